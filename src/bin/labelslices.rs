//! Commandline utility to split a labeled volume into per-label image slices.
//!
//! Every distinct voxel value in the input (e.g. a FreeSurfer `aseg.mgz`)
//! gets its own directory under the output directory, holding one png or jpg
//! per slice along the first axis.

use clap::Parser;
use std::path::Path;

use labelslices::pipeline;
use labelslices::Config;

const TITLE: &str = r"
 _       _          _     _ _
| | __ _| |__   ___| |___| (_) ___ ___  ___
| |/ _` | '_ \ / _ \ / __| | |/ __/ _ \/ __|
| | (_| | |_) |  __/ \__ \ | | (_|  __/\__ \
|_|\__,_|_.__/ \___|_|___/_|_|\___\___||___/
";

// use clap to create commandline interface
#[derive(Parser, Debug)]
#[command(author, about, version, long_about)]
struct Args {
    /// directory holding the input file
    input_dir: String,

    /// directory where one NEW subdirectory per label will be created
    output_dir: String,

    /// name of the input volume within the input directory (.mgz, .mgh, .nii, .nii.gz)
    #[arg(short, long)]
    input_file: String,

    /// output file stem. An image extension here (e.g. `brain.png`) selects
    /// the output type unless --output-file-type is given.
    #[arg(short, long, default_value = "sample")]
    output_file_stem: String,

    /// output image type: png or jpg. jpg is lossy and requires --normalize.
    #[arg(short = 't', long)]
    output_file_type: Option<String>,

    /// rescale each label volume to the full pixel range of the output type
    #[arg(short, long)]
    normalize: bool,

    /// 0 -> warnings only, 1 -> info, 2 -> debug, 3 -> trace.
    /// RUST_LOG overrides this.
    #[arg(short, long, default_value_t = 1)]
    verbosity: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Main function that parses commandline arguments and runs the conversion.
///
/// The output type is validated before the volume is read; any failure ends
/// the run with a nonzero exit code.
fn main() {
    let cli = Args::parse();
    init_logging(cli.verbosity);
    println!("{TITLE}");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));

    let input_file = Path::new(&cli.input_dir).join(&cli.input_file);
    let config = Config::new(input_file, &cli.output_dir)
        .with_output(&cli.output_file_stem, cli.output_file_type.as_deref())
        .unwrap_or_else(|e| {
            eprintln!("Error! {}", e);
            std::process::exit(-2);
        })
        .with_normalize(cli.normalize);
    log::debug!("{:?}", config);

    match pipeline::run(&config) {
        Ok(outputs) => {
            let total: usize = outputs.iter().map(|o| o.slices).sum();
            println!(
                "Wrote {} images for {} labels to {}",
                total,
                outputs.len(),
                config.output_dir.display()
            );
        }
        Err(e) => {
            log::error!("conversion of {} failed", config.input_file.display());
            eprintln!("Error! {}", e);
            std::process::exit(-2);
        }
    }
}

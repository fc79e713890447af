//! Commandline utility to combine one label directory of image slices back into a 3D volume.
//!
//! This is the inverse of `labelslices` for a single label: it reads
//! `<stem>-<index>.<ext>` images in index order, stacks them along the first
//! axis and writes the result as a NIfTI file.

use clap::Parser;
use nifti::writer::WriterOptions;
use nifti::{NiftiObject, ReaderOptions};
use std::path::Path;

use labelslices::restack::restack;
use labelslices::OutputFormat;

// use clap to create commandline interface
#[derive(Parser, Debug)]
#[command(author, about, version, long_about)]
struct Args {
    /// the label directory containing the slice images
    #[arg(short, long)]
    input_dir: String,

    /// the name of the output nifti file
    #[arg(short, long, default_value = "combined.nii")]
    output: String,

    /// the file stem the slices were written with
    #[arg(short, long, default_value = "sample")]
    stem: String,

    /// the image type of the slices. Only lossless png stacks can be combined.
    #[arg(short = 't', long, default_value = "png")]
    file_type: String,

    /// an optional nifti file whose header is reused for the output
    #[arg(short, long)]
    reference: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Args::parse();
    let input_dir = Path::new(&cli.input_dir);
    let output_filename = Path::new(&cli.output);

    if !input_dir.is_dir() {
        eprintln!("Error! Input is not a directory. Use -i to pass a label directory.");
        std::process::exit(-2);
    }
    if output_filename.exists() {
        eprintln!("Error! Output file already exists. Please specify a different output file or remove existing file.");
        std::process::exit(-2);
    }
    let format: OutputFormat = cli.file_type.parse().unwrap_or_else(|e| {
        eprintln!("Error! {}", e);
        std::process::exit(-2);
    });

    let combined = restack(input_dir, &cli.stem, format).unwrap_or_else(|e| {
        eprintln!("Error! {}", e);
        std::process::exit(-2);
    });
    log::info!("Final shape: {:?}", combined.shape());

    // read in reference nifti file
    let reference = cli.reference.map(|r| {
        ReaderOptions::new().read_file(&r).unwrap_or_else(|e| {
            eprintln!("Error! {}", e);
            std::process::exit(-2);
        })
    });
    let mut writer = WriterOptions::new(output_filename);
    if let Some(obj) = &reference {
        writer = writer.reference_header(obj.header());
    }
    writer.write_nifti(&combined).unwrap_or_else(|e| {
        eprintln!("Error! {}", e);
        std::process::exit(-2);
    });
}

//! The configuration record handed to the pipeline.

use std::path::PathBuf;

use crate::error::Result;
use crate::raster::OutputFormat;

pub const DEFAULT_STEM: &str = "sample";
pub const DEFAULT_FORMAT: OutputFormat = OutputFormat::Jpeg;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The labeled volume to convert.
    pub input_file: PathBuf,
    /// Root under which one directory per label is created.
    pub output_dir: PathBuf,
    pub output_stem: String,
    pub format: OutputFormat,
    pub normalize: bool,
}

impl Config {
    /// A config with the default stem and format.
    pub fn new(input_file: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            output_dir: output_dir.into(),
            output_stem: DEFAULT_STEM.to_string(),
            format: DEFAULT_FORMAT,
            normalize: false,
        }
    }

    /// Sets the stem and format from the user's strings.
    ///
    /// A recognized image extension on the stem is stripped and picks the
    /// format, unless `file_type` is given, which always wins. Unknown
    /// `file_type` values fail here, before anything touches the disk.
    pub fn with_output(mut self, stem: &str, file_type: Option<&str>) -> Result<Self> {
        let (stem, stem_format) = split_stem(stem);
        self.format = match file_type {
            Some(t) => t.parse()?,
            None => stem_format.unwrap_or(DEFAULT_FORMAT),
        };
        self.output_stem = stem;
        Ok(self)
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Checks the settings that can fail before any input is read.
    ///
    /// Raw label values are only written to lossless formats, so JPEG
    /// output requires normalization.
    pub fn validate(&self) -> Result<()> {
        self.format.check_raw(self.normalize)
    }
}

/// Splits `name.png` into (`name`, Some(Png)); other stems are returned unchanged.
fn split_stem(stem: &str) -> (String, Option<OutputFormat>) {
    match stem.rsplit_once('.') {
        Some((bare, ext)) if !bare.is_empty() => match OutputFormat::from_extension(ext) {
            Some(format) => (bare.to_string(), Some(format)),
            None => (stem.to_string(), None),
        },
        _ => (stem.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults() {
        let config = Config::new("aseg.mgz", "out");
        assert_eq!(config.output_stem, "sample");
        assert_eq!(config.format, OutputFormat::Jpeg);
        assert!(!config.normalize);
    }

    #[test]
    fn stem_extension_picks_format() {
        let config = Config::new("in", "out").with_output("brain.png", None).unwrap();
        assert_eq!(config.output_stem, "brain");
        assert_eq!(config.format, OutputFormat::Png);
    }

    #[test]
    fn explicit_type_overrides_stem_extension() {
        let config = Config::new("in", "out")
            .with_output("brain.png", Some("jpeg"))
            .unwrap();
        assert_eq!(config.output_stem, "brain");
        assert_eq!(config.format, OutputFormat::Jpeg);
    }

    #[test]
    fn unrelated_dots_stay_in_stem() {
        let config = Config::new("in", "out").with_output("run.01", None).unwrap();
        assert_eq!(config.output_stem, "run.01");
        assert_eq!(config.format, OutputFormat::Jpeg);
    }

    #[test]
    fn raw_jpeg_is_invalid() {
        let config = Config::new("in", "out");
        assert!(matches!(
            config.validate(),
            Err(Error::LossyFormat(OutputFormat::Jpeg))
        ));
        assert!(config.with_normalize(true).validate().is_ok());
        let png = Config::new("in", "out").with_output("sample", Some("png")).unwrap();
        assert!(png.validate().is_ok());
    }

    #[test]
    fn unsupported_type_fails() {
        let err = Config::new("in", "out")
            .with_output("sample", Some("bmp"))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}

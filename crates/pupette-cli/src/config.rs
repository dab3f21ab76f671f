//! Extractor configuration.
//!
//! Options come from CLI arguments with environment variable fallbacks
//! (`PUPETTE_INPUT`, `PUPETTE_OUTPUT`, `PUPETTE_LIST`).

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

/// Suffix appended to the input stem when no output directory is given
pub const OUTPUT_SUFFIX: &str = "_unpack";

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input container does not exist
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input path exists but is not a regular file
    #[error("input is not a file: {}", .0.display())]
    InputNotFile(PathBuf),

    /// Output path exists but is not a directory
    #[error("output exists and is not a directory: {}", .0.display())]
    OutputNotDirectory(PathBuf),
}

/// Extractor configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pupette",
    about = "Unpack PUP firmware-update containers",
    version
)]
pub struct ExtractConfig {
    /// Decrypted PUP container to read
    #[arg(env = "PUPETTE_INPUT")]
    pub input: PathBuf,

    /// Output directory (defaults to the input path without extension plus `_unpack`)
    #[arg(env = "PUPETTE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Print the entry directory and exit without writing files
    #[arg(long, env = "PUPETTE_LIST")]
    pub list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExtractConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Directory extracted files are written under.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.input))
    }

    /// Default log filter when `RUST_LOG` is not set.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The input does not exist or is not a regular file
    /// - The output path exists and is not a directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input.exists() {
            return Err(ConfigError::InputNotFound(self.input.clone()));
        }
        if !self.input.is_file() {
            return Err(ConfigError::InputNotFile(self.input.clone()));
        }

        let output = self.output_dir();
        if output.exists() && !output.is_dir() {
            return Err(ConfigError::OutputNotDirectory(output));
        }

        Ok(())
    }
}

/// `dir/PS4UPDATE.PUP.dec` becomes `dir/PS4UPDATE.PUP_unpack`
pub fn default_output(input: &std::path::Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(OUTPUT_SUFFIX);
    input.with_file_name(name)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn config(input: PathBuf, output: Option<PathBuf>) -> ExtractConfig {
        ExtractConfig {
            input,
            output,
            list: false,
            verbose: false,
        }
    }

    #[test]
    fn test_default_output_strips_last_extension() {
        assert_eq!(
            default_output(std::path::Path::new("fw/PS4UPDATE.PUP.dec")),
            PathBuf::from("fw/PS4UPDATE.PUP_unpack")
        );
        assert_eq!(
            default_output(std::path::Path::new("update")),
            PathBuf::from("update_unpack")
        );
    }

    #[test]
    fn test_explicit_output_wins() {
        let cfg = config(PathBuf::from("a.pup"), Some(PathBuf::from("out")));
        assert_eq!(cfg.output_dir(), PathBuf::from("out"));
    }

    #[test]
    fn test_parse_arguments() {
        let cfg = ExtractConfig::try_parse_from(["pupette", "--list", "-v", "a.pup", "dest"]).unwrap();
        assert!(cfg.list);
        assert!(cfg.verbose);
        assert_eq!(cfg.input, PathBuf::from("a.pup"));
        assert_eq!(cfg.output, Some(PathBuf::from("dest")));
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn test_validate_accepts_file_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("update.pup");
        fs::write(&input, b"data").unwrap();

        assert!(config(input.clone(), None).validate().is_ok());
        assert!(config(input, Some(dir.path().to_path_buf())).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = config(dir.path().join("absent.pup"), None).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InputNotFound(_)));
    }

    #[test]
    fn test_validate_rejects_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = config(dir.path().to_path_buf(), None).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InputNotFile(_)));
    }

    #[test]
    fn test_validate_rejects_file_as_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("update.pup");
        let output = dir.path().join("taken");
        fs::write(&input, b"data").unwrap();
        fs::write(&output, b"file").unwrap();

        let err = config(input, Some(output)).validate().unwrap_err();
        assert!(matches!(err, ConfigError::OutputNotDirectory(_)));
    }
}

//! Pupette binary entry point.
//!
//! This is a thin wrapper around the pupette-formats library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Validates configuration
//! 4. Lists or extracts the container
//!
//! For library usage, see the pupette-formats crate documentation.

mod config;
mod listing;

use anyhow::{Context, Result};
use config::ExtractConfig;
use pupette_formats::pup::{PupReader, extract_all};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = ExtractConfig::from_args();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level())),
        )
        .init();

    tracing::info!("Pupette starting...");

    config.validate()?;

    let mut reader = PupReader::open(&config.input)
        .with_context(|| format!("failed to read container {}", config.input.display()))?;

    if config.list {
        println!("{}", listing::header_line(reader.header()));
        println!("{}", listing::LISTING_HEADER);
        for index in 0..reader.entries().len() {
            if let Some(line) = listing::entry_line(reader.entries(), reader.tables(), index) {
                println!("{line}");
            }
        }
        return Ok(());
    }

    let output = config.output_dir();
    tracing::info!("Extracting {} to {}", config.input.display(), output.display());

    let stats = extract_all(&mut reader, &output)
        .with_context(|| format!("extraction into {} failed", output.display()))?;

    tracing::info!(
        "Done: {} files, {} bytes, {} special entries skipped",
        stats.files_written,
        stats.bytes_written,
        stats.entries_skipped
    );

    Ok(())
}

//! Parser, block reconstructor and builder for PUP firmware-update containers
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Consistent log formatting
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::new_without_default)] // Test helpers
//! This crate reads PUP containers, resolves the block table indirection used
//! by large entries and writes every entry back out as a file.
//!
//! # Example
//!
//! ```no_run
//! use pupette_formats::pup::{PupReader, extract_all};
//! use std::path::Path;
//!
//! let mut reader = PupReader::open("PS4UPDATE.PUP.dec")?;
//! let stats = extract_all(&mut reader, Path::new("PS4UPDATE_unpack"))?;
//! println!("{} files written", stats.files_written);
//! # Ok::<(), pupette_formats::pup::PupError>(())
//! ```
//!
//! # Design Principles
//!
//! - **Single Source of Truth**: entry properties are computed from the raw
//!   flags word, never cached
//! - **Fail Fast**: any inconsistency aborts extraction with a typed error
//! - **Random-Access Output**: blocks are written at their logical offset, so
//!   physical block order does not matter

#![warn(missing_docs)]

/// PUP container parsing, block reconstruction and building
///
/// See the [`pup`] module for the container layout and the reader API.
pub mod pup;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

//! Remove configured substrings from the text metadata of PNG files.
//!
//! PNG files store text metadata in `tEXt` and `iTXt` chunks as
//! `keyword\0value`. This crate decodes the chunk stream of a PNG, deletes
//! every occurrence of a list of literal strings from those values, fixes up
//! the chunk length and CRC, and writes the stream back. Every other chunk is
//! copied byte for byte and chunk order never changes.
//!
//! # Design Principles
//!
//! - **Framing only**: the codec checks the signature and the chunk framing,
//!   nothing else
//! - **Pure rewriting**: [`Rewriter`] is a plain value built from the
//!   configuration; it has no I/O and no global state
//! - **Per-file isolation**: a bad file is reported and skipped, and output
//!   files appear atomically
//!
//! # Quick Start
//!
//! ```
//! use png_scrub::{codec, DecodeMode, Rewriter};
//! use png_scrub::test_utils::text_png;
//!
//! # fn main() -> png_scrub::Result<()> {
//! let png = text_png(&[("Author", "John Secret Smith")]);
//!
//! let rewriter = Rewriter::new(["Secret "]);
//! let mut chunks = codec::read_png(&png, DecodeMode::Lenient)?;
//! let stats = rewriter.rewrite_stream(&mut chunks);
//! assert_eq!(stats.modified_chunks, 1);
//!
//! let output = codec::encode(&chunks);
//! assert_eq!(output, text_png(&[("Author", "John Smith")]));
//! # Ok(())
//! # }
//! ```
//!
//! # Batch API
//!
//! ```no_run
//! use png_scrub::{batch, Config};
//!
//! # fn main() -> png_scrub::Result<()> {
//! let config = Config::load("config.toml")?;
//! let report = batch::run(&config)?;
//! for failure in &report.failures {
//!     eprintln!("{failure}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
mod chunk;
pub mod codec;
pub mod config;
pub mod crc;
mod error;
mod rewrite;
pub mod text;

pub use chunk::{Chunk, ChunkType};
pub use codec::{DecodeMode, PNG_SIGNATURE};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use rewrite::{remove_all, ItxtMode, RewriteStats, Rewriter};

// Test utilities - only compiled for tests or when explicitly enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

//! Error types for png-scrub

use std::io;
use std::path::PathBuf;

/// Result type for png-scrub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, rewriting or writing PNG files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The first 8 bytes are not the PNG signature
    #[error("Invalid PNG signature")]
    InvalidSignature,

    /// A chunk record was cut short (strict decoding only)
    #[error("Truncated chunk stream at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// Configuration is missing a value or holds an unusable one
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid TOML
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Input directory traversal failed
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Processing a single file failed
    #[error("{}: {}", .path.display(), .source)]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the file path this error happened on
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_file_display() {
        let err = Error::InvalidSignature.in_file("in/a.png");
        assert_eq!(err.to_string(), "in/a.png: Invalid PNG signature");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_truncated_display() {
        let err = Error::TruncatedStream {
            offset: 25,
            needed: 112,
            available: 18,
        };
        assert_eq!(
            err.to_string(),
            "Truncated chunk stream at offset 25: needed 112 bytes, 18 available"
        );
    }
}

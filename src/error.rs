//! Centralized error types for callbox.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced during extraction.
///
/// None of these propagate out of [`crate::extract::MboxExtractor::extract`];
/// they are logged and collected into the run's
/// [`crate::extract::ExtractionSummary`].
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The archive file does not exist.
    #[error("archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// I/O error reading the archive.
    #[error("I/O error reading '{}': {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// One message block failed MIME parsing. The block is skipped.
    #[error("failed to parse message block {index}")]
    MessageParse { index: usize },

    /// The `Date` header was missing or unparsable. A fallback timestamp
    /// (current wall-clock time) is substituted.
    #[error("failed to parse date '{value}'")]
    DateParse { value: String },

    /// A decoded audio payload could not be persisted. The attachment is
    /// skipped.
    #[error("failed to save audio file '{filename}': {source}")]
    AttachmentWrite {
        filename: String,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, ExtractError>`.
pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Create an `ArchiveRead` variant from a path and an `io::Error`,
    /// mapping `NotFound` to `ArchiveNotFound`.
    pub fn archive_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::ArchiveNotFound(path)
        } else {
            Self::ArchiveRead { path, source }
        }
    }
}

//! Error types for acris-ingest
//!
//! Three layers, matching how far a failure may travel:
//! - [`ExtractError`]: tag/container problems. Always recoverable; the track
//!   is still stored with whatever fields were recovered.
//! - [`ThumbnailError`]: picture decode/encode problems. Recoverable.
//! - [`IngestError`]: storage failures. The only errors that abort an ingest.

use crate::types::ContainerFormat;
use thiserror::Error;

/// Extraction error (recoverable)
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Sniffer could not classify the bytes as a supported container
    #[error("Unsupported container: {0}")]
    UnsupportedContainer(String),

    /// Container was classified but its structure could not be parsed
    #[error("Failed to parse {format} container: {reason}")]
    Container {
        format: ContainerFormat,
        reason: String,
    },

    /// A single tag field was malformed and skipped
    #[error("Malformed {field} tag: {reason}")]
    MalformedTag { field: &'static str, reason: String },

    /// Extraction worker stopped before producing a result
    #[error("Extraction aborted: {0}")]
    Aborted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Thumbnail error (recoverable)
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Failed to decode embedded picture: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Thumbnail worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Ingest error (fatal to one track)
#[derive(Debug, Error)]
pub enum IngestError {
    /// Find-or-create of an artist, album or genre failed
    #[error("Entity resolution failed: {0}")]
    Resolve(#[source] acris_common::Error),

    /// Storing the thumbnail or the track record failed
    #[error("Persistence failed: {0}")]
    Persist(#[source] acris_common::Error),

    /// Upload exceeds the configured size limit
    #[error("Upload too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;

//! Common error types for Acris

use thiserror::Error;

/// Common result type for Acris storage and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the storage collaborator and configuration loading
///
/// Every variant is fatal to an ingest: the pipeline only propagates these,
/// never tag or container errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller passed a value the store refuses (e.g. an empty entity name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored row could not be decoded (e.g. malformed GUID column)
    #[error("Corrupt record in {table}: {reason}")]
    CorruptRecord { table: &'static str, reason: String },
}

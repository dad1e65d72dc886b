//! acris-ingest library interface
//!
//! Turns uploaded audio files into normalized track records: detect the
//! container, extract tags, resolve artists/albums/genres within a
//! collection, normalize the embedded picture to a JPEG thumbnail and hand
//! the result to storage.

pub mod db;
pub mod error;
pub mod extractors;
pub mod normalizer;
pub mod pipeline;
pub mod sniffer;
pub mod store;
pub mod thumbnail;
pub mod types;

pub use crate::error::{ExtractError, IngestError, IngestResult, ThumbnailError};
pub use crate::extractors::extract_metadata;
pub use crate::pipeline::{IngestOutcome, TrackIngestor, UploadedFile};
pub use crate::store::LibraryStore;

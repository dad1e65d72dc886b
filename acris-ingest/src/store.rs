//! Storage collaborator seam
//!
//! The ingest core only talks to storage through [`LibraryStore`]. The
//! SQLite implementation lives in [`crate::db`]; tests substitute their own.

use crate::types::{AlbumRef, ArtistRef, CollectionId, GenreRef, NormalizedTrack, ThumbnailRef};
use acris_common::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Collection-scoped entity lookup plus track and thumbnail persistence
///
/// Find-or-create operations must be atomic per (collection, name): two
/// concurrent calls with the same name return the same reference.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    async fn find_or_create_artist(&self, collection: CollectionId, name: &str) -> Result<ArtistRef>;

    async fn find_or_create_album(&self, collection: CollectionId, name: &str) -> Result<AlbumRef>;

    async fn find_or_create_genre(&self, collection: CollectionId, name: &str) -> Result<GenreRef>;

    /// Store the normalized JPEG for a track, replacing any previous one
    async fn store_thumbnail(&self, track_id: Uuid, jpeg: &[u8]) -> Result<ThumbnailRef>;

    /// Insert or replace the track record and its entity links
    async fn save_track(&self, track: &NormalizedTrack) -> Result<()>;
}

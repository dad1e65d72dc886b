//! SQLite library storage
//!
//! Free functions per table, plus [`SqliteLibraryStore`] which exposes them
//! through the [`LibraryStore`] seam.

pub mod entities;
pub mod thumbnails;
pub mod tracks;

use acris_common::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::store::LibraryStore;
use crate::thumbnail::{thumbnail_name, THUMBNAIL_MIME_TYPE};
use crate::types::{AlbumRef, ArtistRef, CollectionId, GenreRef, NormalizedTrack, ThumbnailRef};

/// [`LibraryStore`] backed by the shared SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteLibraryStore {
    pool: SqlitePool,
}

impl SqliteLibraryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LibraryStore for SqliteLibraryStore {
    async fn find_or_create_artist(&self, collection: CollectionId, name: &str) -> Result<ArtistRef> {
        entities::find_or_create_artist(&self.pool, collection, name).await
    }

    async fn find_or_create_album(&self, collection: CollectionId, name: &str) -> Result<AlbumRef> {
        entities::find_or_create_album(&self.pool, collection, name).await
    }

    async fn find_or_create_genre(&self, collection: CollectionId, name: &str) -> Result<GenreRef> {
        entities::find_or_create_genre(&self.pool, collection, name).await
    }

    async fn store_thumbnail(&self, track_id: Uuid, jpeg: &[u8]) -> Result<ThumbnailRef> {
        let name = thumbnail_name(track_id);
        thumbnails::save_thumbnail(&self.pool, track_id, &name, THUMBNAIL_MIME_TYPE, jpeg).await?;
        Ok(ThumbnailRef(name))
    }

    async fn save_track(&self, track: &NormalizedTrack) -> Result<()> {
        tracks::save_track(&self.pool, track).await
    }
}

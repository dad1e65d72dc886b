//! Raw metadata to track record
//!
//! Steps run in a fixed order:
//! 1. Name: the title, or the uploaded filename when the title is absent or empty
//! 2. Entities: artists, genre and album resolved to collection-scoped references
//! 3. Thumbnail: embedded picture normalized to JPEG and stored
//! 4. MIME: `audio_format` set from the container, only when extraction succeeded
//!
//! Resolution and storage errors propagate. Thumbnail decode failures are
//! recorded as issues and the track keeps going without one.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{IngestError, IngestResult};
use crate::store::LibraryStore;
use crate::thumbnail::{render_thumbnail_async, ThumbnailSettings};
use crate::types::{
    AlbumRef, ArtistRef, CollectionId, GenreRef, IngestIssue, IngestStage, NormalizedTrack,
    RawMetadata, Thumbnail,
};

/// Identity of the track being normalized
#[derive(Debug, Clone)]
pub struct TrackContext {
    pub track_id: Uuid,
    pub collection: CollectionId,
    pub original_filename: String,
}

/// References resolved during one extraction run
///
/// A name already resolved in a collection is never sent to the store again.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    artists: HashMap<(CollectionId, String), ArtistRef>,
    albums: HashMap<(CollectionId, String), AlbumRef>,
    genres: HashMap<(CollectionId, String), GenreRef>,
}

pub struct Normalizer<'a> {
    store: &'a dyn LibraryStore,
    thumbnails: ThumbnailSettings,
    cache: ResolutionCache,
}

impl<'a> Normalizer<'a> {
    pub fn new(store: &'a dyn LibraryStore, thumbnails: ThumbnailSettings) -> Self {
        Self {
            store,
            thumbnails,
            cache: ResolutionCache::default(),
        }
    }

    /// Build the track record
    ///
    /// `raw` is `None` when extraction failed; the record then carries only
    /// the filename and no `audio_format`.
    pub async fn normalize(
        &mut self,
        ctx: &TrackContext,
        raw: Option<RawMetadata>,
        issues: &mut Vec<IngestIssue>,
    ) -> IngestResult<NormalizedTrack> {
        let mut track = NormalizedTrack::new(ctx.track_id, ctx.collection, &ctx.original_filename);
        let Some(raw) = raw else {
            debug!(track_id = %ctx.track_id, "No metadata; using filename only");
            return Ok(track);
        };

        track.name = track_name(raw.title.as_deref(), &ctx.original_filename);
        track.length = Duration::try_from_secs_f64(raw.duration_seconds).unwrap_or_default();
        track.album_artist = raw.album_artist.clone().unwrap_or_default();
        track.album_track_number = raw.track_number;
        track.lyrics = raw.lyrics.clone().unwrap_or_default();
        track.year = raw.year.clone();

        self.resolve_entities(ctx, &raw, &mut track).await?;
        debug!(
            track_id = %ctx.track_id,
            stage = %IngestStage::EntitiesResolved,
            artists = track.artists.len(),
            genres = track.genres.len(),
            has_album = track.album.is_some()
        );

        if let Some(picture) = raw.picture {
            self.apply_thumbnail(ctx, picture, &mut track, issues).await?;
        }

        track.audio_format = Some(raw.container_format.mime_type());

        Ok(track)
    }

    async fn resolve_entities(
        &mut self,
        ctx: &TrackContext,
        raw: &RawMetadata,
        track: &mut NormalizedTrack,
    ) -> IngestResult<()> {
        for name in raw.artists.iter().filter(|name| is_nameable(name)) {
            let artist = self.resolve_artist(ctx.collection, name).await?;
            track.add_artist(artist);
        }

        if let Some(genre) = raw.genre.as_deref().filter(|name| is_nameable(name)) {
            let genre = self.resolve_genre(ctx.collection, genre).await?;
            track.add_genre(genre);
        }

        if let Some(album) = raw.album.as_deref().filter(|name| is_nameable(name)) {
            track.album = Some(self.resolve_album(ctx.collection, album).await?);
        }

        Ok(())
    }

    async fn resolve_artist(&mut self, collection: CollectionId, name: &str) -> IngestResult<ArtistRef> {
        let key = (collection, name.to_string());
        if let Some(artist) = self.cache.artists.get(&key) {
            return Ok(*artist);
        }

        let artist = self
            .store
            .find_or_create_artist(collection, name)
            .await
            .map_err(IngestError::Resolve)?;
        self.cache.artists.insert(key, artist);
        Ok(artist)
    }

    async fn resolve_album(&mut self, collection: CollectionId, name: &str) -> IngestResult<AlbumRef> {
        let key = (collection, name.to_string());
        if let Some(album) = self.cache.albums.get(&key) {
            return Ok(*album);
        }

        let album = self
            .store
            .find_or_create_album(collection, name)
            .await
            .map_err(IngestError::Resolve)?;
        self.cache.albums.insert(key, album);
        Ok(album)
    }

    async fn resolve_genre(&mut self, collection: CollectionId, name: &str) -> IngestResult<GenreRef> {
        let key = (collection, name.to_string());
        if let Some(genre) = self.cache.genres.get(&key) {
            return Ok(*genre);
        }

        let genre = self
            .store
            .find_or_create_genre(collection, name)
            .await
            .map_err(IngestError::Resolve)?;
        self.cache.genres.insert(key, genre);
        Ok(genre)
    }

    async fn apply_thumbnail(
        &self,
        ctx: &TrackContext,
        picture: Vec<u8>,
        track: &mut NormalizedTrack,
        issues: &mut Vec<IngestIssue>,
    ) -> IngestResult<()> {
        let picture_bytes = picture.len();
        let jpeg = match render_thumbnail_async(picture, self.thumbnails).await {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!(track_id = %ctx.track_id, error = %e, "Skipping thumbnail");
                issues.push(IngestIssue::new(IngestStage::ThumbnailApplied, &e));
                return Ok(());
            }
        };

        let reference = self
            .store
            .store_thumbnail(ctx.track_id, &jpeg)
            .await
            .map_err(IngestError::Persist)?;

        debug!(
            track_id = %ctx.track_id,
            picture_bytes,
            thumbnail_bytes = jpeg.len(),
            "Thumbnail stored"
        );
        track.thumbnail = Some(Thumbnail { reference, data: jpeg });
        Ok(())
    }
}

/// Title when usable, otherwise the uploaded filename
pub fn track_name(title: Option<&str>, original_filename: &str) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => title.to_string(),
        _ => original_filename.to_string(),
    }
}

fn is_nameable(name: &str) -> bool {
    !name.trim().is_empty()
}

//! Per-track ingest pipeline
//!
//! Uploaded → FormatDetected → TagsExtracted → EntitiesResolved →
//! ThumbnailApplied → Persisted
//!
//! Extraction failures never stop a track: it is persisted with whatever was
//! recovered (at least the filename). Only entity resolution and storage
//! failures are returned as errors.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ExtractError, IngestError, IngestResult};
use crate::extractors::extract_metadata;
use crate::normalizer::{Normalizer, TrackContext};
use crate::store::LibraryStore;
use crate::thumbnail::ThumbnailSettings;
use crate::types::{CollectionId, ContainerFormat, IngestIssue, IngestStage, NormalizedTrack, RawMetadata};

/// Default upload limit when none is configured
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 512 * 1024 * 1024;

/// One uploaded file awaiting ingest
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub track_id: Uuid,
    pub collection: CollectionId,
    pub original_filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(collection: CollectionId, original_filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            track_id: Uuid::new_v4(),
            collection,
            original_filename: original_filename.into(),
            bytes,
        }
    }
}

/// Result of ingesting one track
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub track: NormalizedTrack,
    /// Container the sniffer recognized, even when parsing it failed
    pub detected_format: Option<ContainerFormat>,
    pub issues: Vec<IngestIssue>,
}

impl IngestOutcome {
    /// True when every stage completed without a recorded issue
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Runs uploads through extraction, normalization and persistence
pub struct TrackIngestor {
    store: Arc<dyn LibraryStore>,
    thumbnails: ThumbnailSettings,
    max_upload_bytes: u64,
}

impl TrackIngestor {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self {
            store,
            thumbnails: ThumbnailSettings::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_thumbnail_settings(mut self, thumbnails: ThumbnailSettings) -> Self {
        self.thumbnails = thumbnails;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Ingest one uploaded file
    pub async fn ingest(&self, upload: UploadedFile) -> IngestResult<IngestOutcome> {
        self.start_run().ingest(upload).await
    }

    /// Start an extraction run sharing one resolution cache
    ///
    /// Entity names resolved for one file are reused for the rest of the run.
    pub fn start_run(&self) -> IngestRun<'_> {
        IngestRun {
            ingestor: self,
            normalizer: Normalizer::new(self.store.as_ref(), self.thumbnails),
        }
    }

    /// Ingest several files as one run, stopping at the first storage error
    pub async fn ingest_batch(&self, uploads: Vec<UploadedFile>) -> IngestResult<Vec<IngestOutcome>> {
        let mut run = self.start_run();
        let mut outcomes = Vec::with_capacity(uploads.len());
        for upload in uploads {
            outcomes.push(run.ingest(upload).await?);
        }
        Ok(outcomes)
    }

    /// Read a file from disk and ingest it under its own file name
    pub async fn ingest_path(&self, collection: CollectionId, path: &Path) -> IngestResult<IngestOutcome> {
        let upload = self.read_upload(collection, path).await?;
        self.ingest(upload).await
    }

    /// Read a file within the size limit
    pub async fn read_upload(&self, collection: CollectionId, path: &Path) -> IngestResult<UploadedFile> {
        let size = tokio::fs::metadata(path).await?.len();
        if size > self.max_upload_bytes {
            return Err(IngestError::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let bytes = tokio::fs::read(path).await?;
        let original_filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(UploadedFile::new(collection, original_filename, bytes))
    }
}

/// One extraction run over any number of uploads
pub struct IngestRun<'a> {
    ingestor: &'a TrackIngestor,
    normalizer: Normalizer<'a>,
}

impl IngestRun<'_> {
    /// Ingest one uploaded file within this run
    pub async fn ingest(&mut self, upload: UploadedFile) -> IngestResult<IngestOutcome> {
        let ctx = TrackContext {
            track_id: upload.track_id,
            collection: upload.collection,
            original_filename: upload.original_filename,
        };
        info!(
            track_id = %ctx.track_id,
            collection = ctx.collection.0,
            file = %ctx.original_filename,
            bytes = upload.bytes.len(),
            stage = %IngestStage::Uploaded,
            "Ingesting track"
        );

        let mut issues = Vec::new();
        let (raw, detected_format) = extract(&ctx, upload.bytes, &mut issues).await;

        let track = self.normalizer.normalize(&ctx, raw, &mut issues).await?;

        self.ingestor
            .store
            .save_track(&track)
            .await
            .map_err(IngestError::Persist)?;

        info!(
            track_id = %track.id,
            name = %track.name,
            audio_format = track.audio_format.unwrap_or("-"),
            artists = track.artists.len(),
            has_thumbnail = track.thumbnail.is_some(),
            issues = issues.len(),
            stage = %IngestStage::Persisted,
            "Track persisted"
        );

        Ok(IngestOutcome {
            track,
            detected_format,
            issues,
        })
    }
}

/// Run extraction on the blocking pool; every failure becomes an issue
async fn extract(
    ctx: &TrackContext,
    bytes: Vec<u8>,
    issues: &mut Vec<IngestIssue>,
) -> (Option<RawMetadata>, Option<ContainerFormat>) {
    let result = tokio::task::spawn_blocking(move || extract_metadata(&bytes))
        .await
        .unwrap_or_else(|e| Err(ExtractError::Aborted(e.to_string())));

    match result {
        Ok(mut raw) => {
            let format = raw.container_format;
            debug!(track_id = %ctx.track_id, format = %format, stage = %IngestStage::TagsExtracted);
            for issue in raw.issues.drain(..) {
                warn!(track_id = %ctx.track_id, error = %issue, "Skipped malformed tag data");
                issues.push(IngestIssue::new(IngestStage::TagsExtracted, &issue));
            }
            (Some(raw), Some(format))
        }
        Err(e) => {
            let (stage, format) = match &e {
                ExtractError::UnsupportedContainer(_) => (IngestStage::FormatDetected, None),
                ExtractError::Container { format, .. } => (IngestStage::TagsExtracted, Some(*format)),
                _ => (IngestStage::TagsExtracted, None),
            };
            warn!(
                track_id = %ctx.track_id,
                file = %ctx.original_filename,
                error = %e,
                "Metadata extraction failed; storing track with filename only"
            );
            issues.push(IngestIssue::new(stage, &e));
            (None, format)
        }
    }
}

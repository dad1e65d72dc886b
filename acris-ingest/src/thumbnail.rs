//! Thumbnail normalization
//!
//! Every embedded picture, whatever its source encoding, is decoded and
//! re-encoded as a JPEG no larger than the configured bounding box. Smaller
//! pictures keep their size.

use crate::error::ThumbnailError;
use acris_common::config::ThumbnailConfig;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use uuid::Uuid;

/// MIME type of every stored thumbnail
pub const THUMBNAIL_MIME_TYPE: &str = "image/jpeg";

const THUMBNAIL_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSettings {
    /// Longest edge in pixels
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self::from(&ThumbnailConfig::default())
    }
}

impl From<&ThumbnailConfig> for ThumbnailSettings {
    fn from(config: &ThumbnailConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Storage name of a track's thumbnail
pub fn thumbnail_name(track_id: Uuid) -> String {
    format!("{}.{}", track_id, THUMBNAIL_EXTENSION)
}

/// Decode, bound and re-encode a picture as JPEG
pub fn render_thumbnail(picture: &[u8], settings: ThumbnailSettings) -> Result<Vec<u8>, ThumbnailError> {
    let image = image::load_from_memory(picture).map_err(ThumbnailError::Decode)?;

    let max = settings.max_dimension;
    let image = if image.width() > max || image.height() > max {
        image.resize(max, max, FilterType::Lanczos3)
    } else {
        image
    };

    // JPEG has no alpha channel
    let rgb = image.to_rgb8();

    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, settings.jpeg_quality);
    encoder.encode_image(&rgb).map_err(ThumbnailError::Encode)?;

    Ok(buffer)
}

/// [`render_thumbnail`] on the blocking thread pool
pub async fn render_thumbnail_async(
    picture: Vec<u8>,
    settings: ThumbnailSettings,
) -> Result<Vec<u8>, ThumbnailError> {
    tokio::task::spawn_blocking(move || render_thumbnail(&picture, settings)).await?
}

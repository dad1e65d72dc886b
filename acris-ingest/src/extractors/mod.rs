//! Per-format tag extraction
//!
//! The [`sniffer`](crate::sniffer) classifies the bytes, [`strategy_for`]
//! picks the matching [`TagExtractor`], and the strategy produces a
//! [`RawMetadata`]. FLAC and Ogg carry Vorbis comments natively; MP3 and MP4
//! translate their frames/atoms into the same [`TagMap`](crate::types::TagMap)
//! so every format goes through [`vorbis::vorbis_style_extract`].
//!
//! # Strategies
//! 1. **flac** - Vorbis comments + PICTURE blocks
//! 2. **mp3** - ID3v2 frames (APIC read directly, text via a key view)
//! 3. **mp4** - iTunes `ilst` atoms
//! 4. **ogg** - Vorbis/Opus comment headers, METADATA_BLOCK_PICTURE

pub mod flac;
pub mod mp3;
pub mod mp4;
pub mod ogg;
pub mod vorbis;

use crate::error::ExtractError;
use crate::sniffer;
use crate::types::{ContainerFormat, RawMetadata};
use lofty::config::{ParseOptions, ParsingMode};
use tracing::debug;

pub use flac::FlacExtractor;
pub use mp3::Mp3Extractor;
pub use mp4::Mp4Extractor;
pub use ogg::{OggCodec, OggExtractor};

/// Format-specific extraction strategy
pub trait TagExtractor: Send + Sync {
    /// Container this strategy handles
    fn format(&self) -> ContainerFormat;

    /// Extract tags from the full file bytes
    ///
    /// Returns `Err` only when the container itself cannot be parsed.
    /// Malformed individual fields are skipped and recorded in
    /// [`RawMetadata::issues`].
    fn extract(&self, bytes: &[u8]) -> Result<RawMetadata, ExtractError>;
}

/// Select the strategy for a classified container
pub fn strategy_for(format: ContainerFormat) -> &'static dyn TagExtractor {
    match format {
        ContainerFormat::Flac => &FlacExtractor,
        ContainerFormat::Mp3 => &Mp3Extractor,
        ContainerFormat::Mp4 => &Mp4Extractor,
        ContainerFormat::OggVorbis => &OggExtractor {
            codec: OggCodec::Vorbis,
        },
        ContainerFormat::OggOpus => &OggExtractor {
            codec: OggCodec::Opus,
        },
    }
}

/// Classify the bytes and run the matching strategy
pub fn extract_metadata(bytes: &[u8]) -> Result<RawMetadata, ExtractError> {
    let format = sniffer::classify(bytes)?;
    debug!(format = %format, bytes = bytes.len(), "Container detected");

    let raw = strategy_for(format).extract(bytes)?;

    debug!(
        format = %format,
        duration_seconds = raw.duration_seconds,
        title = ?raw.title,
        artists = raw.artists.len(),
        has_picture = raw.picture.is_some(),
        issues = raw.issues.len(),
        "Tags extracted"
    );

    Ok(raw)
}

/// Lenient lofty parsing: keep going past malformed items
pub(crate) fn parse_options() -> ParseOptions {
    ParseOptions::new().parsing_mode(ParsingMode::BestAttempt)
}

/// Map a lofty read failure onto the container it was reading
pub(crate) fn container_error(format: ContainerFormat, error: impl std::fmt::Display) -> ExtractError {
    ExtractError::Container {
        format,
        reason: error.to_string(),
    }
}

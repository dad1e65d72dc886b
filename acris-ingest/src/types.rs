//! Core types for track ingest
//!
//! Two halves:
//! - Extraction side: [`ContainerFormat`], [`TagKey`], [`TagValue`], [`TagMap`],
//!   [`RawMetadata`]. Produced per file and consumed immediately.
//! - Normalized side: collection-scoped entity references and
//!   [`NormalizedTrack`], the record handed to the storage collaborator.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Extraction Types
// ============================================================================

/// Audio container formats the ingest core understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerFormat {
    Flac,
    Mp3,
    Mp4,
    OggVorbis,
    OggOpus,
}

impl ContainerFormat {
    pub const ALL: [ContainerFormat; 5] = [
        ContainerFormat::Flac,
        ContainerFormat::Mp3,
        ContainerFormat::Mp4,
        ContainerFormat::OggVorbis,
        ContainerFormat::OggOpus,
    ];

    /// Canonical MIME type stored as a track's `audio_format`
    pub fn mime_type(self) -> &'static str {
        match self {
            ContainerFormat::Flac => "audio/flac",
            ContainerFormat::Mp3 => "audio/mpeg",
            ContainerFormat::Mp4 => "audio/mp4",
            ContainerFormat::OggVorbis => "audio/ogg",
            ContainerFormat::OggOpus => "audio/opus",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerFormat::Flac => "FLAC",
            ContainerFormat::Mp3 => "MP3",
            ContainerFormat::Mp4 => "MP4",
            ContainerFormat::OggVorbis => "Ogg Vorbis",
            ContainerFormat::OggOpus => "Ogg Opus",
        };
        f.write_str(name)
    }
}

/// Tag fields the ingest core reads, keyed by their Vorbis comment names
///
/// MP3 and MP4 strategies map their own frame/atom identifiers onto these
/// keys so every format shares one extraction routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    Title,
    Artist,
    AlbumArtist,
    Album,
    TrackNumber,
    Genre,
    Lyrics,
    Date,
}

impl TagKey {
    pub const ALL: [TagKey; 8] = [
        TagKey::Title,
        TagKey::Artist,
        TagKey::AlbumArtist,
        TagKey::Album,
        TagKey::TrackNumber,
        TagKey::Genre,
        TagKey::Lyrics,
        TagKey::Date,
    ];

    /// Vorbis comment field name (comment keys are case-insensitive)
    pub fn vorbis_key(self) -> &'static str {
        match self {
            TagKey::Title => "TITLE",
            TagKey::Artist => "ARTIST",
            TagKey::AlbumArtist => "ALBUMARTIST",
            TagKey::Album => "ALBUM",
            TagKey::TrackNumber => "TRACKNUMBER",
            TagKey::Genre => "GENRE",
            TagKey::Lyrics => "LYRICS",
            TagKey::Date => "DATE",
        }
    }

    pub fn from_vorbis_key(key: &str) -> Option<TagKey> {
        TagKey::ALL
            .into_iter()
            .find(|candidate| candidate.vorbis_key().eq_ignore_ascii_case(key))
    }
}

/// Value of one tag field
///
/// `Absent` means the field was not in the container at all; a field present
/// with an empty string is `Single(String::new())`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagValue {
    #[default]
    Absent,
    Single(String),
    Multi(Vec<String>),
}

impl TagValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, TagValue::Absent)
    }

    /// First value, the policy for every single-valued field
    pub fn first(&self) -> Option<&str> {
        match self {
            TagValue::Absent => None,
            TagValue::Single(value) => Some(value),
            TagValue::Multi(values) => values.first().map(String::as_str),
        }
    }

    /// Every value in tag order
    pub fn values(&self) -> Vec<&str> {
        match self {
            TagValue::Absent => Vec::new(),
            TagValue::Single(value) => vec![value.as_str()],
            TagValue::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        *self = match std::mem::take(self) {
            TagValue::Absent => TagValue::Single(value),
            TagValue::Single(first) => TagValue::Multi(vec![first, value]),
            TagValue::Multi(mut values) => {
                values.push(value);
                TagValue::Multi(values)
            }
        };
    }
}

/// Typed lookup table of the tag fields found in one container
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    entries: HashMap<TagKey, TagValue>,
}

static ABSENT: TagValue = TagValue::Absent;

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value; repeated keys become multi-valued
    pub fn push(&mut self, key: TagKey, value: impl Into<String>) {
        self.entries.entry(key).or_default().push(value.into());
    }

    pub fn get(&self, key: TagKey) -> &TagValue {
        self.entries.get(&key).unwrap_or(&ABSENT)
    }

    pub fn contains(&self, key: TagKey) -> bool {
        !self.get(key).is_absent()
    }
}

/// Metadata recovered from one container, before normalization
///
/// Only [`RawMetadata::new`] builds one, so `container_format` is always set
/// before any other field. `None` means the tag was not present.
#[derive(Debug)]
pub struct RawMetadata {
    pub container_format: ContainerFormat,
    pub duration_seconds: f64,
    pub title: Option<String>,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub track_number: Option<u32>,
    pub lyrics: Option<String>,
    /// Free-form date text, not always a valid date
    pub year: Option<String>,
    /// Embedded picture in its original encoding
    pub picture: Option<Vec<u8>>,
    /// Field-level problems that were skipped during extraction
    pub issues: Vec<ExtractError>,
}

impl RawMetadata {
    pub fn new(container_format: ContainerFormat) -> Self {
        Self {
            container_format,
            duration_seconds: 0.0,
            title: None,
            artists: Vec::new(),
            album: None,
            album_artist: None,
            genre: None,
            track_number: None,
            lyrics: None,
            year: None,
            picture: None,
            issues: Vec::new(),
        }
    }
}

// ============================================================================
// Normalized Types
// ============================================================================

/// Collection scope under which entity names are unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionId(pub i64);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable reference to a stored artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistRef(pub Uuid);

/// Stable reference to a stored album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumRef(pub Uuid);

/// Stable reference to a stored genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenreRef(pub Uuid);

/// Name under which a thumbnail was stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbnailRef(pub String);

/// Normalized thumbnail image (always JPEG)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub reference: ThumbnailRef,
    pub data: Vec<u8>,
}

/// Track record handed to the storage collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTrack {
    pub id: Uuid,
    pub collection: CollectionId,
    pub name: String,
    /// Original uploaded filename (not a storage path)
    pub file_name: String,
    pub length: Duration,
    /// Unset when the container could not be parsed
    pub audio_format: Option<&'static str>,
    pub artists: Vec<ArtistRef>,
    pub album_artist: String,
    pub album: Option<AlbumRef>,
    pub album_track_number: Option<u32>,
    pub genres: Vec<GenreRef>,
    pub lyrics: String,
    pub year: Option<String>,
    pub thumbnail: Option<Thumbnail>,
}

impl NormalizedTrack {
    /// Empty record named after the uploaded file
    pub fn new(id: Uuid, collection: CollectionId, file_name: &str) -> Self {
        Self {
            id,
            collection,
            name: file_name.to_string(),
            file_name: file_name.to_string(),
            length: Duration::ZERO,
            audio_format: None,
            artists: Vec::new(),
            album_artist: String::new(),
            album: None,
            album_track_number: None,
            genres: Vec::new(),
            lyrics: String::new(),
            year: None,
            thumbnail: None,
        }
    }

    /// Add an artist reference, keeping the set free of duplicates
    pub fn add_artist(&mut self, artist: ArtistRef) -> bool {
        if self.artists.contains(&artist) {
            return false;
        }
        self.artists.push(artist);
        true
    }

    /// Add a genre reference, keeping the set free of duplicates
    pub fn add_genre(&mut self, genre: GenreRef) -> bool {
        if self.genres.contains(&genre) {
            return false;
        }
        self.genres.push(genre);
        true
    }
}

// ============================================================================
// Pipeline Stages
// ============================================================================

/// Per-track ingest state machine, strictly linear
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum IngestStage {
    Uploaded,
    FormatDetected,
    TagsExtracted,
    EntitiesResolved,
    ThumbnailApplied,
    Persisted,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestStage::Uploaded => "uploaded",
            IngestStage::FormatDetected => "format_detected",
            IngestStage::TagsExtracted => "tags_extracted",
            IngestStage::EntitiesResolved => "entities_resolved",
            IngestStage::ThumbnailApplied => "thumbnail_applied",
            IngestStage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// A recoverable problem recorded while ingesting one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestIssue {
    /// Stage that could not complete fully
    pub stage: IngestStage,
    pub message: String,
}

impl IngestIssue {
    pub fn new(stage: IngestStage, error: &dyn std::error::Error) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_table() {
        assert_eq!(ContainerFormat::Flac.mime_type(), "audio/flac");
        assert_eq!(ContainerFormat::Mp3.mime_type(), "audio/mpeg");
        assert_eq!(ContainerFormat::Mp4.mime_type(), "audio/mp4");
        assert_eq!(ContainerFormat::OggVorbis.mime_type(), "audio/ogg");
        assert_eq!(ContainerFormat::OggOpus.mime_type(), "audio/opus");
    }

    #[test]
    fn test_tag_map_absent_vs_empty() {
        let mut tags = TagMap::new();
        tags.push(TagKey::Title, "");

        assert_eq!(tags.get(TagKey::Title), &TagValue::Single(String::new()));
        assert!(tags.get(TagKey::Album).is_absent());
        assert_eq!(tags.get(TagKey::Album).first(), None);
    }

    #[test]
    fn test_tag_map_repeated_key_becomes_multi() {
        let mut tags = TagMap::new();
        tags.push(TagKey::Artist, "A");
        tags.push(TagKey::Artist, "B");
        tags.push(TagKey::Artist, "C");

        assert_eq!(tags.get(TagKey::Artist).first(), Some("A"));
        assert_eq!(tags.get(TagKey::Artist).values(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_vorbis_key_lookup_ignores_case() {
        assert_eq!(TagKey::from_vorbis_key("albumartist"), Some(TagKey::AlbumArtist));
        assert_eq!(TagKey::from_vorbis_key("TrackNumber"), Some(TagKey::TrackNumber));
        assert_eq!(TagKey::from_vorbis_key("COMMENT"), None);
    }

    #[test]
    fn test_track_ref_sets_reject_duplicates() {
        let mut track = NormalizedTrack::new(Uuid::new_v4(), CollectionId(1), "song.flac");
        let artist = ArtistRef(Uuid::new_v4());

        assert!(track.add_artist(artist));
        assert!(!track.add_artist(artist));
        assert_eq!(track.artists.len(), 1);
        assert_eq!(track.name, "song.flac");
    }
}

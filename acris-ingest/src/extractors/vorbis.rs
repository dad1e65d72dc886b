//! Shared Vorbis-comment style extraction
//!
//! Every strategy ends here. Policy per field:
//! - artist: every value, in tag order
//! - everything else: first value only
//! - track number: leading integer of `"N"` or `"N/M"`
//!
//! A field that is absent stays `None`; a field present with an empty value
//! becomes `Some("")`.

use crate::error::ExtractError;
use crate::types::{ContainerFormat, RawMetadata, TagKey, TagMap};
use lofty::ogg::OggPictureStorage;
use std::time::Duration;

/// Build [`RawMetadata`] from a format's tag view
pub fn vorbis_style_extract(format: ContainerFormat, duration: Duration, tags: &TagMap) -> RawMetadata {
    let mut raw = RawMetadata::new(format);
    raw.duration_seconds = duration.as_secs_f64();

    let first = |key: TagKey| tags.get(key).first().map(str::to_string);

    raw.title = first(TagKey::Title);
    raw.artists = tags
        .get(TagKey::Artist)
        .values()
        .into_iter()
        .map(str::to_string)
        .collect();
    raw.album_artist = first(TagKey::AlbumArtist);
    raw.album = first(TagKey::Album);
    raw.genre = first(TagKey::Genre);
    raw.lyrics = first(TagKey::Lyrics);
    raw.year = first(TagKey::Date);

    if let Some(text) = tags.get(TagKey::TrackNumber).first() {
        match parse_track_number(text) {
            Ok(number) => raw.track_number = Some(number),
            Err(issue) => raw.issues.push(issue),
        }
    }

    raw
}

/// Parse `"3"` or `"3/12"` into `3`
pub fn parse_track_number(text: &str) -> Result<u32, ExtractError> {
    let number = text.split('/').next().unwrap_or_default().trim();

    number.parse::<u32>().map_err(|e| ExtractError::MalformedTag {
        field: "track number",
        reason: format!("{:?}: {}", text, e),
    })
}

/// Collect `KEY=value` comments into a [`TagMap`], ignoring unknown keys
pub fn tag_map_from_comments<'a>(comments: impl IntoIterator<Item = (&'a str, &'a str)>) -> TagMap {
    let mut tags = TagMap::new();
    for (key, value) in comments {
        if let Some(tag_key) = TagKey::from_vorbis_key(key) {
            tags.push(tag_key, value);
        }
    }
    tags
}

/// Data of the first non-empty picture, in stored order
pub fn first_picture(storage: &impl OggPictureStorage) -> Option<Vec<u8>> {
    storage
        .pictures()
        .iter()
        .map(|(picture, _)| picture.data())
        .find(|data| !data.is_empty())
        .map(<[u8]>::to_vec)
}

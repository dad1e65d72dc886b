//! MP3 strategy: ID3v2 frames
//!
//! Two passes over the same tag. The first reads attached pictures (APIC)
//! from the full frame list, the second reads text through a key view that
//! maps frame identifiers onto Vorbis comment keys.

use super::vorbis::vorbis_style_extract;
use super::{container_error, parse_options, TagExtractor};
use crate::error::ExtractError;
use crate::types::{ContainerFormat, RawMetadata, TagKey, TagMap};
use id3::{Content, Tag, TagLike};
use lofty::file::AudioFile;
use lofty::mpeg::MpegFile;
use std::io::Cursor;
use tracing::debug;

/// Text frames read through the key view
const TEXT_FRAMES: [(TagKey, &str); 6] = [
    (TagKey::Title, "TIT2"),
    (TagKey::Artist, "TPE1"),
    (TagKey::AlbumArtist, "TPE2"),
    (TagKey::Album, "TALB"),
    (TagKey::TrackNumber, "TRCK"),
    (TagKey::Date, "TDRC"),
];

pub struct Mp3Extractor;

impl TagExtractor for Mp3Extractor {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Mp3
    }

    fn extract(&self, bytes: &[u8]) -> Result<RawMetadata, ExtractError> {
        let file = MpegFile::read_from(&mut Cursor::new(bytes), parse_options())
            .map_err(|e| container_error(ContainerFormat::Mp3, e))?;
        let duration = file.properties().duration();

        let mut issues = Vec::new();
        let tag = read_id3(bytes, &mut issues);

        let mut raw = match &tag {
            Some(tag) => {
                let mut raw = vorbis_style_extract(ContainerFormat::Mp3, duration, &key_view(tag));
                raw.picture = attached_picture(tag);
                raw
            }
            None => vorbis_style_extract(ContainerFormat::Mp3, duration, &TagMap::new()),
        };
        raw.issues.extend(issues);

        Ok(raw)
    }
}

/// Read the ID3v2 tag, keeping whatever was parsed before an error
fn read_id3(bytes: &[u8], issues: &mut Vec<ExtractError>) -> Option<Tag> {
    match Tag::read_from2(Cursor::new(bytes)) {
        Ok(tag) => Some(tag),
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => {
            debug!("MP3 has no ID3v2 tag");
            None
        }
        Err(mut e) => {
            let partial = e.partial_tag.take();
            issues.push(ExtractError::MalformedTag {
                field: "ID3v2",
                reason: e.to_string(),
            });
            partial
        }
    }
}

/// First pass: first APIC frame (or ID3v2.2 PIC)
fn attached_picture(tag: &Tag) -> Option<Vec<u8>> {
    tag.frames()
        .filter(|frame| frame.id() == "APIC" || frame.id() == "PIC")
        .find_map(|frame| match frame.content() {
            Content::Picture(picture) if !picture.data.is_empty() => Some(picture.data.clone()),
            _ => None,
        })
}

/// Second pass: text frames as Vorbis-style keys
fn key_view(tag: &Tag) -> TagMap {
    let mut tags = TagMap::new();

    for (key, frame_id) in TEXT_FRAMES {
        if let Some(text) = tag.get(frame_id).and_then(|frame| frame.content().text()) {
            push_text_values(&mut tags, key, text);
        }
    }

    // ID3v2.3 files carry the year in TYER instead of TDRC
    if !tags.contains(TagKey::Date) {
        if let Some(text) = tag.get("TYER").and_then(|frame| frame.content().text()) {
            push_text_values(&mut tags, TagKey::Date, text);
        }
    }

    // TCON is NUL-separated; numeric references like "(17)" resolve per value
    for genre in tag.genres_parsed() {
        if !genre.is_empty() {
            tags.push(TagKey::Genre, genre.into_owned());
        }
    }

    for frame in tag.frames().filter(|frame| frame.id() == "USLT") {
        if let Content::Lyrics(lyrics) = frame.content() {
            tags.push(TagKey::Lyrics, lyrics.text.as_str());
        }
    }

    tags
}

/// ID3v2.4 separates multiple values with NUL
fn push_text_values(tags: &mut TagMap, key: TagKey, text: &str) {
    let mut values: Vec<&str> = text.split('\0').collect();
    if values.len() > 1 {
        values.retain(|value| !value.is_empty());
    }
    for value in values {
        tags.push(key, value);
    }
}

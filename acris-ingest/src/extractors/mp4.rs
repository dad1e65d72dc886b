//! MP4 strategy: iTunes-style `ilst` atoms

use super::vorbis::vorbis_style_extract;
use super::{container_error, parse_options, TagExtractor};
use crate::error::ExtractError;
use crate::types::{ContainerFormat, RawMetadata, TagKey, TagMap};
use lofty::file::AudioFile;
use lofty::mp4::{AtomData, AtomIdent, Ilst, Mp4File};
use lofty::tag::Accessor;
use std::io::Cursor;

/// Text atoms mapped onto Vorbis comment keys
const TEXT_ATOMS: [(TagKey, [u8; 4]); 7] = [
    (TagKey::Title, *b"\xa9nam"),
    (TagKey::Artist, *b"\xa9ART"),
    (TagKey::AlbumArtist, *b"aART"),
    (TagKey::Album, *b"\xa9alb"),
    (TagKey::Genre, *b"\xa9gen"),
    (TagKey::Lyrics, *b"\xa9lyr"),
    (TagKey::Date, *b"\xa9day"),
];

const COVER_ATOM: [u8; 4] = *b"covr";

pub struct Mp4Extractor;

impl TagExtractor for Mp4Extractor {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Mp4
    }

    fn extract(&self, bytes: &[u8]) -> Result<RawMetadata, ExtractError> {
        let file = Mp4File::read_from(&mut Cursor::new(bytes), parse_options())
            .map_err(|e| container_error(ContainerFormat::Mp4, e))?;
        let duration = file.properties().duration();

        Ok(match file.ilst() {
            Some(ilst) => extract_from_ilst(ilst, duration),
            None => vorbis_style_extract(ContainerFormat::Mp4, duration, &TagMap::new()),
        })
    }
}

/// Tags and cover art from an already-parsed `ilst`
pub fn extract_from_ilst(ilst: &Ilst, duration: std::time::Duration) -> RawMetadata {
    let mut raw = vorbis_style_extract(ContainerFormat::Mp4, duration, &ilst_tags(ilst));
    raw.picture = cover_art(ilst);
    raw
}

fn ilst_tags(ilst: &Ilst) -> TagMap {
    let mut tags = TagMap::new();

    for (key, fourcc) in TEXT_ATOMS {
        if let Some(atom) = ilst.get(&AtomIdent::Fourcc(fourcc)) {
            for data in atom.data() {
                if let AtomData::UTF8(text) = data {
                    tags.push(key, text.as_str());
                }
            }
        }
    }

    // trkn is a binary (number, total) pair, not text
    if let Some(track) = ilst.track() {
        tags.push(TagKey::TrackNumber, track.to_string());
    }

    tags
}

/// First covr image, if any
fn cover_art(ilst: &Ilst) -> Option<Vec<u8>> {
    ilst.get(&AtomIdent::Fourcc(COVER_ATOM))?
        .data()
        .find_map(|data| match data {
            AtomData::Picture(picture) if !picture.data().is_empty() => {
                Some(picture.data().to_vec())
            }
            _ => None,
        })
}

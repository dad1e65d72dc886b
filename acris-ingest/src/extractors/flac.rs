//! FLAC strategy: Vorbis comment block plus PICTURE blocks

use super::vorbis::{first_picture, tag_map_from_comments, vorbis_style_extract};
use super::{container_error, parse_options, TagExtractor};
use crate::error::ExtractError;
use crate::types::{ContainerFormat, RawMetadata};
use lofty::file::AudioFile;
use lofty::flac::FlacFile;
use std::io::Cursor;

pub struct FlacExtractor;

impl TagExtractor for FlacExtractor {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Flac
    }

    fn extract(&self, bytes: &[u8]) -> Result<RawMetadata, ExtractError> {
        let mut reader = Cursor::new(bytes);
        let file = FlacFile::read_from(&mut reader, parse_options())
            .map_err(|e| container_error(ContainerFormat::Flac, e))?;

        let tags = file
            .vorbis_comments()
            .map(|comments| tag_map_from_comments(comments.items()))
            .unwrap_or_default();
        let mut raw = vorbis_style_extract(ContainerFormat::Flac, file.properties().duration(), &tags);

        // First PICTURE block wins, regardless of picture type
        raw.picture = first_picture(&file);

        Ok(raw)
    }
}

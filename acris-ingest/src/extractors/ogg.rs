//! Ogg Vorbis and Ogg Opus strategy
//!
//! Both codecs carry a Vorbis comment list in their second header packet.
//! Embedded pictures live in METADATA_BLOCK_PICTURE comments as base64 FLAC
//! PICTURE blocks. lofty decodes them in order and discards entries that
//! fail, so the first picture it keeps is the first valid one.

use super::vorbis::{first_picture, tag_map_from_comments, vorbis_style_extract};
use super::{container_error, parse_options, TagExtractor};
use crate::error::ExtractError;
use crate::types::{ContainerFormat, RawMetadata};
use lofty::file::AudioFile;
use lofty::ogg::{OpusFile, VorbisComments, VorbisFile};
use std::io::Cursor;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OggCodec {
    Vorbis,
    Opus,
}

impl OggCodec {
    fn format(self) -> ContainerFormat {
        match self {
            OggCodec::Vorbis => ContainerFormat::OggVorbis,
            OggCodec::Opus => ContainerFormat::OggOpus,
        }
    }
}

pub struct OggExtractor {
    pub codec: OggCodec,
}

impl TagExtractor for OggExtractor {
    fn format(&self) -> ContainerFormat {
        self.codec.format()
    }

    fn extract(&self, bytes: &[u8]) -> Result<RawMetadata, ExtractError> {
        let format = self.codec.format();
        let mut reader = Cursor::new(bytes);

        // Opus durations already account for pre-skip
        let raw = match self.codec {
            OggCodec::Vorbis => {
                let file = VorbisFile::read_from(&mut reader, parse_options())
                    .map_err(|e| container_error(format, e))?;
                from_comments(format, file.properties().duration(), file.vorbis_comments())
            }
            OggCodec::Opus => {
                let file = OpusFile::read_from(&mut reader, parse_options())
                    .map_err(|e| container_error(format, e))?;
                from_comments(format, file.properties().duration(), file.vorbis_comments())
            }
        };

        Ok(raw)
    }
}

fn from_comments(format: ContainerFormat, duration: Duration, comments: &VorbisComments) -> RawMetadata {
    let tags = tag_map_from_comments(comments.items());
    let mut raw = vorbis_style_extract(format, duration, &tags);
    raw.picture = first_picture(comments);
    raw
}

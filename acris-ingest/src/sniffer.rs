//! Container classification from file content
//!
//! Only the leading bytes decide the format; the uploaded file name and
//! extension are never consulted.

use crate::error::ExtractError;
use crate::types::ContainerFormat;
use lofty::file::FileType;
use lofty::probe::Probe;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

/// Classify in-memory bytes
pub fn classify(bytes: &[u8]) -> Result<ContainerFormat, ExtractError> {
    probe(Cursor::new(bytes))
}

/// Classify a file on disk by its content
pub fn classify_path(path: &Path) -> Result<ContainerFormat, ExtractError> {
    let file = File::open(path)?;
    let format = probe(BufReader::new(file))?;

    debug!(path = %path.display(), format = %format, "Classified file");
    Ok(format)
}

fn probe<R: Read + Seek>(reader: R) -> Result<ContainerFormat, ExtractError> {
    let probe = Probe::new(reader)
        .guess_file_type()
        .map_err(|e| ExtractError::UnsupportedContainer(format!("unreadable header: {}", e)))?;

    match probe.file_type() {
        Some(file_type) => supported_format(file_type)
            .ok_or_else(|| ExtractError::UnsupportedContainer(format!("{:?}", file_type))),
        None => Err(ExtractError::UnsupportedContainer(
            "unrecognized header".to_string(),
        )),
    }
}

fn supported_format(file_type: FileType) -> Option<ContainerFormat> {
    match file_type {
        FileType::Flac => Some(ContainerFormat::Flac),
        FileType::Mpeg => Some(ContainerFormat::Mp3),
        FileType::Mp4 => Some(ContainerFormat::Mp4),
        FileType::Vorbis => Some(ContainerFormat::OggVorbis),
        FileType::Opus => Some(ContainerFormat::OggOpus),
        _ => None,
    }
}

//! Byte-level audio fixtures
//!
//! Every builder produces a complete in-memory file that the sniffer and the
//! matching strategy accept. No audio frames are decoded, so payloads are
//! zero-filled.

#![allow(dead_code)]

use base64::prelude::*;
use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

// ============================================================================
// Pictures
// ============================================================================

/// Solid-colour PNG of the given size
pub fn png_image(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([30, 90, 200]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encode");
    bytes
}

/// FLAC PICTURE block body (front cover)
pub fn picture_block(mime: &str, data: &[u8]) -> Vec<u8> {
    let mut block = Vec::new();
    block.extend_from_slice(&3u32.to_be_bytes());
    block.extend_from_slice(&(mime.len() as u32).to_be_bytes());
    block.extend_from_slice(mime.as_bytes());
    block.extend_from_slice(&0u32.to_be_bytes());
    block.extend_from_slice(&0u32.to_be_bytes());
    block.extend_from_slice(&0u32.to_be_bytes());
    block.extend_from_slice(&0u32.to_be_bytes());
    block.extend_from_slice(&0u32.to_be_bytes());
    block.extend_from_slice(&(data.len() as u32).to_be_bytes());
    block.extend_from_slice(data);
    block
}

/// METADATA_BLOCK_PICTURE comment value
pub fn block_picture_base64(mime: &str, data: &[u8]) -> String {
    BASE64_STANDARD.encode(picture_block(mime, data))
}

// ============================================================================
// FLAC
// ============================================================================

pub const FLAC_SAMPLE_RATE: u32 = 44_100;

/// FLAC with STREAMINFO, a Vorbis comment block and an optional PNG picture
pub fn flac_file(comments: &[(&str, &str)], picture: Option<&[u8]>, seconds: u64) -> Vec<u8> {
    let mut blocks: Vec<(u8, Vec<u8>)> = vec![
        (0, stream_info(u64::from(FLAC_SAMPLE_RATE) * seconds)),
        (4, vorbis_comment_list(comments)),
    ];
    if let Some(data) = picture {
        blocks.push((6, picture_block("image/png", data)));
    }

    let mut file = b"fLaC".to_vec();
    let count = blocks.len();
    for (index, (block_type, body)) in blocks.into_iter().enumerate() {
        let last_flag = if index + 1 == count { 0x80 } else { 0x00 };
        file.push(last_flag | block_type);
        file.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        file.extend_from_slice(&body);
    }
    file
}

/// FLAC magic followed by bytes that are not a metadata block
pub fn corrupt_flac() -> Vec<u8> {
    let mut file = b"fLaC".to_vec();
    file.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0x13, 0x37, 0x00, 0x42]);
    file
}

fn stream_info(total_samples: u64) -> Vec<u8> {
    let mut block = Vec::with_capacity(34);
    block.extend_from_slice(&4096u16.to_be_bytes());
    block.extend_from_slice(&4096u16.to_be_bytes());
    block.extend_from_slice(&[0; 6]);
    let packed = (u64::from(FLAC_SAMPLE_RATE) << 44) | (1u64 << 41) | (15u64 << 36) | total_samples;
    block.extend_from_slice(&packed.to_be_bytes());
    block.extend_from_slice(&[0; 16]);
    block
}

/// Vendor string plus `KEY=value` entries (little-endian lengths)
pub fn vorbis_comment_list(comments: &[(&str, &str)]) -> Vec<u8> {
    let vendor = b"acris fixtures";
    let mut body = Vec::new();
    body.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    body.extend_from_slice(vendor);
    body.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for (key, value) in comments {
        let entry = format!("{}={}", key, value);
        body.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        body.extend_from_slice(entry.as_bytes());
    }
    body
}

// ============================================================================
// MP3
// ============================================================================

/// ID3v2.4 tag with the given text frames, then CBR MPEG-1 Layer III frames
pub fn mp3_file(text_frames: &[(&str, &str)], picture: Option<&[u8]>) -> Vec<u8> {
    let mut tag = Tag::new();
    for (frame_id, value) in text_frames {
        tag.set_text(*frame_id, *value);
    }
    if let Some(data) = picture {
        tag.add_frame(Picture {
            mime_type: "image/png".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: data.to_vec(),
        });
    }

    let mut bytes = Vec::new();
    if tag.frames().next().is_some() {
        tag.write_to(&mut bytes, Version::Id3v24).expect("ID3 write");
    }
    for _ in 0..40 {
        let mut frame = vec![0xFF, 0xFB, 0x90, 0x64];
        frame.resize(417, 0);
        bytes.extend(frame);
    }
    bytes
}

// ============================================================================
// Ogg
// ============================================================================

const OGG_SERIAL: u32 = 0x0AC2_1500;

fn ogg_page(sequence: u32, granule: u64, header_type: u8, packet: &[u8]) -> Vec<u8> {
    let mut segments = vec![255u8; packet.len() / 255];
    segments.push((packet.len() % 255) as u8);
    assert!(segments.len() <= 255, "fixture packet too large for one page");

    let mut page = b"OggS".to_vec();
    page.push(0);
    page.push(header_type);
    page.extend_from_slice(&granule.to_le_bytes());
    page.extend_from_slice(&OGG_SERIAL.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&0u32.to_le_bytes());
    page.push(segments.len() as u8);
    page.extend_from_slice(&segments);
    page.extend_from_slice(packet);
    page
}

fn ogg_stream(ident: &[u8], comments: &[u8], final_granule: u64) -> Vec<u8> {
    let mut data = ogg_page(0, 0, 0x02, ident);
    data.extend(ogg_page(1, 0, 0x00, comments));
    data.extend(ogg_page(2, final_granule, 0x04, &[0u8; 64]));
    data
}

/// Ogg Vorbis at 44.1 kHz lasting `seconds`
pub fn ogg_vorbis_file(comments: &[(&str, &str)], seconds: u64) -> Vec<u8> {
    let mut ident = b"\x01vorbis".to_vec();
    ident.extend_from_slice(&0u32.to_le_bytes());
    ident.push(2);
    ident.extend_from_slice(&44_100u32.to_le_bytes());
    ident.extend_from_slice(&[0; 12]);
    ident.push(0xB8);
    ident.push(1);

    let mut tags = b"\x03vorbis".to_vec();
    tags.extend(vorbis_comment_list(comments));
    tags.push(1);

    ogg_stream(&ident, &tags, 44_100 * seconds)
}

/// Ogg Opus with 312 samples of pre-skip lasting `seconds`
pub fn ogg_opus_file(comments: &[(&str, &str)], seconds: u64) -> Vec<u8> {
    let pre_skip = 312u16;
    let mut head = b"OpusHead".to_vec();
    head.push(1);
    head.push(2);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&48_000u32.to_le_bytes());
    head.extend_from_slice(&[0, 0, 0]);

    let mut tags = b"OpusTags".to_vec();
    tags.extend(vorbis_comment_list(comments));

    ogg_stream(&head, &tags, 48_000 * seconds + u64::from(pre_skip))
}

// ============================================================================
// MP4
// ============================================================================

const MP4_TIMESCALE: u32 = 1_000;
const MP4_DATA_UTF8: u32 = 1;
const MP4_DATA_IMPLICIT: u32 = 0;
const MP4_DATA_PNG: u32 = 14;

/// Atom contents for [`mp4_file`]
#[derive(Default)]
pub struct Mp4Tags<'a> {
    pub text: Vec<(&'a [u8; 4], &'a str)>,
    pub track_number: Option<u16>,
    pub cover_png: Option<&'a [u8]>,
}

/// M4A with `ftyp`, `moov` (`mvhd`, one sound `trak`, `udta.meta.ilst`) and a
/// small `mdat`
pub fn mp4_file(tags: &Mp4Tags<'_>, seconds: u32) -> Vec<u8> {
    let duration = seconds * MP4_TIMESCALE;

    let mut ftyp = b"M4A ".to_vec();
    ftyp.extend_from_slice(&0u32.to_be_bytes());
    ftyp.extend_from_slice(b"M4A isom");

    let mut moov = mvhd(duration);
    moov.extend(mp4_atom(b"trak", &mp4_atom(b"mdia", &[mdhd(duration), handler(b"soun")].concat())));
    moov.extend(mp4_atom(b"udta", &meta(&ilst(tags))));

    let mut file = mp4_atom(b"ftyp", &ftyp);
    file.extend(mp4_atom(b"moov", &moov));
    file.extend(mp4_atom(b"mdat", &[0u8; 64]));
    file
}

fn mp4_atom(fourcc: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut atom = ((body.len() + 8) as u32).to_be_bytes().to_vec();
    atom.extend_from_slice(fourcc);
    atom.extend_from_slice(body);
    atom
}

fn mvhd(duration: u32) -> Vec<u8> {
    let mut body = vec![0u8; 12]; // version, flags, creation, modification
    body.extend_from_slice(&MP4_TIMESCALE.to_be_bytes());
    body.extend_from_slice(&duration.to_be_bytes());
    body.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // rate 1.0
    body.extend_from_slice(&0x0100u16.to_be_bytes()); // volume 1.0
    body.extend_from_slice(&[0u8; 10]);
    for value in [0x0001_0000u32, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000] {
        body.extend_from_slice(&value.to_be_bytes()); // unity matrix
    }
    body.extend_from_slice(&[0u8; 24]);
    body.extend_from_slice(&2u32.to_be_bytes()); // next track id
    mp4_atom(b"mvhd", &body)
}

fn mdhd(duration: u32) -> Vec<u8> {
    let mut body = vec![0u8; 12]; // version, flags, creation, modification
    body.extend_from_slice(&MP4_TIMESCALE.to_be_bytes());
    body.extend_from_slice(&duration.to_be_bytes());
    body.extend_from_slice(&0x55C4u16.to_be_bytes()); // "und"
    body.extend_from_slice(&0u16.to_be_bytes());
    mp4_atom(b"mdhd", &body)
}

fn handler(handler_type: &[u8; 4]) -> Vec<u8> {
    let mut body = vec![0u8; 8]; // version, flags, pre-defined
    body.extend_from_slice(handler_type);
    body.extend_from_slice(&[0u8; 12]);
    body.push(0); // empty name
    mp4_atom(b"hdlr", &body)
}

fn meta(ilst: &[u8]) -> Vec<u8> {
    let mut body = 0u32.to_be_bytes().to_vec(); // full atom
    body.extend(handler(b"mdir"));
    body.extend_from_slice(ilst);
    mp4_atom(b"meta", &body)
}

fn ilst(tags: &Mp4Tags<'_>) -> Vec<u8> {
    let mut items = Vec::new();
    for (fourcc, value) in &tags.text {
        items.extend(mp4_atom(fourcc, &data_atom(MP4_DATA_UTF8, value.as_bytes())));
    }
    if let Some(track) = tags.track_number {
        let [hi, lo] = track.to_be_bytes();
        items.extend(mp4_atom(b"trkn", &data_atom(MP4_DATA_IMPLICIT, &[0, 0, hi, lo, 0, 0, 0, 0])));
    }
    if let Some(png) = tags.cover_png {
        items.extend(mp4_atom(b"covr", &data_atom(MP4_DATA_PNG, png)));
    }
    mp4_atom(b"ilst", &items)
}

fn data_atom(type_code: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = type_code.to_be_bytes().to_vec();
    body.extend_from_slice(&0u32.to_be_bytes()); // locale
    body.extend_from_slice(payload);
    mp4_atom(b"data", &body)
}

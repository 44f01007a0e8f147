//! JPEG EXIF orientation stamping.
//!
//! An existing `Orientation` tag (0x0112) in IFD0 is patched in place. When
//! IFD0 has no such tag, a copy of IFD0 with the tag added is appended to the
//! TIFF block and the header is pointed at it, so every other offset in the
//! camera's EXIF block stays valid. A JPEG without EXIF gets a minimal APP1
//! segment carrying only the orientation, placed after SOI and any JFIF APP0.

use std::fs;
use std::path::Path;

use crate::models::error::CameraError;
use crate::models::rotation::ExifOrientation;
use crate::storage::photo_writer::sha256_hex;

const MARKER_PREFIX: u8 = 0xFF;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";
const ORIENTATION_TAG: u16 = 0x0112;
const TYPE_SHORT: u16 = 3;
const IFD_ENTRY_SIZE: usize = 12;

/// Size of the segment produced by [`minimal_exif_segment`].
pub const MINIMAL_SEGMENT_SIZE: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn detect(tiff: &[u8]) -> Option<Self> {
        match tiff.get(0..2)? {
            b"II" => Some(Self::Little),
            b"MM" => Some(Self::Big),
            _ => None,
        }
    }

    fn u16_at(self, data: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
        Some(match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        })
    }

    fn u32_at(self, data: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
        Some(match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        })
    }

    fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }
}

/// Build a standalone APP1 segment holding one IFD0 entry.
///
/// Layout (big-endian TIFF):
/// ```text
/// [0-1]    FF E1
/// [2-3]    segment length (34, includes these two bytes)
/// [4-9]    "Exif\0\0"
/// [10-17]  "MM" 00 2A, IFD0 offset 8
/// [18-19]  entry count 1
/// [20-31]  0x0112, SHORT, count 1, value + 2 pad bytes
/// [32-35]  next IFD offset 0
/// ```
pub fn minimal_exif_segment(orientation: ExifOrientation) -> [u8; MINIMAL_SEGMENT_SIZE] {
    let mut segment = [0u8; MINIMAL_SEGMENT_SIZE];

    segment[0] = MARKER_PREFIX;
    segment[1] = APP1;
    segment[2..4].copy_from_slice(&((MINIMAL_SEGMENT_SIZE - 2) as u16).to_be_bytes());
    segment[4..10].copy_from_slice(EXIF_HEADER);

    // TIFF header
    segment[10..12].copy_from_slice(b"MM");
    segment[12..14].copy_from_slice(&42u16.to_be_bytes());
    segment[14..18].copy_from_slice(&8u32.to_be_bytes());

    // IFD0
    segment[18..20].copy_from_slice(&1u16.to_be_bytes());
    segment[20..22].copy_from_slice(&ORIENTATION_TAG.to_be_bytes());
    segment[22..24].copy_from_slice(&TYPE_SHORT.to_be_bytes());
    segment[24..28].copy_from_slice(&1u32.to_be_bytes());
    segment[28..30].copy_from_slice(&orientation.value().to_be_bytes());
    // [30..36] padding and next-IFD offset stay zero

    segment
}

/// One marker segment before the scan data.
struct Segment {
    kind: u8,
    start: usize,
    end: usize,
}

fn metadata_segments(jpeg: &[u8]) -> Result<Vec<Segment>, CameraError> {
    if jpeg.len() < 2 || jpeg[0] != MARKER_PREFIX || jpeg[1] != SOI {
        return Err(CameraError::CaptureWrite("not a JPEG stream".into()));
    }

    let mut segments = Vec::new();
    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        if jpeg[pos] != MARKER_PREFIX {
            return Err(CameraError::CaptureWrite(format!("bad JPEG marker at offset {}", pos)));
        }
        let kind = jpeg[pos + 1];
        if kind == SOS || kind == EOI {
            break;
        }
        let length = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        let end = pos + 2 + length;
        if length < 2 || end > jpeg.len() {
            return Err(CameraError::CaptureWrite(format!(
                "truncated JPEG segment at offset {}",
                pos
            )));
        }
        segments.push(Segment { kind, start: pos, end });
        pos = end;
    }
    Ok(segments)
}

fn exif_payload<'a>(jpeg: &'a [u8], segment: &Segment) -> Option<&'a [u8]> {
    if segment.kind != APP1 {
        return None;
    }
    let payload = &jpeg[segment.start + 4..segment.end];
    payload.starts_with(EXIF_HEADER).then_some(payload)
}

/// Offset (within the TIFF block) of the orientation value, with its byte order.
fn orientation_slot(tiff: &[u8]) -> Option<(usize, ByteOrder)> {
    let order = ByteOrder::detect(tiff)?;
    let ifd0 = order.u32_at(tiff, 4)? as usize;
    let count = order.u16_at(tiff, ifd0)? as usize;
    (0..count)
        .map(|i| ifd0 + 2 + i * IFD_ENTRY_SIZE)
        .find(|&entry| order.u16_at(tiff, entry) == Some(ORIENTATION_TAG))
        .map(|entry| (entry + 8, order))
        .filter(|(value, _)| value + 2 <= tiff.len())
}

/// TIFF block with an orientation entry added to IFD0.
///
/// The new IFD0 (entries kept in tag order) is appended at the end and the
/// header offset is redirected to it. The old IFD0 bytes stay behind unused.
fn with_orientation_entry(tiff: &[u8], orientation: ExifOrientation) -> Option<Vec<u8>> {
    let order = ByteOrder::detect(tiff)?;
    let ifd0 = order.u32_at(tiff, 4)? as usize;
    let count = order.u16_at(tiff, ifd0)?;
    let entries_start = ifd0 + 2;
    let entries_end = entries_start + count as usize * IFD_ENTRY_SIZE;
    let next_ifd = order.u32_at(tiff, entries_end)?;

    let mut entry = [0u8; IFD_ENTRY_SIZE];
    entry[0..2].copy_from_slice(&order.u16_bytes(ORIENTATION_TAG));
    entry[2..4].copy_from_slice(&order.u16_bytes(TYPE_SHORT));
    entry[4..8].copy_from_slice(&order.u32_bytes(1));
    entry[8..10].copy_from_slice(&order.u16_bytes(orientation.value()));

    let mut out = tiff.to_vec();
    if out.len() % 2 == 1 {
        out.push(0);
    }
    let new_ifd0 = u32::try_from(out.len()).ok()?;
    out.extend_from_slice(&order.u16_bytes(count.checked_add(1)?));

    let mut inserted = false;
    for existing in tiff[entries_start..entries_end].chunks_exact(IFD_ENTRY_SIZE) {
        let tag = order.u16_at(existing, 0)?;
        if !inserted && tag > ORIENTATION_TAG {
            out.extend_from_slice(&entry);
            inserted = true;
        }
        out.extend_from_slice(existing);
    }
    if !inserted {
        out.extend_from_slice(&entry);
    }
    out.extend_from_slice(&order.u32_bytes(next_ifd));

    out[4..8].copy_from_slice(&order.u32_bytes(new_ifd0));
    Some(out)
}

fn app1_segment(tiff: &[u8]) -> Result<Vec<u8>, CameraError> {
    let length = u16::try_from(2 + EXIF_HEADER.len() + tiff.len()).map_err(|_| {
        CameraError::CaptureWrite("EXIF block too large for one APP1 segment".into())
    })?;
    let mut segment = Vec::with_capacity(length as usize + 2);
    segment.extend_from_slice(&[MARKER_PREFIX, APP1]);
    segment.extend_from_slice(&length.to_be_bytes());
    segment.extend_from_slice(EXIF_HEADER);
    segment.extend_from_slice(tiff);
    Ok(segment)
}

/// Return a copy of `jpeg` whose EXIF orientation is `orientation`.
pub fn stamp_orientation(
    jpeg: &[u8],
    orientation: ExifOrientation,
) -> Result<Vec<u8>, CameraError> {
    let segments = metadata_segments(jpeg)?;
    let exif = segments
        .iter()
        .find_map(|s| exif_payload(jpeg, s).map(|payload| (s, payload)));

    if let Some((segment, payload)) = exif {
        let tiff = &payload[EXIF_HEADER.len()..];
        if let Some((offset, order)) = orientation_slot(tiff) {
            let mut out = jpeg.to_vec();
            let at = segment.start + 4 + EXIF_HEADER.len() + offset;
            out[at..at + 2].copy_from_slice(&order.u16_bytes(orientation.value()));
            return Ok(out);
        }
        if let Some(extended) = with_orientation_entry(tiff, orientation) {
            let mut out = Vec::with_capacity(jpeg.len() + extended.len() - tiff.len());
            out.extend_from_slice(&jpeg[..segment.start]);
            out.extend_from_slice(&app1_segment(&extended)?);
            out.extend_from_slice(&jpeg[segment.end..]);
            return Ok(out);
        }
        log::warn!("Unreadable EXIF block, replacing it with a bare orientation tag");
    }

    // SOI, then JFIF APP0 if present, then the new APP1.
    let insert_at = segments
        .first()
        .filter(|s| s.kind == APP0)
        .map_or(2, |s| s.end);
    let mut out = Vec::with_capacity(jpeg.len() + MINIMAL_SEGMENT_SIZE);
    out.extend_from_slice(&jpeg[..insert_at]);
    out.extend_from_slice(&minimal_exif_segment(orientation));
    match exif {
        Some((segment, _)) => {
            out.extend_from_slice(&jpeg[insert_at..segment.start]);
            out.extend_from_slice(&jpeg[segment.end..]);
        }
        None => out.extend_from_slice(&jpeg[insert_at..]),
    }
    Ok(out)
}

/// Read the EXIF orientation of a JPEG stream, if it carries one.
pub fn read_orientation(jpeg: &[u8]) -> Option<ExifOrientation> {
    let segments = metadata_segments(jpeg).ok()?;
    let payload = segments.iter().find_map(|s| exif_payload(jpeg, s))?;
    let tiff = &payload[EXIF_HEADER.len()..];
    let (offset, order) = orientation_slot(tiff)?;
    ExifOrientation::from_value(order.u16_at(tiff, offset)?)
}

/// Stamp the orientation into the JPEG file at `path`, rewriting it.
///
/// Returns the SHA-256 hex digest of the rewritten file.
pub fn stamp_orientation_file(
    path: &Path,
    orientation: ExifOrientation,
) -> Result<String, CameraError> {
    let jpeg = fs::read(path).map_err(|e| {
        CameraError::CaptureWrite(format!("failed to read {} for EXIF: {}", path.display(), e))
    })?;
    let stamped = stamp_orientation(&jpeg, orientation)?;
    fs::write(path, &stamped).map_err(|e| {
        CameraError::CaptureWrite(format!("failed to save EXIF to {}: {}", path.display(), e))
    })?;
    Ok(sha256_hex(&stamped))
}

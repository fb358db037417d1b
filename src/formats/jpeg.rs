//! JPEG container: walk the segment markers to the Exif APP1 payload, then
//! hand over to the TIFF parser.

use crate::error::{ExifError, Result};
use crate::ifd::Tag;
use crate::ifd_reader;
use crate::source::ExifSource;
use log::debug;
use std::io::{Read, Seek};

/// Start-of-image marker, the first two bytes of every JPEG.
pub const SOI: u16 = 0xFFD8;
/// APP1, the segment Exif data lives in.
const EXIF_APP1: u16 = 0xFFE1;
/// Start of scan: entropy-coded data follows, no Exif will come anymore.
const SOS: u16 = 0xFFDA;
/// ASCII "Exif", the first word of the APP1 payload.
const EXIF_MAGIC: u32 = 0x4578_6966;

/// One JPEG segment descriptor. The size field includes itself, so the
/// payload advance is `size - 2`.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    pub marker: u16,
    pub size: u16,
    pub offset: u64,
}

fn read_marker<R: Read + Seek>(source: &mut ExifSource<R>) -> Result<Marker> {
    let marker = source.read_u16()?;
    let size = source.read_u16()?;
    let offset = source.position()?;
    Ok(Marker { marker, size, offset })
}

/// Reads all Exif tags of a JPEG source. Verifies SOI, then scans segments
/// for the Exif APP1 marker; reaching start-of-scan first means the file
/// simply has no Exif, which yields an empty tag list rather than an error.
pub fn read_tags<R: Read + Seek>(source: &mut ExifSource<R>) -> Result<Vec<Tag>> {
    if source.read_u16()? != SOI {
        return Err(ExifError::InvalidContainer(format!(
            "not a JPEG file: {}",
            source.path().display()
        )));
    }
    read_tags_after_soi(source)
}

/// Continues the segment walk with the cursor just past an already verified
/// SOI (the RAF container re-enters here).
pub fn read_tags_after_soi<R: Read + Seek>(source: &mut ExifSource<R>) -> Result<Vec<Tag>> {
    let marker = loop {
        let marker = read_marker(source)?;
        if marker.marker == EXIF_APP1 {
            break marker;
        }
        if marker.marker == SOS {
            debug!("{}: reached start of scan without Exif data", source.path().display());
            return Ok(Vec::new());
        }
        // u16 wrap keeps the walk moving forward on a malformed size < 2;
        // the resulting overshoot fails the seek instead of looping
        source.seek_relative(i64::from(marker.size.wrapping_sub(2)))?;
    };
    source.seek_absolute(marker.offset)?;
    if source.read_u32()? != EXIF_MAGIC {
        return Err(ExifError::InvalidExifMarker);
    }
    if source.read_u16()? != 0 {
        return Err(ExifError::InvalidExifMarker);
    }
    // TIFF offsets inside the APP1 payload count from here
    let anchor = source.position()?;
    source.set_tiff_anchor(anchor);
    ifd_reader::read_tags(source)
}

//! Fujifilm RAF container. The RAF header carries a pointer to a full
//! built-in JPEG whose Exif describes the shot; everything past the SOI check
//! is the plain JPEG pipeline.
//!
//! Header layout: 16-byte magic, 4-byte format version, 8-byte camera ID,
//! 32-byte camera name, 4-byte direction, 20 reserved bytes, then the 4-byte
//! big-endian offset of the built-in JPEG at byte 84.

use crate::error::{ExifError, Result};
use crate::formats::jpeg;
use crate::ifd::Tag;
use crate::source::ExifSource;
use std::io::{Read, Seek};

const RAF_MAGIC: &[u8] = b"FUJIFILMCCD-RAW";
const BUILT_IN_JPEG_POINTER: u64 = 16 + 4 + 8 + 32 + 4 + 20;

pub fn read_tags<R: Read + Seek>(source: &mut ExifSource<R>) -> Result<Vec<Tag>> {
    let mut magic = [0u8; 16];
    source.read_exact(&mut magic)?;
    if !magic.starts_with(RAF_MAGIC) {
        return Err(ExifError::InvalidContainer(format!(
            "not a RAF file: {}",
            source.path().display()
        )));
    }
    source.seek_absolute(BUILT_IN_JPEG_POINTER)?;
    let jpeg_offset = source.read_u32()?;
    source.seek_absolute(u64::from(jpeg_offset))?;
    if source.read_u16()? != jpeg::SOI {
        return Err(ExifError::InvalidContainer(format!(
            "RAF built-in JPEG pointer does not lead to a JPEG: {}",
            source.path().display()
        )));
    }
    jpeg::read_tags_after_soi(source)
}

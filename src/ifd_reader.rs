//! TIFF header and IFD readers, and the walker that flattens the directory
//! tree into path-keyed tags.
//!
//! All offsets inside a TIFF scope are measured from the source's anchor; the
//! JPEG container anchors at the byte after `Exif\0\0`, raw TIFF containers at
//! zero, maker notes wherever their embedded header begins.

use crate::error::{ExifError, Result};
use crate::ifd::{Ifd, IfdEntry, Tag, EXIF_IFD_TAG, MAKER_NOTES_TAG};
use crate::makernote;
use crate::source::{Endian, ExifSource};
use crate::value::{read_value, ExifValueType};
use log::debug;
use num_traits::FromPrimitive;
use std::io::{Read, Seek};

/// Reads the 8-byte TIFF header at the current position: the byte-order
/// magic, then the IFD0 offset, leaving the cursor on IFD0's entry count.
///
/// The caller must have set the source's TIFF anchor to the header start.
pub fn read_tiff_header<R: Read + Seek>(source: &mut ExifSource<R>) -> Result<()> {
    let mut magic = [0u8; 4];
    source.read_exact(&mut magic)?;
    match magic {
        [0x49, 0x49, 0x2A, 0x00] => source.set_endian(Endian::Little),
        [0x4D, 0x4D, 0x00, 0x2A] => source.set_endian(Endian::Big),
        _ => return Err(ExifError::InvalidTiffHeader(u32::from_be_bytes(magic))),
    }
    let ifd0_offset = source.read_u32()?;
    // the offset counts from the header start and 8 header bytes are consumed
    source.seek_relative(i64::from(ifd0_offset) - 8)?;
    Ok(())
}

fn read_ifd_entry<R: Read + Seek>(source: &mut ExifSource<R>, ifd_index: usize) -> Result<IfdEntry> {
    let tag = source.read_u16()?;
    let dtype_code = source.read_u16()?;
    let dtype = ExifValueType::from_u16(dtype_code)
        .ok_or(ExifError::UnsupportedDataType { tag, dtype: dtype_code })?;
    let count = source.read_u32()?;
    // capture the data word, then rewind so the typed reader consumes it
    let data = source.read_u32()?;
    source.seek_relative(-4)?;
    let (value, raw) = read_value(source, dtype, count)?;
    Ok(IfdEntry {
        ifd_index,
        tag,
        dtype,
        count,
        data,
        value,
        raw,
    })
}

/// Reads one IFD. With `offset` given, seeks to `anchor + offset` first and
/// restores the cursor afterwards; with `None`, parses at the current
/// position and leaves the cursor on the trailing next-IFD offset field.
pub fn read_ifd<R: Read + Seek>(
    source: &mut ExifSource<R>,
    offset: Option<u32>,
    index: usize,
) -> Result<Ifd> {
    match offset {
        Some(offset) => {
            let pos = source.position()?;
            source.seek_absolute(source.tiff_anchor() + u64::from(offset))?;
            let ifd = read_ifd_at_cursor(source, index);
            source.seek_absolute(pos)?;
            ifd
        }
        None => read_ifd_at_cursor(source, index),
    }
}

fn read_ifd_at_cursor<R: Read + Seek>(source: &mut ExifSource<R>, index: usize) -> Result<Ifd> {
    let entry_count = source.read_u16()?;
    let mut entries = Vec::with_capacity(usize::from(entry_count));
    for _ in 0..entry_count {
        entries.push(read_ifd_entry(source, index)?);
    }
    Ok(Ifd { index, entries })
}

/// Follows the IFD chain starting at the current position (IFD0). The chain
/// ends at a zero next-IFD offset; an offset that cannot be seeked (past EOF)
/// also ends the chain rather than failing the file.
pub fn read_ifds<R: Read + Seek>(source: &mut ExifSource<R>) -> Result<Vec<Ifd>> {
    let mut ifds = Vec::new();
    loop {
        let ifd = read_ifd(source, None, ifds.len())?;
        ifds.push(ifd);
        let next_offset = source.read_u32()?;
        if next_offset == 0 {
            break;
        }
        let target = source.tiff_anchor() + u64::from(next_offset);
        if source.seek_absolute(target).is_err() {
            debug!(
                "{}: next-IFD offset {next_offset:#x} is out of bounds, ending chain",
                source.path().display()
            );
            break;
        }
    }
    Ok(ifds)
}

/// Flattens the entries of one IFD into tags, descending into the Exif
/// sub-IFD and recognized maker notes. `parents` is the path of tag IDs that
/// led here; unrecognized maker notes are skipped silently, everything else
/// becomes a tag.
pub fn entries_to_tags<R: Read + Seek>(
    source: &mut ExifSource<R>,
    parents: &[u16],
    entries: Vec<IfdEntry>,
) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    for entry in entries {
        if entry.tag == EXIF_IFD_TAG {
            let offset = *entry
                .value
                .longs()
                .and_then(|longs| longs.first())
                .ok_or_else(|| ExifError::InvalidValue(format!("{:#06x}", entry.tag)))?;
            let sub_ifd = read_ifd(source, Some(offset), entry.ifd_index)?;
            let mut path = parents.to_vec();
            path.push(entry.tag);
            tags.extend(entries_to_tags(source, &path, sub_ifd.entries)?);
        } else if entry.tag == MAKER_NOTES_TAG {
            let mut path = parents.to_vec();
            path.push(entry.tag);
            if let Some(note_tags) = makernote::read_maker_notes(source, &entry, &path)? {
                tags.extend(note_tags);
            }
        } else {
            tags.push(Tag::from_entry(parents, entry));
        }
    }
    Ok(tags)
}

/// Parses a complete TIFF stream at the current position: header, the whole
/// IFD chain, then flattens IFD0. Later chain members are parsed so the chain
/// terminates correctly, but only IFD0 (and its sub-IFDs) carry the fields of
/// interest.
pub fn read_tags<R: Read + Seek>(source: &mut ExifSource<R>) -> Result<Vec<Tag>> {
    read_tiff_header(source)?;
    let ifds = read_ifds(source)?;
    match ifds.into_iter().next() {
        Some(ifd0) => entries_to_tags(source, &[], ifd0.entries),
        None => Ok(Vec::new()),
    }
}

//! Vendor maker-note dispatch.
//!
//! A fixed registry of detectors matches on the raw bytes of the MakerNotes
//! entry; a recognized vendor re-enters the parser on the nested TIFF stream
//! with its own anchor and byte order. The outer anchor and order are scoped:
//! they are restored on every exit path before control returns to the walker.

use crate::error::Result;
use crate::ifd::{IfdEntry, Tag};
use crate::ifd_reader::{entries_to_tags, read_ifd, read_tiff_header};
use crate::source::{Endian, ExifSource};
use std::io::{Read, Seek};

const NIKON_V3_SIGNATURE: &[u8; 10] = b"Nikon\0\x02\x10\x00\x00";
const NIKON_V3_VARIANT_SIGNATURE: &[u8; 10] = b"Nikon\0\x02\x00\x00\x00";

fn nikon_v3_detector(raw: &[u8]) -> bool {
    raw.starts_with(NIKON_V3_SIGNATURE)
}

fn nikon_v3_variant_detector(raw: &[u8]) -> bool {
    raw.starts_with(NIKON_V3_VARIANT_SIGNATURE)
}

/// How a recognized maker note is parsed. One variant per layout, shared by
/// all signatures that use it.
#[derive(Debug, Clone, Copy)]
enum NoteLayout {
    /// 10-byte signature, then a complete TIFF stream with its own header.
    NikonV3,
}

struct MakerNoteFormat {
    detect: fn(&[u8]) -> bool,
    layout: NoteLayout,
}

static MAKER_NOTE_FORMATS: &[MakerNoteFormat] = &[
    MakerNoteFormat {
        detect: nikon_v3_detector,
        layout: NoteLayout::NikonV3,
    },
    MakerNoteFormat {
        detect: nikon_v3_variant_detector,
        layout: NoteLayout::NikonV3,
    },
];

/// Runs `body` with the given anchor and byte order, restoring the previous
/// values on every exit path.
fn with_tiff_scope<R: Read + Seek, T>(
    source: &mut ExifSource<R>,
    anchor: u64,
    endian: Endian,
    body: impl FnOnce(&mut ExifSource<R>) -> Result<T>,
) -> Result<T> {
    let outer_anchor = source.tiff_anchor();
    let outer_endian = source.endian();
    source.set_tiff_anchor(anchor);
    source.set_endian(endian);
    let result = body(source);
    source.set_tiff_anchor(outer_anchor);
    source.set_endian(outer_endian);
    result
}

/// Dispatches a MakerNotes entry to the vendor registry. Returns the flat
/// tags of the embedded IFD for a recognized vendor, `None` (skip silently)
/// otherwise. `path` already ends with the MakerNotes tag ID.
pub fn read_maker_notes<R: Read + Seek>(
    source: &mut ExifSource<R>,
    entry: &IfdEntry,
    path: &[u16],
) -> Result<Option<Vec<Tag>>> {
    for format in MAKER_NOTE_FORMATS {
        if (format.detect)(&entry.raw) {
            let tags = match format.layout {
                NoteLayout::NikonV3 => read_nikon_v3(source, entry, path)?,
            };
            return Ok(Some(tags));
        }
    }
    Ok(None)
}

/// The note payload sits at `anchor + data word`; past the signature a whole
/// TIFF stream follows and that point becomes the anchor of the sub-parse.
/// The embedded header is read under a forced big-endian order, which the
/// magic then corrects to whatever the camera wrote.
fn read_nikon_v3<R: Read + Seek>(
    source: &mut ExifSource<R>,
    entry: &IfdEntry,
    path: &[u16],
) -> Result<Vec<Tag>> {
    let note_anchor =
        source.tiff_anchor() + u64::from(entry.data) + NIKON_V3_SIGNATURE.len() as u64;
    with_tiff_scope(source, note_anchor, Endian::Big, |source| {
        source.seek_absolute(note_anchor)?;
        read_tiff_header(source)?;
        let ifd = read_ifd(source, None, entry.ifd_index)?;
        entries_to_tags(source, path, ifd.entries)
    })
}

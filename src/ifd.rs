//! Image File Directory data model: raw entries, parsed directories and the
//! flattened, path-keyed tags the projection layer consumes.

use crate::value::{ExifValue, ExifValueType};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Write;

/// Tag that points at the Exif sub-IFD.
pub const EXIF_IFD_TAG: u16 = 0x8769;
/// Tag that carries the vendor maker note blob.
pub const MAKER_NOTES_TAG: u16 = 0x927C;

/// The raw form of one directory entry: twelve bytes on the wire, plus the
/// decoded value and the bit-exact bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct IfdEntry {
    /// Zero-based position of the owning IFD in its chain.
    pub ifd_index: usize,
    pub tag: u16,
    pub dtype: ExifValueType,
    /// Declared component count.
    pub count: u32,
    /// The entry's data word: inline payload or TIFF-relative offset.
    pub data: u32,
    pub value: ExifValue,
    /// Raw value bytes; maker-note detectors match signatures on these.
    pub raw: Vec<u8>,
}

impl fmt::Display for IfdEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id={:#06x} count={} value={:?}", self.tag, self.count, self.value)
    }
}

/// One directory: its ordinal index in the IFD0 -> IFD1 -> ... chain and its
/// entries in wire order.
#[derive(Debug)]
pub struct Ifd {
    pub index: usize,
    pub entries: Vec<IfdEntry>,
}

/// Flattened output of the tree walk: a tag and the path of parent tag IDs
/// that leads to it from the root directory.
#[derive(Debug, Clone)]
pub struct Tag {
    pub id: u16,
    pub path: Vec<u16>,
    pub dtype: ExifValueType,
    pub value: ExifValue,
    pub raw: Vec<u8>,
}

impl Tag {
    pub fn from_entry(path: &[u16], entry: IfdEntry) -> Self {
        Self {
            id: entry.tag,
            path: path.to_vec(),
            dtype: entry.dtype,
            value: entry.value,
            raw: entry.raw,
        }
    }

    /// Canonical key: every path component and the tag ID in lowercase
    /// 4-digit hex, joined with `/` (e.g. `8769/927c/0002`).
    pub fn path_name(&self) -> String {
        let mut name = String::new();
        for parent in &self.path {
            let _ = write!(name, "{parent:04x}/");
        }
        let _ = write!(name, "{:04x}", self.id);
        name
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path={} value={:?}", self.path_name(), self.value)
    }
}

/// Indexes a flat tag list by canonical path name.
pub fn tags_as_map(tags: Vec<Tag>) -> HashMap<String, Tag> {
    tags.into_iter().map(|tag| (tag.path_name(), tag)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: u16, path: &[u16]) -> Tag {
        Tag {
            id,
            path: path.to_vec(),
            dtype: ExifValueType::UnsignedShort,
            value: ExifValue::Shorts(vec![0]),
            raw: vec![0, 0, 0, 0],
        }
    }

    #[test]
    fn path_name_is_lowercase_hex_with_separators() {
        assert_eq!(tag(0x010F, &[]).path_name(), "010f");
        assert_eq!(tag(0x9003, &[0x8769]).path_name(), "8769/9003");
        assert_eq!(tag(0x0002, &[0x8769, 0x927C]).path_name(), "8769/927c/0002");
    }

    #[test]
    fn map_is_keyed_by_path() {
        let map = tags_as_map(vec![tag(0x010F, &[]), tag(0x8827, &[0x8769])]);
        assert!(map.contains_key("010f"));
        assert!(map.contains_key("8769/8827"));
        assert_eq!(map.len(), 2);
    }
}

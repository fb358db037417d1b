//! Per-container entry points and the extension dispatch that routes a path
//! to one of them.

pub mod arw;
pub mod jpeg;
pub mod raf;

use crate::error::{ExifError, Result};
use crate::ifd::Tag;
use crate::info::{self, ExifInfo, ReadOptions};
use crate::source::{ExifSource, FileSource, MmapSource};
use std::io::{Read, Seek};
use std::path::Path;

/// The containers a path can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Jpeg,
    Arw,
    Raf,
}

impl FileFormat {
    /// Routes by lowercased extension: `.jpg`/`.jpeg`, `.arw`, `.raf`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "arw" => Some(Self::Arw),
            "raf" => Some(Self::Raf),
            _ => None,
        }
    }
}

/// Parses one file into the flat tag list of its Exif TIFF stream.
pub fn read_format_tags<R: Read + Seek>(
    source: &mut ExifSource<R>,
    format: FileFormat,
) -> Result<Vec<Tag>> {
    match format {
        FileFormat::Jpeg => jpeg::read_tags(source),
        FileFormat::Arw => arw::read_tags(source),
        FileFormat::Raf => raf::read_tags(source),
    }
}

/// Extracts the Exif record of one image file. Opens a source (streamed, or
/// memory-mapped with `fast_io`), parses the container and projects the tags.
/// Every failure is per-file; the caller logs and skips.
pub fn read_exif_info(path: &Path, options: &ReadOptions) -> Result<ExifInfo> {
    let format = FileFormat::from_path(path)
        .ok_or_else(|| ExifError::UnsupportedFile(path.display().to_string()))?;
    let tags = if options.fast_io {
        let mut source = MmapSource::open_mmap(path)?;
        read_format_tags(&mut source, format)?
    } else {
        let mut source = FileSource::open(path)?;
        read_format_tags(&mut source, format)?
    };
    let mut exif_info = info::project(tags, options);
    exif_info.file_name = path.display().to_string();
    Ok(exif_info)
}

//! Positioned, endian-aware byte source over a single image file.
//!
//! The byte order and the TIFF anchor are properties of the source, not of an
//! individual read: the TIFF magic decides the order for the remainder of the
//! parse, and maker-note sub-parses re-anchor and re-order the same source
//! transiently. One source is owned by one parser task; the backing handle is
//! released on drop on every exit path.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Byte order of the multi-byte primitives a source currently decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

pub struct ExifSource<R: Read + Seek> {
    path: PathBuf,
    reader: R,
    len: u64,
    endian: Endian,
    tiff_anchor: u64,
}

/// Streaming backend over a buffered file descriptor.
pub type FileSource = ExifSource<BufReader<File>>;

/// Memory-mapped backend behind a seekable cursor (`--fast-io`).
pub type MmapSource = ExifSource<Cursor<Mmap>>;

impl ExifSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        Ok(Self::with_len(path.as_ref(), BufReader::new(file), len))
    }
}

impl ExifSource<Cursor<Mmap>> {
    pub fn open_mmap(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        // read-only map; the file is never written while we hold it
        let map = unsafe { Mmap::map(&file)? };
        let len = map.len() as u64;
        Ok(Self::with_len(path.as_ref(), Cursor::new(map), len))
    }
}

macro_rules! endian_read {
    ($name:ident, $kind:ty) => {
        pub fn $name(&mut self) -> io::Result<$kind> {
            match self.endian {
                Endian::Little => self.reader.$name::<LittleEndian>(),
                Endian::Big => self.reader.$name::<BigEndian>(),
            }
        }
    };
}

impl<R: Read + Seek> ExifSource<R> {
    /// Wraps an arbitrary reader, measuring its length by seeking to the end.
    /// The cursor is left at the start. Initial byte order is big-endian (the
    /// order of JPEG marker fields); the TIFF magic corrects it later.
    pub fn from_reader(path: impl AsRef<Path>, mut reader: R) -> io::Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self::with_len(path.as_ref(), reader, len))
    }

    fn with_len(path: &Path, reader: R, len: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            reader,
            len,
            endian: Endian::Big,
            tiff_anchor: 0,
        }
    }

    endian_read!(read_u16, u16);
    endian_read!(read_u32, u32);

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.reader.read_u8()
    }

    /// Fills `out` exactly; hitting EOF mid-read is an error, not a short read.
    pub fn read_exact(&mut self, out: &mut [u8]) -> io::Result<()> {
        self.reader.read_exact(out)
    }

    pub fn read_exact_vec(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.reader.stream_position()
    }

    /// Absolute seek. Positioning beyond the end of the source is an error so
    /// that a bogus IFD offset is caught at the seek, not at the next read.
    pub fn seek_absolute(&mut self, pos: u64) -> io::Result<u64> {
        if pos > self.len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("seek to {pos} beyond end of {} ({} bytes)", self.path.display(), self.len),
            ));
        }
        self.reader.seek(SeekFrom::Start(pos))
    }

    pub fn seek_relative(&mut self, delta: i64) -> io::Result<u64> {
        let pos = self.position()?;
        let target = pos
            .checked_add_signed(delta)
            .filter(|target| *target <= self.len)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("relative seek by {delta} from {pos} leaves {}", self.path.display()),
                )
            })?;
        self.reader.seek(SeekFrom::Start(target))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Absolute offset the current TIFF scope measures its offsets from.
    pub fn tiff_anchor(&self) -> u64 {
        self.tiff_anchor
    }

    pub fn set_tiff_anchor(&mut self, anchor: u64) {
        self.tiff_anchor = anchor;
    }
}

impl<R: Read + Seek> fmt::Debug for ExifSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExifSource")
            .field("path", &self.path)
            .field("len", &self.len)
            .field("endian", &self.endian)
            .field("tiff_anchor", &self.tiff_anchor)
            .finish_non_exhaustive()
    }
}

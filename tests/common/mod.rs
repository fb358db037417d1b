//! Synthetic container fixtures: byte-exact TIFF streams, JPEG wrappers and
//! RAF headers assembled in memory, so the parser can be exercised without
//! binary sample files in the repository.

#![allow(dead_code)]

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestEndian {
    Little,
    Big,
}

/// Tag payloads the builder can serialize. `SubIfd` becomes an unsigned-long
/// pointer entry whose directory is appended after the parent; `Invalid`
/// writes an arbitrary wire entry verbatim.
#[derive(Clone)]
pub enum Value {
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    SignedLongs(Vec<i32>),
    Ascii(String),
    Rationals(Vec<(u32, u32)>),
    SignedRationals(Vec<(i32, i32)>),
    Undefined(Vec<u8>),
    SubIfd(Vec<(u16, Value)>),
    Invalid { dtype: u16, count: u32, word: [u8; 4] },
}

impl Value {
    fn dtype(&self) -> u16 {
        match self {
            Value::Ascii(_) => 2,
            Value::Shorts(_) => 3,
            Value::Longs(_) | Value::SubIfd(_) => 4,
            Value::Rationals(_) => 5,
            Value::Undefined(_) => 7,
            Value::SignedLongs(_) => 9,
            Value::SignedRationals(_) => 10,
            Value::Invalid { dtype, .. } => *dtype,
        }
    }

    fn count(&self) -> u32 {
        match self {
            Value::Shorts(v) => v.len() as u32,
            Value::Longs(v) => v.len() as u32,
            Value::SignedLongs(v) => v.len() as u32,
            Value::Ascii(s) => s.len() as u32 + 1,
            Value::Rationals(v) => v.len() as u32,
            Value::SignedRationals(v) => v.len() as u32,
            Value::Undefined(v) => v.len() as u32,
            Value::SubIfd(_) => 1,
            Value::Invalid { count, .. } => *count,
        }
    }

    fn payload(&self, endian: TestEndian) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Value::Shorts(values) => {
                for &v in values {
                    out.extend(endian.u16_bytes(v));
                }
            }
            Value::Longs(values) => {
                for &v in values {
                    out.extend(endian.u32_bytes(v));
                }
            }
            Value::SignedLongs(values) => {
                for &v in values {
                    out.extend(endian.u32_bytes(v as u32));
                }
            }
            Value::Ascii(text) => {
                out.extend(text.as_bytes());
                out.push(0);
            }
            Value::Rationals(values) => {
                for &(n, d) in values {
                    out.extend(endian.u32_bytes(n));
                    out.extend(endian.u32_bytes(d));
                }
            }
            Value::SignedRationals(values) => {
                for &(n, d) in values {
                    out.extend(endian.u32_bytes(n as u32));
                    out.extend(endian.u32_bytes(d as u32));
                }
            }
            Value::Undefined(bytes) => out.extend(bytes),
            Value::SubIfd(_) | Value::Invalid { .. } => unreachable!("serialized separately"),
        }
        out
    }
}

impl TestEndian {
    fn u16_bytes(self, v: u16) -> [u8; 2] {
        match self {
            TestEndian::Little => v.to_le_bytes(),
            TestEndian::Big => v.to_be_bytes(),
        }
    }

    fn u32_bytes(self, v: u32) -> [u8; 4] {
        match self {
            TestEndian::Little => v.to_le_bytes(),
            TestEndian::Big => v.to_be_bytes(),
        }
    }
}

struct TiffStream {
    endian: TestEndian,
    buf: Vec<u8>,
}

enum Fixup {
    Payload(Vec<u8>),
    SubIfd(Vec<(u16, Value)>),
}

impl TiffStream {
    fn push_u16(&mut self, v: u16) {
        self.buf.extend(self.endian.u16_bytes(v));
    }

    fn push_u32(&mut self, v: u32) {
        self.buf.extend(self.endian.u32_bytes(v));
    }

    fn patch_u32(&mut self, at: usize, v: u32) {
        let bytes = self.endian.u32_bytes(v);
        self.buf[at..at + 4].copy_from_slice(&bytes);
    }

    /// Writes one directory plus its out-of-line payloads and sub-IFDs.
    /// Returns the buffer index of the (zeroed) next-IFD offset field.
    fn write_ifd(&mut self, entries: Vec<(u16, Value)>) -> usize {
        self.push_u16(entries.len() as u16);
        let mut fixups: Vec<(usize, Fixup)> = Vec::new();
        for (tag, value) in entries {
            self.push_u16(tag);
            match value {
                Value::Invalid { dtype, count, word } => {
                    self.push_u16(dtype);
                    self.push_u32(count);
                    self.buf.extend(word);
                }
                Value::SubIfd(sub_entries) => {
                    // a sub-IFD pointer is an unsigned long on the wire
                    self.push_u16(4);
                    self.push_u32(1);
                    fixups.push((self.buf.len(), Fixup::SubIfd(sub_entries)));
                    self.push_u32(0);
                }
                value => {
                    self.push_u16(value.dtype());
                    self.push_u32(value.count());
                    let payload = value.payload(self.endian);
                    if payload.len() <= 4 {
                        let mut word = payload;
                        word.resize(4, 0);
                        self.buf.extend(word);
                    } else {
                        fixups.push((self.buf.len(), Fixup::Payload(payload)));
                        self.push_u32(0);
                    }
                }
            }
        }
        let next_offset_at = self.buf.len();
        self.push_u32(0);
        for (at, fixup) in fixups {
            let offset = self.buf.len() as u32;
            self.patch_u32(at, offset);
            match fixup {
                Fixup::Payload(payload) => self.buf.extend(payload),
                Fixup::SubIfd(sub_entries) => {
                    self.write_ifd(sub_entries);
                }
            }
        }
        next_offset_at
    }
}

/// Builds a complete TIFF stream (header + chained IFDs + data). All offsets
/// are relative to the stream start, which is what the parser anchors on.
pub fn build_tiff(endian: TestEndian, ifds: Vec<Vec<(u16, Value)>>) -> Vec<u8> {
    build_tiff_chain(endian, ifds, None)
}

/// Same, but the last IFD's next-offset field is patched to `bogus_next`
/// instead of zero, for chain-recovery tests.
pub fn build_tiff_with_bogus_next(
    endian: TestEndian,
    ifds: Vec<Vec<(u16, Value)>>,
    bogus_next: u32,
) -> Vec<u8> {
    build_tiff_chain(endian, ifds, Some(bogus_next))
}

fn build_tiff_chain(
    endian: TestEndian,
    ifds: Vec<Vec<(u16, Value)>>,
    bogus_next: Option<u32>,
) -> Vec<u8> {
    let mut stream = TiffStream { endian, buf: Vec::new() };
    match endian {
        TestEndian::Little => stream.buf.extend([0x49, 0x49, 0x2A, 0x00]),
        TestEndian::Big => stream.buf.extend([0x4D, 0x4D, 0x00, 0x2A]),
    }
    stream.push_u32(8);
    let mut pending_next: Option<usize> = None;
    for entries in ifds {
        let directory_offset = stream.buf.len() as u32;
        if let Some(at) = pending_next {
            stream.patch_u32(at, directory_offset);
        }
        pending_next = Some(stream.write_ifd(entries));
    }
    if let (Some(at), Some(bogus)) = (pending_next, bogus_next) {
        stream.patch_u32(at, bogus);
    }
    stream.buf
}

/// A maker note in the Nikon v3 layout: the 10-byte signature followed by a
/// self-contained TIFF stream whose tag `0x0002` carries the effective ISO
/// at element 1.
pub fn nikon_maker_note(iso: u16) -> Vec<u8> {
    let mut blob = b"Nikon\0\x02\x10\x00\x00".to_vec();
    blob.extend(build_tiff(
        TestEndian::Little,
        vec![vec![(0x0002, Value::Shorts(vec![0, iso]))]],
    ));
    blob
}

/// Wraps a TIFF stream into a JPEG: SOI, a JFIF APP0 filler segment (so the
/// marker walk has something to skip), the Exif APP1 segment, then SOS.
pub fn wrap_jpeg(tiff: &[u8]) -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend([0xFF, 0xE0]);
    jpeg.extend(16u16.to_be_bytes());
    jpeg.extend([0u8; 14]);
    jpeg.extend([0xFF, 0xE1]);
    jpeg.extend(((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend(b"Exif\0\0");
    jpeg.extend(tiff);
    jpeg.extend([0xFF, 0xDA]);
    jpeg.extend(2u16.to_be_bytes());
    jpeg
}

/// A JPEG with segments but no Exif APP1: the walk must stop at SOS and
/// report an empty tag list.
pub fn jpeg_without_exif() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend([0xFF, 0xE0]);
    jpeg.extend(16u16.to_be_bytes());
    jpeg.extend([0u8; 14]);
    jpeg.extend([0xFF, 0xDA]);
    jpeg.extend(2u16.to_be_bytes());
    jpeg
}

/// Wraps a JPEG into a RAF container: 16-byte magic, header padding, the
/// big-endian built-in JPEG pointer at byte 84, then the JPEG itself.
pub fn wrap_raf(jpeg: &[u8]) -> Vec<u8> {
    let mut raf = b"FUJIFILMCCD-RAW ".to_vec();
    raf.resize(84, 0);
    raf.extend(88u32.to_be_bytes());
    raf.extend(jpeg);
    raf
}

/// IFD tree mirroring the Nikon D50 sample: no standard ISO tag, the
/// effective ISO only lives in the maker note.
pub fn nikon_d50_ifds() -> Vec<Vec<(u16, Value)>> {
    vec![vec![
        (0x010F, Value::Ascii("NIKON CORPORATION".to_string())),
        (0x0110, Value::Ascii("NIKON D50".to_string())),
        (0x0112, Value::Shorts(vec![1])),
        (
            0x8769,
            Value::SubIfd(vec![
                (0x829A, Value::Rationals(vec![(1, 400)])),
                (0x829D, Value::Rationals(vec![(10, 1)])),
                (0x8822, Value::Shorts(vec![2])),
                (0x9003, Value::Ascii("2006:04:16 15:11:33".to_string())),
                (0x9204, Value::SignedRationals(vec![(-2, 6)])),
                (0x9209, Value::Shorts(vec![0])),
                (0x920A, Value::Rationals(vec![(18, 1)])),
                (0x927C, Value::Undefined(nikon_maker_note(400))),
                (0xA002, Value::Longs(vec![3008])),
                (0xA003, Value::Longs(vec![2000])),
                (0xA405, Value::Shorts(vec![27])),
            ]),
        ),
    ]]
}

/// IFD tree mirroring the Panasonic GX85 sample: standard ISO tag, flash
/// code 0x10, aperture-priority program.
pub fn panasonic_gx85_ifds() -> Vec<Vec<(u16, Value)>> {
    vec![vec![
        (0x010F, Value::Ascii("Panasonic".to_string())),
        (0x0110, Value::Ascii("DMC-GX85".to_string())),
        (
            0x8769,
            Value::SubIfd(vec![
                (0x8827, Value::Shorts(vec![250])),
                (0x829A, Value::Rationals(vec![(1, 800)])),
                (0x829D, Value::Rationals(vec![(8, 1)])),
                (0x8822, Value::Shorts(vec![3])),
                (0x9003, Value::Ascii("2019:06:08 08:19:37".to_string())),
                (0x9204, Value::SignedRationals(vec![(-33, 100)])),
                (0x9209, Value::Shorts(vec![0x10])),
                (0x920A, Value::Rationals(vec![(140, 1)])),
                (0xA002, Value::Longs(vec![4592])),
                (0xA003, Value::Longs(vec![3448])),
                (0xA405, Value::Shorts(vec![280])),
            ]),
        ),
    ]]
}

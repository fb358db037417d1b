//! The twelve Exif wire types and the readers that materialize them.
//!
//! Every reader yields the decoded value together with the raw bytes it was
//! decoded from; the raw form is kept bit-exact on the entry because the
//! maker-note detectors match on it.

use crate::error::{ExifError, Result};
use crate::rational::{Rational, SignedRational};
use crate::source::{Endian, ExifSource};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use num_derive::FromPrimitive;
use std::io::{Read, Seek};

/// Wire-level data type codes as they appear in an IFD entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum ExifValueType {
    UnsignedByte = 1,
    AsciiString = 2,
    UnsignedShort = 3,
    UnsignedLong = 4,
    UnsignedRational = 5,
    SignedByte = 6,
    Undefined = 7,
    SignedShort = 8,
    SignedLong = 9,
    SignedRational = 10,
    SingleFloat = 11,
    DoubleFloat = 12,
}

impl ExifValueType {
    pub fn bytes_per_element(self) -> u32 {
        match self {
            Self::UnsignedByte | Self::AsciiString | Self::SignedByte | Self::Undefined => 1,
            Self::UnsignedShort | Self::SignedShort => 2,
            Self::UnsignedLong | Self::SignedLong | Self::SingleFloat => 4,
            Self::UnsignedRational | Self::SignedRational | Self::DoubleFloat => 8,
        }
    }
}

/// A decoded tag value, one arm per wire type. Rational and signed-rational
/// values are sequences even for a single component; consumers read index 0.
#[derive(Debug, Clone, PartialEq)]
pub enum ExifValue {
    Bytes(Vec<u8>),
    Ascii(String),
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Rationals(Vec<Rational>),
    SignedBytes(Vec<i8>),
    Undefined(Vec<u8>),
    SignedShorts(Vec<i16>),
    SignedLongs(Vec<i32>),
    SignedRationals(Vec<SignedRational>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
}

impl ExifValue {
    pub fn as_ascii(&self) -> Option<&str> {
        match self {
            Self::Ascii(s) => Some(s),
            _ => None,
        }
    }

    pub fn shorts(&self) -> Option<&[u16]> {
        match self {
            Self::Shorts(v) => Some(v),
            _ => None,
        }
    }

    pub fn longs(&self) -> Option<&[u32]> {
        match self {
            Self::Longs(v) => Some(v),
            _ => None,
        }
    }

    pub fn signed_longs(&self) -> Option<&[i32]> {
        match self {
            Self::SignedLongs(v) => Some(v),
            _ => None,
        }
    }

    pub fn rationals(&self) -> Option<&[Rational]> {
        match self {
            Self::Rationals(v) => Some(v),
            _ => None,
        }
    }

    pub fn signed_rationals(&self) -> Option<&[SignedRational]> {
        match self {
            Self::SignedRationals(v) => Some(v),
            _ => None,
        }
    }
}

/// Reads the value of one IFD entry from the current cursor position, which
/// sits on the entry's 4-byte data word. Returns the decoded value and the
/// raw buffer (always `max(4, count * element size)` bytes).
///
/// When the payload fits the data word it is decoded inline; otherwise the
/// data word is a TIFF-relative offset and the cursor is saved, moved to
/// `anchor + offset` for the read and restored afterwards.
pub fn read_value<R: Read + Seek>(
    source: &mut ExifSource<R>,
    dtype: ExifValueType,
    count: u32,
) -> Result<(ExifValue, Vec<u8>)> {
    let raw = read_raw_data(source, count, dtype.bytes_per_element())?;
    let value = decode_value(source.endian(), dtype, count as usize, &raw);
    Ok((value, raw))
}

fn read_raw_data<R: Read + Seek>(
    source: &mut ExifSource<R>,
    count: u32,
    bytes_per_element: u32,
) -> Result<Vec<u8>> {
    let size = u64::from(count) * u64::from(bytes_per_element);
    if size <= 4 {
        return Ok(source.read_exact_vec(4)?);
    }
    if size > source.len() {
        return Err(ExifError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("declared value size {size} exceeds file size {}", source.len()),
        )));
    }
    let offset = source.read_u32()?;
    let pos = source.position()?;
    let anchor = source.tiff_anchor();
    source.seek_absolute(anchor + u64::from(offset))?;
    let raw = source.read_exact_vec(size as usize);
    source.seek_absolute(pos)?;
    Ok(raw?)
}

fn decode_value(endian: Endian, dtype: ExifValueType, count: usize, raw: &[u8]) -> ExifValue {
    match endian {
        Endian::Little => decode_typed::<LittleEndian>(dtype, count, raw),
        Endian::Big => decode_typed::<BigEndian>(dtype, count, raw),
    }
}

fn decode_typed<E: ByteOrder>(dtype: ExifValueType, count: usize, raw: &[u8]) -> ExifValue {
    match dtype {
        ExifValueType::UnsignedByte => ExifValue::Bytes(raw[..count].to_vec()),
        ExifValueType::AsciiString => ExifValue::Ascii(decode_ascii(&raw[..count])),
        ExifValueType::Undefined => ExifValue::Undefined(raw[..count].to_vec()),
        ExifValueType::SignedByte => {
            ExifValue::SignedBytes(raw[..count].iter().map(|&b| b as i8).collect())
        }
        ExifValueType::UnsignedShort => {
            let mut values = vec![0u16; count];
            E::read_u16_into(&raw[..count * 2], &mut values);
            ExifValue::Shorts(values)
        }
        ExifValueType::SignedShort => {
            let mut values = vec![0i16; count];
            E::read_i16_into(&raw[..count * 2], &mut values);
            ExifValue::SignedShorts(values)
        }
        ExifValueType::UnsignedLong => {
            let mut values = vec![0u32; count];
            E::read_u32_into(&raw[..count * 4], &mut values);
            ExifValue::Longs(values)
        }
        ExifValueType::SignedLong => {
            let mut values = vec![0i32; count];
            E::read_i32_into(&raw[..count * 4], &mut values);
            ExifValue::SignedLongs(values)
        }
        ExifValueType::UnsignedRational => {
            // pairs of (numerator, denominator), exactly one rational per component
            let mut words = vec![0u32; count * 2];
            E::read_u32_into(&raw[..count * 8], &mut words);
            ExifValue::Rationals(
                words
                    .chunks_exact(2)
                    .map(|pair| Rational::new(pair[0], pair[1]))
                    .collect(),
            )
        }
        ExifValueType::SignedRational => {
            let mut words = vec![0i32; count * 2];
            E::read_i32_into(&raw[..count * 8], &mut words);
            ExifValue::SignedRationals(
                words
                    .chunks_exact(2)
                    .map(|pair| SignedRational::new(pair[0], pair[1]))
                    .collect(),
            )
        }
        ExifValueType::SingleFloat => {
            let mut values = vec![0f32; count];
            E::read_f32_into(&raw[..count * 4], &mut values);
            ExifValue::Floats(values)
        }
        ExifValueType::DoubleFloat => {
            let mut values = vec![0f64; count];
            E::read_f64_into(&raw[..count * 8], &mut values);
            ExifValue::Doubles(values)
        }
    }
}

/// Strips all trailing NULs, then trims outer whitespace.
fn decode_ascii(raw: &[u8]) -> String {
    let mut end = raw.len();
    while end > 0 && raw[end - 1] == 0 {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

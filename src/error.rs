use std::io;
use thiserror::Error;

/// The error type produced by the Exif parser and the container readers.
///
/// A failure always aborts the *current file* only; the driver logs it and
/// moves on to the next path.
#[derive(Error, Debug)]
pub enum ExifError {
    /// Underlying read or positioning failure, including reads that hit EOF
    /// mid-primitive.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The outer container is not what the extension promised (JPEG without
    /// SOI, RAF without the FUJIFILM magic).
    #[error("not a supported image container: {0}")]
    InvalidContainer(String),

    /// The 4-byte TIFF magic matched neither `II*\0` nor `MM\0*`.
    #[error("invalid byte order in TIFF header: {0:#010x}")]
    InvalidTiffHeader(u32),

    /// The APP1 segment does not start with `Exif\0\0`.
    #[error("exif data does not contain a valid exif marker")]
    InvalidExifMarker,

    /// An IFD entry declared a data type code outside 1..=12.
    #[error("unsupported data type {dtype} of tag {tag:#06x}")]
    UnsupportedDataType { tag: u16, dtype: u16 },

    /// A tag whose decoded value does not have the shape its role requires
    /// (e.g. a sub-IFD pointer that is not an unsigned long).
    #[error("unexpected value shape in tag {0}")]
    InvalidValue(String),

    /// The path has an extension no reader is registered for.
    #[error("unsupported file: {0}")]
    UnsupportedFile(String),
}

pub type Result<T> = std::result::Result<T, ExifError>;

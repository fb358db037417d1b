//! Exif metadata extraction for photo collections.
//!
//! Parses the Exif/TIFF streams of JPEG, Sony ARW and Fujifilm RAF files
//! into flat, path-keyed tag lists, projects the tags of interest onto an
//! [`ExifInfo`] record and writes a CSV summary. The parser handles per-file
//! endianness, inline and offset-addressed values, nested Exif sub-IFDs and
//! Nikon maker notes with their own embedded TIFF headers.

pub mod cameras;
pub mod error;
pub mod formats;
pub mod ifd;
pub mod ifd_reader;
pub mod info;
pub mod makernote;
pub mod pipeline;
pub mod rational;
pub mod report;
pub mod scan;
pub mod source;
pub mod value;

pub use error::ExifError;
pub use formats::read_exif_info;
pub use info::{ExifInfo, ReadOptions};

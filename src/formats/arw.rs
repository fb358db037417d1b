//! Sony ARW container: the file is a TIFF stream from byte zero.

use crate::error::Result;
use crate::ifd::Tag;
use crate::ifd_reader;
use crate::source::ExifSource;
use std::io::{Read, Seek};

pub fn read_tags<R: Read + Seek>(source: &mut ExifSource<R>) -> Result<Vec<Tag>> {
    source.set_tiff_anchor(0);
    ifd_reader::read_tags(source)
}

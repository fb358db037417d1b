//! CSV output: one all-quoted row per valid Exif record.

use crate::info::ExifInfo;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::Receiver;

pub fn csv_header(include_file_name: bool) -> String {
    let mut header = String::from(
        "Make,Model,CreateTime,Iso,FNumber,ExposureTime,FocalLength,FocalLength35,ExpComp,Flash,ExposureProgram,MPix",
    );
    if include_file_name {
        header.push_str(",FileName");
    }
    header.push('\n');
    header
}

/// Formats one record. Every field is double-quoted; FNumber, FocalLength
/// and MPix get one decimal, the rational fields print normalized.
pub fn csv_row(info: &ExifInfo, include_file_name: bool) -> String {
    let mpix = (u64::from(info.width) * u64::from(info.height)) as f64 / 1_000_000.0;
    let mut row = format!(
        "\"{}\",\"{}\",\"{}\",\"{}\",\"{:.1}\",\"{}\",\"{:.1}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{:.1}\"",
        info.make.trim(),
        info.model.trim(),
        info.create_time,
        info.iso,
        info.f_number.as_f64(),
        info.exposure_time.normalize(),
        info.focal_length.as_f64(),
        info.focal_length_35,
        info.exposure_compensation.normalize(),
        info.flash,
        info.exposure_program,
        mpix,
    );
    if include_file_name {
        row.push_str(&format!(",\"{}\"", info.file_name));
    }
    row.push('\n');
    row
}

/// Drains the record channel into the output file, keeping only valid
/// records. Returns the number of rows written.
pub fn write_csv(
    output: &Path,
    records: Receiver<ExifInfo>,
    include_file_name: bool,
) -> io::Result<u64> {
    let mut out = BufWriter::new(File::create(output)?);
    out.write_all(csv_header(include_file_name).as_bytes())?;
    let mut written = 0u64;
    for info in records {
        if info.is_valid() {
            out.write_all(csv_row(&info, include_file_name).as_bytes())?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}

//! Projection of the flat tag list onto the Exif record of interest.
//!
//! A fixed registry maps canonical tag paths to field setters; everything the
//! CSV layer prints comes through here. Labels for flash and exposure program
//! are fixed code tables, with a simplified Off/On flash table as the default.

use crate::cameras;
use crate::ifd::{tags_as_map, Tag};
use crate::rational::{Rational, SignedRational};
use crate::value::ExifValueType;
use chrono::{NaiveDate, SecondsFormat, TimeZone, Utc};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const TAG_MAKE: &str = "010f";
pub const TAG_MODEL: &str = "0110";
pub const TAG_DATE_TIME_ORIGINAL: &str = "8769/9003";
pub const TAG_ISO: &str = "8769/8827";
pub const TAG_F_NUMBER: &str = "8769/829d";
pub const TAG_EXPOSURE_TIME: &str = "8769/829a";
pub const TAG_FOCAL_LENGTH: &str = "8769/920a";
pub const TAG_FOCAL_LENGTH_35: &str = "8769/a405";
pub const TAG_FLASH: &str = "8769/9209";
pub const TAG_EXPOSURE_PROGRAM: &str = "8769/8822";
pub const TAG_EXPOSURE_COMPENSATION: &str = "8769/9204";
pub const TAG_IMAGE_WIDTH: &str = "8769/a002";
pub const TAG_IMAGE_HEIGHT: &str = "8769/a003";
pub const TAG_NIKON_ISO: &str = "8769/927c/0002";

/// Per-run parse options, shared read-only across parser workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Use the memory-mapped byte source.
    pub fast_io: bool,
    /// Use the detailed flash label table instead of Off/On.
    pub extend_flash: bool,
}

/// Values of all the Exif tags of interest for one image.
#[derive(Debug, Clone, Default)]
pub struct ExifInfo {
    pub make: String,
    pub model: String,
    /// RFC-3339 UTC, empty when absent or malformed.
    pub create_time: String,
    pub iso: u16,
    pub f_number: Rational,
    pub exposure_time: Rational,
    pub focal_length: Rational,
    pub focal_length_35: u16,
    pub flash: String,
    pub exposure_program: String,
    pub exposure_compensation: SignedRational,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

impl ExifInfo {
    /// A record is worth a CSV row only when the identifying strings are
    /// present and none of the rational fields carry a zero denominator.
    pub fn is_valid(&self) -> bool {
        !self.make.is_empty()
            && !self.model.is_empty()
            && !self.create_time.is_empty()
            && self.f_number.denominator != 0
            && self.exposure_time.denominator != 0
            && self.focal_length.denominator != 0
    }
}

static FLASH_LABELS: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (0x0, "No Flash"),
        (0x1, "Fired"),
        (0x5, "Fired, Return not detected"),
        (0x7, "Fired, Return detected"),
        (0x8, "On, Did not fire"),
        (0x9, "On, Fired"),
        (0xd, "On, Return not detected"),
        (0xf, "On, Return detected"),
        (0x10, "Off, Did not fire"),
        (0x14, "Off, Did not fire, Return not detected"),
        (0x18, "Auto, Did not fire"),
        (0x19, "Auto, Fired"),
        (0x1d, "Auto, Fired, Return not detected"),
        (0x1f, "Auto, Fired, Return detected"),
        (0x20, "No flash function"),
        (0x30, "Off, No flash function"),
        (0x41, "Fired, Red-eye reduction"),
        (0x45, "Fired, Red-eye reduction, Return not detected"),
        (0x47, "Fired, Red-eye reduction, Return detected"),
        (0x49, "On, Red-eye reduction"),
        (0x4d, "On, Red-eye reduction, Return not detected"),
        (0x4f, "On, Red-eye reduction, Return detected"),
        (0x50, "Off, Red-eye reduction"),
        (0x58, "Auto, Did not fire, Red-eye reduction"),
        (0x59, "Auto, Fired, Red-eye reduction"),
        (0x5d, "Auto, Fired, Red-eye reduction, Return not detected"),
        (0x5f, "Auto, Fired, Red-eye reduction, Return detected"),
    ])
});

static SIMPLIFIED_FLASH_LABELS: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (0x0, "Off"),
        (0x1, "On"),
        (0x5, "On"),
        (0x7, "On"),
        (0x8, "On"),
        (0x9, "On"),
        (0xd, "On"),
        (0xf, "On"),
        (0x10, "Off"),
        (0x14, "Off"),
        (0x18, "Off"),
        (0x19, "On"),
        (0x1d, "On"),
        (0x1f, "On"),
        (0x20, "Off"),
        (0x30, "Off"),
        (0x41, "On"),
        (0x45, "On"),
        (0x47, "On"),
        (0x49, "On"),
        (0x4d, "On"),
        (0x4f, "On"),
        (0x50, "Off"),
        (0x58, "Off"),
        (0x59, "On"),
        (0x5d, "On"),
        (0x5f, "On"),
    ])
});

static EXPOSURE_PROGRAMS: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (0, "Not Defined"),
        (1, "Manual"),
        (2, "Program AE"),
        (3, "Aperture-priority AE"),
        (4, "Shutter speed priority AE"),
        (5, "Creative (Slow speed)"),
        (6, "Action (High speed)"),
        (7, "Portrait"),
        (8, "Landscape"),
        (9, "Bulb"),
    ])
});

type TagSetter = fn(&mut ExifInfo, &Tag, &ReadOptions);

/// The static path -> setter mapping. Orientation (`0112`) is parsed like any
/// other tag but deliberately has no entry here.
static PROJECTORS: &[(&str, TagSetter)] = &[
    (TAG_MAKE, set_make),
    (TAG_MODEL, set_model),
    (TAG_DATE_TIME_ORIGINAL, set_create_time),
    (TAG_ISO, set_iso),
    (TAG_F_NUMBER, set_f_number),
    (TAG_EXPOSURE_TIME, set_exposure_time),
    (TAG_FOCAL_LENGTH, set_focal_length),
    (TAG_FOCAL_LENGTH_35, set_focal_length_35),
    (TAG_FLASH, set_flash),
    (TAG_EXPOSURE_PROGRAM, set_exposure_program),
    (TAG_EXPOSURE_COMPENSATION, set_exposure_compensation),
    (TAG_IMAGE_WIDTH, set_width),
    (TAG_IMAGE_HEIGHT, set_height),
];

/// Projects a flat tag list onto an [`ExifInfo`], applies the Nikon ISO
/// fallback and the camera-knowledge post-processing.
pub fn project(tags: Vec<Tag>, options: &ReadOptions) -> ExifInfo {
    let map = tags_as_map(tags);
    let mut info = ExifInfo::default();
    for (path, setter) in PROJECTORS {
        if let Some(tag) = map.get(*path) {
            setter(&mut info, tag, options);
        }
    }
    // no standard ISO tag, but a Nikon maker note may still carry it
    if !map.contains_key(TAG_ISO) {
        if let Some(tag) = map.get(TAG_NIKON_ISO) {
            set_nikon_iso(&mut info, tag);
        }
    }
    cameras::post_process(&mut info);
    info
}

fn set_make(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(text) = tag.value.as_ascii() {
        info.make = text.to_string();
    }
}

fn set_model(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(text) = tag.value.as_ascii() {
        info.model = text.to_string();
    }
}

fn set_create_time(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    info.create_time = tag
        .value
        .as_ascii()
        .and_then(parse_exif_timestamp)
        .unwrap_or_default();
}

fn set_iso(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(&iso) = tag.value.shorts().and_then(<[u16]>::first) {
        info.iso = iso;
    }
}

fn set_f_number(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(&value) = tag.value.rationals().and_then(<[Rational]>::first) {
        info.f_number = value;
    }
}

fn set_exposure_time(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(&value) = tag.value.rationals().and_then(<[Rational]>::first) {
        info.exposure_time = value;
    }
}

fn set_focal_length(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(&value) = tag.value.rationals().and_then(<[Rational]>::first) {
        info.focal_length = value;
    }
}

fn set_focal_length_35(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(&value) = tag.value.shorts().and_then(<[u16]>::first) {
        info.focal_length_35 = value;
    }
}

fn set_flash(info: &mut ExifInfo, tag: &Tag, options: &ReadOptions) {
    let labels: &HashMap<u16, &str> = if options.extend_flash {
        &FLASH_LABELS
    } else {
        &SIMPLIFIED_FLASH_LABELS
    };
    if let Some(label) = tag
        .value
        .shorts()
        .and_then(<[u16]>::first)
        .and_then(|code| labels.get(code))
    {
        info.flash = label.to_string();
    }
}

fn set_exposure_program(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(label) = tag
        .value
        .shorts()
        .and_then(<[u16]>::first)
        .and_then(|code| EXPOSURE_PROGRAMS.get(code))
    {
        info.exposure_program = label.to_string();
    }
}

fn set_exposure_compensation(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(&value) = tag.value.signed_rationals().and_then(<[SignedRational]>::first) {
        info.exposure_compensation = value;
    }
}

fn set_width(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(value) = dimension(tag) {
        info.width = value;
    }
}

fn set_height(info: &mut ExifInfo, tag: &Tag, _: &ReadOptions) {
    if let Some(value) = dimension(tag) {
        info.height = value;
    }
}

/// Cameras disagree on the storage type of the pixel dimensions; widen
/// whatever arrived to u32.
fn dimension(tag: &Tag) -> Option<u32> {
    match tag.dtype {
        ExifValueType::UnsignedLong => tag.value.longs()?.first().copied(),
        ExifValueType::SignedLong => tag.value.signed_longs()?.first().map(|&v| v as u32),
        _ => tag.value.shorts()?.first().map(|&v| u32::from(v)),
    }
}

/// The effective ISO is the second element of the Nikon ISO tag. Some bodies
/// write an all-zero Undefined blob here instead; anything that is not an
/// unsigned-short vector leaves the field zeroed.
fn set_nikon_iso(info: &mut ExifInfo, tag: &Tag) {
    if tag.dtype != ExifValueType::UnsignedShort {
        debug!("unexpected data type {:?} in Nikon ISO tag", tag.dtype);
        return;
    }
    if let Some(&iso) = tag.value.shorts().and_then(|shorts| shorts.get(1)) {
        info.iso = iso;
    }
}

/// Parses `YYYY:MM:DD HH:MM:SS` (some cameras use `-` separators) into an
/// RFC-3339 UTC string. Returns `None` on any malformed component so the
/// caller clears the field.
fn parse_exif_timestamp(timestamp: &str) -> Option<String> {
    let (date_part, time_part) = timestamp.split_once(' ')?;
    let date_part = date_part.replace('-', ":");
    let time_part = time_part.replace('-', ":");

    let mut date_fields = date_part.split(':');
    let year: i32 = date_fields.next()?.parse().ok()?;
    let month: u32 = date_fields.next()?.parse().ok()?;
    let day: u32 = date_fields.next()?.parse().ok()?;

    let mut time_fields = time_part.split(':');
    let hour: u32 = time_fields.next()?.parse().ok()?;
    let minute: u32 = time_fields.next()?.parse().ok()?;
    let second: u32 = time_fields.next()?.parse().ok()?;

    let timestamp = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    Some(
        Utc.from_utc_datetime(&timestamp)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

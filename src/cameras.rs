//! Camera-specific knowledge applied after projection.

use crate::info::ExifInfo;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Crop factors for bodies that do not report a 35mm-equivalent focal length.
static CROP_FACTORS: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| HashMap::from([("Canon EOS R6", 1.0)]));

/// Fills in the 35mm-equivalent focal length from the crop-factor table when
/// the camera left it at zero.
pub fn post_process(info: &mut ExifInfo) {
    if info.focal_length_35 != 0 {
        return;
    }
    if let Some(crop) = CROP_FACTORS.get(info.model.as_str()) {
        info.focal_length_35 = (info.focal_length.as_f64() * crop).round() as u16;
    }
}

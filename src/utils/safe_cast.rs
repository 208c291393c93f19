//! Checked conversions from floating point geometry to raster coordinates

use crate::{Error, Result};

/// Convert a rendered dimension to a canvas size in whole pixels
///
/// The value is rounded and must be at least one pixel.
///
/// # Errors
///
/// Returns an error if the value is not finite, rounds to zero, or exceeds u32
#[allow(clippy::cast_possible_truncation)] // Range checked above
#[allow(clippy::cast_sign_loss)] // Negative values rejected above
pub fn f64_to_canvas_dim(value: f64) -> Result<u32> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= 1.0 && rounded <= f64::from(u32::MAX) {
        Ok(rounded as u32)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} is not a valid canvas dimension"
        )))
    }
}

/// Clamp and convert f64 to i64 for pixel coordinates
///
/// Non-finite input maps to `min`.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
#[allow(clippy::cast_precision_loss)] // Acceptable for clamping bounds
pub fn f64_to_i64_clamp(value: f64, min: i64, max: i64) -> i64 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(min as f64, max as f64);
    (clamped as i64).clamp(min, max)
}

/// Scale a unit-interval value to a colour channel
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamped to 0..=255
#[allow(clippy::cast_sign_loss)] // Clamped to 0..=255
pub fn unit_to_u8(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

use crate::error::AppError;

pub const NORMALIZED_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Converts an intrinsic pixel coordinate into normalized space, where each
/// axis runs [0, 100] as a percentage of the image dimension. Applied once,
/// at seat-creation time; the stored position is resolution-independent.
/// Coordinates outside the image bounds are rejected, not clamped.
pub fn to_normalized(pixel_x: f64, pixel_y: f64, image: ImageSize) -> Result<(f64, f64), AppError> {
    if image.width <= 0.0 || image.height <= 0.0 {
        return Err(AppError::Validation(format!(
            "Invalid image size {}x{}",
            image.width, image.height
        )));
    }
    if !pixel_x.is_finite() || !pixel_y.is_finite() {
        return Err(AppError::Validation("Pixel coordinates must be finite".into()));
    }
    if pixel_x < 0.0 || pixel_y < 0.0 || pixel_x > image.width || pixel_y > image.height {
        return Err(AppError::Validation(format!(
            "Pixel position ({}, {}) outside image bounds {}x{}",
            pixel_x, pixel_y, image.width, image.height
        )));
    }

    Ok((
        pixel_x / image.width * NORMALIZED_MAX,
        pixel_y / image.height * NORMALIZED_MAX,
    ))
}

/// Inverse transform, applied at every render against whatever resolution
/// the chart is currently displayed at.
pub fn to_pixel(norm_x: f64, norm_y: f64, target: ImageSize) -> (f64, f64) {
    (
        norm_x / NORMALIZED_MAX * target.width,
        norm_y / NORMALIZED_MAX * target.height,
    )
}

/// Range check for positions supplied directly in normalized space.
pub fn validate_normalized(norm_x: f64, norm_y: f64) -> Result<(), AppError> {
    if !norm_x.is_finite() || !norm_y.is_finite()
        || norm_x < 0.0 || norm_x > NORMALIZED_MAX
        || norm_y < 0.0 || norm_y > NORMALIZED_MAX
    {
        return Err(AppError::Validation(format!(
            "Normalized position ({}, {}) outside [0, {}]",
            norm_x, norm_y, NORMALIZED_MAX
        )));
    }
    Ok(())
}

/// Two seats closer than `epsilon` (normalized units, Euclidean) count as
/// overlapping placements.
pub fn positions_overlap(ax: f64, ay: f64, bx: f64, by: f64, epsilon: f64) -> bool {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt() < epsilon
}

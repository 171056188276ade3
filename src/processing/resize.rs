//! Downscale dimension math and resampling

use image::imageops::FilterType;
use image::DynamicImage;

/// Resampling filter used for every downscale
///
/// Lanczos3 is the slowest of the built-in filters but keeps fine detail
/// intact, which matters when the output is recompressed to JPEG afterwards.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Compute the output dimensions for a width-capped downscale
///
/// Returns `None` when the image is already within `max_width` (upscaling is
/// never performed). Otherwise returns `(max_width, new_height)` where the
/// height is scaled by the same ratio and truncated, with a floor of 1 pixel.
pub fn downscale_dimensions(width: u32, height: u32, max_width: u32) -> Option<(u32, u32)> {
    if width <= max_width {
        return None;
    }

    // Integer math avoids float rounding drift: height * max_width / width
    // truncates exactly like the ratio multiply it replaces.
    let new_height = (u64::from(height) * u64::from(max_width) / u64::from(width)) as u32;
    Some((max_width, new_height.max(1)))
}

/// Downscale an image to fit `max_width`, or return it untouched
pub fn downscale_to_width(image: DynamicImage, max_width: u32) -> (DynamicImage, bool) {
    match downscale_dimensions(image.width(), image.height(), max_width) {
        Some((width, height)) => (image.resize_exact(width, height, RESIZE_FILTER), true),
        None => (image, false),
    }
}

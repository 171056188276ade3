//! Input format detection and color normalization

use std::path::Path;

use image::DynamicImage;

/// File extensions the walker and single-file modes accept
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Extension given to every optimized output and variant
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Check whether a path carries a supported image extension
/// (case-insensitive)
pub fn is_supported_image<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Normalize an image into a JPEG-encodable color space
///
/// JPEG has no alpha channel, so any image with alpha (or a 16-bit/float
/// sample format) is flattened to 8-bit RGB. Plain RGB and grayscale pass
/// through untouched.
pub fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

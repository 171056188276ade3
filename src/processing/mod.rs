//! Core image optimization pipeline
//!
//! [`Optimizer::optimize`] is the single-image primitive every mode builds
//! on: decode, flatten to a JPEG-encodable color space, downscale when the
//! image exceeds the width cap, then recompress to JPEG. Output is written
//! through a temp sibling and renamed into place so a failed run never
//! leaves a truncated file at the destination.

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::OptimizeOptions;
use crate::error::{Result, WebimizeError};

pub mod formats;
pub mod resize;
pub mod variants;
pub mod walker;

pub use formats::is_supported_image;
pub use variants::{VariantGenerator, VariantOutcome};
pub use walker::{collect_images, BatchSummary, BatchWalker, InPlaceOutcome};

/// Suffix for the temp sibling written before the rename into place
const TEMP_SUFFIX: &str = ".tmp";

/// Outcome of a single optimize pass
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeReport {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub original_dimensions: (u32, u32),
    pub output_dimensions: (u32, u32),
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub resized: bool,
}

impl OptimizeReport {
    /// Output size relative to input size (1.0 = unchanged)
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            return 1.0;
        }
        self.bytes_out as f64 / self.bytes_in as f64
    }

    /// Percentage saved; negative when the output grew
    pub fn size_reduction(&self) -> f64 {
        (1.0 - self.compression_ratio()) * 100.0
    }
}

/// Single-image optimizer
///
/// Stateless; one instance can serve an entire batch run. Parameters travel
/// with each call so the same engine can encode at different widths.
#[derive(Debug, Clone, Default)]
pub struct Optimizer;

impl Optimizer {
    pub fn new() -> Self {
        Self
    }

    /// Optimize one image: decode `source`, fit it to `options.max_width`,
    /// and write it to `dest` as JPEG at `options.quality`
    ///
    /// `source` and `dest` may be the same path; the temp-and-rename write
    /// makes in-place replacement safe.
    pub fn optimize(
        &self,
        source: &Path,
        dest: &Path,
        options: &OptimizeOptions,
    ) -> Result<OptimizeReport> {
        options.validate()?;

        let (image, bytes_in) = self.decode(source)?;
        let original_dimensions = (image.width(), image.height());

        let image = formats::normalize_color(image);
        let (image, resized) = resize::downscale_to_width(image, options.max_width);
        let output_dimensions = (image.width(), image.height());

        debug!(
            source = %source.display(),
            from = ?original_dimensions,
            to = ?output_dimensions,
            "encoding"
        );

        let encoded = self.encode_jpeg(&image, options.quality, dest)?;
        let bytes_out = encoded.len() as u64;
        self.write_atomic(dest, &encoded)?;

        let report = OptimizeReport {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            original_dimensions,
            output_dimensions,
            bytes_in,
            bytes_out,
            resized,
        };

        info!(
            source = %source.display(),
            dest = %dest.display(),
            "optimized ({:.1}% saved)",
            report.size_reduction()
        );

        Ok(report)
    }

    /// Read and decode an image, sniffing the format from the file content
    ///
    /// Content sniffing (rather than extension dispatch) is what lets the
    /// batch walker decode `photo.jpg.backup` files. A missing or unreadable
    /// file surfaces as a decode failure, same as undecodable content.
    fn decode(&self, path: &Path) -> Result<(DynamicImage, u64)> {
        let bytes = fs::read(path).map_err(|e| WebimizeError::decode(path, e))?;
        let len = bytes.len() as u64;
        let image =
            image::load_from_memory(&bytes).map_err(|e| WebimizeError::decode(path, e))?;
        Ok((image, len))
    }

    fn encode_jpeg(&self, image: &DynamicImage, quality: u8, dest: &Path) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        image
            .write_with_encoder(encoder)
            .map_err(|e| WebimizeError::encode(dest, e))?;
        Ok(buffer)
    }

    /// Write `bytes` to a temp sibling of `dest` and rename it into place
    ///
    /// A failed write (disk full, unwritable destination) is an encode error
    /// naming `dest`; the rename is plain I/O plumbing.
    fn write_atomic(&self, dest: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| WebimizeError::io(parent, e))?;
            }
        }

        let mut temp = dest.to_path_buf().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        if let Err(e) = fs::write(&temp, bytes) {
            let _ = fs::remove_file(&temp);
            return Err(WebimizeError::encode(dest, e));
        }
        if let Err(e) = fs::rename(&temp, dest) {
            let _ = fs::remove_file(&temp);
            return Err(WebimizeError::io(dest, e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 100])
        }));
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn test_optimize_downscales_wide_image() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "wide.png", 1600, 1000);
        let dest = dir.path().join("wide.jpg");

        let report = Optimizer::new()
            .optimize(&source, &dest, &OptimizeOptions::new(400, 85))
            .unwrap();

        assert_eq!(report.original_dimensions, (1600, 1000));
        assert_eq!(report.output_dimensions, (400, 250));
        assert!(report.resized);

        let written = image::open(&dest).unwrap();
        assert_eq!((written.width(), written.height()), (400, 250));
    }

    #[test]
    fn test_optimize_never_upscales() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "small.png", 300, 200);
        let dest = dir.path().join("small.jpg");

        let report = Optimizer::new()
            .optimize(&source, &dest, &OptimizeOptions::new(800, 85))
            .unwrap();

        assert_eq!(report.output_dimensions, (300, 200));
        assert!(!report.resized);
    }

    #[test]
    fn test_optimize_flattens_alpha() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("alpha.png");
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_fn(64, 64, |_, _| {
            Rgba([200, 100, 50, 120])
        }));
        image.save(&source).unwrap();
        let dest = dir.path().join("alpha.jpg");

        Optimizer::new()
            .optimize(&source, &dest, &OptimizeOptions::default())
            .unwrap();

        let written = image::open(&dest).unwrap();
        assert!(!written.color().has_alpha());
    }

    #[test]
    fn test_quality_changes_output_size() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "photo.png", 640, 480);

        let low = Optimizer::new()
            .optimize(
                &source,
                &dir.path().join("low.jpg"),
                &OptimizeOptions::new(800, 40),
            )
            .unwrap();
        let high = Optimizer::new()
            .optimize(
                &source,
                &dir.path().join("high.jpg"),
                &OptimizeOptions::new(800, 95),
            )
            .unwrap();

        assert!(low.bytes_out < high.bytes_out);
    }

    #[test]
    fn test_optimize_in_place() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "photo.png", 1200, 900);

        let report = Optimizer::new()
            .optimize(&source, &source, &OptimizeOptions::new(400, 85))
            .unwrap();

        assert_eq!(report.output_dimensions, (400, 300));
        // JPEG content now lives under the .png name, so sniff the format
        let written = image::load_from_memory(&fs::read(&source).unwrap()).unwrap();
        assert_eq!(written.width(), 400);
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let result = Optimizer::new().optimize(
            &dir.path().join("absent.png"),
            &dir.path().join("out.jpg"),
            &OptimizeOptions::default(),
        );
        assert!(matches!(result, Err(WebimizeError::Decode { .. })));
    }

    #[test]
    fn test_corrupt_source_fails_without_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("garbage.png");
        fs::write(&source, b"not an image at all").unwrap();
        let dest = dir.path().join("out.jpg");

        let result =
            Optimizer::new().optimize(&source, &dest, &OptimizeOptions::default());
        assert!(matches!(result, Err(WebimizeError::Decode { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_unwritable_dest_is_encode_error() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "photo.png", 100, 100);
        // A regular file where the destination directory should be
        let blocker = dir.path().join("blocker.txt");
        fs::write(&blocker, "in the way").unwrap();
        let dest = blocker.join("out.jpg");

        let result =
            Optimizer::new().optimize(&source, &dest, &OptimizeOptions::default());

        let err = result.unwrap_err();
        assert!(matches!(err, WebimizeError::Encode { .. }));
        // The error names the destination, not the temp sibling
        assert_eq!(err.path(), Some(dest.as_path()));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "photo.png", 100, 100);

        let result = Optimizer::new().optimize(
            &source,
            &dir.path().join("out.jpg"),
            &OptimizeOptions::new(800, 0),
        );
        assert!(matches!(result, Err(WebimizeError::InvalidParameters(_))));
    }

    #[test]
    fn test_decode_ignores_extension() {
        let dir = TempDir::new().unwrap();
        // PNG content under a name with no image extension
        let source = dir.path().join("photo.jpg.backup");
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(50, 50, |_, _| {
            Rgb([10, 20, 30])
        }));
        image.save_with_format(&source, image::ImageFormat::Png).unwrap();

        let report = Optimizer::new()
            .optimize(
                &source,
                &dir.path().join("photo.jpg"),
                &OptimizeOptions::default(),
            )
            .unwrap();
        assert_eq!(report.original_dimensions, (50, 50));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "photo.png", 200, 200);
        let dest = dir.path().join("out.jpg");

        Optimizer::new()
            .optimize(&source, &dest, &OptimizeOptions::default())
            .unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::{Rgb, RgbImage};

use crate::error::{EngineError, Result};

/// Error level analysis: re-encode the image at a fixed lossy quality and
/// render the amplified per-pixel difference. Regions that were locally
/// re-compressed (pasted-in edits) compress differently on the second pass
/// and show up brighter; an untouched re-saved image stays uniformly dim.
pub struct ElaGenerator {
    quality: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElaReport {
    /// Largest per-channel difference seen anywhere in the image.
    pub max_difference: u8,
    /// Brightness factor applied to the difference image; 1.0 when the
    /// rasters were pixel-identical.
    pub scale: f64,
    pub mean_difference: f64,
}

impl ElaGenerator {
    pub const DEFAULT_QUALITY: u8 = 90;

    pub fn new() -> Self {
        Self {
            quality: Self::DEFAULT_QUALITY,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Writes the ELA visualization for `image_path` to `output_path`.
    /// The intermediate re-encoded JPEG is written beside the output and
    /// removed unconditionally, including on error paths.
    pub fn generate<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        image_path: P,
        output_path: Q,
    ) -> Result<ElaReport> {
        let output_path = output_path.as_ref();
        let original = image::open(image_path.as_ref())?.to_rgb8();

        let temp = TempArtifact::for_output(output_path);
        self.reencode_to(&original, temp.path())?;
        let recompressed = image::open(temp.path())?.to_rgb8();

        if recompressed.dimensions() != original.dimensions() {
            return Err(EngineError::AnalysisFailed(format!(
                "re-encoded raster is {}x{}, expected {}x{}",
                recompressed.width(),
                recompressed.height(),
                original.width(),
                original.height()
            )));
        }

        let (width, height) = original.dimensions();
        let mut difference = RgbImage::new(width, height);
        let mut max_difference = 0u8;
        let mut sum = 0u64;

        for (x, y, pixel) in original.enumerate_pixels() {
            let recomp = recompressed.get_pixel(x, y);
            let mut channels = [0u8; 3];
            for c in 0..3 {
                let diff = pixel[c].abs_diff(recomp[c]);
                max_difference = max_difference.max(diff);
                sum += diff as u64;
                channels[c] = diff;
            }
            difference.put_pixel(x, y, Rgb(channels));
        }

        let scale = if max_difference == 0 {
            1.0
        } else {
            255.0 / max_difference as f64
        };

        for pixel in difference.pixels_mut() {
            for c in 0..3 {
                pixel[c] = (pixel[c] as f64 * scale).min(255.0) as u8;
            }
        }

        difference.save(output_path)?;

        Ok(ElaReport {
            max_difference,
            scale,
            mean_difference: sum as f64 / (width as f64 * height as f64 * 3.0),
        })
    }

    fn reencode_to(&self, image: &RgbImage, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, self.quality);
        image.write_with_encoder(encoder)?;
        Ok(())
    }
}

impl Default for ElaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the re-encoded artifact on drop so it cannot outlive the call.
struct TempArtifact(PathBuf);

impl TempArtifact {
    fn for_output(output_path: &Path) -> Self {
        let stem = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "ela".to_string());
        let path = output_path.with_file_name(format!("temp_{stem}.jpg"));
        TempArtifact(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(err) = fs::remove_file(&self.0) {
                log::warn!("failed to remove temp artifact {}: {}", self.0.display(), err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save_png(dir: &Path, name: &str, image: &RgbImage) -> PathBuf {
        let path = dir.join(name);
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn flat_image_scales_by_one_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // Solid black survives a JPEG round trip untouched, so the
        // difference raster is all zeros.
        let input = save_png(dir.path(), "flat.png", &RgbImage::new(32, 32));
        let output = dir.path().join("ela_flat.png");

        let report = ElaGenerator::new().generate(&input, &output).unwrap();

        assert_eq!(report.max_difference, 0);
        assert_eq!(report.scale, 1.0);
        assert_eq!(report.mean_difference, 0.0);
        assert!(output.exists());
        assert!(!dir.path().join("temp_ela_flat.jpg").exists());
    }

    #[test]
    fn textured_image_produces_a_difference_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut image = RgbImage::new(64, 64);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8]);
        }
        let input = save_png(dir.path(), "textured.png", &image);
        let output = dir.path().join("ela_textured.png");

        let report = ElaGenerator::new().generate(&input, &output).unwrap();

        assert!(report.max_difference > 0);
        assert!(report.scale >= 1.0);
        assert!(output.exists());
        assert!(!dir.path().join("temp_ela_textured.jpg").exists());
    }

    #[test]
    fn unreadable_input_errors_without_leaking_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("not_an_image.png");
        std::fs::write(&input, b"definitely not pixels").unwrap();
        let output = dir.path().join("ela_broken.png");

        let result = ElaGenerator::new().generate(&input, &output);

        assert!(result.is_err());
        assert!(!output.exists());
        assert!(!dir.path().join("temp_ela_broken.jpg").exists());
    }
}

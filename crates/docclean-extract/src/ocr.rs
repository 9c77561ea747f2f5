//! Image OCR through the tesseract command-line tool

use crate::config::OcrConfig;
use crate::dispatch::Extractor;
use crate::error::ExtractorError;
use image::{GrayImage, ImageFormat, Luma};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Image extractor.
///
/// The image is decoded, converted to grayscale, optionally denoised with a
/// 3x3 median filter, written to a temporary PNG and passed to
/// `tesseract <file> stdout`.
#[derive(Debug, Clone, Default)]
pub struct OcrExtractor {
    config: OcrConfig,
}

impl OcrExtractor {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Whether a tesseract binary can be found
    pub fn is_available(&self) -> bool {
        self.tesseract().is_ok()
    }

    fn tesseract(&self) -> Result<PathBuf, ExtractorError> {
        match &self.config.tesseract_path {
            Some(path) => Ok(path.clone()),
            None => which::which("tesseract").map_err(|e| {
                ExtractorError::Ocr(format!(
                    "tesseract not found on PATH ({e}); install tesseract-ocr or set ocr.tesseract_path"
                ))
            }),
        }
    }

    /// Grayscale and optionally denoise the decoded image
    pub fn preprocess(&self, bytes: &[u8]) -> Result<GrayImage, ExtractorError> {
        let gray = image::load_from_memory(bytes)?.to_luma8();
        Ok(if self.config.denoise {
            median_filter(&gray)
        } else {
            gray
        })
    }

    fn recognize(&self, image: &GrayImage) -> Result<String, ExtractorError> {
        let tesseract = self.tesseract()?;

        // Removed on drop, whatever tesseract does
        let mut file = tempfile::Builder::new()
            .prefix("docclean-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.write_to(&mut file, ImageFormat::Png)?;
        file.flush()?;

        debug!(
            tesseract = %tesseract.display(),
            language = %self.config.language,
            width = image.width(),
            height = image.height(),
            "running tesseract"
        );
        let output = Command::new(&tesseract)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .output()
            .map_err(|e| ExtractorError::Ocr(format!("failed to run {}: {e}", tesseract.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "tesseract failed");
            return Err(ExtractorError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Extractor for OcrExtractor {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractorError> {
        let image = self.preprocess(bytes)?;
        let text = self.recognize(&image)?;
        debug!(chars = text.len(), "ocr text extracted");
        Ok(text)
    }
}

/// 3x3 median filter; edge pixels reuse their nearest neighbours
pub fn median_filter(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    GrayImage::from_fn(width, height, |x, y| {
        let mut window = [0u8; 9];
        let mut i = 0;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                let ny = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                window[i] = image.get_pixel(nx, ny)[0];
                i += 1;
            }
        }
        window.sort_unstable();
        Luma([window[4]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(image: &GrayImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_median_removes_salt_noise() {
        let mut image = GrayImage::from_pixel(5, 5, Luma([10]));
        image.put_pixel(2, 2, Luma([255]));
        let filtered = median_filter(&image);
        assert_eq!(filtered.get_pixel(2, 2)[0], 10);
        assert_eq!(filtered.dimensions(), (5, 5));
    }

    #[test]
    fn test_median_keeps_edges() {
        // left half black, right half white
        let image = GrayImage::from_fn(6, 4, |x, _| Luma([if x < 3 { 0 } else { 255 }]));
        let filtered = median_filter(&image);
        assert_eq!(filtered, image);
    }

    #[test]
    fn test_median_single_pixel() {
        let image = GrayImage::from_pixel(1, 1, Luma([42]));
        assert_eq!(median_filter(&image).get_pixel(0, 0)[0], 42);
    }

    #[test]
    fn test_preprocess_grayscale() {
        let rgb = image::RgbImage::from_pixel(3, 3, image::Rgb([255, 0, 0]));
        let mut buf = Cursor::new(Vec::new());
        rgb.write_to(&mut buf, ImageFormat::Png).unwrap();

        let gray = OcrExtractor::default().preprocess(buf.get_ref()).unwrap();
        assert_eq!(gray.dimensions(), (3, 3));
        let value = gray.get_pixel(1, 1)[0];
        assert!(value > 0 && value < 255);
    }

    #[test]
    fn test_invalid_image() {
        let err = OcrExtractor::default().extract(b"not a png").unwrap_err();
        assert!(matches!(err, ExtractorError::Image(_)));
    }

    #[test]
    fn test_missing_tesseract_binary() {
        let extractor = OcrExtractor::new(
            OcrConfig::default().with_tesseract_path("/nonexistent/bin/tesseract"),
        );
        let bytes = png_bytes(&GrayImage::from_pixel(4, 4, Luma([200])));
        let err = extractor.extract(&bytes).unwrap_err();
        assert!(matches!(err, ExtractorError::Ocr(_)));
    }
}

//! Extractor configuration

use crate::error::{ExtractError, Result};
use docclean_guard::GuardConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for extraction and the sanitize step that follows it.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// max_length = 5_000_000
///
/// [ocr]
/// language = "deu"
///
/// [guard.injection]
/// custom_patterns = ['developer\s+mode']
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input document size in bytes
    pub max_length: usize,

    /// How many times `max_length` a decompressed container part may grow to
    pub max_expansion: usize,

    /// Whether extracted text goes through the sanitizer
    pub sanitize: bool,

    /// OCR settings for image input
    pub ocr: OcrConfig,

    /// Sanitizer settings
    pub guard: GuardConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_length: 50 * 1024 * 1024,
            max_expansion: 20,
            sanitize: true,
            ocr: OcrConfig::default(),
            guard: GuardConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Set the input size limit
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the decompression ratio cap
    pub fn with_max_expansion(mut self, max_expansion: usize) -> Self {
        self.max_expansion = max_expansion;
        self
    }

    /// Byte cap for any single part read out of a compressed container
    pub fn max_part_bytes(&self) -> u64 {
        self.max_length.saturating_mul(self.max_expansion) as u64
    }

    /// Enable or disable sanitization
    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    pub fn with_ocr(mut self, ocr: OcrConfig) -> Self {
        self.ocr = ocr;
        self
    }

    pub fn with_guard(mut self, guard: GuardConfig) -> Self {
        self.guard = guard;
        self
    }
}

/// OCR settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Explicit tesseract binary; looked up on `PATH` when unset
    pub tesseract_path: Option<PathBuf>,

    /// Tesseract language code
    pub language: String,

    /// Apply a 3x3 median filter before recognition
    pub denoise: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            language: "eng".to_string(),
            denoise: true,
        }
    }
}

impl OcrConfig {
    pub fn with_tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tesseract_path = Some(path.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert!(config.sanitize);
        assert_eq!(config.ocr.language, "eng");
        assert!(config.ocr.denoise);
        assert!(config.guard.injection.custom_patterns.is_empty());
    }

    #[test]
    fn test_partial_toml() {
        let config = ExtractorConfig::from_toml_str(
            r#"
            sanitize = false

            [ocr]
            language = "deu"

            [guard.injection]
            custom_patterns = ['developer\s+mode']
            "#,
        )
        .unwrap();

        assert!(!config.sanitize);
        assert_eq!(config.ocr.language, "deu");
        assert!(config.ocr.denoise);
        assert_eq!(config.guard.injection.custom_patterns, vec![r"developer\s+mode"]);
        assert_eq!(config.max_length, ExtractorConfig::default().max_length);
    }

    #[test]
    fn test_bad_toml() {
        let err = ExtractorConfig::from_toml_str("sanitize = \"yes\"").unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ExtractorConfig::load("/nonexistent/docclean.toml").unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[test]
    fn test_builders() {
        let config = ExtractorConfig::default()
            .with_max_length(10)
            .with_max_expansion(4)
            .with_sanitize(false)
            .with_ocr(OcrConfig::default().with_language("fra").with_tesseract_path("/opt/tess"));
        assert_eq!(config.max_length, 10);
        assert_eq!(config.max_part_bytes(), 40);
        assert!(!config.sanitize);
        assert_eq!(config.ocr.language, "fra");
        assert_eq!(config.ocr.tesseract_path, Some(PathBuf::from("/opt/tess")));
    }
}

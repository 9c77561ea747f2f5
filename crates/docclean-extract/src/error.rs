//! Error types for document extraction

use crate::format::FormatTag;
use docclean_guard::GuardError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Why a file name did not map to a supported format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The name has no extension at all
    MissingExtension,
    /// The extension is not one we know
    Unrecognized,
    /// A known format that is deliberately not handled
    LegacyFormat { hint: &'static str },
}

impl std::fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnsupportedReason::MissingExtension => write!(f, "file name has no extension"),
            UnsupportedReason::Unrecognized => write!(f, "unrecognized extension"),
            UnsupportedReason::LegacyFormat { hint } => {
                write!(f, "legacy format is not supported; {hint}")
            }
        }
    }
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    /// File name does not map to a supported format
    #[error("Unsupported format for `{filename}` (extension: {}): {reason}", .extension.as_deref().unwrap_or("none"))]
    UnsupportedFormat {
        filename: String,
        extension: Option<String>,
        reason: UnsupportedReason,
    },

    /// The format-specific extractor rejected the content
    #[error("Failed to extract {format} text from `{filename}`: {source}")]
    ExtractionFailure {
        filename: String,
        format: FormatTag,
        #[source]
        source: ExtractorError,
    },

    /// Caller passed something the dispatcher cannot work with
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Content too large
    #[error("Content too large: {size} bytes exceeds max {max} bytes")]
    ContentTooLarge { size: usize, max: usize },

    /// Reading the source file failed
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sanitizer error
    #[error("Sanitizer error: {0}")]
    Guard(GuardError),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ExtractError {
    /// Whether the failure is about the format rather than the content
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ExtractError::UnsupportedFormat { .. })
    }
}

impl From<GuardError> for ExtractError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::InputTooLarge { size, max } => ExtractError::ContentTooLarge { size, max },
            other => ExtractError::Guard(other),
        }
    }
}

impl From<toml::de::Error> for ExtractError {
    fn from(err: toml::de::Error) -> Self {
        ExtractError::Config(err.to_string())
    }
}

/// Failure raised by a single format extractor.
///
/// The dispatcher wraps it in [`ExtractError::ExtractionFailure`] together
/// with the file name and format.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// PDF parse error
    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// DOCX container error
    #[cfg(feature = "docx")]
    #[error("DOCX archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Decompressed container part over its size cap
    #[cfg(feature = "docx")]
    #[error("{part} expands past {max} bytes")]
    PartTooLarge { part: &'static str, max: u64 },

    /// Malformed XML inside a container
    #[error("XML error: {0}")]
    Xml(String),

    /// Image decode or encode error
    #[cfg(feature = "ocr")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// OCR engine unavailable or failed
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Document is encrypted
    #[error("document is encrypted")]
    Encrypted,

    /// Extractor for this format was not compiled in
    #[error("{0} support is not enabled in this build")]
    Unavailable(FormatTag),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

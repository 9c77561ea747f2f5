//! Format tags derived from file names

use crate::error::UnsupportedReason;
use serde::{Deserialize, Serialize};

/// Closed set of document formats, derived from the file extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Pdf,
    Docx,
    Html,
    Image,
    Unsupported,
}

/// Extensions that are recognized but deliberately not handled
const LEGACY_EXTENSIONS: &[(&str, &str)] = &[("doc", "convert .doc (binary Word) files to .docx")];

impl FormatTag {
    /// Every tag that has an extractor
    pub const SUPPORTED: [FormatTag; 4] = [
        FormatTag::Pdf,
        FormatTag::Docx,
        FormatTag::Html,
        FormatTag::Image,
    ];

    /// Map an extension (without the dot, any case) to a tag
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => FormatTag::Pdf,
            "docx" => FormatTag::Docx,
            "html" | "htm" => FormatTag::Html,
            "png" => FormatTag::Image,
            _ => FormatTag::Unsupported,
        }
    }

    /// Map a file name or path to a tag
    pub fn from_filename(filename: &str) -> Self {
        extension_of(filename)
            .map(|ext| Self::from_extension(&ext))
            .unwrap_or(FormatTag::Unsupported)
    }

    /// Whether an extractor exists for this tag
    pub fn is_supported(self) -> bool {
        !matches!(self, FormatTag::Unsupported)
    }

    /// MIME type for supported tags
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            FormatTag::Pdf => Some("application/pdf"),
            FormatTag::Docx => {
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            }
            FormatTag::Html => Some("text/html"),
            FormatTag::Image => Some("image/png"),
            FormatTag::Unsupported => None,
        }
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatTag::Pdf => write!(f, "PDF"),
            FormatTag::Docx => write!(f, "DOCX"),
            FormatTag::Html => write!(f, "HTML"),
            FormatTag::Image => write!(f, "image"),
            FormatTag::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Lowercased extension of the last path component.
///
/// `None` when the name has no `.`, ends with `.`, or is a dotfile such as
/// `.pdf`.
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Why `filename` is not supported
pub fn unsupported_reason(filename: &str) -> UnsupportedReason {
    match extension_of(filename) {
        None => UnsupportedReason::MissingExtension,
        Some(ext) => LEGACY_EXTENSIONS
            .iter()
            .find(|(legacy, _)| *legacy == ext)
            .map(|(_, hint)| UnsupportedReason::LegacyFormat { hint })
            .unwrap_or(UnsupportedReason::Unrecognized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_table() {
        assert_eq!(FormatTag::from_filename("a.pdf"), FormatTag::Pdf);
        assert_eq!(FormatTag::from_filename("a.docx"), FormatTag::Docx);
        assert_eq!(FormatTag::from_filename("a.html"), FormatTag::Html);
        assert_eq!(FormatTag::from_filename("a.htm"), FormatTag::Html);
        assert_eq!(FormatTag::from_filename("a.png"), FormatTag::Image);
        assert_eq!(FormatTag::from_filename("a.jpg"), FormatTag::Unsupported);
        assert_eq!(FormatTag::from_filename("a.doc"), FormatTag::Unsupported);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(FormatTag::from_filename("REPORT.PDF"), FormatTag::Pdf);
        assert_eq!(FormatTag::from_filename("Page.HtMl"), FormatTag::Html);
    }

    #[test]
    fn test_last_segment_wins() {
        assert_eq!(FormatTag::from_filename("archive.pdf.docx"), FormatTag::Docx);
        assert_eq!(FormatTag::from_filename("notes.docx.bak"), FormatTag::Unsupported);
    }

    #[test]
    fn test_paths() {
        assert_eq!(FormatTag::from_filename("/tmp/v1.2/report.pdf"), FormatTag::Pdf);
        assert_eq!(FormatTag::from_filename("dir.pdf/README"), FormatTag::Unsupported);
        assert_eq!(FormatTag::from_filename(r"C:\docs\scan.png"), FormatTag::Image);
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of(".pdf"), None);
        assert_eq!(FormatTag::from_filename(".pdf"), FormatTag::Unsupported);
    }

    #[test]
    fn test_unsupported_reasons() {
        assert_eq!(unsupported_reason("README"), UnsupportedReason::MissingExtension);
        assert_eq!(unsupported_reason("report.xyz"), UnsupportedReason::Unrecognized);
        assert!(matches!(
            unsupported_reason("report.DOC"),
            UnsupportedReason::LegacyFormat { .. }
        ));
    }

    #[test]
    fn test_content_types() {
        for tag in FormatTag::SUPPORTED {
            assert!(tag.is_supported());
            assert!(tag.content_type().is_some());
        }
        assert_eq!(FormatTag::Unsupported.content_type(), None);
    }
}

//! Extraction result types

use crate::format::FormatTag;
use docclean_guard::SanitizeReport;
use serde::{Deserialize, Serialize};

/// Result of extracting (and usually sanitizing) one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResult {
    /// The extracted text, sanitized unless sanitization was disabled
    pub text: String,

    /// File name the format was detected from
    pub source: String,

    /// Detected format
    pub format: FormatTag,

    /// MIME type of the source document
    pub content_type: Option<String>,

    /// Input document size in bytes
    pub original_length: usize,

    /// Length of `text` in bytes
    pub text_length: usize,

    /// Whether `text` went through the sanitizer
    pub sanitized: bool,

    /// What the sanitizer did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitization: Option<SanitizationInfo>,
}

/// Summary of the sanitizer's work on one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizationInfo {
    pub non_ascii_dropped: usize,
    pub chars_escaped: usize,
    pub sql_spans_stripped: usize,
    pub injections_redacted: usize,
    /// Injection rules that fired
    pub injection_rules: Vec<String>,
}

impl From<&SanitizeReport> for SanitizationInfo {
    fn from(report: &SanitizeReport) -> Self {
        Self {
            non_ascii_dropped: report.non_ascii_dropped,
            chars_escaped: report.chars_escaped,
            sql_spans_stripped: report.sql_spans_stripped,
            injections_redacted: report.injections_redacted,
            injection_rules: report.injection_rules.clone(),
        }
    }
}

impl SanitizationInfo {
    /// Whether any injection span was redacted
    pub fn injection_detected(&self) -> bool {
        self.injections_redacted > 0
    }
}

impl ExtractResult {
    /// Create a result for raw extracted text
    pub fn new(text: String, source: impl Into<String>, format: FormatTag) -> Self {
        let text_length = text.len();
        Self {
            text,
            source: source.into(),
            format,
            content_type: format.content_type().map(str::to_string),
            original_length: 0,
            text_length,
            sanitized: false,
            sanitization: None,
        }
    }

    /// Set the original length
    pub fn with_original_length(mut self, length: usize) -> Self {
        self.original_length = length;
        self
    }

    /// Replace the text with the sanitizer's output
    pub fn with_sanitization(mut self, report: SanitizeReport) -> Self {
        self.sanitization = Some(SanitizationInfo::from(&report));
        self.text = report.text;
        self.text_length = self.text.len();
        self.sanitized = true;
        self
    }

    /// Whether the sanitizer had to redact an injection attempt
    pub fn injection_detected(&self) -> bool {
        self.sanitization
            .as_ref()
            .is_some_and(SanitizationInfo::injection_detected)
    }

    /// Get a truncated version of the text, on a character boundary
    pub fn truncate(&self, max_chars: usize) -> String {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.text[..idx]),
            None => self.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_content_type() {
        let result = ExtractResult::new("hi".to_string(), "a.pdf", FormatTag::Pdf);
        assert_eq!(result.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(result.text_length, 2);
        assert!(!result.sanitized);
    }

    #[test]
    fn test_with_sanitization() {
        let report = SanitizeReport {
            text: "[REDACTED]".to_string(),
            injections_redacted: 1,
            injection_rules: vec!["repeat_after_me".to_string()],
            ..Default::default()
        };
        let result = ExtractResult::new("repeat after me: x".to_string(), "a.html", FormatTag::Html)
            .with_sanitization(report);

        assert_eq!(result.text, "[REDACTED]");
        assert_eq!(result.text_length, 10);
        assert!(result.sanitized);
        assert!(result.injection_detected());
    }

    #[test]
    fn test_json_shape() {
        let result = ExtractResult::new("x".to_string(), "a.htm", FormatTag::Html).with_original_length(9);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["format"], "html");
        assert_eq!(json["original_length"], 9);
        assert!(json.get("sanitization").is_none());
    }

    #[test]
    fn test_truncate() {
        let result = ExtractResult::new("abcdef".to_string(), "a.html", FormatTag::Html);
        assert_eq!(result.truncate(3), "abc...");
        assert_eq!(result.truncate(10), "abcdef");
    }
}

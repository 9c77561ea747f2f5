//! Core types for docclean-guard

use serde::{Deserialize, Serialize};

/// Sanitized text plus what each stage did to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeReport {
    /// The fully sanitized text
    pub text: String,
    /// Decomposed code points dropped by ASCII folding
    pub non_ascii_dropped: usize,
    /// Characters rewritten to entities
    pub chars_escaped: usize,
    /// Spans removed by the risk filter
    pub sql_spans_stripped: usize,
    /// Spans replaced with the redaction marker
    pub injections_redacted: usize,
    /// Names of the injection rules that fired, in firing order
    pub injection_rules: Vec<String>,
}

impl SanitizeReport {
    /// Whether any stage changed the text
    pub fn is_modified(&self) -> bool {
        self.non_ascii_dropped > 0
            || self.chars_escaped > 0
            || self.sql_spans_stripped > 0
            || self.injections_redacted > 0
    }

    /// Whether stage 4 found anything to redact
    pub fn injection_detected(&self) -> bool {
        self.injections_redacted > 0
    }
}

/// Result of injection detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionResult {
    /// Whether any rule matched
    pub detected: bool,
    /// Every match, ordered by position
    pub patterns: Vec<DetectedPattern>,
}

/// A detected injection pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPattern {
    /// Name of the rule that matched
    pub rule: String,
    /// Byte offset of the match
    pub position: usize,
    /// Matched text
    pub matched: String,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Hash of the input
    pub content_hash: String,
    /// Input length in bytes
    pub input_bytes: usize,
    /// Output length in bytes
    pub output_bytes: usize,
    /// Spans removed by the risk filter
    pub sql_spans_stripped: usize,
    /// Spans redacted as injections
    pub injections_redacted: usize,
    /// Processing time in microseconds
    pub processing_time_us: u64,
}

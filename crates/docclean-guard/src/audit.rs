//! Audit logging for the sanitizer

use crate::config::AuditConfig;
use crate::types::{AuditEntry, SanitizeReport};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use tracing::info;

/// Audit logger
pub struct AuditLogger {
    config: AuditConfig,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    /// Log a sanitization event
    pub fn log(&self, input: &str, report: &SanitizeReport, elapsed: Duration) {
        if !self.config.enabled {
            return;
        }

        let entry = AuditEntry {
            content_hash: hash_content(input),
            input_bytes: input.len(),
            output_bytes: report.text.len(),
            sql_spans_stripped: report.sql_spans_stripped,
            injections_redacted: report.injections_redacted,
            processing_time_us: elapsed.as_micros() as u64,
        };

        let content_field = if self.config.log_content {
            Some(truncate(input, 500))
        } else {
            None
        };

        info!(
            content_hash = %entry.content_hash,
            input_bytes = entry.input_bytes,
            output_bytes = entry.output_bytes,
            sql_spans_stripped = entry.sql_spans_stripped,
            injections_redacted = entry.injections_redacted,
            injection_rules = ?report.injection_rules,
            processing_time_us = entry.processing_time_us,
            content = ?content_field,
            "sanitize audit"
        );
    }
}

/// Hash content for audit (privacy-preserving)
fn hash_content(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Truncate string for logging, on a character boundary
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

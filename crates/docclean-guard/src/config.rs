//! Configuration for docclean-guard

use serde::{Deserialize, Serialize};

/// Default input budget for [`Sanitizer::try_sanitize`](crate::Sanitizer::try_sanitize): 10 MiB
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Main configuration for the sanitizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Largest input, in bytes, accepted by the checked entry points
    pub max_input_bytes: usize,
    /// Injection detection configuration
    pub injection: InjectionConfig,
    /// Audit configuration
    pub audit: AuditConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            injection: InjectionConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Set the input budget
    pub fn with_max_input_bytes(mut self, max: usize) -> Self {
        self.max_input_bytes = max;
        self
    }

    /// Add an extra injection pattern
    pub fn with_custom_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.injection.custom_patterns.push(pattern.into());
        self
    }

    /// Configure audit logging
    pub fn with_audit(mut self, audit: AuditConfig) -> Self {
        self.audit = audit;
        self
    }
}

/// Injection detection configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Extra case-insensitive regexes redacted after the built-in rules
    pub custom_patterns: Vec<String>,
}

/// Audit logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Enable audit logging
    pub enabled: bool,
    /// Log (truncated) content instead of just its hash
    pub log_content: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_content: false, // Privacy by default
        }
    }
}

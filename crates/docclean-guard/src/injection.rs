//! Prompt injection and jailbreak detection (pipeline stage 4)

use crate::config::InjectionConfig;
use crate::error::{GuardError, Result};
use crate::normalize::entity_spans;
use crate::rules::{PatternRule, RuleMode};
use crate::types::{DetectedPattern, InjectionResult};
use once_cell::sync::Lazy;
use std::ops::Range;

/// Literal that replaces every injection match
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Canonical jailbreak and instruction-override phrasings.
///
/// `.` does not cross newlines, so every rule is line-local. None of the
/// patterns matches [`REDACTION_MARKER`], and every possible match is longer
/// than it, so repeated redaction always terminates.
pub static PROMPT_INJECTION_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::builtin(
            "ignore_previous",
            r"(?i)(ignore.*(previous|above|prior).*(instruction|content|text))",
            RuleMode::Redact,
        ),
        PatternRule::builtin(
            "disregard_rules",
            r"(?i)(disregard.*(rules|guidelines|prior))",
            RuleMode::Redact,
        ),
        PatternRule::builtin(
            "language_model_persona",
            r"(?i)(you are an? .* language model)",
            RuleMode::Redact,
        ),
        PatternRule::builtin(
            "repeat_after_me",
            r"(?i)(repeat after me:.*)",
            RuleMode::Redact,
        ),
        PatternRule::builtin(
            "act_as_expert",
            r"(?i)(act as an? .* expert)",
            RuleMode::Redact,
        ),
        PatternRule::builtin(
            "override_instruction",
            r"(?i)(override.*instruction)",
            RuleMode::Redact,
        ),
        PatternRule::builtin(
            "fabricated_experience",
            r"(?i)(hallucinate|make up|pretend).*experience",
            RuleMode::Redact,
        ),
    ]
});

/// Prompt injection detector and neutralizer
///
/// Holds the built-in table plus any custom patterns from
/// [`InjectionConfig`]. Detection, redaction and [`is_safe`](Self::is_safe)
/// all iterate the same rule list.
pub struct InjectionDetector {
    custom: Vec<PatternRule>,
}

impl Default for InjectionDetector {
    fn default() -> Self {
        Self { custom: Vec::new() }
    }
}

impl InjectionDetector {
    /// Create a detector, compiling the configured custom patterns
    pub fn new(config: &InjectionConfig) -> Result<Self> {
        let mut custom = Vec::with_capacity(config.custom_patterns.len());
        for (idx, pattern) in config.custom_patterns.iter().enumerate() {
            let rule = PatternRule::custom(format!("custom_{idx}"), pattern, RuleMode::Redact)?;
            if rule.is_match(REDACTION_MARKER) {
                return Err(GuardError::ConfigError(format!(
                    "custom injection pattern `{pattern}` matches the redaction marker {REDACTION_MARKER}"
                )));
            }
            custom.push(rule);
        }
        Ok(Self { custom })
    }

    /// Built-in rules followed by custom rules
    pub fn rules(&self) -> impl Iterator<Item = &PatternRule> {
        PROMPT_INJECTION_RULES.iter().chain(self.custom.iter())
    }

    /// Whether no rule matches `text`
    pub fn is_safe(&self, text: &str) -> bool {
        !self.rules().any(|rule| rule.is_match(text))
    }

    /// Report every match without modifying the text
    pub fn detect(&self, text: &str) -> InjectionResult {
        let mut patterns = vec![];
        for rule in self.rules() {
            for m in rule.regex().find_iter(text) {
                patterns.push(DetectedPattern {
                    rule: rule.name().to_string(),
                    position: m.start(),
                    matched: m.as_str().to_string(),
                });
            }
        }
        patterns.sort_by_key(|p| p.position);

        InjectionResult {
            detected: !patterns.is_empty(),
            patterns,
        }
    }

    /// Replace every match with [`REDACTION_MARKER`], rules in order.
    ///
    /// A match that ends or starts inside an escaped entity is widened to
    /// cover the whole entity, so redaction never leaves a bare `&`.
    ///
    /// Returns the text, the number of spans redacted and the names of the
    /// rules that fired.
    pub fn neutralize(&self, text: &str) -> (String, usize, Vec<String>) {
        let mut current = text.to_string();
        let mut redacted = 0usize;
        let mut fired = vec![];
        for rule in self.rules() {
            let (next, count) = redact(rule, &current);
            if count > 0 {
                tracing::warn!(rule = rule.name(), count, "redacted prompt injection");
                fired.push(rule.name().to_string());
            }
            redacted += count;
            current = next;
        }
        (current, redacted, fired)
    }
}

fn redact(rule: &PatternRule, text: &str) -> (String, usize) {
    let entities = entity_spans(text);
    let mut spans: Vec<Range<usize>> = vec![];
    for m in rule.regex().find_iter(text) {
        let mut span = m.range();
        for entity in &entities {
            if entity.start < span.end && span.start < entity.end {
                span.start = span.start.min(entity.start);
                span.end = span.end.max(entity.end);
            }
        }
        match spans.last_mut() {
            // two matches inside one entity collapse into a single span
            Some(last) if span.start < last.end => last.end = last.end.max(span.end),
            _ => spans.push(span),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in &spans {
        out.push_str(&text[cursor..span.start]);
        out.push_str(REDACTION_MARKER);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    (out, spans.len())
}

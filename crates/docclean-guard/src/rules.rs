//! Compiled pattern rules shared by the SQL and injection stages

use crate::error::{GuardError, Result};
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Upper bound on the compiled program size of a single rule.
///
/// The regex engine already matches in linear time; this keeps a
/// user-supplied pattern from blowing up memory at compile time.
pub const RULE_SIZE_LIMIT: usize = 1 << 20;

/// Capture group name whose text survives a [`RuleMode::Strip`] match
pub const KEEP_GROUP: &str = "keep";

/// What happens to the text a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleMode {
    /// Delete the matched span
    Strip,
    /// Replace the matched span with the redaction marker
    Redact,
}

/// A named, compiled pattern with its rewrite mode
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    regex: Regex,
    mode: RuleMode,
}

impl PatternRule {
    /// Compile a rule. Case sensitivity is controlled by the pattern itself.
    pub fn new(name: impl Into<String>, pattern: &str, mode: RuleMode) -> Result<Self> {
        Self::build(name.into(), pattern, mode, false)
    }

    /// Compile a user-supplied rule; matching is always case-insensitive.
    pub fn custom(name: impl Into<String>, pattern: &str, mode: RuleMode) -> Result<Self> {
        Self::build(name.into(), pattern, mode, true)
    }

    pub(crate) fn builtin(name: &'static str, pattern: &'static str, mode: RuleMode) -> Self {
        Self::build(name.to_string(), pattern, mode, false)
            .unwrap_or_else(|e| panic!("built-in rule `{name}` must compile: {e}"))
    }

    fn build(name: String, pattern: &str, mode: RuleMode, case_insensitive: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .size_limit(RULE_SIZE_LIMIT)
            .build()
            .map_err(|source| GuardError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self { name, regex, mode })
    }

    /// Rule name used in reports and logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rewrite mode
    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    /// The compiled pattern
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether the rule matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Rewrite every match in `text`, returning the new text and the number
    /// of spans rewritten.
    ///
    /// `Strip` deletes the match, except for the text of a `keep` group when
    /// the pattern has one; a match consisting only of kept text is not
    /// counted. `Redact` replaces the whole match with `marker`.
    pub fn apply(&self, text: &str, marker: &str) -> (String, usize) {
        let mut count = 0usize;
        let rewritten = self.regex.replace_all(text, |caps: &Captures<'_>| match self.mode {
            RuleMode::Strip => match caps.name(KEEP_GROUP) {
                Some(kept) => kept.as_str().to_string(),
                None => {
                    count += 1;
                    String::new()
                }
            },
            RuleMode::Redact => {
                count += 1;
                marker.to_string()
            }
        });
        (rewritten.into_owned(), count)
    }
}

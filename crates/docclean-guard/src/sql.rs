//! SQL-injection risk stripping (pipeline stage 3)
//!
//! The built-in filter is a deliberately blunt heuristic: a SQL keyword
//! followed by whitespace deletes everything after it up to the end of the
//! line, including ordinary English uses of "or" and "and". Callers that need
//! something smarter plug in their own [`RiskFilter`].

use crate::rules::{PatternRule, RuleMode};
use once_cell::sync::Lazy;

/// SQL risk rules, applied in order; each sees the output of the previous one.
///
/// The terminator rule carries a `keep` group for the entities produced by
/// markup escaping, so their `#` and `;` are not mistaken for SQL tokens.
pub static SQL_RISK_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::builtin(
            "sql_keyword_tail",
            r"(?i)(\b(SELECT|INSERT|DELETE|UPDATE|DROP|UNION|OR|AND)\b\s+.+)",
            RuleMode::Strip,
        ),
        PatternRule::builtin(
            "sql_comment_or_terminator",
            r"(?P<keep>&(?:amp|lt|gt|quot|#x27);)|--|#|/\*|\*/|;",
            RuleMode::Strip,
        ),
        PatternRule::builtin(
            "sql_where_clause",
            r"(?i)(\bWHERE\b\s+.+)",
            RuleMode::Strip,
        ),
    ]
});

/// Stage-3 seam: removes spans that look like SQL injection.
pub trait RiskFilter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Remove risky spans, returning the filtered text and the number of
    /// spans removed.
    fn strip(&self, text: &str) -> (String, usize);
}

/// Regex-table implementation of [`RiskFilter`] over [`SQL_RISK_RULES`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlPatternFilter;

impl SqlPatternFilter {
    /// Create the built-in filter
    pub fn new() -> Self {
        Self
    }
}

impl RiskFilter for SqlPatternFilter {
    fn name(&self) -> &str {
        "sql-patterns"
    }

    fn strip(&self, text: &str) -> (String, usize) {
        let mut current = text.to_string();
        let mut removed = 0usize;
        for rule in SQL_RISK_RULES.iter() {
            let (next, count) = rule.apply(&current, "");
            if count > 0 {
                tracing::debug!(rule = rule.name(), count, "stripped SQL risk spans");
            }
            removed += count;
            current = next;
        }
        (current, removed)
    }
}

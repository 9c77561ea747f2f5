//! Error types for docclean-guard

use thiserror::Error;

/// Result type alias for guard operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Guard error types
///
/// The sanitization stages themselves never fail. Errors only come from
/// building a [`Sanitizer`](crate::Sanitizer) out of a bad configuration or
/// from the input-size budget enforced by
/// [`Sanitizer::try_sanitize`](crate::Sanitizer::try_sanitize).
#[derive(Debug, Error)]
pub enum GuardError {
    /// A rule pattern failed to compile
    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Input exceeds the configured byte budget
    #[error("Input too large: {size} bytes exceeds max {max} bytes")]
    InputTooLarge { size: usize, max: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

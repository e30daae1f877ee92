//! Error types for grammar construction and parsing
//!
//! Malformed Clojure never produces an error: the grammar turns anything it
//! cannot model into `error` leaves. The only failures are configuration
//! mistakes in the grammar itself.

use thiserror::Error;

/// Fatal grammar configuration error
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A by-name reference (or explicit lookup) names a rule that was never registered
    #[error("Could not find parser: {name}")]
    UnknownRule { name: String },

    /// A regex terminal whose pattern does not compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl GrammarError {
    /// Create an unknown rule error
    pub fn unknown_rule(name: impl Into<String>) -> Self {
        Self::UnknownRule { name: name.into() }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

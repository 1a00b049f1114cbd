//! Error types for history formatting

use thiserror::Error;

/// Failure of an entity lookup backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Backend could not be reached
    #[error("entity store unavailable: {0}")]
    Unavailable(String),

    /// Backend rejected or failed the query
    #[error("entity lookup failed: {0}")]
    Backend(String),
}

/// Errors that can occur while formatting a history
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Lookup failed under the propagate policy
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Reference resolution exceeded its time budget
    #[error("reference resolution timed out after {millis}ms")]
    Timeout {
        /// Configured budget
        millis: u64,
    },

    /// Caller abandoned the formatting
    #[error("formatting cancelled")]
    Cancelled,
}

/// A configured date, date-time or time pattern chrono cannot render
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {setting} pattern: {pattern:?}")]
pub struct InvalidPattern {
    /// Configuration key holding the pattern
    pub setting: &'static str,
    /// Rejected pattern
    pub pattern: String,
}

impl FormatError {
    /// Check if the error stems from a timeout or cancellation rather than
    /// a backend failure
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_predicate() {
        assert!(FormatError::Cancelled.is_cancellation());
        assert!(FormatError::Timeout { millis: 5 }.is_cancellation());
        assert!(!FormatError::from(LookupError::Backend("x".into())).is_cancellation());
    }

    #[test]
    fn messages() {
        let err = FormatError::Timeout { millis: 250 };
        assert_eq!(err.to_string(), "reference resolution timed out after 250ms");
        let err = FormatError::from(LookupError::Unavailable("db down".into()));
        assert_eq!(err.to_string(), "entity store unavailable: db down");
        let err = InvalidPattern {
            setting: "date_format",
            pattern: "%Q".into(),
        };
        assert_eq!(err.to_string(), r#"invalid date_format pattern: "%Q""#);
    }
}

//! Error types for Formhist Core

use formhist_format::FormatError;
use formhist_schema::SchemaError;

/// Main history error type
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Form definition is malformed
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Formatting did not complete
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl HistoryError {
    /// Check if the form definition itself is at fault
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Check if the history was abandoned by timeout or cancellation
    #[inline]
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Format(err) if err.is_cancellation())
    }
}

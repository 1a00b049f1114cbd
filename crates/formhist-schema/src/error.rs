//! Error types for schema extraction

/// Structural errors in a form definition
///
/// Extraction fails on the first one; no partial schema is returned because
/// every later stage indexes fields by name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A question has no data key
    #[error("please add a value name to all questions, inside the data tab")]
    MissingValueName,

    /// A reference question has no related name
    #[error("missing related name for reference question '{0}'")]
    MissingRelatedField(String),

    /// Two questions share the same data key
    #[error("duplicated value name '{0}': please provide different value names for all questions")]
    DuplicateValueName(String),
}

impl SchemaError {
    /// Field name involved in the error, if any
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingValueName => None,
            Self::MissingRelatedField(name) | Self::DuplicateValueName(name) => Some(name),
        }
    }
}

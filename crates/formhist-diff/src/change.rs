//! Changes and changesets
//!
//! A [`Change`] is one field-level delta between two snapshots. A
//! [`Changeset`] groups the changes of one transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Classification of a field delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Field gained a value
    Add,
    /// Field value changed
    Modify,
    /// Field value was cleared
    Remove,
}

impl ChangeKind {
    /// Translation key of the display text for this kind
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-level delta
///
/// # Invariants
/// - `add` carries only `new`, `remove` carries only `old`
/// - `modify` always carries `old`; `new` is absent when the field was dropped
/// - `old` and `new` are never both absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Delta classification
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Data key
    pub field: String,
    /// Label shown to users; the data key until formatted
    pub display_name: String,
    /// Translated text of `kind`, set when formatted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    /// Value before the transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
    /// Value after the transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
}

impl Change {
    /// Field gained `new`
    #[inline]
    #[must_use]
    pub fn add(field: impl Into<String>, new: Value) -> Self {
        Self::build(ChangeKind::Add, field.into(), None, Some(new))
    }

    /// Field changed from `old`, to `new` if it still has a value
    #[inline]
    #[must_use]
    pub fn modify(field: impl Into<String>, old: Value, new: Option<Value>) -> Self {
        Self::build(ChangeKind::Modify, field.into(), Some(old), new)
    }

    /// Field was cleared
    #[inline]
    #[must_use]
    pub fn remove(field: impl Into<String>, old: Value) -> Self {
        Self::build(ChangeKind::Remove, field.into(), Some(old), None)
    }

    fn build(kind: ChangeKind, field: String, old: Option<Value>, new: Option<Value>) -> Self {
        Self {
            kind,
            display_name: field.clone(),
            field,
            display_type: None,
            old,
            new,
        }
    }

    /// Copy of this change carrying display values
    #[must_use]
    pub fn with_display(
        &self,
        display_name: impl Into<String>,
        display_type: impl Into<String>,
        old: Option<Value>,
        new: Option<Value>,
    ) -> Self {
        Self {
            kind: self.kind,
            field: self.field.clone(),
            display_name: display_name.into(),
            display_type: Some(display_type.into()),
            old,
            new,
        }
    }
}

/// Changes of one transition between consecutive snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    /// Time of the target snapshot
    #[serde(rename = "created")]
    pub timestamp: DateTime<Utc>,
    /// Who made the edit
    #[serde(rename = "createdBy", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Field deltas, in key order
    pub changes: Vec<Change>,
}

impl Changeset {
    /// Create changeset
    #[inline]
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, author: Option<String>, changes: Vec<Change>) -> Self {
        Self {
            timestamp,
            author,
            changes,
        }
    }

    /// Check if the transition changed nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Changesets of a record, most recent transition first
pub type RecordHistory = Vec<Changeset>;

//! Record snapshots
//!
//! The persistence layer supplies a [`SnapshotChain`]; nothing here writes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw record data: field name to stored value
pub type RecordData = Map<String, Value>;

/// One stored state of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Field values
    pub data: RecordData,
    /// When this state was stored
    pub timestamp: DateTime<Utc>,
    /// Who replaced this state with the next one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Snapshot {
    /// Create snapshot
    #[inline]
    #[must_use]
    pub fn new(data: RecordData, timestamp: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp,
            author: None,
        }
    }

    /// With author
    #[inline]
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Ordered historical states of one record
///
/// `versions[0]` holds the state at creation; each later version holds the
/// state before the next edit. `current` is the live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotChain {
    /// Record creation time
    pub created_at: DateTime<Utc>,
    /// Record creator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Stored versions, oldest first
    #[serde(default)]
    pub versions: Vec<Snapshot>,
    /// Live state
    pub current: Snapshot,
}

impl SnapshotChain {
    /// Chain of a record never edited since creation
    #[inline]
    #[must_use]
    pub fn new(data: RecordData, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            creator: None,
            versions: Vec::new(),
            current: Snapshot::new(data, created_at),
        }
    }

    /// With creator
    #[inline]
    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// With stored versions and the live state they lead to
    #[inline]
    #[must_use]
    pub fn with_versions(mut self, versions: Vec<Snapshot>, current: Snapshot) -> Self {
        self.versions = versions;
        self.current = current;
        self
    }

    /// Number of transitions the chain describes
    #[inline]
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.versions.len() + 1
    }
}

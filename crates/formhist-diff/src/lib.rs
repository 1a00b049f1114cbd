//! Formhist Diff
//!
//! Rebuilds a record's change history from its raw snapshot chain.
//!
//! # Core Concepts
//!
//! - [`Change`]: One classified field delta (add, modify, remove)
//! - [`Changeset`]: All deltas of one transition, with time and author
//! - [`SnapshotChain`]: Creation state, stored versions and live state
//! - [`diff()`]: Schema-free comparison of two snapshots
//! - [`reduce`]: One changeset per transition, most recent first
//!
//! Everything here is pure and synchronous.
//!
//! # Example
//!
//! ```rust
//! use formhist_diff::{diff, ChangeKind};
//! use serde_json::json;
//!
//! let before = json!({"a": 1}).as_object().cloned().unwrap();
//! let after = json!({"a": 2}).as_object().cloned().unwrap();
//!
//! let changes = diff(Some(&before), &after);
//! assert_eq!(changes[0].kind, ChangeKind::Modify);
//! ```

#![warn(unreachable_pub)]

mod change;
mod diff;
mod reduce;
mod snapshot;

pub use change::{Change, ChangeKind, Changeset, RecordHistory};
pub use diff::diff;
pub use reduce::reduce;
pub use snapshot::{RecordData, Snapshot, SnapshotChain};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

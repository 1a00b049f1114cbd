//! Formhist Core - record version history
//!
//! Ties the pipeline together:
//! - Picks the field schema (linked resource first, else the form's own)
//! - Reduces a record's snapshot chain into raw changesets
//! - Formats every change for display, resolving references through the
//!   caller's access
//!
//! # Example
//!
//! ```rust,ignore
//! use formhist_core::prelude::*;
//!
//! # async fn example(lookup: MyLookup, chain: SnapshotChain, access: MyAccess)
//! #     -> Result<(), HistoryError> {
//! let fields = HistoryService::<MyLookup>::schema(&form_structure, false)?;
//! let service = HistoryService::new(HistoryConfig::new(), lookup);
//!
//! let request = HistoryRequest::new("rec-1", &chain, &access).with_form_fields(&fields);
//! let history = service.record_history(request).await?;
//!
//! println!("{} changesets", history.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod service;

pub use config::HistoryConfig;
pub use error::HistoryError;
pub use service::{HistoryRequest, HistoryService};

pub use formhist_diff::{Change, ChangeKind, Changeset, RecordHistory, Snapshot, SnapshotChain};
pub use formhist_format::{
    Entity, EntityKind, EntityLookup, FormatError, FormatterConfig, LookupError,
    LookupFailurePolicy, Translate, Untranslated,
};
pub use formhist_schema::{FieldDescriptor, FieldKind, SchemaError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Formhist Core
    pub use crate::{
        Change, ChangeKind, Changeset, Entity, EntityKind, EntityLookup, FieldDescriptor,
        HistoryConfig, HistoryError, HistoryRequest, HistoryService, LookupError,
        RecordHistory, Snapshot, SnapshotChain, Translate,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

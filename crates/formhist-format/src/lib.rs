//! Formhist Format
//!
//! Turns raw changesets into reader-facing history: field titles, translated
//! change types and per-kind display values, with foreign references resolved
//! through an access-controlled [`EntityLookup`].
//!
//! # Core Concepts
//!
//! - [`ValueFormatter`]: Schema-directed formatting of a history
//! - [`EntityLookup`]: Host-supplied batch lookup of referenced entities
//! - [`FormatterConfig`]: Timeout, failure policy and date formats
//! - [`Translate`]: Translation of change type keys
//!
//! References of a whole history are resolved with at most one lookup per
//! [`EntityKind`] before any value is rendered.

#![warn(unreachable_pub)]

mod config;
mod display;
mod error;
mod formatter;
mod lookup;
mod resolve;

pub use config::{FormatterConfig, LookupFailurePolicy};
pub use error::{FormatError, InvalidPattern, LookupError};
pub use formatter::{Translate, Untranslated, ValueFormatter};
pub use lookup::{Entity, EntityKind, EntityLookup};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Formhist Schema
//!
//! Turns a form's declarative, freely nested structure into a flat, typed
//! field schema.
//!
//! # Core Concepts
//!
//! - [`FieldKind`]: Closed set of question types
//! - [`FieldDescriptor`]: Typed schema record for one leaf question
//! - [`FieldMeta`]: Kind-specific metadata (choices, matrix rows, linkage, ...)
//! - [`extract`]: Depth-first flattening of a form structure
//! - [`FieldRegistry`]: Name-indexed view over a schema
//!
//! # Example
//!
//! ```rust
//! use formhist_schema::{extract, FieldKind};
//! use serde_json::json;
//!
//! let structure = json!({
//!     "pages": [{"elements": [
//!         {"type": "panel", "elements": [
//!             {"type": "dropdown", "valueName": "color", "choices": ["red", "blue"]}
//!         ]}
//!     ]}]
//! });
//!
//! let fields = extract(&structure, false).unwrap();
//! assert_eq!(fields[0].kind, FieldKind::Dropdown);
//! ```

#![warn(unreachable_pub)]

mod descriptor;
mod error;
mod extract;
mod kind;
mod registry;

pub use descriptor::{
    Choice, ChoiceSource, ChoicesByUrl, Column, FieldDescriptor, FieldMeta, Item, ResourceRef,
};
pub use error::SchemaError;
pub use extract::extract;
pub use kind::FieldKind;
pub use registry::FieldRegistry;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

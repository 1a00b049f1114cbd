//! Field descriptors
//!
//! A [`FieldDescriptor`] describes one leaf question of a form. Kind-specific
//! metadata lives in [`FieldMeta`], one variant per metadata shape.

use crate::kind::FieldKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed schema record for one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Data key, unique within a schema
    pub name: String,
    /// Question type
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Question title shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Whether an answer is mandatory
    #[serde(default)]
    pub is_required: bool,
    /// Whether the question is read-only
    #[serde(default)]
    pub is_read_only: bool,
    /// Whether the field belongs to the resource's core form
    #[serde(default)]
    pub is_core: bool,
    /// Kind-specific metadata
    #[serde(default)]
    pub meta: FieldMeta,
}

impl FieldDescriptor {
    /// Create a descriptor without metadata
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            title: None,
            is_required: false,
            is_read_only: false,
            is_core: false,
            meta: FieldMeta::None,
        }
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// With metadata
    #[inline]
    #[must_use]
    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = meta;
        self
    }

    /// With static choices
    #[inline]
    #[must_use]
    pub fn with_choices(self, choices: Vec<Choice>) -> Self {
        self.with_meta(FieldMeta::Choices {
            source: ChoiceSource::Static(choices),
        })
    }

    /// Label shown in histories: the title, or the name when untitled
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Static choice list, for choice kinds and matrices sharing a list
    #[must_use]
    pub fn choices(&self) -> Option<&[Choice]> {
        match &self.meta {
            FieldMeta::Choices {
                source: ChoiceSource::Static(choices),
            }
            | FieldMeta::MatrixDynamic { choices, .. }
            | FieldMeta::MatrixDropdown { choices, .. } => Some(choices),
            _ => None,
        }
    }

    /// Remote choice source
    #[must_use]
    pub fn choices_by_url(&self) -> Option<&ChoicesByUrl> {
        match &self.meta {
            FieldMeta::Choices {
                source: ChoiceSource::Remote(remote),
            } => Some(remote),
            _ => None,
        }
    }

    /// Sub-items of a grouped-text field
    #[must_use]
    pub fn items(&self) -> Option<&[Item]> {
        match &self.meta {
            FieldMeta::GroupedText { items } => Some(items),
            _ => None,
        }
    }

    /// Row labels of a matrix
    #[must_use]
    pub fn rows(&self) -> Option<&[Item]> {
        match &self.meta {
            FieldMeta::Matrix { rows, .. } | FieldMeta::MatrixDropdown { rows, .. } => Some(rows),
            _ => None,
        }
    }

    /// Column labels of a single-choice matrix
    #[must_use]
    pub fn column_labels(&self) -> Option<&[Item]> {
        match &self.meta {
            FieldMeta::Matrix { columns, .. } => Some(columns),
            _ => None,
        }
    }

    /// Typed columns of a free or dynamic-row matrix
    #[must_use]
    pub fn columns(&self) -> Option<&[Column]> {
        match &self.meta {
            FieldMeta::MatrixDynamic { columns, .. } | FieldMeta::MatrixDropdown { columns, .. } => {
                Some(columns)
            }
            _ => None,
        }
    }

    /// Linked resource of a reference field
    #[must_use]
    pub fn resource_ref(&self) -> Option<&ResourceRef> {
        match &self.meta {
            FieldMeta::Reference(resource) => Some(resource),
            _ => None,
        }
    }

    /// Applications an owner or users field is scoped to
    #[must_use]
    pub fn applications(&self) -> Option<&[String]> {
        match &self.meta {
            FieldMeta::Scoped { applications } => Some(applications),
            _ => None,
        }
    }
}

/// Kind-specific descriptor metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum FieldMeta {
    /// Scalar kinds carry nothing extra
    #[default]
    None,
    /// Optional display labels for boolean answers
    #[serde(rename_all = "camelCase")]
    Boolean {
        /// Label for `true`
        label_true: Option<String>,
        /// Label for `false`
        label_false: Option<String>,
    },
    /// Choice list of a dropdown, radio, checkbox or tagbox field
    Choices {
        /// Static list or remote descriptor, never both
        source: ChoiceSource,
    },
    /// Named text sub-inputs
    GroupedText {
        /// Sub-items in form order
        items: Vec<Item>,
    },
    /// Single-choice matrix
    Matrix {
        /// Row labels
        rows: Vec<Item>,
        /// Column labels
        columns: Vec<Item>,
    },
    /// Dynamic-row matrix
    MatrixDynamic {
        /// Column definitions
        columns: Vec<Column>,
        /// Shared choice list
        choices: Vec<Choice>,
    },
    /// Free matrix
    MatrixDropdown {
        /// Row labels
        rows: Vec<Item>,
        /// Column definitions
        columns: Vec<Column>,
        /// Shared choice list
        choices: Vec<Choice>,
    },
    /// Record reference linkage
    Reference(ResourceRef),
    /// Application scope of owner and users fields
    Scoped {
        /// Application identifiers
        applications: Vec<String>,
    },
}

/// One selectable value and its display text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Stored value
    pub value: Value,
    /// Display text
    pub text: String,
}

impl Choice {
    /// Create choice
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<Value>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// Where a choice field gets its choices from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChoiceSource {
    /// Inline choice list
    Static(Vec<Choice>),
    /// Choices fetched from a remote endpoint
    Remote(ChoicesByUrl),
}

/// Remote choice source descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoicesByUrl {
    /// Endpoint URL
    pub url: String,
    /// Path to the choice array inside the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Property holding the choice value
    pub value_name: String,
    /// Property holding the choice text
    pub title_name: String,
}

/// Name/label pair for rows, columns and grouped-text items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stored key
    pub name: String,
    /// Display label
    pub label: String,
}

impl Item {
    /// Create item
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// Typed matrix column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Stored key
    pub name: String,
    /// Display label
    pub label: String,
    /// Kind of each cell in this column
    pub cell_kind: FieldKind,
    /// Column-specific choices, overriding the matrix's shared list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

impl Column {
    /// Create column without its own choices
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>, cell_kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            cell_kind,
            choices: None,
        }
    }

    /// Choices for this column's cells, falling back to the shared list
    #[inline]
    #[must_use]
    pub fn choices_or<'a>(&'a self, shared: &'a [Choice]) -> &'a [Choice] {
        self.choices.as_deref().unwrap_or(shared)
    }
}

/// Linkage of a reference field to another resource
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    /// Linked resource identifier
    pub resource: Option<String>,
    /// Field of the linked resource shown to users
    pub display_field: Option<String>,
    /// Name under which the linked resource sees this relation
    pub related_name: String,
    /// Show linked records as a grid
    #[serde(default)]
    pub display_as_grid: bool,
    /// Allow creating linked records inline
    #[serde(default)]
    pub can_add_new: bool,
    /// Form template used for inline creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_template: Option<String>,
    /// Grid column settings, stored as authored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_fields_settings: Option<Value>,
}

//! Field kinds
//!
//! [`FieldKind`] is the closed set of question types a form may contain.
//! Every downstream rule (extraction, formatting) matches on it exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Question type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Multi-line text
    Comment,
    /// Number input
    Numeric,
    /// Email input
    Email,
    /// URL input
    Url,
    /// Phone number input
    Tel,
    /// Color picker
    Color,
    /// Yes/no toggle
    Boolean,
    /// Calendar date
    Date,
    /// Date with time, zoned
    #[serde(rename = "datetime")]
    DateTime,
    /// Date with time, local
    #[serde(rename = "datetime-local")]
    DateTimeLocal,
    /// Time of day
    Time,
    /// File upload
    File,
    /// Single choice from a list
    Dropdown,
    /// Single choice from radio buttons
    #[serde(rename = "radiogroup")]
    RadioGroup,
    /// Multiple choice from checkboxes
    Checkbox,
    /// Multiple choice from a tag list
    Tagbox,
    /// Group of named text inputs
    #[serde(rename = "multipletext")]
    MultipleText,
    /// Single-choice matrix: one column value per row
    Matrix,
    /// Free matrix: fixed rows, typed cells per column
    #[serde(rename = "matrixdropdown")]
    MatrixDropdown,
    /// Dynamic-row matrix: fixed columns, user-added rows
    #[serde(rename = "matrixdynamic")]
    MatrixDynamic,
    /// Link to a single record of another resource
    Resource,
    /// Links to several records of another resource
    Resources,
    /// Links to users
    Users,
    /// Link to an owning role
    Owner,
    /// Computed expression
    Expression,
    /// Rating scale
    Rating,
}

impl FieldKind {
    /// Resolve the kind of a form element from its `type` and `inputType`.
    ///
    /// Unknown element types resolve to [`FieldKind::Text`].
    #[must_use]
    pub fn from_element(element: &Value) -> Self {
        let element_type = element.get("type").and_then(Value::as_str).unwrap_or("text");
        if element_type == "text" {
            let input_type = element.get("inputType").and_then(Value::as_str);
            return match input_type {
                Some("date") => Self::Date,
                Some("datetime") => Self::DateTime,
                Some("datetime-local") => Self::DateTimeLocal,
                Some("time") => Self::Time,
                Some("number") => Self::Numeric,
                Some("email") => Self::Email,
                Some("url") => Self::Url,
                Some("tel") => Self::Tel,
                Some("color") => Self::Color,
                _ => Self::Text,
            };
        }
        Self::from_type_name(element_type).unwrap_or_else(|| {
            tracing::debug!("unknown element type '{}', treating as text", element_type);
            Self::Text
        })
    }

    /// Parse a type name as stored in a schema
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "text" => Self::Text,
            "comment" => Self::Comment,
            "numeric" => Self::Numeric,
            "email" => Self::Email,
            "url" => Self::Url,
            "tel" => Self::Tel,
            "color" => Self::Color,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "datetime-local" => Self::DateTimeLocal,
            "time" => Self::Time,
            "file" => Self::File,
            "dropdown" => Self::Dropdown,
            "radiogroup" => Self::RadioGroup,
            "checkbox" => Self::Checkbox,
            "tagbox" => Self::Tagbox,
            "multipletext" => Self::MultipleText,
            "matrix" => Self::Matrix,
            "matrixdropdown" => Self::MatrixDropdown,
            "matrixdynamic" => Self::MatrixDynamic,
            "resource" => Self::Resource,
            "resources" => Self::Resources,
            "users" => Self::Users,
            "owner" => Self::Owner,
            "expression" => Self::Expression,
            "rating" => Self::Rating,
            _ => return None,
        };
        Some(kind)
    }

    /// Type name as stored in a schema
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Comment => "comment",
            Self::Numeric => "numeric",
            Self::Email => "email",
            Self::Url => "url",
            Self::Tel => "tel",
            Self::Color => "color",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::DateTimeLocal => "datetime-local",
            Self::Time => "time",
            Self::File => "file",
            Self::Dropdown => "dropdown",
            Self::RadioGroup => "radiogroup",
            Self::Checkbox => "checkbox",
            Self::Tagbox => "tagbox",
            Self::MultipleText => "multipletext",
            Self::Matrix => "matrix",
            Self::MatrixDropdown => "matrixdropdown",
            Self::MatrixDynamic => "matrixdynamic",
            Self::Resource => "resource",
            Self::Resources => "resources",
            Self::Users => "users",
            Self::Owner => "owner",
            Self::Expression => "expression",
            Self::Rating => "rating",
        }
    }

    /// Choice-based kinds (static or remote choice list)
    #[inline]
    #[must_use]
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::Dropdown | Self::RadioGroup | Self::Checkbox | Self::Tagbox
        )
    }

    /// Choice kinds whose stored value is an array
    #[inline]
    #[must_use]
    pub fn is_multi_choice(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Tagbox)
    }

    /// Kinds that link to another resource's records
    #[inline]
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Resource | Self::Resources)
    }

    /// Date and time kinds
    #[inline]
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::DateTime | Self::DateTimeLocal | Self::Time
        )
    }

    /// Matrix kinds
    #[inline]
    #[must_use]
    pub fn is_matrix(&self) -> bool {
        matches!(
            self,
            Self::Matrix | Self::MatrixDropdown | Self::MatrixDynamic
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

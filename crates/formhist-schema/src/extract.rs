//! Field schema extraction
//!
//! Walks a form's nested element tree depth-first and flattens every leaf
//! question into a [`FieldDescriptor`]. Panels contribute their children, in
//! order, and never produce a descriptor themselves.

use crate::descriptor::{
    Choice, ChoiceSource, ChoicesByUrl, Column, FieldDescriptor, FieldMeta, Item, ResourceRef,
};
use crate::error::SchemaError;
use crate::kind::FieldKind;
use serde_json::Value;
use std::collections::HashSet;

/// Default property read from remote choice items
const DEFAULT_REMOTE_PROPERTY: &str = "name";

/// Extract the flat field schema of a form structure.
///
/// Accepts a structure with `pages`, a single container with `elements`, or a
/// bare array of elements.
///
/// # Errors
/// - [`SchemaError::MissingValueName`] if a leaf has no `valueName`
/// - [`SchemaError::MissingRelatedField`] if a reference leaf has no `relatedName`
/// - [`SchemaError::DuplicateValueName`] if two leaves share a `valueName`
pub fn extract(structure: &Value, is_core: bool) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let mut walker = Walker {
        is_core,
        fields: Vec::new(),
        seen: HashSet::new(),
    };

    if let Some(pages) = structure.get("pages").and_then(Value::as_array) {
        for page in pages {
            walker.visit_container(page)?;
        }
    } else if let Some(elements) = structure.as_array() {
        walker.visit_elements(elements)?;
    } else {
        walker.visit_container(structure)?;
    }

    tracing::debug!("extracted {} fields (core: {})", walker.fields.len(), is_core);
    Ok(walker.fields)
}

struct Walker {
    is_core: bool,
    fields: Vec<FieldDescriptor>,
    seen: HashSet<String>,
}

impl Walker {
    fn visit_container(&mut self, container: &Value) -> Result<(), SchemaError> {
        match container.get("elements").and_then(Value::as_array) {
            Some(elements) => self.visit_elements(elements),
            None => Ok(()),
        }
    }

    fn visit_elements(&mut self, elements: &[Value]) -> Result<(), SchemaError> {
        for element in elements {
            if element.get("type").and_then(Value::as_str) == Some("panel") {
                self.visit_container(element)?;
            } else {
                let field = leaf_descriptor(element, self.is_core)?;
                if !self.seen.insert(field.name.clone()) {
                    return Err(SchemaError::DuplicateValueName(field.name));
                }
                self.fields.push(field);
            }
        }
        Ok(())
    }
}

/// Build the descriptor of one leaf question
fn leaf_descriptor(element: &Value, is_core: bool) -> Result<FieldDescriptor, SchemaError> {
    let name = element
        .get("valueName")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(SchemaError::MissingValueName)?;

    let kind = FieldKind::from_element(element);
    let meta = enrich(kind, name, element)?;

    Ok(FieldDescriptor {
        name: name.to_string(),
        kind,
        title: localized_text(element.get("title")),
        is_required: flag(element, "isRequired"),
        is_read_only: flag(element, "readOnly"),
        is_core,
        meta,
    })
}

/// Kind-specific metadata, exactly one shape per kind
fn enrich(kind: FieldKind, name: &str, element: &Value) -> Result<FieldMeta, SchemaError> {
    let meta = match kind {
        FieldKind::Resource | FieldKind::Resources => {
            let related_name = element
                .get("relatedName")
                .and_then(Value::as_str)
                .filter(|related| !related.is_empty())
                .ok_or_else(|| SchemaError::MissingRelatedField(name.to_string()))?;
            FieldMeta::Reference(ResourceRef {
                resource: string_prop(element, "resource"),
                display_field: string_prop(element, "displayField"),
                related_name: related_name.to_string(),
                display_as_grid: flag(element, "displayAsGrid"),
                can_add_new: flag(element, "canAddNew"),
                add_template: string_prop(element, "addTemplate"),
                grid_fields_settings: element.get("gridFieldsSettings").cloned(),
            })
        }
        FieldKind::MultipleText => FieldMeta::GroupedText {
            items: list(element, "items").iter().map(item).collect(),
        },
        FieldKind::Matrix => FieldMeta::Matrix {
            rows: list(element, "rows").iter().map(item).collect(),
            columns: list(element, "columns").iter().map(item).collect(),
        },
        FieldKind::MatrixDynamic => FieldMeta::MatrixDynamic {
            columns: columns(element),
            choices: list(element, "choices").iter().map(choice).collect(),
        },
        FieldKind::MatrixDropdown => FieldMeta::MatrixDropdown {
            rows: list(element, "rows").iter().map(item).collect(),
            columns: columns(element),
            choices: list(element, "choices").iter().map(choice).collect(),
        },
        FieldKind::Dropdown | FieldKind::RadioGroup | FieldKind::Checkbox | FieldKind::Tagbox => {
            let source = match element.get("choicesByUrl").filter(|v| !v.is_null()) {
                Some(remote) => ChoiceSource::Remote(choices_by_url(remote)),
                None => ChoiceSource::Static(list(element, "choices").iter().map(choice).collect()),
            };
            FieldMeta::Choices { source }
        }
        FieldKind::Owner | FieldKind::Users => FieldMeta::Scoped {
            applications: list(element, "applications")
                .iter()
                .filter_map(|app| app.as_str().map(str::to_string))
                .collect(),
        },
        FieldKind::Boolean => FieldMeta::Boolean {
            label_true: localized_text(element.get("labelTrue")),
            label_false: localized_text(element.get("labelFalse")),
        },
        FieldKind::Text
        | FieldKind::Comment
        | FieldKind::Numeric
        | FieldKind::Email
        | FieldKind::Url
        | FieldKind::Tel
        | FieldKind::Color
        | FieldKind::Date
        | FieldKind::DateTime
        | FieldKind::DateTimeLocal
        | FieldKind::Time
        | FieldKind::File
        | FieldKind::Expression
        | FieldKind::Rating => FieldMeta::None,
    };
    Ok(meta)
}

/// Typed columns; cell kind falls back to the matrix `cellType`, then dropdown
fn columns(element: &Value) -> Vec<Column> {
    let default_kind = element
        .get("cellType")
        .and_then(Value::as_str)
        .and_then(FieldKind::from_type_name)
        .unwrap_or(FieldKind::Dropdown);

    list(element, "columns")
        .iter()
        .map(|column| {
            let Item { name, label } = item(column);
            let cell_kind = column
                .get("cellType")
                .and_then(Value::as_str)
                .and_then(FieldKind::from_type_name)
                .unwrap_or(default_kind);
            let choices = column
                .get("choices")
                .and_then(Value::as_array)
                .map(|choices| choices.iter().map(choice).collect());
            Column {
                name,
                label,
                cell_kind,
                choices,
            }
        })
        .collect()
}

fn choices_by_url(remote: &Value) -> ChoicesByUrl {
    // A bare string is the URL itself
    let url = match remote {
        Value::String(url) => url.clone(),
        other => string_prop(other, "url").unwrap_or_default(),
    };
    ChoicesByUrl {
        url,
        path: string_prop(remote, "path"),
        value_name: string_prop(remote, "valueName")
            .unwrap_or_else(|| DEFAULT_REMOTE_PROPERTY.to_string()),
        title_name: string_prop(remote, "titleName")
            .unwrap_or_else(|| DEFAULT_REMOTE_PROPERTY.to_string()),
    }
}

/// Parse a choice given as a bare value or as `{value, text}`
fn choice(raw: &Value) -> Choice {
    match raw.get("value") {
        Some(value) => Choice {
            value: value.clone(),
            text: localized_text(raw.get("text")).unwrap_or_else(|| plain_text(value)),
        },
        None => Choice {
            value: raw.clone(),
            text: plain_text(raw),
        },
    }
}

/// Parse a row, column or sub-item given as a bare name or as an object
fn item(raw: &Value) -> Item {
    if !raw.is_object() {
        let name = plain_text(raw);
        return Item {
            label: name.clone(),
            name,
        };
    }
    let name = raw
        .get("value")
        .or_else(|| raw.get("name"))
        .map(plain_text)
        .unwrap_or_default();
    let label = localized_text(raw.get("text"))
        .or_else(|| localized_text(raw.get("title")))
        .unwrap_or_else(|| name.clone());
    Item { name, label }
}

/// Text of a possibly localized property (`"x"` or `{"default": "x", ...}`)
fn localized_text(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map
            .get("default")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Text of a scalar without JSON quoting
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn string_prop(element: &Value, key: &str) -> Option<String> {
    element.get(key).and_then(Value::as_str).map(str::to_string)
}

fn flag(element: &Value, key: &str) -> bool {
    element.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn list<'a>(element: &'a Value, key: &str) -> &'a [Value] {
    element
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

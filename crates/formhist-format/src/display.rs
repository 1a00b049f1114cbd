//! Per-kind display rules
//!
//! Pure functions turning a stored value into what a reader sees, given the
//! field's descriptor and the references resolved for the whole history.

use crate::config::FormatterConfig;
use crate::lookup::EntityKind;
use crate::resolve::{reference_ids, ResolvedReferences};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use formhist_schema::{Choice, Column, FieldDescriptor, FieldKind, FieldMeta, Item};
use serde_json::{Map, Value};
use std::fmt::Write;

/// Renders values of one history
pub(crate) struct Renderer<'a> {
    refs: &'a ResolvedReferences,
    config: &'a FormatterConfig,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(refs: &'a ResolvedReferences, config: &'a FormatterConfig) -> Self {
        Self { refs, config }
    }

    /// Display form of `value` stored under `field`
    pub(crate) fn render(&self, field: &FieldDescriptor, value: &Value) -> Value {
        match field.kind {
            FieldKind::Boolean => boolean(field, value),
            FieldKind::Dropdown | FieldKind::RadioGroup => {
                single_choice(field.choices().unwrap_or_default(), value)
            }
            FieldKind::Checkbox | FieldKind::Tagbox => {
                multi_choice(field.choices().unwrap_or_default(), value)
            }
            FieldKind::File => file_names(value),
            FieldKind::MultipleText => relabel_keys(field.items().unwrap_or_default(), value),
            FieldKind::Matrix => matrix(field, value),
            FieldKind::MatrixDropdown => matrix_dropdown(field, value),
            FieldKind::MatrixDynamic => matrix_dynamic(field, value),
            FieldKind::Resource => self.single_reference(EntityKind::Record, value),
            FieldKind::Resources => self.reference_list(EntityKind::Record, value),
            FieldKind::Users => self.reference_list(EntityKind::User, value),
            FieldKind::Owner => self.owner(value),
            FieldKind::Date => temporal(value, &self.config.date_format, parse_datetime),
            FieldKind::DateTime | FieldKind::DateTimeLocal => {
                temporal(value, &self.config.datetime_format, parse_datetime)
            }
            FieldKind::Time => temporal(value, &self.config.time_format, |text| {
                parse_time(text).map(|time| NaiveDate::MIN.and_time(time))
            }),
            FieldKind::Text
            | FieldKind::Comment
            | FieldKind::Numeric
            | FieldKind::Email
            | FieldKind::Url
            | FieldKind::Tel
            | FieldKind::Color
            | FieldKind::Expression
            | FieldKind::Rating => value.clone(),
        }
    }

    /// A single reference is looked up as a one-element list, then unwrapped.
    /// An id the caller cannot read stays as stored.
    fn single_reference(&self, kind: EntityKind, value: &Value) -> Value {
        match value {
            Value::String(id) => match self.refs.label(kind, id) {
                Some(label) => Value::String(label.to_string()),
                None => {
                    tracing::debug!("{kind} reference '{id}' left unresolved");
                    value.clone()
                }
            },
            Value::Array(_) => self.reference_list(kind, value),
            _ => value.clone(),
        }
    }

    /// Labels of readable references, in stored order
    fn reference_list(&self, kind: EntityKind, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        Value::Array(
            reference_ids(value)
                .into_iter()
                .filter_map(|id| self.refs.label(kind, id))
                .map(|label| Value::String(label.to_string()))
                .collect(),
        )
    }

    fn owner(&self, value: &Value) -> Value {
        match value {
            Value::Array(_) => self.reference_list(EntityKind::Role, value),
            _ => self.single_reference(EntityKind::Role, value),
        }
    }
}

/// Date-like text reformatted, anything unparseable or unrenderable as stored
fn temporal(value: &Value, format: &str, parse: impl Fn(&str) -> Option<NaiveDateTime>) -> Value {
    let Some(moment) = value.as_str().and_then(parse) else {
        return value.clone();
    };
    let mut shown = String::new();
    match write!(shown, "{}", moment.format(format)) {
        Ok(()) => Value::String(shown),
        Err(_) => {
            tracing::warn!("cannot render {value} with pattern '{format}'");
            value.clone()
        }
    }
}

fn boolean(field: &FieldDescriptor, value: &Value) -> Value {
    let FieldMeta::Boolean {
        label_true,
        label_false,
    } = &field.meta
    else {
        return value.clone();
    };
    let label = match value {
        Value::Bool(true) => label_true,
        Value::Bool(false) => label_false,
        _ => return value.clone(),
    };
    label
        .as_ref()
        .map_or_else(|| value.clone(), |label| Value::String(label.clone()))
}

/// Text of the choice whose value loosely equals `value`
fn choice_text<'c>(choices: &'c [Choice], value: &Value) -> Option<&'c str> {
    let wanted = plain_text(value);
    choices
        .iter()
        .find(|choice| choice.value == *value || plain_text(&choice.value) == wanted)
        .map(|choice| choice.text.as_str())
}

fn single_choice(choices: &[Choice], value: &Value) -> Value {
    choice_text(choices, value).map_or_else(|| value.clone(), |text| Value::String(text.into()))
}

fn multi_choice(choices: &[Choice], value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| single_choice(choices, item))
                .collect(),
        ),
        other => single_choice(choices, other),
    }
}

fn file_names(value: &Value) -> Value {
    let name = |file: &Value| file.get("name").cloned().unwrap_or_else(|| file.clone());
    match value {
        Value::Array(files) => Value::Array(files.iter().map(name).collect()),
        Value::Object(_) => name(value),
        other => other.clone(),
    }
}

fn item_label<'i>(items: &'i [Item], name: &'i str) -> &'i str {
    items
        .iter()
        .find(|item| item.name == name)
        .map_or(name, |item| item.label.as_str())
}

fn relabel_keys(items: &[Item], value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    Value::Object(
        map.iter()
            .map(|(key, sub)| (item_label(items, key).to_string(), sub.clone()))
            .collect(),
    )
}

/// Row keys become row labels, cell values become column labels
fn matrix(field: &FieldDescriptor, value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    let rows = field.rows().unwrap_or_default();
    let columns = field.column_labels().unwrap_or_default();
    Value::Object(
        map.iter()
            .map(|(row, cell)| {
                let cell = match cell {
                    Value::Null => Value::Null,
                    other => {
                        let name = plain_text(other);
                        Value::String(item_label(columns, &name).to_string())
                    }
                };
                (item_label(rows, row).to_string(), cell)
            })
            .collect(),
    )
}

/// Cell value rendered through its column's choices
fn cell(column: &Column, shared: &[Choice], value: &Value) -> Value {
    let choices = column.choices_or(shared);
    match column.cell_kind {
        FieldKind::Checkbox | FieldKind::Tagbox => multi_choice(choices, value),
        FieldKind::Dropdown | FieldKind::RadioGroup => single_choice(choices, value),
        _ => value.clone(),
    }
}

/// Rows flatten into `row.column` keys
///
/// A row is either keyed by column name or positional, one cell per column.
fn matrix_dropdown(field: &FieldDescriptor, value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    let rows = field.rows().unwrap_or_default();
    let columns = field.columns().unwrap_or_default();
    let shared = field.choices().unwrap_or_default();

    let mut rendered = Map::new();
    for (row, cells) in map {
        let row_label = item_label(rows, row);
        for (index, column) in columns.iter().enumerate() {
            let stored = match cells {
                Value::Object(cells) => cells.get(&column.name),
                Value::Array(cells) => cells.get(index),
                _ => None,
            };
            if let Some(stored) = stored {
                rendered.insert(
                    format!("{row_label}.{}", column.label),
                    cell(column, shared, stored),
                );
            }
        }
    }
    Value::Object(rendered)
}

/// Each row renders as one `[i]\tkey: value` line, rows joined by newlines
fn matrix_dynamic(field: &FieldDescriptor, value: &Value) -> Value {
    let Value::Array(rows) = value else {
        return value.clone();
    };
    let columns = field.columns().unwrap_or_default();
    let shared = field.choices().unwrap_or_default();

    let lines: Vec<String> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut line = format!("[{}]", index + 1);
            if let Value::Object(entries) = row {
                for (key, stored) in entries {
                    let column = columns.iter().find(|column| column.name == *key);
                    let (label, shown) = match column {
                        Some(column) => (column.label.as_str(), cell(column, shared, stored)),
                        None => (key.as_str(), stored.clone()),
                    };
                    let _ = write!(line, "\t{label}: {}", plain_text(&shown));
                }
            }
            line.trim().to_string()
        })
        .collect();
    Value::String(lines.join("\n"))
}

/// Text of a value as it reads inline: strings unquoted, lists comma-joined
fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(plain_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(text) {
        return Some(moment.with_timezone(&Utc).naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    parse_datetime(text).map(|moment| moment.time()).or_else(|| {
        ["%H:%M:%S%.f", "%H:%M"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
    })
}

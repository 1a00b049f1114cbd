//! Record diff engine
//!
//! Compares two raw snapshots key by key and classifies every delta. Works
//! without a schema: display names are resolved later by the formatter.
//!
//! A value is *present* when its key exists and is not `null`.

use crate::change::Change;
use crate::snapshot::RecordData;
use serde_json::{Map, Value};

/// Compute the changes turning `previous` into `next`.
///
/// `previous` is `None` for the creation transition. Keys of `previous` are
/// examined first, in order, then keys only `next` has a value for.
///
/// Total and pure: `diff(Some(x), x)` is always empty.
#[must_use]
pub fn diff(previous: Option<&RecordData>, next: &RecordData) -> Vec<Change> {
    let mut changes = Vec::new();

    if let Some(previous) = previous {
        for (key, old) in previous {
            if let Some(change) = compare(key, old, next.get(key)) {
                changes.push(change);
            }
        }
    }

    for (key, new) in next {
        let covered = previous
            .and_then(|previous| previous.get(key))
            .is_some_and(|old| !old.is_null());
        if !covered && !new.is_null() {
            changes.push(Change::add(key.as_str(), new.clone()));
        }
    }

    changes
}

/// Classify one key whose previous value is `old`
fn compare(key: &str, old: &Value, new: Option<&Value>) -> Option<Change> {
    let new_present = new.filter(|value| !value.is_null());

    if old.is_boolean() || new.is_some_and(Value::is_boolean) {
        if old.is_null() || new == Some(old) {
            return None;
        }
        return Some(Change::modify(key, old.clone(), new_present.cloned()));
    }

    // Absent before: handled as an addition
    if old.is_null() {
        return None;
    }

    if old.is_array() || new.is_some_and(Value::is_array) {
        return match new {
            None => Some(Change::modify(key, old.clone(), None)),
            Some(Value::Null) => Some(Change::remove(key, old.clone())),
            Some(new) if loose_text(old) != loose_text(new) => {
                Some(Change::modify(key, old.clone(), Some(new.clone())))
            }
            Some(_) => None,
        };
    }

    if let Value::Object(old_map) = old {
        return match new_present {
            Some(Value::Object(new_map)) => compare_objects(key, old_map, Some(new_map)),
            Some(other) => Some(Change::modify(key, old.clone(), Some(other.clone()))),
            None => compare_objects(key, old_map, None),
        };
    }

    match new {
        None => None,
        Some(Value::Null) => Some(Change::remove(key, old.clone())),
        Some(new) if new != old => Some(Change::modify(key, old.clone(), Some(new.clone()))),
        Some(_) => None,
    }
}

/// Sub-key diff of an object value, aggregated into one `modify`.
///
/// Only differing sub-keys are kept; a sub-key missing on one side shows as
/// `null` there. Yields nothing when no sub-key differs.
fn compare_objects(
    key: &str,
    old: &Map<String, Value>,
    new: Option<&Map<String, Value>>,
) -> Option<Change> {
    let empty = Map::new();
    let new = new.unwrap_or(&empty);

    let sub_keys: Vec<&String> = new
        .keys()
        .chain(old.keys().filter(|sub| !new.contains_key(*sub)))
        .collect();

    let mut old_diff = Map::new();
    let mut new_diff = Map::new();
    for sub in sub_keys {
        let before = old.get(sub);
        let after = new.get(sub);
        if scalar_text(before) != scalar_text(after) {
            old_diff.insert(sub.clone(), before.cloned().unwrap_or(Value::Null));
            new_diff.insert(sub.clone(), after.cloned().unwrap_or(Value::Null));
        }
    }

    if new_diff.is_empty() {
        return None;
    }
    Some(Change::modify(
        key,
        Value::Object(old_diff),
        Some(Value::Object(new_diff)),
    ))
}

/// Comparable text of a sub-value
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(other) => loose_text(other),
    }
}

/// Text form used for loose equality
///
/// Scalars compare by their plain text and arrays of scalars by their
/// comma-joined elements, so `[1, 2]` equals `["1", "2"]`. Nested arrays and
/// objects keep their full structure.
fn loose_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(element_text).collect::<Vec<_>>().join(","),
        other => element_text(other),
    }
}

fn element_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn data(value: Value) -> RecordData {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    fn run(previous: Value, next: Value) -> Vec<Change> {
        let previous = data(previous);
        diff(Some(&previous), &data(next))
    }

    #[test]
    fn creation_adds_every_present_key() {
        let changes = diff(None, &data(json!({"a": 1, "b": null, "c": {"x": 1}, "d": false})));
        assert_eq!(
            changes,
            vec![
                Change::add("a", json!(1)),
                Change::add("c", json!({"x": 1})),
                Change::add("d", json!(false)),
            ]
        );
    }

    #[test]
    fn scalar_modify() {
        assert_eq!(
            run(json!({"a": 1}), json!({"a": 2})),
            vec![Change::modify("a", json!(1), Some(json!(2)))]
        );
    }

    #[test]
    fn scalar_absent_in_next_is_ignored() {
        assert!(run(json!({"a": 1}), json!({})).is_empty());
    }

    #[test]
    fn scalar_null_in_next_is_remove() {
        assert_eq!(
            run(json!({"a": "x"}), json!({"a": null})),
            vec![Change::remove("a", json!("x"))]
        );
    }

    #[test]
    fn scalar_zero_is_present() {
        assert_eq!(
            run(json!({"a": 0}), json!({"a": 5})),
            vec![Change::modify("a", json!(0), Some(json!(5)))]
        );
    }

    #[test]
    fn boolean_absent_in_next_is_modify_to_nothing() {
        assert_eq!(
            run(json!({"a": true}), json!({})),
            vec![Change::modify("a", json!(true), None)]
        );
        assert_eq!(
            run(json!({"a": false}), json!({"a": null})),
            vec![Change::modify("a", json!(false), None)]
        );
    }

    #[test]
    fn boolean_flip_is_modify() {
        assert_eq!(
            run(json!({"a": true}), json!({"a": false})),
            vec![Change::modify("a", json!(true), Some(json!(false)))]
        );
    }

    #[test]
    fn boolean_from_null_is_add() {
        assert_eq!(
            run(json!({"a": null}), json!({"a": true})),
            vec![Change::add("a", json!(true))]
        );
    }

    #[test]
    fn object_sub_key_diff_keeps_only_differences() {
        let changes = run(
            json!({"m": {"r1": "c1", "r2": "c2"}}),
            json!({"m": {"r1": "c1", "r2": "c3", "r3": "c1"}}),
        );
        assert_eq!(
            changes,
            vec![Change::modify(
                "m",
                json!({"r2": "c2", "r3": null}),
                Some(json!({"r2": "c3", "r3": "c1"}))
            )]
        );
    }

    #[test]
    fn object_sub_key_dropped_in_next_is_detected() {
        let changes = run(json!({"m": {"a": "1", "b": "2"}}), json!({"m": {"a": "1"}}));
        assert_eq!(
            changes,
            vec![Change::modify("m", json!({"b": "2"}), Some(json!({"b": null})))]
        );
    }

    #[test]
    fn nested_objects_compare_by_structure() {
        assert!(run(
            json!({"g": {"row": {"c1": 1, "c2": [1, 2]}}}),
            json!({"g": {"row": {"c1": 1, "c2": [1, 2]}}}),
        )
        .is_empty());

        let changes = run(
            json!({"g": {"row": {"c1": 1, "c2": 2}}}),
            json!({"g": {"row": {"c1": 1, "c2": 3}}}),
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Modify);
        assert_eq!(changes[0].new, Some(json!({"row": {"c1": 1, "c2": 3}})));
    }

    #[test]
    fn object_removed_with_values_is_modify() {
        let changes = run(json!({"m": {"a": "x"}}), json!({}));
        assert_eq!(
            changes,
            vec![Change::modify("m", json!({"a": "x"}), Some(json!({"a": null})))]
        );
    }

    #[test]
    fn object_removed_without_values_is_dropped() {
        assert!(run(json!({"m": {"a": null}}), json!({})).is_empty());
        assert!(run(json!({"m": {}}), json!({"m": null})).is_empty());
    }

    #[test]
    fn array_changes() {
        assert_eq!(
            run(json!({"t": ["a", "b"]}), json!({"t": ["a"]})),
            vec![Change::modify("t", json!(["a", "b"]), Some(json!(["a"])))]
        );
        assert!(run(json!({"t": ["a", "b"]}), json!({"t": ["a", "b"]})).is_empty());
        assert_eq!(
            run(json!({"t": ["a"]}), json!({})),
            vec![Change::modify("t", json!(["a"]), None)]
        );
        assert_eq!(
            run(json!({"t": ["a"]}), json!({"t": null})),
            vec![Change::remove("t", json!(["a"]))]
        );
    }

    #[test]
    fn array_compare_is_by_text() {
        // Same joined text, so no change
        assert!(run(json!({"t": [1, 2]}), json!({"t": ["1", "2"]})).is_empty());
    }

    #[test]
    fn file_replacement_is_modify() {
        assert_eq!(
            run(json!({"f": [{"name": "a.pdf"}]}), json!({"f": [{"name": "b.pdf"}]})),
            vec![Change::modify(
                "f",
                json!([{"name": "a.pdf"}]),
                Some(json!([{"name": "b.pdf"}]))
            )]
        );
        assert!(run(json!({"f": [{"name": "a.pdf"}]}), json!({"f": [{"name": "a.pdf"}]})).is_empty());
    }

    #[test]
    fn dynamic_row_cell_edit_is_modify() {
        let changes = run(
            json!({"lines": [{"color": "r", "qty": "3"}]}),
            json!({"lines": [{"color": "b", "qty": "9"}]}),
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Modify);
        assert_eq!(changes[0].new, Some(json!([{"color": "b", "qty": "9"}])));
    }

    #[test]
    fn multi_valued_sub_cells_keep_their_shape() {
        let changes = run(
            json!({"g": {"row": {"tags": ["a", "b"]}}}),
            json!({"g": {"row": {"tags": ["a,b"]}}}),
        );
        assert_eq!(changes.len(), 1);

        let changes = run(
            json!({"g": {"row": {"c1": "a", "c2": "b"}}}),
            json!({"g": {"row": {"c1": "a,b", "c2": ""}}}),
        );
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn array_appearing_is_add() {
        assert_eq!(
            run(json!({"t": null}), json!({"t": ["x"]})),
            vec![Change::add("t", json!(["x"]))]
        );
    }

    #[test]
    fn previous_keys_come_before_new_keys() {
        let changes = run(json!({"b": 1, "a": 1}), json!({"z": 1, "a": 2, "b": 2}));
        let fields: Vec<_> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["b", "a", "z"]);
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,4}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::hash_map("[a-z]{1,3}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    fn record() -> impl Strategy<Value = RecordData> {
        prop::collection::hash_map("[a-e]", json_value(), 0..6)
            .prop_map(|map| map.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_diff_against_self_is_empty(snapshot in record()) {
            prop_assert!(diff(Some(&snapshot), &snapshot).is_empty());
        }

        #[test]
        fn prop_no_change_lacks_both_values(previous in record(), next in record()) {
            for change in diff(Some(&previous), &next) {
                prop_assert!(change.old.is_some() || change.new.is_some());
            }
        }

        #[test]
        fn prop_creation_adds_only(next in record()) {
            for change in diff(None, &next) {
                prop_assert_eq!(change.kind, ChangeKind::Add);
            }
        }
    }
}

//! Testing utilities for Formhist workspace
//!
//! Shared fixtures, an in-memory entity store and tracing setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use formhist_diff::{RecordData, Snapshot, SnapshotChain};
use formhist_format::{Entity, EntityKind, EntityLookup, LookupError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Fixed instant on 2024-03-01 at `hour`:00 UTC
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

/// Record data from a JSON object literal
pub fn record(value: Value) -> RecordData {
    match value {
        Value::Object(map) => map,
        other => panic!("record data must be an object, got {other}"),
    }
}

/// Chain from `(data, timestamp, author)` versions and the live state
pub fn chain(
    created_at: DateTime<Utc>,
    creator: &str,
    versions: Vec<(Value, DateTime<Utc>, &str)>,
    current: (Value, DateTime<Utc>),
) -> SnapshotChain {
    let versions = versions
        .into_iter()
        .map(|(data, timestamp, author)| Snapshot::new(record(data), timestamp).with_author(author))
        .collect();
    SnapshotChain::new(RecordData::new(), created_at)
        .with_creator(creator)
        .with_versions(versions, Snapshot::new(record(current.0), current.1))
}

/// Form exercising every display rule, nested two panels deep
pub fn sample_form() -> Value {
    json!({
        "pages": [
            {"elements": [
                {"type": "text", "valueName": "name", "title": "Name"},
                {"type": "dropdown", "valueName": "color", "title": "Color",
                 "choices": [{"value": "r", "text": "Red"}, {"value": "b", "text": "Blue"}]},
                {"type": "panel", "elements": [
                    {"type": "boolean", "valueName": "active", "title": "Active",
                     "labelTrue": "Yes", "labelFalse": "No"},
                    {"type": "checkbox", "valueName": "tags", "title": "Tags",
                     "choices": ["a", {"value": "b", "text": "Bee"}]},
                    {"type": "panel", "elements": [
                        {"type": "text", "inputType": "date", "valueName": "due", "title": "Due"}
                    ]}
                ]}
            ]},
            {"elements": [
                {"type": "resource", "valueName": "parent", "title": "Parent",
                 "resource": "res-tasks", "displayField": "title", "relatedName": "children"},
                {"type": "resources", "valueName": "related", "title": "Related",
                 "resource": "res-tasks", "relatedName": "related_of"},
                {"type": "users", "valueName": "watchers", "title": "Watchers"},
                {"type": "owner", "valueName": "owner", "title": "Owner", "applications": ["app-1"]},
                {"type": "file", "valueName": "attachments", "title": "Attachments"},
                {"type": "matrixdynamic", "valueName": "lines", "title": "Lines",
                 "columns": [
                     {"name": "color", "title": "Color"},
                     {"name": "qty", "title": "Quantity", "cellType": "text"}
                 ],
                 "choices": [{"value": "r", "text": "Red"}]}
            ]}
        ]
    })
}

/// Linked resource schema: its fields win over the form's own
pub fn sample_resource_fields() -> Value {
    json!([
        {"type": "text", "valueName": "name", "title": "Full name"},
        {"type": "dropdown", "valueName": "color", "title": "Colour",
         "choices": [{"value": "r", "text": "Rouge"}]}
    ])
}

/// One `find_many` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCall {
    pub kind: EntityKind,
    pub ids: Vec<String>,
}

/// Ids a caller may read
#[derive(Debug, Clone, Default)]
pub enum ReadAccess {
    #[default]
    All,
    Only(HashSet<String>),
}

impl ReadAccess {
    pub fn only<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self::Only(ids.into_iter().map(str::to_string).collect())
    }

    pub fn allows(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(id),
        }
    }
}

/// Entity store held in memory, recording every lookup
#[derive(Debug, Default)]
pub struct InMemoryLookup {
    entities: HashMap<(EntityKind, String), Entity>,
    failing: HashSet<EntityKind>,
    delay: Option<Duration>,
    calls: Mutex<Vec<LookupCall>>,
}

impl InMemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities
            .insert((entity.kind(), entity.id().to_string()), entity);
        self
    }

    /// Every lookup of `kind` fails
    pub fn failing(mut self, kind: EntityKind) -> Self {
        self.failing.insert(kind);
        self
    }

    /// Every lookup sleeps for `delay` first
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<LookupCall> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, kind: EntityKind) -> usize {
        self.calls.lock().iter().filter(|call| call.kind == kind).count()
    }
}

/// Store matching [`sample_form`]'s references
pub fn sample_lookup() -> InMemoryLookup {
    InMemoryLookup::new()
        .with_entity(Entity::record("rec-1", "T-1"))
        .with_entity(Entity::record("rec-2", "T-2"))
        .with_entity(Entity::record("rec-3", "T-3"))
        .with_entity(Entity::user("usr-1", "alice"))
        .with_entity(Entity::user("usr-2", "bob"))
        .with_entity(Entity::role("role-1", "Manager", Some("Sales".to_string())))
}

#[async_trait]
impl EntityLookup for InMemoryLookup {
    type Access = ReadAccess;

    async fn find_many(
        &self,
        kind: EntityKind,
        ids: &[String],
        access: &ReadAccess,
    ) -> Result<Vec<Entity>, LookupError> {
        self.calls.lock().push(LookupCall {
            kind,
            ids: ids.to_vec(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&kind) {
            return Err(LookupError::Unavailable(format!("{kind} store offline")));
        }
        Ok(ids
            .iter()
            .filter(|id| access.allows(id))
            .filter_map(|id| self.entities.get(&(kind, id.clone())).cloned())
            .collect())
    }
}

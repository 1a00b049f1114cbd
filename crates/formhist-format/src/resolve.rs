//! Batched reference resolution
//!
//! Resolution runs in two steps: [`ReferenceBatch::collect`] gathers every
//! referenced id of a history per [`EntityKind`], then [`resolve`] issues one
//! lookup per kind and indexes the labels by id.

use crate::config::LookupFailurePolicy;
use crate::error::LookupError;
use crate::lookup::{EntityKind, EntityLookup};
use formhist_diff::Changeset;
use formhist_schema::{FieldKind, FieldRegistry};
use futures::future::join_all;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Entity kind a reference field points at
pub(crate) fn reference_kind(kind: FieldKind) -> Option<EntityKind> {
    match kind {
        FieldKind::Resource | FieldKind::Resources => Some(EntityKind::Record),
        FieldKind::Users => Some(EntityKind::User),
        FieldKind::Owner => Some(EntityKind::Role),
        _ => None,
    }
}

/// Ids held by a reference value: a single id or a list of ids
pub(crate) fn reference_ids(value: &Value) -> Vec<&str> {
    match value {
        Value::String(id) => vec![id.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Distinct referenced ids, per entity kind
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ReferenceBatch {
    ids: BTreeMap<EntityKind, BTreeSet<String>>,
}

impl ReferenceBatch {
    /// Gather every id referenced by the old or new values of `history`
    pub(crate) fn collect(history: &[Changeset], fields: &FieldRegistry) -> Self {
        let mut batch = Self::default();
        for change in history.iter().flat_map(|changeset| &changeset.changes) {
            let Some(kind) = fields
                .get(&change.field)
                .and_then(|field| reference_kind(field.kind))
            else {
                continue;
            };
            for value in change.old.iter().chain(change.new.iter()) {
                for id in reference_ids(value) {
                    batch.insert(kind, id);
                }
            }
        }
        batch
    }

    fn insert(&mut self, kind: EntityKind, id: &str) {
        self.ids.entry(kind).or_default().insert(id.to_string());
    }

    /// Check if nothing needs resolving
    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of lookups the batch needs
    pub(crate) fn kind_count(&self) -> usize {
        self.ids.len()
    }
}

/// Labels of resolved references
#[derive(Debug, Default)]
pub(crate) struct ResolvedReferences {
    labels: HashMap<(EntityKind, String), String>,
}

impl ResolvedReferences {
    /// Label of `id`, if the caller may read it
    pub(crate) fn label(&self, kind: EntityKind, id: &str) -> Option<&str> {
        self.labels
            .get(&(kind, id.to_string()))
            .map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn with_label(mut self, kind: EntityKind, id: &str, label: &str) -> Self {
        self.labels.insert((kind, id.to_string()), label.to_string());
        self
    }
}

/// Run one lookup per entity kind of `batch`, concurrently
///
/// # Errors
/// Returns the first failed lookup when `policy` is
/// [`LookupFailurePolicy::Propagate`].
pub(crate) async fn resolve<L: EntityLookup>(
    lookup: &L,
    access: &L::Access,
    batch: ReferenceBatch,
    policy: LookupFailurePolicy,
) -> Result<ResolvedReferences, LookupError> {
    let mut resolved = ResolvedReferences::default();
    if batch.is_empty() {
        return Ok(resolved);
    }

    tracing::debug!("resolving references of {} entity kinds", batch.kind_count());

    let lookups = batch.ids.into_iter().map(move |(kind, ids)| async move {
        let ids: Vec<String> = ids.into_iter().collect();
        let result = lookup.find_many(kind, &ids, access).await;
        (kind, ids.len(), result)
    });

    for (kind, requested, result) in join_all(lookups).await {
        match result {
            Ok(entities) => {
                for entity in entities.into_iter().filter(|entity| entity.kind() == kind) {
                    let label = entity.label();
                    resolved.labels.insert((kind, entity.id().to_string()), label);
                }
            }
            Err(err) => match policy {
                LookupFailurePolicy::Propagate => return Err(err),
                LookupFailurePolicy::Unresolvable => {
                    tracing::warn!("{kind} lookup of {requested} ids failed: {err}");
                }
            },
        }
    }

    Ok(resolved)
}

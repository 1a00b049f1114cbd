//! History formatter
//!
//! Rewrites raw changesets into what a reader sees: field titles, translated
//! change types and display values.
//!
//! # Phases
//!
//! 1. Collect every referenced id of the history, grouped by entity kind
//! 2. Resolve each group with a single lookup, bounded by the configured timeout
//! 3. Render every change synchronously from the resolved labels
//!
//! Output never depends on lookup completion order, and nothing is returned
//! unless every phase completes.

use crate::config::FormatterConfig;
use crate::display::Renderer;
use crate::error::FormatError;
use crate::lookup::EntityLookup;
use crate::resolve::{resolve, ReferenceBatch, ResolvedReferences};
use formhist_diff::{Change, ChangeKind, Changeset, RecordHistory};
use formhist_schema::FieldRegistry;
use std::future::Future;

/// Translation of user-facing keys
pub trait Translate: Send + Sync {
    /// Text shown for `key`
    fn translate(&self, key: &str) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

/// Translation returning every key unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Untranslated;

impl Translate for Untranslated {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Formats record histories against a field schema
pub struct ValueFormatter<'a, L: EntityLookup> {
    fields: &'a FieldRegistry,
    lookup: &'a L,
    config: FormatterConfig,
}

impl<'a, L: EntityLookup> ValueFormatter<'a, L> {
    /// Create formatter with default configuration
    #[must_use]
    pub fn new(fields: &'a FieldRegistry, lookup: &'a L) -> Self {
        Self {
            fields,
            lookup,
            config: FormatterConfig::default(),
        }
    }

    /// With configuration
    #[must_use]
    pub fn with_config(mut self, config: FormatterConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Format `history`, resolving references as `access` allows
    ///
    /// The input is left untouched; changesets and changes keep their order.
    ///
    /// # Errors
    /// - [`FormatError::Timeout`] when resolution exceeds the configured budget
    /// - [`FormatError::Lookup`] when a lookup fails under the propagate policy
    pub async fn format(
        &self,
        history: &[Changeset],
        access: &L::Access,
        translate: &dyn Translate,
    ) -> Result<RecordHistory, FormatError> {
        let refs = self.resolve_references(history, access).await?;
        Ok(self.render(history, &refs, translate))
    }

    /// Like [`format`](Self::format), abandoned as soon as `cancel` completes
    ///
    /// # Errors
    /// [`FormatError::Cancelled`] when `cancel` wins, otherwise as `format`.
    pub async fn format_until<C>(
        &self,
        history: &[Changeset],
        access: &L::Access,
        translate: &dyn Translate,
        cancel: C,
    ) -> Result<RecordHistory, FormatError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = cancel => {
                tracing::debug!("formatting cancelled by caller");
                Err(FormatError::Cancelled)
            }
            result = self.format(history, access, translate) => result,
        }
    }

    async fn resolve_references(
        &self,
        history: &[Changeset],
        access: &L::Access,
    ) -> Result<ResolvedReferences, FormatError> {
        let batch = ReferenceBatch::collect(history, self.fields);
        let resolution = resolve(self.lookup, access, batch, self.config.lookup_failure);

        match self.config.lookup_timeout() {
            Some(limit) => match tokio::time::timeout(limit, resolution).await {
                Ok(resolved) => Ok(resolved?),
                Err(_) => {
                    let millis = self.config.lookup_timeout_ms.unwrap_or_default();
                    tracing::warn!("reference resolution exceeded {millis}ms");
                    Err(FormatError::Timeout { millis })
                }
            },
            None => Ok(resolution.await?),
        }
    }

    fn render(
        &self,
        history: &[Changeset],
        refs: &ResolvedReferences,
        translate: &dyn Translate,
    ) -> RecordHistory {
        let renderer = Renderer::new(refs, &self.config);
        let labels = KindLabels::new(translate);

        let formatted: RecordHistory = history
            .iter()
            .map(|changeset| {
                Changeset::new(
                    changeset.timestamp,
                    changeset.author.clone(),
                    changeset
                        .changes
                        .iter()
                        .map(|change| self.render_change(change, &renderer, &labels))
                        .collect(),
                )
            })
            .collect();

        tracing::debug!("formatted {} changesets", formatted.len());
        formatted
    }

    fn render_change(&self, change: &Change, renderer: &Renderer<'_>, labels: &KindLabels) -> Change {
        let display_type = labels.get(change.kind);
        match self.fields.get(&change.field) {
            Some(field) => change.with_display(
                field.display_name(),
                display_type,
                change.old.as_ref().map(|value| renderer.render(field, value)),
                change.new.as_ref().map(|value| renderer.render(field, value)),
            ),
            None => change.with_display(
                change.field.as_str(),
                display_type,
                change.old.clone(),
                change.new.clone(),
            ),
        }
    }
}

/// Translated change type texts
struct KindLabels {
    add: String,
    modify: String,
    remove: String,
}

impl KindLabels {
    fn new(translate: &dyn Translate) -> Self {
        Self {
            add: translate.translate(ChangeKind::Add.as_str()),
            modify: translate.translate(ChangeKind::Modify.as_str()),
            remove: translate.translate(ChangeKind::Remove.as_str()),
        }
    }

    fn get(&self, kind: ChangeKind) -> &str {
        match kind {
            ChangeKind::Add => &self.add,
            ChangeKind::Modify => &self.modify,
            ChangeKind::Remove => &self.remove,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LookupFailurePolicy;
    use crate::error::LookupError;
    use crate::lookup::{Entity, EntityKind};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use formhist_schema::{Choice, FieldDescriptor, FieldKind};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashSet;
    use std::time::Duration;

    /// Records readable only when listed in the access set
    #[derive(Default)]
    struct Records {
        calls: Mutex<usize>,
        delay: Option<Duration>,
        broken: bool,
    }

    #[async_trait]
    impl EntityLookup for Records {
        type Access = HashSet<String>;

        async fn find_many(
            &self,
            kind: EntityKind,
            ids: &[String],
            access: &HashSet<String>,
        ) -> Result<Vec<Entity>, LookupError> {
            *self.calls.lock() += 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.broken {
                return Err(LookupError::Backend("query failed".into()));
            }
            Ok(ids
                .iter()
                .filter(|id| kind == EntityKind::Record && access.contains(*id))
                .map(|id| Entity::record(id, id.to_uppercase()))
                .collect())
        }
    }

    fn fields() -> FieldRegistry {
        [
            FieldDescriptor::new("color", FieldKind::Dropdown)
                .with_title("Color")
                .with_choices(vec![Choice::new("r", "Red"), Choice::new("b", "Blue")]),
            FieldDescriptor::new("links", FieldKind::Resources).with_title("Links"),
        ]
        .into_iter()
        .collect()
    }

    fn history() -> Vec<Changeset> {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        vec![
            Changeset::new(
                at,
                Some("u1".into()),
                vec![
                    Change::modify("color", json!("r"), Some(json!("b"))),
                    Change::add("links", json!(["r1", "r2"])),
                    Change::remove("legacy", json!(7)),
                ],
            ),
            Changeset::new(at, None, vec![Change::add("color", json!("r"))]),
        ]
    }

    fn access(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn formats_names_types_and_values() {
        let fields = fields();
        let lookup = Records::default();
        let formatter = ValueFormatter::new(&fields, &lookup);
        let translate = |key: &str| format!("<{key}>");

        let source = history();
        let formatted = formatter
            .format(&source, &access(&["r2"]), &translate)
            .await
            .unwrap();

        assert_eq!(formatted.len(), 2);
        let first = &formatted[0].changes;
        assert_eq!(first[0].display_name, "Color");
        assert_eq!(first[0].display_type.as_deref(), Some("<modify>"));
        assert_eq!(first[0].old, Some(json!("Red")));
        assert_eq!(first[0].new, Some(json!("Blue")));
        assert_eq!(first[1].new, Some(json!(["R2"])));
        assert_eq!(first[2].display_name, "legacy");
        assert_eq!(first[2].old, Some(json!(7)));
        assert_eq!(formatted[1].changes[0].display_type.as_deref(), Some("<add>"));
        assert_eq!(formatted[0].author.as_deref(), Some("u1"));

        // Input untouched
        assert_eq!(source, history());
        assert_eq!(*lookup.calls.lock(), 1);
    }

    #[tokio::test]
    async fn unreadable_references_are_dropped() {
        let fields = fields();
        let lookup = Records::default();
        let formatted = ValueFormatter::new(&fields, &lookup)
            .format(&history(), &access(&[]), &Untranslated)
            .await
            .unwrap();
        assert_eq!(formatted[0].changes[1].new, Some(json!([])));
    }

    #[tokio::test]
    async fn history_without_references_skips_lookup() {
        let fields = fields();
        let lookup = Records::default();
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let history = vec![Changeset::new(at, None, vec![Change::add("color", json!("b"))])];

        ValueFormatter::new(&fields, &lookup)
            .format(&history, &access(&[]), &Untranslated)
            .await
            .unwrap();
        assert_eq!(*lookup.calls.lock(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_times_out() {
        let fields = fields();
        let lookup = Records {
            delay: Some(Duration::from_secs(60)),
            ..Records::default()
        };
        let config = FormatterConfig::new().with_lookup_timeout(Duration::from_millis(100));

        let err = ValueFormatter::new(&fields, &lookup)
            .with_config(config)
            .format(&history(), &access(&["r1"]), &Untranslated)
            .await
            .unwrap_err();
        assert_eq!(err, FormatError::Timeout { millis: 100 });
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_wins_over_slow_lookup() {
        let fields = fields();
        let lookup = Records {
            delay: Some(Duration::from_secs(60)),
            ..Records::default()
        };
        let formatter = ValueFormatter::new(&fields, &lookup)
            .with_config(FormatterConfig::new().without_lookup_timeout());

        let err = formatter
            .format_until(
                &history(),
                &access(&["r1"]),
                &Untranslated,
                tokio::time::sleep(Duration::from_millis(10)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, FormatError::Cancelled);
    }

    #[tokio::test]
    async fn failure_policies() {
        let fields = fields();
        let lookup = Records {
            broken: true,
            ..Records::default()
        };

        let absorbed = ValueFormatter::new(&fields, &lookup)
            .format(&history(), &access(&["r1"]), &Untranslated)
            .await
            .unwrap();
        assert_eq!(absorbed[0].changes[1].new, Some(json!([])));

        let err = ValueFormatter::new(&fields, &lookup)
            .with_config(FormatterConfig::new().with_lookup_failure(LookupFailurePolicy::Propagate))
            .format(&history(), &access(&["r1"]), &Untranslated)
            .await
            .unwrap_err();
        assert!(matches!(err, FormatError::Lookup(LookupError::Backend(_))));
    }
}

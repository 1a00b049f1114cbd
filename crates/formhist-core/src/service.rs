//! History service
//!
//! Runs the whole pipeline for one record: pick the schema, reduce the
//! snapshot chain into raw changesets, then format them for the reader.

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use formhist_diff::{reduce, RecordHistory, SnapshotChain};
use formhist_format::{EntityLookup, Translate, Untranslated, ValueFormatter};
use formhist_schema::{extract, FieldDescriptor, FieldRegistry};
use serde_json::Value;
use std::future::Future;
use tracing::Instrument;

/// Inputs for rebuilding one record's history
pub struct HistoryRequest<'a, A> {
    /// Record being described, for tracing
    pub record_id: &'a str,
    /// Fields of the form the record was submitted against
    pub form_fields: &'a [FieldDescriptor],
    /// Fields of the resource behind the form, preferred when present
    pub resource_fields: Option<&'a [FieldDescriptor]>,
    /// Stored states of the record
    pub chain: &'a SnapshotChain,
    /// Caller permissions handed to the entity lookup
    pub access: &'a A,
    /// Translation of change type keys
    pub translate: &'a dyn Translate,
}

impl<'a, A> HistoryRequest<'a, A> {
    /// Request without schema or translation
    #[must_use]
    pub fn new(record_id: &'a str, chain: &'a SnapshotChain, access: &'a A) -> Self {
        Self {
            record_id,
            form_fields: &[],
            resource_fields: None,
            chain,
            access,
            translate: &Untranslated,
        }
    }

    /// With form fields
    #[must_use]
    pub fn with_form_fields(mut self, fields: &'a [FieldDescriptor]) -> Self {
        self.form_fields = fields;
        self
    }

    /// With resource fields
    #[must_use]
    pub fn with_resource_fields(mut self, fields: &'a [FieldDescriptor]) -> Self {
        self.resource_fields = Some(fields);
        self
    }

    /// With translation
    #[must_use]
    pub fn with_translate(mut self, translate: &'a dyn Translate) -> Self {
        self.translate = translate;
        self
    }

    /// Fields the history is displayed with
    #[must_use]
    pub fn fields(&self) -> &'a [FieldDescriptor] {
        self.resource_fields.unwrap_or(self.form_fields)
    }
}

/// Builds display-ready record histories
pub struct HistoryService<L: EntityLookup> {
    config: HistoryConfig,
    lookup: L,
}

impl<L: EntityLookup> HistoryService<L> {
    /// Create service
    #[must_use]
    pub fn new(config: HistoryConfig, lookup: L) -> Self {
        Self { config, lookup }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Entity lookup in use
    #[inline]
    #[must_use]
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Flatten a form structure into its field schema
    ///
    /// # Errors
    /// Returns [`HistoryError::Schema`] for a malformed structure
    pub fn schema(structure: &Value, is_core: bool) -> Result<Vec<FieldDescriptor>, HistoryError> {
        Ok(extract(structure, is_core)?)
    }

    /// Rebuild the history of a record, most recent transition first
    ///
    /// # Errors
    /// Returns [`HistoryError::Format`] when reference resolution times out
    /// or fails under the propagate policy
    pub async fn record_history(
        &self,
        request: HistoryRequest<'_, L::Access>,
    ) -> Result<RecordHistory, HistoryError> {
        self.record_history_until(request, std::future::pending()).await
    }

    /// Like [`record_history`](Self::record_history), abandoned when
    /// `cancel` completes
    ///
    /// # Errors
    /// Also returns [`HistoryError::Format`] when cancelled
    pub async fn record_history_until<C>(
        &self,
        request: HistoryRequest<'_, L::Access>,
        cancel: C,
    ) -> Result<RecordHistory, HistoryError>
    where
        C: Future<Output = ()>,
    {
        let span = tracing::info_span!("record_history", record = request.record_id);
        self.build(&request, cancel).instrument(span).await
    }

    async fn build<C>(
        &self,
        request: &HistoryRequest<'_, L::Access>,
        cancel: C,
    ) -> Result<RecordHistory, HistoryError>
    where
        C: Future<Output = ()>,
    {
        let fields: FieldRegistry = request.fields().iter().cloned().collect();
        let raw = reduce(request.chain);
        tracing::debug!(
            "reduced {} versions into {} changesets over {} fields",
            request.chain.versions.len(),
            raw.len(),
            fields.len()
        );

        let history = self
            .formatter(&fields)
            .format_until(&raw, request.access, request.translate, cancel)
            .await?;

        tracing::info!("history ready: {} changesets", history.len());
        Ok(history)
    }

    fn formatter<'f>(&'f self, fields: &'f FieldRegistry) -> ValueFormatter<'f, L> {
        ValueFormatter::new(fields, &self.lookup).with_config(self.config.formatter.clone())
    }
}

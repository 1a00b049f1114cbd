//! History configuration
//!
//! Loaded from TOML, YAML or JSON; every key is optional.
//!
//! ```toml
//! lookup_timeout_ms = 2000
//! lookup_failure = "propagate"
//! date_format = "%d/%m/%Y"
//! ```

use crate::error::HistoryError;
use formhist_format::{FormatterConfig, LookupFailurePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// History service configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Display formatting and reference resolution
    #[serde(flatten)]
    pub formatter: FormatterConfig,
}

impl HistoryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With lookup timeout
    #[inline]
    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.formatter = self.formatter.with_lookup_timeout(timeout);
        self
    }

    /// With lookup failure policy
    #[inline]
    #[must_use]
    pub fn with_lookup_failure(mut self, policy: LookupFailurePolicy) -> Self {
        self.formatter = self.formatter.with_lookup_failure(policy);
        self
    }

    /// With formatter configuration
    #[inline]
    #[must_use]
    pub fn with_formatter(mut self, formatter: FormatterConfig) -> Self {
        self.formatter = formatter;
        self
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Returns [`HistoryError::Config`] if the document is invalid or holds
    /// a pattern chrono cannot render
    pub fn from_toml_str(content: &str) -> Result<Self, HistoryError> {
        toml::from_str::<Self>(content)
            .map_err(|e| HistoryError::Config(e.to_string()))?
            .validated()
    }

    /// Parse from YAML
    ///
    /// # Errors
    /// Returns [`HistoryError::Config`] if the document is invalid or holds
    /// a pattern chrono cannot render
    pub fn from_yaml_str(content: &str) -> Result<Self, HistoryError> {
        serde_yaml::from_str::<Self>(content)
            .map_err(|e| HistoryError::Config(e.to_string()))?
            .validated()
    }

    /// Parse from JSON
    ///
    /// # Errors
    /// Returns [`HistoryError::Config`] if the document is invalid or holds
    /// a pattern chrono cannot render
    pub fn from_json_str(content: &str) -> Result<Self, HistoryError> {
        serde_json::from_str::<Self>(content)
            .map_err(|e| HistoryError::Config(e.to_string()))?
            .validated()
    }

    /// Check the formatter settings
    ///
    /// # Errors
    /// Returns [`HistoryError::Config`] for a date, date-time or time pattern
    /// chrono cannot render
    pub fn validated(self) -> Result<Self, HistoryError> {
        self.formatter
            .validate()
            .map_err(|e| HistoryError::Config(e.to_string()))?;
        Ok(self)
    }

    /// Load from a file, picking the format from its extension
    ///
    /// # Errors
    /// Returns [`HistoryError::Config`] if the file cannot be read, has an
    /// unknown extension or does not parse
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| HistoryError::Config(format!("{}: {e}", path.display())))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(HistoryError::Config(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let config = HistoryConfig::from_toml_str(
            r#"
            lookup_timeout_ms = 2000
            lookup_failure = "propagate"
            date_format = "%d/%m/%Y"
            "#,
        )
        .unwrap();
        assert_eq!(config.formatter.lookup_timeout_ms, Some(2000));
        assert_eq!(config.formatter.lookup_failure, LookupFailurePolicy::Propagate);
        assert_eq!(config.formatter.date_format, "%d/%m/%Y");
        assert_eq!(config.formatter.time_format, FormatterConfig::default().time_format);
    }

    #[test]
    fn yaml_and_json_agree() {
        let yaml = HistoryConfig::from_yaml_str("lookup_failure: propagate\n").unwrap();
        let json = HistoryConfig::from_json_str(r#"{"lookup_failure": "propagate"}"#).unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(HistoryConfig::from_json_str("{}").unwrap(), HistoryConfig::default());
    }

    #[test]
    fn invalid_documents_are_config_errors() {
        let err = HistoryConfig::from_json_str(r#"{"lookup_failure": "retry"}"#).unwrap_err();
        assert!(matches!(err, HistoryError::Config(_)));

        let err = HistoryConfig::from_path("settings.ini").unwrap_err();
        assert!(matches!(err, HistoryError::Config(_)));
    }

    #[test]
    fn unrenderable_patterns_are_config_errors() {
        let err = HistoryConfig::from_toml_str(r#"date_format = "%Q""#).unwrap_err();
        assert!(matches!(
            &err,
            HistoryError::Config(message) if message == r#"invalid date_format pattern: "%Q""#
        ));

        let err = HistoryConfig::from_yaml_str("datetime_format: \"%m/%d %Q\"\n").unwrap_err();
        assert!(matches!(err, HistoryError::Config(_)));

        let err = HistoryConfig::from_json_str(r#"{"time_format": "%Q"}"#).unwrap_err();
        assert!(matches!(err, HistoryError::Config(_)));

        assert!(HistoryConfig::new()
            .with_formatter(FormatterConfig::new().with_time_format("%H:%Q"))
            .validated()
            .is_err());
    }

    #[test]
    fn builders_reach_formatter() {
        let config = HistoryConfig::new()
            .with_lookup_timeout(Duration::from_millis(30))
            .with_lookup_failure(LookupFailurePolicy::Propagate);
        assert_eq!(config.formatter.lookup_timeout_ms, Some(30));
        assert_eq!(config.formatter.lookup_failure, LookupFailurePolicy::Propagate);
    }
}

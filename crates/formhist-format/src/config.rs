//! Formatter configuration

use crate::error::InvalidPattern;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do when a reference batch cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupFailurePolicy {
    /// Log the failure and treat every id of the batch as unresolved
    #[default]
    Unresolvable,
    /// Abort formatting with the lookup error
    Propagate,
}

/// Formatter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Budget for the whole reference resolution phase, unbounded when unset
    pub lookup_timeout_ms: Option<u64>,
    /// Reaction to a failed lookup batch
    pub lookup_failure: LookupFailurePolicy,
    /// `chrono` format of date values
    pub date_format: String,
    /// `chrono` format of date-time values
    pub datetime_format: String,
    /// `chrono` format of time values
    pub time_format: String,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: Some(5_000),
            lookup_failure: LookupFailurePolicy::Unresolvable,
            date_format: "%m/%d/%Y".to_string(),
            datetime_format: "%m/%d/%Y, %-I:%M:%S %p".to_string(),
            time_format: "%H:%M:%S".to_string(),
        }
    }
}

impl FormatterConfig {
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
        self.lookup_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Without lookup timeout
    #[inline]
    #[must_use]
    pub fn without_lookup_timeout(mut self) -> Self {
        self.lookup_timeout_ms = None;
        self
    }

    /// With lookup failure policy
    #[inline]
    #[must_use]
    pub fn with_lookup_failure(mut self, policy: LookupFailurePolicy) -> Self {
        self.lookup_failure = policy;
        self
    }

    /// With date format
    #[inline]
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// With date-time format
    #[inline]
    #[must_use]
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    /// With time format
    #[inline]
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Lookup timeout as a duration
    #[inline]
    #[must_use]
    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }

    /// Check that every temporal pattern is one chrono can render
    ///
    /// # Errors
    /// Returns the first [`InvalidPattern`] found
    pub fn validate(&self) -> Result<(), InvalidPattern> {
        [
            ("date_format", &self.date_format),
            ("datetime_format", &self.datetime_format),
            ("time_format", &self.time_format),
        ]
        .into_iter()
        .try_for_each(|(setting, pattern)| {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(InvalidPattern {
                    setting,
                    pattern: pattern.clone(),
                });
            }
            Ok(())
        })
    }
}

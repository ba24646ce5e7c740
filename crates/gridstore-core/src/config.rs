//! Module: config
//! Responsibility: reference-store tuning knobs and their JSON loading.

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid store config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_query_ranges must be greater than zero")]
    ZeroMaxRanges,
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Config, err.to_string())
    }
}

///
/// StoreConfig
///
/// Every field is optional in serialized form.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Narrow scans to the index strategy's query ranges when a query
    /// supplies constraints.
    pub range_scan: bool,

    /// Upper bound forwarded to `IndexStrategy::query_ranges`.
    pub max_query_ranges: Option<usize>,

    /// Limit applied when a query does not set one.
    pub default_limit: Option<usize>,
}

impl StoreConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.max_query_ranges, Some(0)) {
            return Err(ConfigError::ZeroMaxRanges);
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            range_scan: true,
            max_query_ranges: None,
            default_limit: None,
        }
    }
}

///
/// TESTS
///

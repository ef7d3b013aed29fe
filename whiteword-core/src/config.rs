//! Tokenizer configuration
//!
//! The environment is read only by [`TokenizerConfig::from_env`], which
//! belongs to process bootstrap. Sessions receive an already-resolved
//! config.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Table bound when nothing else is configured
pub const DEFAULT_TABLE_NAME: &str = "white_words";

/// Environment variable overriding [`DEFAULT_TABLE_NAME`]
pub const TABLE_NAME_ENV: &str = "WHITE_TABLE_NAME";

/// Hits fetched from the dictionary per scan
pub const DEFAULT_BATCH_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerConfig {
    /// Name of the catalog table to bind
    pub table_name: String,
    /// Upper bound on hits held in memory at once
    pub batch_capacity: NonZeroUsize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            batch_capacity: DEFAULT_BATCH_CAPACITY,
        }
    }
}

impl TokenizerConfig {
    /// Defaults, with the table name taken from `WHITE_TABLE_NAME` when set
    pub fn from_env() -> Self {
        Self::default().with_env_table_name(std::env::var(TABLE_NAME_ENV).ok())
    }

    fn with_env_table_name(self, name: Option<String>) -> Self {
        match name {
            Some(name) if !name.is_empty() => self.with_table_name(name),
            _ => self,
        }
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            // serde reports a zero NonZeroUsize as a generic invalid value
            if json_has_zero_capacity(json) {
                ConfigError::ZeroBatchCapacity
            } else {
                ConfigError::Json(err)
            }
        })?;
        config.validate()
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    pub fn with_batch_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        self.batch_capacity = NonZeroUsize::new(capacity).ok_or(ConfigError::ZeroBatchCapacity)?;
        Ok(self)
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.table_name.is_empty() {
            return Err(ConfigError::EmptyTableName);
        }
        Ok(self)
    }
}

fn json_has_zero_capacity(json: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|value| value.get("batch_capacity")?.as_u64())
        == Some(0)
}

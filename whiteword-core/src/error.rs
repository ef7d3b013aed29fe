//! Error types for opening tokenizer sessions and loading configuration

use std::collections::TryReserveError;

use thiserror::Error;

use crate::table::TableKind;

/// Errors detected once, when a session is opened
///
/// Nothing is reported mid-stream: per-token problems degrade to `SKIP`
/// tokens instead.
#[derive(Debug, Error)]
pub enum TokenizerError {
    /// The hit buffer could not be reserved
    #[error("[tokenizer][white] failed to allocate hit buffer")]
    AllocationFailed(#[from] TryReserveError),

    /// The bound table cannot be scanned for matches
    #[error("[tokenizer][white] table ({name}) must be a patricia-key table, found {kind}")]
    IncompatibleDictionary { name: String, kind: TableKind },

    /// No table is registered under the configured name
    #[error("[tokenizer][white] failed to find table ({name})")]
    DictionaryUnavailable { name: String },
}

/// Errors produced while building a [`TokenizerConfig`](crate::TokenizerConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid tokenizer config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("batch capacity must be at least 1")]
    ZeroBatchCapacity,

    #[error("table name must not be empty")]
    EmptyTableName,
}

pub type Result<T, E = TokenizerError> = std::result::Result<T, E>;

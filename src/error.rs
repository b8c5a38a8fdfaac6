// src/error.rs
//! Error taxonomy for the batch run.
//!
//! Configuration and exhausted-retry store errors are fatal; source and
//! per-row failures are logged and swallowed so the run proceeds with the
//! union of whatever sources succeeded.

use thiserror::Error;

/// Required configuration cell missing or malformed. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration cell {cell} ({what})")]
    MissingCell { cell: String, what: &'static str },
    #[error("weight in cell {cell} is not percent-formatted: {value:?}")]
    BadWeight { cell: String, value: String },
    #[error("unparsable date in cell {cell}: {value:?}")]
    BadDate { cell: String, value: String },
    #[error("configuration store error: {0}")]
    Store(#[from] StoreError),
}

/// Failure talking to the spreadsheet workspace.
#[derive(Debug, Error)]
#[error("sheet store error on {op}: {message}")]
pub struct StoreError {
    pub op: &'static str,
    pub message: String,
    /// Rate limit / transient API failure: retried with backoff.
    /// Permanent errors (not found, auth) abort immediately.
    pub transient: bool,
}

impl StoreError {
    pub fn permanent(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
            transient: false,
        }
    }

    pub fn transient(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
            transient: true,
        }
    }
}

/// A source feed failed wholesale (HTTP error, empty ZIP, no CSVs).
/// Non-fatal: the source contributes an empty set.
///
/// `Error` is implemented manually because the field is named `source`,
/// which the `thiserror` derive would otherwise treat as the error cause.
#[derive(Debug)]
pub struct SourceError {
    pub source: &'static str,
    pub message: String,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source {} failed: {}", self.source, self.message)
    }
}

impl std::error::Error for SourceError {}

impl SourceError {
    pub fn new(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }
}

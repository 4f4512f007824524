//! Error types for the census tool.
//!
//! Record-store failures are the only errors the statistics code can see;
//! they propagate unchanged through every demographic operation.

use std::path::PathBuf;

/// Result type for record-store queries.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by a [`crate::store::ResidentSource`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying query could not be executed.
    #[error("Query error: {message} (operation={operation})")]
    Query { operation: String, message: String },

    /// A page size of zero can never make progress.
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),
}

impl StoreError {
    /// Create a query error for the named operation.
    pub fn query(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while reading the residents CSV.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Residents file has no {0} column")]
    MissingColumn(&'static str),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised while reading the TOML configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level error for the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Invalid --as-of date '{0}', expected YYYY-MM-DD")]
    AsOf(String),
}

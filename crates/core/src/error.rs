//! Error types for the Registrar core crate.

use thiserror::Error;

/// Top-level error type for all Registrar operations.
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    #[error("endpoint did not return a paginated response: {url}")]
    PaginationUnsupported { url: String },

    #[error("unable to find field \"{field}\" in import response; see debug log for response data")]
    FieldNotFound { field: String },

    #[error("SIS import took {elapsed_secs} seconds; max allowed import time is {limit_secs} seconds")]
    ImportTimeout { elapsed_secs: u64, limit_secs: u64 },

    #[error("SIS import errors occurred in: {}", .files.join(", "))]
    SisImport { files: Vec<String> },

    #[error("book lookup error: {0}")]
    Books(String),
}

/// A convenience Result alias that defaults to [`RegistrarError`].
pub type Result<T> = std::result::Result<T, RegistrarError>;

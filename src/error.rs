//! Crate-wide error types.
//!
//! Each concern gets its own small enum; they compose into [`AppError`] via
//! `#[from]` rather than being flattened into one catch-all.

use thiserror::Error;

/// Failures raised while building or querying the [`crate::catalogue::Catalogue`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("unknown stop: {0}")]
    UnknownStop(String),

    #[error("unknown bus: {0}")]
    UnknownBus(String),

    #[error("duplicate stop: {0}")]
    DuplicateStop(String),
}

/// Shorthand result type for catalogue operations.
pub type CatalogueResult<T> = Result<T, CatalogueError>;

/// Failures raised while parsing or dispatching a JSON request document.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("unknown request type: {0}")]
    UnknownType(String),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type RequestResult<T> = Result<T, RequestError>;

/// Failures raised while writing or reading a persisted bundle.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("bundle version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Top-level error type for the binary's `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("usage: transit-router <make_base|process_requests>")]
    Usage,

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}

pub type AppResult<T> = Result<T, AppError>;

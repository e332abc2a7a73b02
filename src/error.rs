//! Errors at the collaborator seams. Core mutators never fail; they report
//! whether they applied.

use std::path::PathBuf;

use thiserror::Error;

use crate::id::ViewerId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    BadValue { key: &'static str, value: String },
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse catalog {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion service returned no choices")]
    Empty,
    #[error("completion timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("{0} is not connected")]
    Disconnected(ViewerId),
    #[error("could not encode notice: {0}")]
    Encode(#[from] serde_json::Error),
}

//! Error types for the booleans API client.
//!
//! # Design
//! HTTP failures are not split by status: 404, 401 and 5xx all land in
//! `Http` with the status line and raw body, and callers that care can
//! branch on `ApiError::status`. Local contract violations (reading a field
//! before fetching, seeding a handle with another record) get their own
//! variants because they never reach the network.

use thiserror::Error;

/// Errors returned by the client, its transports and its handles.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A field was read (or a toggle attempted) before the handle's cache
    /// was populated.
    #[error("boolean has not been fetched yet; call fetch() first")]
    NotFetched,

    /// Initial data handed to a handle belongs to a different boolean.
    #[error("initial data id {found:?} does not match handle id {expected:?}")]
    IdMismatch { expected: String, found: String },

    /// The server answered with a non-2xx status.
    #[error("unexpected HTTP {status}: {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request never completed.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The id cannot name a single path segment below the collection root.
    #[error("invalid boolean id {0:?}")]
    InvalidId(String),

    /// The base URL cannot have path segments appended to it.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

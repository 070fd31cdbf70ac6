//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers often branch on it.
//! Every other non-2xx response lands in `Http`, whose message carries the
//! status text the server replied with.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("{operation}: todo not found")]
    NotFound { operation: &'static str },

    /// The server returned a non-2xx status other than 404.
    #[error("{operation}: HTTP {status} {status_text}: {body}")]
    Http {
        operation: &'static str,
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request never produced an HTTP response.
    #[error("{operation}: transport error: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

//! Error types for the todo server.
//!
//! # Design
//! Validation failures (`InvalidInput`, `NotFound`) are expected outcomes and
//! map to 4xx responses carrying a short message. Anything raised by SQLite
//! or the filesystem is an internal failure: it is logged and reported to the
//! caller as a generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use todo_types::ErrorBody;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed identifier, missing/blank title, or undecodable body.
    #[error("{0}")]
    InvalidInput(String),

    /// No todo exists for the given identifier.
    #[error("Todo not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A previous store operation panicked while holding the connection.
    #[error("store connection poisoned")]
    StorePoisoned,

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Database(_) | Error::Io(_) | Error::StorePoisoned | Error::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

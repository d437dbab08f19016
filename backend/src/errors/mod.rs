//! Global application error types and handlers.
//!
//! `ApiError` is what every handler returns on failure. It renders as a JSON
//! body of the form `{ "error": "<message>" }`. Internal failures keep their
//! source for the log and only expose the public message to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}: {source}")]
    Internal {
        message: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to clients.
    pub fn public_message(&self) -> &str {
        match self {
            Self::BadRequest(message) | Self::NotFound(message) => message.as_str(),
            Self::Internal { message, .. } => *message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal { message, source } = &self {
            tracing::error!(error = %source, "{message}");
        }
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

/// Attaches a public message to internal failures.
pub trait Context<T> {
    fn context(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::Internal {
            message,
            source: Box::new(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn internal_errors_hide_their_source() {
        let result: Result<(), io::Error> = Err(io::Error::other("connection reset"));
        let err = result.context("Failed to fetch campaigns").unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Failed to fetch campaigns");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn client_errors_map_to_status() {
        assert_eq!(ApiError::bad_request("Invalid count").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("Campaign not found").status(), StatusCode::NOT_FOUND);
    }
}

//! Shared primitives for all Rust crates in pamsync.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across pamsync crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common connector error categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input, label, or configuration value.
    #[error("validation error: {0}")]
    Validation(String),

    /// A record the operation depends on does not exist upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// The OAuth token request failed or returned no token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// An upstream REST call returned a non-success status or never completed.
    #[error("Issue when trying to perform {operation} - {} - {body}", status_label(.status))]
    Upstream {
        /// Logical call name, e.g. `List Accounts`.
        operation: String,
        /// HTTP status, absent when the request failed before a response.
        status: Option<u16>,
        /// Response body or transport error text.
        body: String,
    },

    /// The requested attribute change operation is not supported.
    #[error("operation not supported: {0}")]
    UnsupportedOperation(String),

    /// An upstream response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an upstream failure for a named call.
    #[must_use]
    pub fn upstream(
        operation: impl Into<String>,
        status: Option<u16>,
        body: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".to_owned(), |status| status.to_string())
}

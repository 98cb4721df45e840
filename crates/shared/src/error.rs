//! Transport-neutral error body.
//!
//! Every domain error renders into an [`ErrorBody`] before it leaves the core:
//! a stable machine-readable code, a human message, the status class and a
//! structured payload of the identifiers and values involved. Low-level causes
//! never appear here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rendered form of a failure, ready to be serialized by a transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code (e.g. `ACCOUNT_NOT_FOUND`).
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// HTTP-style status class (400, 404, 500...).
    pub status: u16,
    /// Identifiers and values relevant to the failure.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl ErrorBody {
    /// Creates a body without details.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
            details: Map::new(),
        }
    }

    /// Adds a detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns true for 4xx bodies.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for (key, value) in &self.details {
            write!(f, ", {key}={value}")?;
        }
        Ok(())
    }
}

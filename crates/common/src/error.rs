//! The orchestration error value and its taxonomy.

use serde_json::Value;
use thiserror::Error;

/// Category of an [`OrchestrationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A business invariant was violated (400).
    Validation,
    /// The caller did not present a bearer token (401).
    Auth,
    /// A downstream service failed, timed out, or could not be reached.
    Upstream,
    /// Unexpected failure or an undecodable response body (500).
    Internal,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Auth => "auth",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Internal => "internal",
        }
    }
}

/// The sole error value produced by the workflows.
///
/// Carries enough to render a boundary response: a human readable message,
/// the HTTP status to answer with, and optional structured details.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct OrchestrationError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: u16,
    pub details: Option<Value>,
}

impl OrchestrationError {
    /// A violated business invariant.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            status_code: 400,
            details: None,
        }
    }

    /// A violated business invariant with structured details.
    pub fn validation_with_details(message: impl Into<String>, details: Value) -> Self {
        Self {
            details: Some(details),
            ..Self::validation(message)
        }
    }

    /// Missing credentials at the boundary.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Auth,
            message: message.into(),
            status_code: 401,
            details: None,
        }
    }

    /// A downstream error response, status passed through verbatim.
    pub fn upstream(status_code: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            kind: ErrorKind::Upstream,
            message: message.into(),
            status_code,
            details,
        }
    }

    /// A downstream call exceeded its timeout.
    pub fn timeout() -> Self {
        Self::upstream(504, "Timeout al comunicarse con el microservicio", None)
    }

    /// A downstream service could not be reached.
    pub fn unavailable() -> Self {
        Self::upstream(503, "No se pudo conectar con el microservicio", None)
    }

    /// Unexpected failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
            status_code: 500,
            details: None,
        }
    }

    /// Returns the `details.<key>` value, if present.
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref().and_then(|d| d.get(key))
    }
}

/// Convenience type alias for orchestration results.
pub type Result<T> = std::result::Result<T, OrchestrationError>;

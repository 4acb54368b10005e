//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic failures of pure domain code. Availability, existence and
/// storage concerns belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (malformed input, zero delta, unknown reason code).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A custom-material snapshot is missing one of its required fields.
    #[error("incomplete custom material: `{field}` is required")]
    IncompleteMaterial { field: &'static str },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn incomplete(field: &'static str) -> Self {
        Self::IncompleteMaterial { field }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

use thiserror::Error;

use konveksi_core::DomainError;

use crate::store::StoreError;

/// Error surfaced by the inventory services.
///
/// Deterministic failures (`Validation` through `Conflict`) leave the store
/// untouched. `Persistence` wraps a store failure; nothing partial is visible
/// afterwards and the call is safe to retry.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("custom material is incomplete: `{field}` is required")]
    IncompleteMaterial { field: &'static str },

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Persistence(StoreError),
}

impl InventoryError {
    /// A lost optimistic-concurrency race; re-reading and retrying may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(StoreError::Concurrency(_)))
    }
}

impl From<DomainError> for InventoryError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::InvalidId(msg) => Self::Validation(format!("invalid id: {msg}")),
            DomainError::IncompleteMaterial { field } => Self::IncompleteMaterial { field },
        }
    }
}

/// Integrity rejections from the store are caller errors, not infrastructure ones.
impl From<StoreError> for InventoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingRecord(what) => Self::NotFound(what),
            StoreError::StillReferenced(msg) => Self::Conflict(msg),
            StoreError::StockOverflow(msg) => Self::Validation(msg),
            other => Self::Persistence(other),
        }
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

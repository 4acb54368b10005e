//! Stock ledger domain module.
//!
//! Stock is never a stored number: it is the sum of immutable, signed
//! transactions appended per subject (raw material or variant). This crate
//! holds the transaction model and the pure projection over it (no IO).

pub mod projection;
pub mod transaction;

pub use projection::{ProjectionError, StockProjection, stream_version};
pub use transaction::{
    NewStockTransaction, StockTransaction, Subject, SubjectKind, TransactionReason,
};

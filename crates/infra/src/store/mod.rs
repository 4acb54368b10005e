//! Transactional inventory store boundary.
//!
//! Catalog records and the stock ledger are written together through a
//! `UnitOfWork` so a variant and the transactions it causes land atomically.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{FaultPoint, InMemoryInventoryStore};
pub use postgres::PostgresInventoryStore;
pub use r#trait::{CommitReceipt, InventoryStore, StoreError, UnitOfWork};

//! Infrastructure layer: stores, configuration, and the inventory services
//! that tie the sourcing resolver to the stock ledger.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod ledger;
pub mod materials;
pub mod movements;
pub mod provisioning;
pub mod retry;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use config::{ConfigError, InventoryConfig, StoreBackend};
pub use error::{InventoryError, InventoryResult};
pub use ledger::{StockLedger, StockReading};
pub use materials::MaterialRegistry;
pub use movements::StockMovementService;
pub use provisioning::{MaterialMovement, VariantProvisioningService, reconcile};
pub use store::{
    CommitReceipt, FaultPoint, InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError,
    UnitOfWork,
};

//! Raw-material registry.
//!
//! Registration is the only place a material's opening stock is recorded (as an
//! INIT transaction in the same unit of work). Detail edits never touch stock.

use chrono::Utc;
use tracing::info;

use konveksi_catalog::{MaterialDetails, RawMaterial, RawMaterialDraft, RawMaterialRecord};
use konveksi_core::RawMaterialId;
use konveksi_ledger::{NewStockTransaction, StockProjection, Subject, TransactionReason};

use crate::config::InventoryConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::ledger::StockLedger;
use crate::retry::with_commit_retry;
use crate::store::{InventoryStore, StoreError, UnitOfWork};

pub struct MaterialRegistry<S> {
    ledger: StockLedger<S>,
    max_commit_attempts: u32,
}

impl<S: InventoryStore> MaterialRegistry<S> {
    pub fn new(store: S, config: &InventoryConfig) -> Self {
        Self {
            ledger: StockLedger::new(store),
            max_commit_attempts: config.max_commit_attempts,
        }
    }

    pub fn register(&self, draft: &RawMaterialDraft) -> InventoryResult<RawMaterial> {
        let now = Utc::now();
        let record = RawMaterialRecord::register(RawMaterialId::new(), draft, now)?;

        let mut work = UnitOfWork::new();
        work.put_material(record.clone());
        if draft.opening_stock > 0 {
            work.append(
                NewStockTransaction::new(record.id, draft.opening_stock, TransactionReason::Init, now)?
                    .with_note("opening stock"),
            );
        }
        self.ledger.store().commit(work)?;

        info!(
            material_id = %record.id,
            name = %record.details.name,
            opening_stock = draft.opening_stock,
            "raw material registered"
        );
        self.with_stock(record)
    }

    pub fn get(&self, id: RawMaterialId) -> InventoryResult<RawMaterial> {
        let record = self
            .ledger
            .store()
            .raw_material(id)?
            .ok_or_else(|| InventoryError::NotFound(format!("raw material {id}")))?;
        self.with_stock(record)
    }

    pub fn list(&self) -> InventoryResult<Vec<RawMaterial>> {
        let store = self.ledger.store();
        let records = store.raw_materials()?;
        let log = store.all_transactions()?;
        let projection = StockProjection::from_log(&log).map_err(|e| StoreError::Corrupted(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|record| {
                let stock = projection.stock(Subject::from(record.id));
                RawMaterial { record, stock }
            })
            .collect())
    }

    /// Materials at or below their reorder threshold.
    pub fn below_buffer(&self) -> InventoryResult<Vec<RawMaterial>> {
        Ok(self.list()?.into_iter().filter(RawMaterial::below_buffer).collect())
    }

    /// Replace descriptive fields. Stock is unaffected.
    pub fn update_details(&self, id: RawMaterialId, details: MaterialDetails) -> InventoryResult<RawMaterial> {
        let record = with_commit_retry("update_material", self.max_commit_attempts, || {
            let current = self
                .ledger
                .store()
                .raw_material(id)?
                .ok_or_else(|| InventoryError::NotFound(format!("raw material {id}")))?;
            let revised = current.revise(details.clone(), Utc::now())?;

            let mut work = UnitOfWork::new();
            work.put_material(revised.clone());
            self.ledger.store().commit(work)?;
            Ok(revised)
        })?;

        info!(material_id = %id, revision = record.revision, "raw material updated");
        self.with_stock(record)
    }

    /// Remove a material no variant references. Its ledger history is kept.
    pub fn remove(&self, id: RawMaterialId) -> InventoryResult<()> {
        let users = self.ledger.store().variants_using_material(id)?;
        if !users.is_empty() {
            return Err(InventoryError::Conflict(format!(
                "raw material {id} is used by {} variant(s)",
                users.len()
            )));
        }

        let mut work = UnitOfWork::new();
        work.remove_material(id);
        self.ledger.store().commit(work)?;

        info!(material_id = %id, "raw material removed");
        Ok(())
    }

    fn with_stock(&self, record: RawMaterialRecord) -> InventoryResult<RawMaterial> {
        let stock = self.ledger.reading(Subject::from(record.id))?.stock;
        Ok(RawMaterial { record, stock })
    }
}

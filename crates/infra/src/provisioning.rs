//! Variant provisioning: create/update variants and keep raw-material stock in
//! step with the material they consume.
//!
//! ## Flow
//!
//! ```text
//! VariantDraft
//!   ↓
//! 1. Validate refs, resolve sourcing (pure)
//!   ↓
//! 2. Reconcile consumption against the previous sourcing (pure)
//!   ↓
//! 3. Check every consumed quantity against the material's projected stock,
//!    recording the stream version that was read
//!   ↓
//! 4. Commit variant record + transactions as one unit of work
//!   ↓
//! 5. Re-read the variant's stock from the ledger
//! ```
//!
//! Step 4 fails with a concurrency error when any stream read in step 3 moved;
//! the whole cycle is then re-run up to `max_commit_attempts` times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use konveksi_catalog::{Variant, VariantDraft, VariantRecord};
use konveksi_core::{ExpectedVersion, RawMaterialId, VariantId};
use konveksi_ledger::{NewStockTransaction, StockProjection, Subject, TransactionReason};
use konveksi_sourcing::{SourcingDecision, SourcingInput, resolve};

use crate::config::InventoryConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::ledger::StockLedger;
use crate::retry::with_commit_retry;
use crate::store::{InventoryStore, StoreError, UnitOfWork};

/// One raw-material movement caused by a sourcing change.
/// Negative `delta` consumes material, positive returns it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialMovement {
    pub material: RawMaterialId,
    pub delta: i64,
}

/// Raw-material movements needed to go from `old` to `new` sourcing.
///
/// Only `Existing` sourcing consumes material. On the same material the net
/// difference is emitted as one movement; otherwise the old consumption is
/// returned in full and the new one consumed in full.
pub fn reconcile(old: &SourcingDecision, new: &SourcingDecision) -> Vec<MaterialMovement> {
    match (old.consumption(), new.consumption()) {
        (Some((before, old_qty)), Some((after, new_qty))) if before == after => {
            let change = new_qty - old_qty;
            if change == 0 {
                vec![]
            } else {
                vec![MaterialMovement {
                    material: after,
                    delta: -change,
                }]
            }
        }
        (old, new) => {
            let mut movements = Vec::with_capacity(2);
            if let Some((material, qty)) = old.filter(|(_, q)| *q > 0) {
                movements.push(MaterialMovement { material, delta: qty });
            }
            if let Some((material, qty)) = new.filter(|(_, q)| *q > 0) {
                movements.push(MaterialMovement { material, delta: -qty });
            }
            movements
        }
    }
}

pub struct VariantProvisioningService<S> {
    ledger: StockLedger<S>,
    max_commit_attempts: u32,
}

impl<S: InventoryStore> VariantProvisioningService<S> {
    pub fn new(store: S, config: &InventoryConfig) -> Self {
        Self {
            ledger: StockLedger::new(store),
            max_commit_attempts: config.max_commit_attempts,
        }
    }

    pub fn ledger(&self) -> &StockLedger<S> {
        &self.ledger
    }

    /// Resolve editor input into a sourcing decision without writing anything.
    pub fn resolve_sourcing(&self, input: &SourcingInput) -> InventoryResult<SourcingDecision> {
        Ok(resolve(input, Utc::now())?)
    }

    pub fn create_variant(&self, draft: &VariantDraft) -> InventoryResult<Variant> {
        draft.validate()?;
        let id = VariantId::new();

        let record = with_commit_retry("create_variant", self.max_commit_attempts, || {
            let now = Utc::now();
            let sourcing = resolve(&draft.sourcing, now)?;
            let record = VariantRecord::create(id, draft, sourcing, now);

            let mut work = UnitOfWork::new();
            work.expect(id, ExpectedVersion::Exact(0))
                .put_variant(record.clone());
            if draft.initial_stock > 0 {
                work.append(
                    NewStockTransaction::new(id, draft.initial_stock, TransactionReason::Init, now)?
                        .with_note("initial stock"),
                );
            }
            let movements = reconcile(&SourcingDecision::None, &record.sourcing);
            self.stage_movements(&mut work, id, &record.sourcing, &movements, now)?;

            self.ledger.store().commit(work)?;
            Ok(record)
        })
        .inspect_err(|err| warn!(error = %err, "create_variant rejected"))?;

        info!(
            variant_id = %record.id,
            sourcing_mode = %record.sourcing.mode(),
            initial_stock = draft.initial_stock,
            "variant created"
        );
        self.with_stock(record)
    }

    /// Re-resolve sourcing and reconcile material consumption. `initial_stock`
    /// in the draft is ignored.
    pub fn update_variant(&self, id: VariantId, draft: &VariantDraft) -> InventoryResult<Variant> {
        draft.validate_refs()?;

        let (record, movements) = with_commit_retry("update_variant", self.max_commit_attempts, || {
            let current = self
                .ledger
                .store()
                .variant(id)?
                .ok_or_else(|| InventoryError::NotFound(format!("variant {id}")))?;

            let now = Utc::now();
            let sourcing = resolve(&draft.sourcing, now)?;
            let record = current.revise(draft, sourcing, now);
            let movements = reconcile(&current.sourcing, &record.sourcing);

            let mut work = UnitOfWork::new();
            work.put_variant(record.clone());
            self.stage_movements(&mut work, id, &record.sourcing, &movements, now)?;

            self.ledger.store().commit(work)?;
            Ok((record, movements))
        })
        .inspect_err(|err| warn!(variant_id = %id, error = %err, "update_variant rejected"))?;

        info!(
            variant_id = %record.id,
            sourcing_mode = %record.sourcing.mode(),
            revision = record.revision,
            material_movements = movements.len(),
            "variant updated"
        );
        self.with_stock(record)
    }

    pub fn get_variant(&self, id: VariantId) -> InventoryResult<Variant> {
        let record = self
            .ledger
            .store()
            .variant(id)?
            .ok_or_else(|| InventoryError::NotFound(format!("variant {id}")))?;
        self.with_stock(record)
    }

    /// All variants with stock projected from one pass over the log.
    pub fn list_variants(&self) -> InventoryResult<Vec<Variant>> {
        let store = self.ledger.store();
        let records = store.variants()?;
        let log = store.all_transactions()?;
        let projection = StockProjection::from_log(&log).map_err(|e| StoreError::Corrupted(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|record| {
                let stock = projection.stock(Subject::from(record.id));
                Variant { record, stock }
            })
            .collect())
    }

    /// Validate availability for every consumption and stage the PRODUCTION
    /// transactions, guarding each consumed material's stream.
    fn stage_movements(
        &self,
        work: &mut UnitOfWork,
        variant: VariantId,
        sourcing: &SourcingDecision,
        movements: &[MaterialMovement],
        now: DateTime<Utc>,
    ) -> InventoryResult<()> {
        if let Some(material) = sourcing.material_ref() {
            if self.ledger.store().raw_material(material)?.is_none() {
                return Err(InventoryError::NotFound(format!("raw material {material}")));
            }
        }

        for movement in movements {
            let note = if movement.delta < 0 {
                let subject = Subject::from(movement.material);
                let reading = self.ledger.reading(subject)?;
                let requested = -movement.delta;
                if requested > reading.stock {
                    return Err(InventoryError::InsufficientStock {
                        requested,
                        available: reading.stock,
                    });
                }
                work.expect(subject, ExpectedVersion::Exact(reading.version));
                format!("consumed by variant {variant}")
            } else {
                format!("returned from variant {variant}")
            };

            work.append(
                NewStockTransaction::new(movement.material, movement.delta, TransactionReason::Production, now)?
                    .with_note(note),
            );
        }
        Ok(())
    }

    fn with_stock(&self, record: VariantRecord) -> InventoryResult<Variant> {
        let stock = self.ledger.reading(Subject::from(record.id))?.stock;
        Ok(Variant { record, stock })
    }
}

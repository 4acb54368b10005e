use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};

use konveksi_catalog::{RawMaterialRecord, VariantRecord};
use konveksi_core::{RawMaterialId, TransactionId, VariantId};
use konveksi_ledger::{StockTransaction, Subject, stream_version};

use super::r#trait::{CommitReceipt, InventoryStore, StoreError, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct State {
    materials: BTreeMap<RawMaterialId, RawMaterialRecord>,
    variants: BTreeMap<VariantId, VariantRecord>,
    streams: HashMap<Subject, Vec<StockTransaction>>,
}

impl State {
    fn version(&self, subject: Subject) -> u64 {
        self.streams
            .get(&subject)
            .map(|s| stream_version(s))
            .unwrap_or(0)
    }

    /// Stock after appending `delta` to the subject's stream, if it fits in `i64`.
    fn stock_after(&self, subject: Subject, delta: i64) -> Option<i64> {
        self.streams
            .get(&subject)
            .map_or(Some(0), |s| s.iter().try_fold(0i64, |acc, tx| acc.checked_add(tx.delta)))?
            .checked_add(delta)
    }

    fn has_record(&self, subject: Subject) -> bool {
        match subject {
            Subject::RawMaterial(id) => self.materials.contains_key(&id),
            Subject::Variant(id) => self.variants.contains_key(&id),
        }
    }
}

/// Where the next commit should fail, for exercising all-or-nothing behavior.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaultPoint {
    /// After records are staged, before any transaction is appended.
    BeforeAppends,
    /// Right before appending the transaction at this index of the unit of work.
    BeforeAppend(usize),
}

/// In-memory inventory store.
///
/// Intended for tests/dev. Not optimized for performance: every commit stages
/// a full copy of the state under one write lock and swaps it in on success,
/// which makes commits serializable and all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<State>,
    fault: Mutex<Option<FaultPoint>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit fail at `point` (one-shot).
    pub fn inject_fault(&self, point: FaultPoint) {
        if let Ok(mut fault) = self.fault.lock() {
            *fault = Some(point);
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

fn check_revision(kind: &str, id: impl core::fmt::Display, stored: u64, staged: u64) -> Result<(), StoreError> {
    if staged != stored + 1 {
        return Err(StoreError::Concurrency(format!(
            "{kind} {id} is at revision {stored}, attempted write of revision {staged}"
        )));
    }
    Ok(())
}

impl InventoryStore for InMemoryInventoryStore {
    fn raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterialRecord>, StoreError> {
        Ok(self.read()?.materials.get(&id).cloned())
    }

    fn raw_materials(&self) -> Result<Vec<RawMaterialRecord>, StoreError> {
        Ok(self.read()?.materials.values().cloned().collect())
    }

    fn variant(&self, id: VariantId) -> Result<Option<VariantRecord>, StoreError> {
        Ok(self.read()?.variants.get(&id).cloned())
    }

    fn variants(&self) -> Result<Vec<VariantRecord>, StoreError> {
        Ok(self.read()?.variants.values().cloned().collect())
    }

    fn variants_using_material(&self, material: RawMaterialId) -> Result<Vec<VariantId>, StoreError> {
        Ok(self
            .read()?
            .variants
            .values()
            .filter(|v| v.sourcing.material_ref() == Some(material))
            .map(|v| v.id)
            .collect())
    }

    fn transactions(&self, subject: Subject) -> Result<Vec<StockTransaction>, StoreError> {
        Ok(self.read()?.streams.get(&subject).cloned().unwrap_or_default())
    }

    fn all_transactions(&self) -> Result<Vec<StockTransaction>, StoreError> {
        let state = self.read()?;
        let mut all: Vec<StockTransaction> = state.streams.values().flatten().cloned().collect();
        all.sort_by_key(|tx| (tx.created_at, tx.subject, tx.sequence_number));
        Ok(all)
    }

    fn commit(&self, work: UnitOfWork) -> Result<CommitReceipt, StoreError> {
        let fault = self
            .fault
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?
            .take();

        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        // 1) Stream expectations against committed state.
        for (subject, expected) in work.expectations() {
            let current = state.version(subject);
            if !expected.matches(current) {
                return Err(StoreError::Concurrency(format!(
                    "{subject}: expected {expected:?}, found {current}"
                )));
            }
        }

        // 2) Stage record writes on a copy.
        let mut staged = state.clone();

        for record in work.materials() {
            let stored = staged.materials.get(&record.id).map(|r| r.revision).unwrap_or(0);
            check_revision("raw material", record.id, stored, record.revision)?;
            staged.materials.insert(record.id, record.clone());
        }
        for id in work.material_removals() {
            if staged.materials.remove(id).is_none() {
                return Err(StoreError::MissingRecord(format!("raw material {id}")));
            }
        }
        for record in work.variants() {
            let stored = staged.variants.get(&record.id).map(|r| r.revision).unwrap_or(0);
            check_revision("variant", record.id, stored, record.revision)?;
            staged.variants.insert(record.id, record.clone());
        }

        // 3) Referential integrity on the staged state.
        for variant in staged.variants.values() {
            if let Some(material) = variant.sourcing.material_ref() {
                if staged.materials.contains_key(&material) {
                    continue;
                }
                return Err(if work.material_removals().contains(&material) {
                    StoreError::StillReferenced(format!(
                        "raw material {material} is used by variant {}",
                        variant.id
                    ))
                } else {
                    StoreError::MissingRecord(format!("raw material {material}"))
                });
            }
        }

        // 4) Append transactions (sequence numbers assigned per subject).
        if fault == Some(FaultPoint::BeforeAppends) {
            return Err(StoreError::Unavailable("injected fault before appends".to_string()));
        }

        let mut receipt = CommitReceipt::default();
        for (idx, tx) in work.transactions().iter().enumerate() {
            if fault == Some(FaultPoint::BeforeAppend(idx)) {
                return Err(StoreError::Unavailable(format!(
                    "injected fault before append #{idx}"
                )));
            }

            let subject = tx.subject();
            if !staged.has_record(subject) {
                return Err(StoreError::MissingRecord(subject.to_string()));
            }
            if staged.stock_after(subject, tx.delta()).is_none() {
                return Err(StoreError::StockOverflow(format!(
                    "{subject}: appending {} leaves the i64 range",
                    tx.delta()
                )));
            }

            let stream = staged.streams.entry(subject).or_default();
            let committed = tx.clone().commit(TransactionId::new(), stream_version(stream) + 1);
            stream.push(committed.clone());
            receipt.transactions.push(committed);
        }

        // 5) Publish the staged state.
        *state = staged;
        Ok(receipt)
    }
}

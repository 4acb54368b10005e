use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use konveksi_catalog::{RawMaterialRecord, VariantRecord};
use konveksi_core::{ExpectedVersion, RawMaterialId, VariantId};
use konveksi_ledger::{NewStockTransaction, StockTransaction, Subject};

/// A set of record writes and ledger appends committed atomically.
///
/// ## Optimistic concurrency
///
/// Two kinds of expectation guard a unit of work against concurrent writers:
///
/// - **Stream expectations** (`expect`): the number of transactions recorded for
///   a subject must still equal the version observed when its stock was read.
///   A writer that validated "enough material" against a stale projection is
///   rejected with `StoreError::Concurrency`.
/// - **Record revisions**: a staged record with `revision = n` is only accepted
///   on top of a stored revision `n - 1` (a new record has revision 1, so a
///   duplicate insert is rejected the same way).
///
/// ## Integrity
///
/// After applying staged records the store rejects the unit when a variant
/// references a missing material, a removed material is still referenced, or a
/// transaction targets a subject with no record.
///
/// Nothing from a rejected unit of work is visible afterwards.
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    expectations: BTreeMap<Subject, ExpectedVersion>,
    materials: Vec<RawMaterialRecord>,
    material_removals: Vec<RawMaterialId>,
    variants: Vec<VariantRecord>,
    transactions: Vec<NewStockTransaction>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `subject`'s stream to be at `version` at commit time.
    pub fn expect(&mut self, subject: impl Into<Subject>, version: ExpectedVersion) -> &mut Self {
        self.expectations.insert(subject.into(), version);
        self
    }

    pub fn put_material(&mut self, record: RawMaterialRecord) -> &mut Self {
        self.materials.push(record);
        self
    }

    pub fn remove_material(&mut self, id: RawMaterialId) -> &mut Self {
        self.material_removals.push(id);
        self
    }

    pub fn put_variant(&mut self, record: VariantRecord) -> &mut Self {
        self.variants.push(record);
        self
    }

    pub fn append(&mut self, transaction: NewStockTransaction) -> &mut Self {
        self.transactions.push(transaction);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
            && self.material_removals.is_empty()
            && self.variants.is_empty()
            && self.transactions.is_empty()
    }

    pub fn expectations(&self) -> impl Iterator<Item = (Subject, ExpectedVersion)> + '_ {
        self.expectations.iter().map(|(s, v)| (*s, *v))
    }

    pub fn materials(&self) -> &[RawMaterialRecord] {
        &self.materials
    }

    pub fn material_removals(&self) -> &[RawMaterialId] {
        &self.material_removals
    }

    pub fn variants(&self) -> &[VariantRecord] {
        &self.variants
    }

    pub fn transactions(&self) -> &[NewStockTransaction] {
        &self.transactions
    }

    /// Every subject this unit of work touches, in a stable order (lock ordering).
    pub fn touched_subjects(&self) -> Vec<Subject> {
        let mut subjects: Vec<Subject> = self
            .expectations
            .keys()
            .copied()
            .chain(self.materials.iter().map(|m| Subject::from(m.id)))
            .chain(self.material_removals.iter().map(|id| Subject::from(*id)))
            .chain(self.variants.iter().map(|v| Subject::from(v.id)))
            .chain(self.transactions.iter().map(|t| t.subject()))
            .collect();
        subjects.sort();
        subjects.dedup();
        subjects
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Appended transactions, with their assigned ids and sequence numbers.
    pub transactions: Vec<StockTransaction>,
}

/// Inventory store operation error.
///
/// These are **infrastructure errors** (storage, concurrency, integrity) as
/// opposed to domain errors (validation, sufficiency).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stream expectation or record revision no longer holds.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A record the unit of work depends on does not exist.
    #[error("missing record: {0}")]
    MissingRecord(String),

    /// A record cannot be removed because others still reference it.
    #[error("record still referenced: {0}")]
    StillReferenced(String),

    /// An append would take a subject's stock outside the `i64` range.
    #[error("stock overflow: {0}")]
    StockOverflow(String),

    /// Backend unreachable or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Persisted data failed to decode or violates a stored invariant.
    #[error("corrupted data: {0}")]
    Corrupted(String),
}

/// Transactional read/write store for catalog records and the stock ledger.
///
/// Reads are individually consistent; writes only happen through `commit`,
/// which applies a whole `UnitOfWork` or nothing.
pub trait InventoryStore: Send + Sync {
    fn raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterialRecord>, StoreError>;

    fn raw_materials(&self) -> Result<Vec<RawMaterialRecord>, StoreError>;

    fn variant(&self, id: VariantId) -> Result<Option<VariantRecord>, StoreError>;

    fn variants(&self) -> Result<Vec<VariantRecord>, StoreError>;

    /// Variants whose sourcing references `material`.
    fn variants_using_material(&self, material: RawMaterialId) -> Result<Vec<VariantId>, StoreError>;

    /// One subject's transactions in sequence order.
    fn transactions(&self, subject: Subject) -> Result<Vec<StockTransaction>, StoreError>;

    /// Every transaction in the log.
    fn all_transactions(&self) -> Result<Vec<StockTransaction>, StoreError>;

    fn commit(&self, work: UnitOfWork) -> Result<CommitReceipt, StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterialRecord>, StoreError> {
        (**self).raw_material(id)
    }

    fn raw_materials(&self) -> Result<Vec<RawMaterialRecord>, StoreError> {
        (**self).raw_materials()
    }

    fn variant(&self, id: VariantId) -> Result<Option<VariantRecord>, StoreError> {
        (**self).variant(id)
    }

    fn variants(&self) -> Result<Vec<VariantRecord>, StoreError> {
        (**self).variants()
    }

    fn variants_using_material(&self, material: RawMaterialId) -> Result<Vec<VariantId>, StoreError> {
        (**self).variants_using_material(material)
    }

    fn transactions(&self, subject: Subject) -> Result<Vec<StockTransaction>, StoreError> {
        (**self).transactions(subject)
    }

    fn all_transactions(&self) -> Result<Vec<StockTransaction>, StoreError> {
        (**self).all_transactions()
    }

    fn commit(&self, work: UnitOfWork) -> Result<CommitReceipt, StoreError> {
        (**self).commit(work)
    }
}

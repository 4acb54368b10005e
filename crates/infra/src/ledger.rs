//! Stock ledger service: the only write path for stock.
//!
//! Stock is computed from the transaction set on every read; there is no
//! cached level that could drift from the log.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use konveksi_core::ExpectedVersion;
use konveksi_ledger::{NewStockTransaction, StockProjection, StockTransaction, Subject, SubjectKind, TransactionReason};

use crate::error::InventoryResult;
use crate::store::{InventoryStore, StoreError, UnitOfWork};

/// Projected stock of one subject and the stream version it was computed at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReading {
    pub stock: i64,
    pub version: u64,
}

#[derive(Debug, Clone)]
pub struct StockLedger<S> {
    store: S,
}

impl<S: InventoryStore> StockLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sum of all deltas recorded for the subject (0 when there are none).
    pub fn current_stock(&self, kind: SubjectKind, id: Uuid) -> InventoryResult<i64> {
        Ok(self.reading(Subject::new(kind, id))?.stock)
    }

    /// Projected stock plus the stream version, for optimistic writes.
    pub fn reading(&self, subject: Subject) -> InventoryResult<StockReading> {
        let stream = self.store.transactions(subject)?;
        let projection = StockProjection::from_log(&stream)
            .map_err(|e| StoreError::Corrupted(e.to_string()))?;
        Ok(StockReading {
            stock: projection.stock(subject),
            version: projection.version(subject),
        })
    }

    pub fn stream_version(&self, subject: Subject) -> InventoryResult<u64> {
        Ok(self.reading(subject)?.version)
    }

    /// Transactions of one subject in sequence order.
    pub fn history(&self, subject: Subject) -> InventoryResult<Vec<StockTransaction>> {
        Ok(self.store.transactions(subject)?)
    }

    /// Record one movement. No sufficiency check happens here.
    pub fn append(
        &self,
        kind: SubjectKind,
        id: Uuid,
        delta: i64,
        reason: TransactionReason,
    ) -> InventoryResult<StockTransaction> {
        let tx = NewStockTransaction::new(Subject::new(kind, id), delta, reason, Utc::now())?;
        self.append_expecting(tx, ExpectedVersion::Any)
    }

    /// Like `append`, with the reason given as its persisted code (`"SALE"`, ...).
    pub fn append_code(
        &self,
        kind: SubjectKind,
        id: Uuid,
        delta: i64,
        reason_code: &str,
    ) -> InventoryResult<StockTransaction> {
        let reason = TransactionReason::from_code(reason_code)?;
        self.append(kind, id, delta, reason)
    }

    /// Append one prepared transaction, guarded by the subject's stream version.
    pub fn append_expecting(
        &self,
        tx: NewStockTransaction,
        expected: ExpectedVersion,
    ) -> InventoryResult<StockTransaction> {
        let subject = tx.subject();
        let mut work = UnitOfWork::new();
        work.expect(subject, expected).append(tx);

        let committed = self
            .store
            .commit(work)?
            .transactions
            .pop()
            .ok_or_else(|| StoreError::Corrupted(format!("{subject}: commit returned no transaction")))?;

        debug!(
            subject = %committed.subject,
            sequence_number = committed.sequence_number,
            delta = committed.delta,
            reason = %committed.reason,
            "stock transaction appended"
        );
        Ok(committed)
    }
}

use std::collections::HashMap;

use thiserror::Error;

use crate::transaction::{StockTransaction, Subject};

/// Current stream version of a subject (sequence number of its last transaction).
pub fn stream_version(stream: &[StockTransaction]) -> u64 {
    stream.last().map(|tx| tx.sequence_number).unwrap_or(0)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("non-monotonic sequence number for {subject} (last={last}, found={found})")]
    NonMonotonicSequence { subject: Subject, last: u64, found: u64 },

    #[error("stock of {subject} overflows at sequence number {sequence_number}")]
    Overflow { subject: Subject, sequence_number: u64 },
}

/// Multi-subject stock projection.
///
/// Folds transactions into current stock per subject. Duplicates (a sequence
/// number at or below the subject's cursor) are ignored, gaps and sums outside
/// `i64` are rejected.
/// The projection is disposable and rebuildable from the transaction log.
#[derive(Debug, Clone, Default)]
pub struct StockProjection {
    levels: HashMap<Subject, i64>,
    cursors: HashMap<Subject, u64>,
}

impl StockProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a projection from a full transaction log, in stream order per subject.
    pub fn from_log<'a>(
        transactions: impl IntoIterator<Item = &'a StockTransaction>,
    ) -> Result<Self, ProjectionError> {
        let mut sorted: Vec<&StockTransaction> = transactions.into_iter().collect();
        sorted.sort_by_key(|tx| (tx.subject, tx.sequence_number));

        let mut projection = Self::new();
        for tx in sorted {
            projection.apply(tx)?;
        }
        Ok(projection)
    }

    pub fn apply(&mut self, tx: &StockTransaction) -> Result<(), ProjectionError> {
        let last = self.cursors.get(&tx.subject).copied().unwrap_or(0);

        if tx.sequence_number <= last {
            return Ok(());
        }
        if tx.sequence_number != last + 1 {
            return Err(ProjectionError::NonMonotonicSequence {
                subject: tx.subject,
                last,
                found: tx.sequence_number,
            });
        }

        let level = self
            .stock(tx.subject)
            .checked_add(tx.delta)
            .ok_or(ProjectionError::Overflow {
                subject: tx.subject,
                sequence_number: tx.sequence_number,
            })?;
        self.levels.insert(tx.subject, level);
        self.cursors.insert(tx.subject, tx.sequence_number);
        Ok(())
    }

    pub fn stock(&self, subject: Subject) -> i64 {
        self.levels.get(&subject).copied().unwrap_or(0)
    }

    pub fn version(&self, subject: Subject) -> u64 {
        self.cursors.get(&subject).copied().unwrap_or(0)
    }
}

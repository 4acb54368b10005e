//! Day-to-day stock movements: sales, returns, and corrections.

use chrono::Utc;
use tracing::info;

use konveksi_core::{ExpectedVersion, VariantId};
use konveksi_ledger::{NewStockTransaction, StockTransaction, Subject, TransactionReason};

use crate::config::InventoryConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::ledger::StockLedger;
use crate::retry::with_commit_retry;
use crate::store::InventoryStore;

pub struct StockMovementService<S> {
    ledger: StockLedger<S>,
    max_commit_attempts: u32,
}

impl<S: InventoryStore> StockMovementService<S> {
    pub fn new(store: S, config: &InventoryConfig) -> Self {
        Self {
            ledger: StockLedger::new(store),
            max_commit_attempts: config.max_commit_attempts,
        }
    }

    pub fn ledger(&self) -> &StockLedger<S> {
        &self.ledger
    }

    /// Sell `quantity` units of a variant. Never takes stock below zero.
    pub fn record_sale(
        &self,
        variant: VariantId,
        quantity: i64,
        note: Option<&str>,
    ) -> InventoryResult<StockTransaction> {
        require_positive("sale quantity", quantity)?;

        let tx = with_commit_retry("record_sale", self.max_commit_attempts, || {
            if self.ledger.store().variant(variant)?.is_none() {
                return Err(InventoryError::NotFound(format!("variant {variant}")));
            }
            let reading = self.ledger.reading(Subject::from(variant))?;
            if quantity > reading.stock {
                return Err(InventoryError::InsufficientStock {
                    requested: quantity,
                    available: reading.stock,
                });
            }

            let tx = with_note(
                NewStockTransaction::new(variant, -quantity, TransactionReason::Sale, Utc::now())?,
                note,
            );
            self.ledger.append_expecting(tx, ExpectedVersion::Exact(reading.version))
        })?;

        info!(variant_id = %variant, quantity, sequence_number = tx.sequence_number, "sale recorded");
        Ok(tx)
    }

    /// Take `quantity` units of a variant back into stock.
    pub fn record_return(
        &self,
        variant: VariantId,
        quantity: i64,
        note: Option<&str>,
    ) -> InventoryResult<StockTransaction> {
        require_positive("return quantity", quantity)?;

        let tx = with_note(
            NewStockTransaction::new(variant, quantity, TransactionReason::Return, Utc::now())?,
            note,
        );
        let tx = self.ledger.append_expecting(tx, ExpectedVersion::Any)?;

        info!(variant_id = %variant, quantity, sequence_number = tx.sequence_number, "return recorded");
        Ok(tx)
    }

    /// Correct any subject's stock by `delta`. The result may not be negative.
    pub fn adjust(&self, subject: Subject, delta: i64, note: Option<&str>) -> InventoryResult<StockTransaction> {
        let tx = with_commit_retry("adjust", self.max_commit_attempts, || {
            let reading = self.ledger.reading(subject)?;
            let overflow =
                || InventoryError::Validation(format!("adjusting {subject} by {delta} overflows its stock"));
            let resulting = reading.stock.checked_add(delta).ok_or_else(overflow)?;
            if resulting < 0 {
                return Err(InventoryError::InsufficientStock {
                    requested: delta.checked_neg().ok_or_else(overflow)?,
                    available: reading.stock,
                });
            }

            let tx = with_note(
                NewStockTransaction::new(subject, delta, TransactionReason::Adjustment, Utc::now())?,
                note,
            );
            self.ledger.append_expecting(tx, ExpectedVersion::Exact(reading.version))
        })?;

        info!(subject = %subject, delta, sequence_number = tx.sequence_number, "stock adjusted");
        Ok(tx)
    }
}

fn require_positive(what: &str, quantity: i64) -> InventoryResult<()> {
    if quantity <= 0 {
        return Err(InventoryError::Validation(format!(
            "{what} must be positive (got {quantity})"
        )));
    }
    Ok(())
}

fn with_note(tx: NewStockTransaction, note: Option<&str>) -> NewStockTransaction {
    match note {
        Some(note) => tx.with_note(note),
        None => tx,
    }
}

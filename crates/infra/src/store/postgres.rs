//! Postgres-backed inventory store.
//!
//! Catalog rows and the stock ledger live in one database so a unit of work
//! commits in a single SQL transaction. Schema: `migrations/0001_inventory.sql`.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError | Scenario |
//! |------------|-----------------|------------|----------|
//! | Database (unique violation) | `23505` | `Concurrency` | duplicate insert or concurrent append on the same sequence number |
//! | Database (foreign key violation) | `23503` | `MissingRecord` / `StillReferenced` | unknown material on a variant / delete of a referenced material |
//! | Database (check violation) | `23514` | `Corrupted` | row rejected by a schema invariant |
//! | n/a (checked in Rust) | n/a | `StockOverflow` | append would take a stream's sum outside `i64` |
//! | Database (other), pool closed, IO | n/a | `Unavailable` | backend failure |
//!
//! ## Concurrency
//!
//! `commit_unit` takes a transaction-scoped advisory lock per touched subject
//! (in sorted order, so two writers cannot deadlock on each other), then checks
//! stream versions and record revisions under those locks. The unique
//! constraint on `(subject_kind, subject_id, sequence_number)` backs this up.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tokio::runtime::RuntimeFlavor;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use konveksi_catalog::{MaterialDetails, RawMaterialRecord, SourcingColumns, VariantRecord};
use konveksi_core::{RawMaterialId, TransactionId, VariantId};
use konveksi_ledger::{StockTransaction, Subject, SubjectKind, TransactionReason};

use super::r#trait::{CommitReceipt, InventoryStore, StoreError, UnitOfWork};

const SCHEMA: &str = include_str!("../../migrations/0001_inventory.sql");

/// Postgres-backed inventory store.
///
/// `Send + Sync`; all operations go through the SQLx connection pool. The
/// synchronous `InventoryStore` impl must be called from inside a
/// multi-threaded tokio runtime.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create tables and the `stock_levels` view if they are missing.
    #[instrument(skip(self), err)]
    pub async fn install_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("install_schema", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(material_id = %id), err)]
    pub async fn load_raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterialRecord>, StoreError> {
        let row = sqlx::query(&format!("{RAW_MATERIAL_SELECT} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_raw_material", e))?;

        row.map(|r| RawMaterialRecord::try_from(decode::<RawMaterialRow>(&r)?)).transpose()
    }

    #[instrument(skip(self), err)]
    pub async fn load_raw_materials(&self) -> Result<Vec<RawMaterialRecord>, StoreError> {
        let rows = sqlx::query(&format!("{RAW_MATERIAL_SELECT} ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_raw_materials", e))?;

        rows.iter()
            .map(|r| RawMaterialRecord::try_from(decode::<RawMaterialRow>(r)?))
            .collect()
    }

    #[instrument(skip(self), fields(variant_id = %id), err)]
    pub async fn load_variant(&self, id: VariantId) -> Result<Option<VariantRecord>, StoreError> {
        let row = sqlx::query(&format!("{VARIANT_SELECT} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_variant", e))?;

        row.map(|r| VariantRecord::try_from(decode::<VariantRow>(&r)?)).transpose()
    }

    #[instrument(skip(self), err)]
    pub async fn load_variants(&self) -> Result<Vec<VariantRecord>, StoreError> {
        let rows = sqlx::query(&format!("{VARIANT_SELECT} ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_variants", e))?;

        rows.iter()
            .map(|r| VariantRecord::try_from(decode::<VariantRow>(r)?))
            .collect()
    }

    #[instrument(skip(self), fields(material_id = %material), err)]
    pub async fn load_variants_using_material(
        &self,
        material: RawMaterialId,
    ) -> Result<Vec<VariantId>, StoreError> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM variants WHERE material_ref = $1 ORDER BY id ASC")
            .bind(material.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_variants_using_material", e))?;

        Ok(ids.into_iter().map(VariantId::from_uuid).collect())
    }

    #[instrument(skip(self), fields(subject = %subject), err)]
    pub async fn load_transactions(&self, subject: Subject) -> Result<Vec<StockTransaction>, StoreError> {
        let rows = sqlx::query(&format!(
            "{TRANSACTION_SELECT} WHERE subject_kind = $1 AND subject_id = $2 ORDER BY sequence_number ASC"
        ))
        .bind(subject.kind().code())
        .bind(subject.uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_transactions", e))?;

        rows.iter()
            .map(|r| StockTransaction::try_from(decode::<TransactionRow>(r)?))
            .collect()
    }

    #[instrument(skip(self), err)]
    pub async fn load_all_transactions(&self) -> Result<Vec<StockTransaction>, StoreError> {
        let rows = sqlx::query(&format!(
            "{TRANSACTION_SELECT} ORDER BY created_at ASC, subject_kind ASC, subject_id ASC, sequence_number ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_all_transactions", e))?;

        rows.iter()
            .map(|r| StockTransaction::try_from(decode::<TransactionRow>(r)?))
            .collect()
    }

    /// Apply a unit of work in one SQL transaction.
    #[instrument(
        skip(self, work),
        fields(
            materials = work.materials().len(),
            variants = work.variants().len(),
            transactions = work.transactions().len()
        ),
        err
    )]
    pub async fn commit_unit(&self, work: UnitOfWork) -> Result<CommitReceipt, StoreError> {
        if work.is_empty() && work.expectations().next().is_none() {
            return Ok(CommitReceipt::default());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        match apply_unit(&mut tx, &work).await {
            Ok(receipt) => {
                tx.commit()
                    .await
                    .map_err(|e| map_sqlx_error("commit_transaction", e))?;
                debug!(appended = receipt.transactions.len(), "unit of work committed");
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

async fn apply_unit(
    tx: &mut Transaction<'_, Postgres>,
    work: &UnitOfWork,
) -> Result<CommitReceipt, StoreError> {
    // 1) Serialize writers per subject.
    for subject in work.touched_subjects() {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(subject.to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("advisory_lock", e))?;
    }

    // 2) Stream expectations.
    let mut streams: HashMap<Subject, StreamState> = HashMap::new();
    for (subject, expected) in work.expectations() {
        let current = stream_state(tx, subject).await?;
        if !expected.matches(current.version) {
            return Err(StoreError::Concurrency(format!(
                "{subject}: expected {expected:?}, found {}",
                current.version
            )));
        }
        streams.insert(subject, current);
    }

    // 3) Record writes.
    for record in work.materials() {
        upsert_raw_material(tx, record).await?;
    }
    for record in work.variants() {
        upsert_variant(tx, record).await?;
    }
    for id in work.material_removals() {
        delete_raw_material(tx, *id).await?;
    }

    // 4) Ledger appends.
    let mut receipt = CommitReceipt::default();
    for new_tx in work.transactions() {
        let subject = new_tx.subject();
        if !record_exists(tx, subject).await? {
            return Err(StoreError::MissingRecord(subject.to_string()));
        }

        let current = match streams.get(&subject) {
            Some(state) => *state,
            None => stream_state(tx, subject).await?,
        };
        let stock = current.stock.checked_add(new_tx.delta()).ok_or_else(|| {
            StoreError::StockOverflow(format!(
                "{subject}: appending {} leaves the i64 range",
                new_tx.delta()
            ))
        })?;
        let committed = new_tx.clone().commit(TransactionId::new(), current.version + 1);

        sqlx::query(
            r#"
            INSERT INTO stock_transactions (
                id,
                subject_kind,
                subject_id,
                sequence_number,
                delta,
                reason,
                note,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(committed.id.as_uuid())
        .bind(subject.kind().code())
        .bind(subject.uuid())
        .bind(committed.sequence_number as i64)
        .bind(committed.delta)
        .bind(committed.reason.code())
        .bind(committed.note.as_deref())
        .bind(committed.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Concurrency(format!(
                    "{subject}: sequence_number {} already exists",
                    committed.sequence_number
                ))
            } else {
                map_sqlx_error("insert_transaction", e)
            }
        })?;

        streams.insert(
            subject,
            StreamState {
                version: committed.sequence_number,
                stock,
            },
        );
        receipt.transactions.push(committed);
    }

    Ok(receipt)
}

#[derive(Debug, Copy, Clone)]
struct StreamState {
    version: u64,
    stock: i64,
}

/// Version and stock of one stream. Every append is overflow-checked, so the
/// stored sum always fits the `BIGINT` cast.
async fn stream_state(tx: &mut Transaction<'_, Postgres>, subject: Subject) -> Result<StreamState, StoreError> {
    let (version, stock): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(MAX(sequence_number), 0), COALESCE(SUM(delta), 0)::BIGINT
        FROM stock_transactions
        WHERE subject_kind = $1 AND subject_id = $2
        "#,
    )
    .bind(subject.kind().code())
    .bind(subject.uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("stream_state", e))?;

    Ok(StreamState {
        version: version as u64,
        stock,
    })
}

async fn record_exists(tx: &mut Transaction<'_, Postgres>, subject: Subject) -> Result<bool, StoreError> {
    let sql = match subject.kind() {
        SubjectKind::RawMaterial => "SELECT EXISTS (SELECT 1 FROM raw_materials WHERE id = $1)",
        SubjectKind::Variant => "SELECT EXISTS (SELECT 1 FROM variants WHERE id = $1)",
    };
    sqlx::query_scalar(sql)
        .bind(subject.uuid())
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("record_exists", e))
}

/// Revision 1 inserts; revision `n` updates the row currently at `n - 1`.
async fn upsert_raw_material(
    tx: &mut Transaction<'_, Postgres>,
    record: &RawMaterialRecord,
) -> Result<(), StoreError> {
    let d = &record.details;
    let result = if record.revision == 1 {
        sqlx::query(
            r#"
            INSERT INTO raw_materials (
                id, revision, name, unit, purchase_price, buffer_stock, color_ref, created_at, updated_at
            )
            VALUES ($1, 1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&d.name)
        .bind(&d.unit)
        .bind(d.purchase_price)
        .bind(d.buffer_stock)
        .bind(d.color_ref.as_deref())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut **tx)
        .await
    } else {
        sqlx::query(
            r#"
            UPDATE raw_materials
            SET revision = $2, name = $3, unit = $4, purchase_price = $5,
                buffer_stock = $6, color_ref = $7, updated_at = $8
            WHERE id = $1 AND revision = $2 - 1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.revision as i64)
        .bind(&d.name)
        .bind(&d.unit)
        .bind(d.purchase_price)
        .bind(d.buffer_stock)
        .bind(d.color_ref.as_deref())
        .bind(record.updated_at)
        .execute(&mut **tx)
        .await
    };

    let done = result.map_err(|e| map_sqlx_error("upsert_raw_material", e))?;
    if done.rows_affected() == 0 {
        return Err(StoreError::Concurrency(format!(
            "raw material {} is not at revision {}",
            record.id,
            record.revision.saturating_sub(1)
        )));
    }
    Ok(())
}

async fn upsert_variant(tx: &mut Transaction<'_, Postgres>, record: &VariantRecord) -> Result<(), StoreError> {
    let columns = SourcingColumns::from_decision(&record.sourcing)
        .map_err(|e| StoreError::Corrupted(format!("variant {}: {e}", record.id)))?;

    let result = if record.revision == 1 {
        sqlx::query(
            r#"
            INSERT INTO variants (
                id, revision, product_ref, color_ref, size_ref,
                sourcing_mode, material_ref, material_quantity, material_snapshot,
                created_at, updated_at
            )
            VALUES ($1, 1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.product_ref)
        .bind(&record.color_ref)
        .bind(&record.size_ref)
        .bind(&columns.sourcing_mode)
        .bind(columns.material_ref)
        .bind(columns.material_quantity)
        .bind(&columns.material_snapshot)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut **tx)
        .await
    } else {
        sqlx::query(
            r#"
            UPDATE variants
            SET revision = $2, product_ref = $3, color_ref = $4, size_ref = $5,
                sourcing_mode = $6, material_ref = $7, material_quantity = $8,
                material_snapshot = $9, updated_at = $10
            WHERE id = $1 AND revision = $2 - 1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.revision as i64)
        .bind(&record.product_ref)
        .bind(&record.color_ref)
        .bind(&record.size_ref)
        .bind(&columns.sourcing_mode)
        .bind(columns.material_ref)
        .bind(columns.material_quantity)
        .bind(&columns.material_snapshot)
        .bind(record.updated_at)
        .execute(&mut **tx)
        .await
    };

    let done = result.map_err(|e| {
        if is_foreign_key_violation(&e) {
            StoreError::MissingRecord(format!(
                "raw material {}",
                record.sourcing.material_ref().map(|m| m.to_string()).unwrap_or_default()
            ))
        } else {
            map_sqlx_error("upsert_variant", e)
        }
    })?;
    if done.rows_affected() == 0 {
        return Err(StoreError::Concurrency(format!(
            "variant {} is not at revision {}",
            record.id,
            record.revision.saturating_sub(1)
        )));
    }
    Ok(())
}

async fn delete_raw_material(tx: &mut Transaction<'_, Postgres>, id: RawMaterialId) -> Result<(), StoreError> {
    let done = sqlx::query("DELETE FROM raw_materials WHERE id = $1")
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::StillReferenced(format!("raw material {id} is used by a variant"))
            } else {
                map_sqlx_error("delete_raw_material", e)
            }
        })?;

    if done.rows_affected() == 0 {
        return Err(StoreError::MissingRecord(format!("raw material {id}")));
    }
    Ok(())
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Concurrency(msg),
                Some("23514") => StoreError::Corrupted(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Unavailable(format!("connection pool closed in {operation}")),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupted(format!("decode error in {operation}: {err}"))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_sqlstate(err, "23505")
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    has_sqlstate(err, "23503")
}

fn has_sqlstate(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|c| c == code),
        _ => false,
    }
}

fn decode<'r, T: FromRow<'r, PgRow>>(row: &'r PgRow) -> Result<T, StoreError> {
    T::from_row(row).map_err(|e| StoreError::Corrupted(format!("failed to deserialize row: {e}")))
}

// SQLx row types

const RAW_MATERIAL_SELECT: &str = r#"
    SELECT id, revision, name, unit, purchase_price, buffer_stock, color_ref, created_at, updated_at
    FROM raw_materials
"#;

const VARIANT_SELECT: &str = r#"
    SELECT id, revision, product_ref, color_ref, size_ref,
           sourcing_mode, material_ref, material_quantity, material_snapshot,
           created_at, updated_at
    FROM variants
"#;

const TRANSACTION_SELECT: &str = r#"
    SELECT id, subject_kind, subject_id, sequence_number, delta, reason, note, created_at
    FROM stock_transactions
"#;

#[derive(Debug)]
struct RawMaterialRow {
    id: Uuid,
    revision: i64,
    name: String,
    unit: String,
    purchase_price: i64,
    buffer_stock: i64,
    color_ref: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for RawMaterialRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(RawMaterialRow {
            id: row.try_get("id")?,
            revision: row.try_get("revision")?,
            name: row.try_get("name")?,
            unit: row.try_get("unit")?,
            purchase_price: row.try_get("purchase_price")?,
            buffer_stock: row.try_get("buffer_stock")?,
            color_ref: row.try_get("color_ref")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<RawMaterialRow> for RawMaterialRecord {
    type Error = StoreError;

    fn try_from(row: RawMaterialRow) -> Result<Self, Self::Error> {
        Ok(RawMaterialRecord {
            id: RawMaterialId::from_uuid(row.id),
            revision: row.revision as u64,
            details: MaterialDetails {
                name: row.name,
                unit: row.unit,
                purchase_price: row.purchase_price,
                buffer_stock: row.buffer_stock,
                color_ref: row.color_ref,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct VariantRow {
    id: Uuid,
    revision: i64,
    product_ref: String,
    color_ref: String,
    size_ref: String,
    sourcing: SourcingColumns,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for VariantRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(VariantRow {
            id: row.try_get("id")?,
            revision: row.try_get("revision")?,
            product_ref: row.try_get("product_ref")?,
            color_ref: row.try_get("color_ref")?,
            size_ref: row.try_get("size_ref")?,
            sourcing: SourcingColumns {
                sourcing_mode: row.try_get("sourcing_mode")?,
                material_ref: row.try_get("material_ref")?,
                material_quantity: row.try_get("material_quantity")?,
                material_snapshot: row.try_get("material_snapshot")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<VariantRow> for VariantRecord {
    type Error = StoreError;

    fn try_from(row: VariantRow) -> Result<Self, Self::Error> {
        let sourcing = row
            .sourcing
            .into_decision()
            .map_err(|e| StoreError::Corrupted(format!("variant {}: {e}", row.id)))?;
        Ok(VariantRecord {
            id: VariantId::from_uuid(row.id),
            revision: row.revision as u64,
            product_ref: row.product_ref,
            color_ref: row.color_ref,
            size_ref: row.size_ref,
            sourcing,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct TransactionRow {
    id: Uuid,
    subject_kind: String,
    subject_id: Uuid,
    sequence_number: i64,
    delta: i64,
    reason: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for TransactionRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(TransactionRow {
            id: row.try_get("id")?,
            subject_kind: row.try_get("subject_kind")?,
            subject_id: row.try_get("subject_id")?,
            sequence_number: row.try_get("sequence_number")?,
            delta: row.try_get("delta")?,
            reason: row.try_get("reason")?,
            note: row.try_get("note")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<TransactionRow> for StockTransaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = SubjectKind::from_code(&row.subject_kind)
            .map_err(|e| StoreError::Corrupted(format!("transaction {}: {e}", row.id)))?;
        let reason = TransactionReason::from_code(&row.reason)
            .map_err(|e| StoreError::Corrupted(format!("transaction {}: {e}", row.id)))?;
        Ok(StockTransaction {
            id: TransactionId::from_uuid(row.id),
            subject: Subject::new(kind, row.subject_id),
            sequence_number: row.sequence_number as u64,
            delta: row.delta,
            reason,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

/// Run `fut` to completion from synchronous code.
///
/// The `InventoryStore` trait is synchronous; the pool is async. Only a
/// multi-threaded tokio runtime can park a worker for this, so any other
/// context is reported as `Unavailable`.
fn block_on<F: Future>(fut: F) -> Result<F::Output, StoreError> {
    let handle = tokio::runtime::Handle::try_current().map_err(|_| {
        StoreError::Unavailable(
            "PostgresInventoryStore requires a tokio runtime; call it from within one".to_string(),
        )
    })?;
    if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
        return Err(StoreError::Unavailable(format!(
            "PostgresInventoryStore needs a multi-threaded tokio runtime (found {:?})",
            handle.runtime_flavor()
        )));
    }
    Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
}

impl InventoryStore for PostgresInventoryStore {
    fn raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterialRecord>, StoreError> {
        block_on(self.load_raw_material(id))?
    }

    fn raw_materials(&self) -> Result<Vec<RawMaterialRecord>, StoreError> {
        block_on(self.load_raw_materials())?
    }

    fn variant(&self, id: VariantId) -> Result<Option<VariantRecord>, StoreError> {
        block_on(self.load_variant(id))?
    }

    fn variants(&self) -> Result<Vec<VariantRecord>, StoreError> {
        block_on(self.load_variants())?
    }

    fn variants_using_material(&self, material: RawMaterialId) -> Result<Vec<VariantId>, StoreError> {
        block_on(self.load_variants_using_material(material))?
    }

    fn transactions(&self, subject: Subject) -> Result<Vec<StockTransaction>, StoreError> {
        block_on(self.load_transactions(subject))?
    }

    fn all_transactions(&self) -> Result<Vec<StockTransaction>, StoreError> {
        block_on(self.load_all_transactions())?
    }

    fn commit(&self, work: UnitOfWork) -> Result<CommitReceipt, StoreError> {
        block_on(self.commit_unit(work))?
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use konveksi_core::{DomainError, DomainResult, RawMaterialId, TransactionId, VariantId};

/// Which kind of stock-bearing record a transaction applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    RawMaterial,
    Variant,
}

impl SubjectKind {
    /// Stable storage code.
    pub fn code(self) -> &'static str {
        match self {
            SubjectKind::RawMaterial => "raw_material",
            SubjectKind::Variant => "variant",
        }
    }

    pub fn from_code(code: &str) -> DomainResult<Self> {
        match code {
            "raw_material" => Ok(SubjectKind::RawMaterial),
            "variant" => Ok(SubjectKind::Variant),
            other => Err(DomainError::validation(format!(
                "unknown subject kind `{other}`"
            ))),
        }
    }
}

impl core::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// A stock-bearing record: one transaction stream per subject.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    RawMaterial(RawMaterialId),
    Variant(VariantId),
}

impl Subject {
    pub fn new(kind: SubjectKind, id: Uuid) -> Self {
        match kind {
            SubjectKind::RawMaterial => Subject::RawMaterial(RawMaterialId::from_uuid(id)),
            SubjectKind::Variant => Subject::Variant(VariantId::from_uuid(id)),
        }
    }

    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::RawMaterial(_) => SubjectKind::RawMaterial,
            Subject::Variant(_) => SubjectKind::Variant,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            Subject::RawMaterial(id) => *id.as_uuid(),
            Subject::Variant(id) => *id.as_uuid(),
        }
    }
}

impl From<RawMaterialId> for Subject {
    fn from(value: RawMaterialId) -> Self {
        Subject::RawMaterial(value)
    }
}

impl From<VariantId> for Subject {
    fn from(value: VariantId) -> Self {
        Subject::Variant(value)
    }
}

impl core::fmt::Display for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.uuid())
    }
}

/// Why a quantity changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionReason {
    /// Opening on-hand quantity of a freshly created record.
    Init,
    /// Raw material consumed (negative) or returned (positive) by production.
    Production,
    /// Manual correction.
    Adjustment,
    Sale,
    Return,
}

impl TransactionReason {
    pub const ALL: [TransactionReason; 5] = [
        TransactionReason::Init,
        TransactionReason::Production,
        TransactionReason::Adjustment,
        TransactionReason::Sale,
        TransactionReason::Return,
    ];

    pub fn code(self) -> &'static str {
        match self {
            TransactionReason::Init => "INIT",
            TransactionReason::Production => "PRODUCTION",
            TransactionReason::Adjustment => "ADJUSTMENT",
            TransactionReason::Sale => "SALE",
            TransactionReason::Return => "RETURN",
        }
    }

    /// Parse a reason code coming from outside the type system (storage rows, requests).
    pub fn from_code(code: &str) -> DomainResult<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| DomainError::validation(format!("unknown transaction reason `{code}`")))
    }
}

impl core::fmt::Display for TransactionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// A transaction ready to be appended (not yet assigned an id or sequence number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStockTransaction {
    subject: Subject,
    delta: i64,
    reason: TransactionReason,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl NewStockTransaction {
    /// Validate and build a pending transaction. A zero delta is rejected.
    pub fn new(
        subject: impl Into<Subject>,
        delta: i64,
        reason: TransactionReason,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }
        Ok(Self {
            subject: subject.into(),
            delta,
            reason,
            note: None,
            created_at,
        })
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn delta(&self) -> i64 {
        self.delta
    }

    pub fn reason(&self) -> TransactionReason {
        self.reason
    }

    /// Commit into an immutable record at the given stream position.
    pub fn commit(self, id: TransactionId, sequence_number: u64) -> StockTransaction {
        StockTransaction {
            id,
            subject: self.subject,
            sequence_number,
            delta: self.delta,
            reason: self.reason,
            note: self.note,
            created_at: self.created_at,
        }
    }
}

/// An appended, immutable stock transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: TransactionId,
    pub subject: Subject,
    /// 1-based position in the subject's stream.
    pub sequence_number: u64,
    pub delta: i64,
    pub reason: TransactionReason,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockTransaction {
    pub fn subject_kind(&self) -> SubjectKind {
        self.subject.kind()
    }
}

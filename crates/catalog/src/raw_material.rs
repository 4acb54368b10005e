use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use konveksi_core::{DomainError, DomainResult, RawMaterialId};

/// Descriptive fields of a raw material. Everything except stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDetails {
    pub name: String,
    pub unit: String,
    /// Minor currency units.
    pub purchase_price: i64,
    /// Reorder threshold; informational only.
    pub buffer_stock: i64,
    pub color_ref: Option<String>,
}

impl MaterialDetails {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.unit.trim().is_empty() {
            return Err(DomainError::validation("unit cannot be empty"));
        }
        if self.purchase_price < 0 {
            return Err(DomainError::validation("purchase_price cannot be negative"));
        }
        if self.buffer_stock < 0 {
            return Err(DomainError::validation("buffer_stock cannot be negative"));
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.unit = self.unit.trim().to_string();
        self.color_ref = self
            .color_ref
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }
}

/// Request to register a new raw material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialDraft {
    pub details: MaterialDetails,
    /// On-hand quantity at registration, recorded as an INIT transaction.
    pub opening_stock: i64,
}

/// Persisted raw-material row. Stock is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialRecord {
    pub id: RawMaterialId,
    /// Row revision, starting at 1. Stores accept a write only on top of `revision - 1`.
    pub revision: u64,
    pub details: MaterialDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RawMaterialRecord {
    pub fn register(id: RawMaterialId, draft: &RawMaterialDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        draft.details.validate()?;
        if draft.opening_stock < 0 {
            return Err(DomainError::validation("opening_stock cannot be negative"));
        }
        Ok(Self {
            id,
            revision: 1,
            details: draft.details.clone().normalized(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn revise(&self, details: MaterialDetails, now: DateTime<Utc>) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: self.id,
            revision: self.revision + 1,
            details: details.normalized(),
            created_at: self.created_at,
            updated_at: now,
        })
    }
}

/// A raw material together with its projected stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterial {
    #[serde(flatten)]
    pub record: RawMaterialRecord,
    pub stock: i64,
}

impl RawMaterial {
    pub fn id(&self) -> RawMaterialId {
        self.record.id
    }

    /// At or below the reorder threshold.
    pub fn below_buffer(&self) -> bool {
        self.stock <= self.record.details.buffer_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> MaterialDetails {
        MaterialDetails {
            name: "  Cotton Combed 30s ".to_string(),
            unit: "kg".to_string(),
            purchase_price: 125_000,
            buffer_stock: 20,
            color_ref: Some("  ".to_string()),
        }
    }

    #[test]
    fn register_normalizes_details() {
        let now = Utc::now();
        let draft = RawMaterialDraft {
            details: details(),
            opening_stock: 100,
        };
        let record = RawMaterialRecord::register(RawMaterialId::new(), &draft, now).unwrap();
        assert_eq!(record.details.name, "Cotton Combed 30s");
        assert_eq!(record.details.color_ref, None);
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn register_rejects_invalid_values() {
        let mut draft = RawMaterialDraft {
            details: details(),
            opening_stock: -1,
        };
        assert!(RawMaterialRecord::register(RawMaterialId::new(), &draft, Utc::now()).is_err());

        draft.opening_stock = 0;
        draft.details.purchase_price = -5;
        assert!(RawMaterialRecord::register(RawMaterialId::new(), &draft, Utc::now()).is_err());

        draft.details = details();
        draft.details.name = " ".to_string();
        assert_eq!(
            RawMaterialRecord::register(RawMaterialId::new(), &draft, Utc::now()),
            Err(DomainError::validation("name cannot be empty"))
        );
    }

    #[test]
    fn revise_keeps_identity_and_creation_time() {
        let created = Utc::now();
        let draft = RawMaterialDraft {
            details: details(),
            opening_stock: 0,
        };
        let record = RawMaterialRecord::register(RawMaterialId::new(), &draft, created).unwrap();

        let mut changed = record.details.clone();
        changed.buffer_stock = 50;
        let later = created + chrono::Duration::minutes(5);
        let revised = record.revise(changed, later).unwrap();

        assert_eq!(revised.id, record.id);
        assert_eq!(revised.revision, 2);
        assert_eq!(revised.created_at, created);
        assert_eq!(revised.updated_at, later);
        assert_eq!(revised.details.buffer_stock, 50);
    }

    #[test]
    fn below_buffer_is_inclusive() {
        let draft = RawMaterialDraft {
            details: details(),
            opening_stock: 0,
        };
        let record = RawMaterialRecord::register(RawMaterialId::new(), &draft, Utc::now()).unwrap();
        assert!(RawMaterial { record: record.clone(), stock: 20 }.below_buffer());
        assert!(!RawMaterial { record, stock: 21 }.below_buffer());
    }
}

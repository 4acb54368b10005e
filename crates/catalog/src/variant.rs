use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use konveksi_core::{DomainError, DomainResult, VariantId};
use konveksi_sourcing::{SourcingDecision, SourcingInput};

/// Create/update request for a variant.
///
/// On-hand quantity only moves through ledger transactions, so there is no
/// stock field here. `initial_stock` is honored on creation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDraft {
    pub product_ref: String,
    pub color_ref: String,
    pub size_ref: String,
    pub sourcing: SourcingInput,
    #[serde(default)]
    pub initial_stock: i64,
}

impl VariantDraft {
    /// Full check for creation.
    pub fn validate(&self) -> DomainResult<()> {
        self.validate_refs()?;
        if self.initial_stock < 0 {
            return Err(DomainError::validation(format!(
                "initial_stock must be non-negative (got {})",
                self.initial_stock
            )));
        }
        Ok(())
    }

    /// Descriptive refs only; updates ignore `initial_stock`.
    pub fn validate_refs(&self) -> DomainResult<()> {
        for (field, value) in [
            ("product_ref", &self.product_ref),
            ("color_ref", &self.color_ref),
            ("size_ref", &self.size_ref),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} cannot be empty")));
            }
        }
        Ok(())
    }
}

/// Persisted variant row. Stock is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub id: VariantId,
    /// Row revision, starting at 1. Stores accept a write only on top of `revision - 1`.
    pub revision: u64,
    pub product_ref: String,
    pub color_ref: String,
    pub size_ref: String,
    pub sourcing: SourcingDecision,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VariantRecord {
    /// Build a fresh record from a validated draft and an already resolved sourcing decision.
    pub fn create(
        id: VariantId,
        draft: &VariantDraft,
        sourcing: SourcingDecision,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            revision: 1,
            product_ref: draft.product_ref.trim().to_string(),
            color_ref: draft.color_ref.trim().to_string(),
            size_ref: draft.size_ref.trim().to_string(),
            sourcing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Next revision of this record. A custom snapshot that describes the same
    /// material keeps its timestamps; a changed one keeps its creation time.
    pub fn revise(&self, draft: &VariantDraft, sourcing: SourcingDecision, now: DateTime<Utc>) -> Self {
        let sourcing = match (&self.sourcing, sourcing) {
            (
                SourcingDecision::Custom { snapshot: previous },
                SourcingDecision::Custom { snapshot },
            ) => {
                let snapshot = if snapshot.same_material(previous) {
                    previous.clone()
                } else {
                    snapshot.revised_from(previous)
                };
                SourcingDecision::Custom { snapshot }
            }
            (_, sourcing) => sourcing,
        };

        Self {
            id: self.id,
            revision: self.revision + 1,
            product_ref: draft.product_ref.trim().to_string(),
            color_ref: draft.color_ref.trim().to_string(),
            size_ref: draft.size_ref.trim().to_string(),
            sourcing,
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// A variant together with its projected stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(flatten)]
    pub record: VariantRecord,
    pub stock: i64,
}

impl Variant {
    pub fn id(&self) -> VariantId {
        self.record.id
    }

    pub fn sourcing(&self) -> &SourcingDecision {
        &self.record.sourcing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use konveksi_sourcing::{CustomMaterialFields, resolve};

    fn draft(sourcing: SourcingInput) -> VariantDraft {
        VariantDraft {
            product_ref: "kemeja-flanel".to_string(),
            color_ref: "navy".to_string(),
            size_ref: " L ".to_string(),
            sourcing,
            initial_stock: 0,
        }
    }

    fn custom_fields(quantity: i64) -> CustomMaterialFields {
        CustomMaterialFields {
            material_name: Some("Flannel".to_string()),
            material_type: Some("Woven".to_string()),
            material_category: Some("Fabric".to_string()),
            color: Some("Navy".to_string()),
            unit: Some("m".to_string()),
            purchase_price: Some(32_000),
            quantity: Some(quantity),
        }
    }

    #[test]
    fn draft_validation_rejects_blank_refs_and_negative_stock() {
        let mut d = draft(SourcingInput::none());
        assert!(d.validate().is_ok());

        d.size_ref = "  ".to_string();
        match d.validate() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("size_ref")),
            other => panic!("expected Validation, got {other:?}"),
        }

        let mut d = draft(SourcingInput::none());
        d.initial_stock = -4;
        assert!(d.validate().is_err());
        assert!(d.validate_refs().is_ok());
    }

    #[test]
    fn create_trims_refs() {
        let d = draft(SourcingInput::none());
        let record = VariantRecord::create(VariantId::new(), &d, SourcingDecision::None, Utc::now());
        assert_eq!(record.size_ref, "L");
    }

    #[test]
    fn revise_keeps_unchanged_snapshot_timestamps() {
        let created = Utc::now();
        let later = created + chrono::Duration::hours(1);
        let d = draft(SourcingInput::custom(custom_fields(15)));

        let first = resolve(&d.sourcing, created).unwrap();
        let record = VariantRecord::create(VariantId::new(), &d, first, created);

        let same = resolve(&d.sourcing, later).unwrap();
        let revised = record.revise(&d, same, later);
        assert_eq!(revised.sourcing, record.sourcing);
        assert_eq!(revised.updated_at, later);
        assert_eq!(revised.revision, record.revision + 1);
    }

    #[test]
    fn revise_keeps_snapshot_creation_time_on_change() {
        let created = Utc::now();
        let later = created + chrono::Duration::hours(1);
        let d = draft(SourcingInput::custom(custom_fields(15)));
        let record = VariantRecord::create(
            VariantId::new(),
            &d,
            resolve(&d.sourcing, created).unwrap(),
            created,
        );

        let changed = draft(SourcingInput::custom(custom_fields(25)));
        let revised = record.revise(&changed, resolve(&changed.sourcing, later).unwrap(), later);
        let snapshot = revised.sourcing.snapshot().unwrap();
        assert_eq!(snapshot.quantity, 25);
        assert_eq!(snapshot.created_at, created);
        assert_eq!(snapshot.updated_at, later);
    }
}

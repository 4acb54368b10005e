//! Flat column shape of a variant's sourcing, as relational stores keep it.
//!
//! `variants(sourcing_mode, material_ref, material_quantity, material_snapshot)`.
//! Converting to columns always yields an exclusive combination; converting
//! back rejects any row that mixes modes.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use konveksi_core::{DomainError, DomainResult, RawMaterialId};
use konveksi_sourcing::{CustomMaterialSnapshot, SourcingDecision, SourcingMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcingColumns {
    pub sourcing_mode: String,
    pub material_ref: Option<Uuid>,
    pub material_quantity: Option<i64>,
    pub material_snapshot: Option<JsonValue>,
}

impl SourcingColumns {
    pub fn from_decision(decision: &SourcingDecision) -> DomainResult<Self> {
        let mode = decision.mode().code().to_string();
        Ok(match decision {
            SourcingDecision::None => Self {
                sourcing_mode: mode,
                material_ref: None,
                material_quantity: None,
                material_snapshot: None,
            },
            SourcingDecision::Existing {
                material_ref,
                material_quantity,
            } => Self {
                sourcing_mode: mode,
                material_ref: Some(*material_ref.as_uuid()),
                material_quantity: Some(*material_quantity),
                material_snapshot: None,
            },
            SourcingDecision::Custom { snapshot } => Self {
                sourcing_mode: mode,
                material_ref: None,
                material_quantity: None,
                material_snapshot: Some(serde_json::to_value(snapshot).map_err(|e| {
                    DomainError::validation(format!("snapshot serialization failed: {e}"))
                })?),
            },
        })
    }

    pub fn into_decision(self) -> DomainResult<SourcingDecision> {
        let mode: SourcingMode = self.sourcing_mode.parse()?;
        match (mode, self.material_ref, self.material_quantity, self.material_snapshot) {
            (SourcingMode::None, None, None, None) => Ok(SourcingDecision::None),
            (SourcingMode::Existing, Some(material_ref), quantity, None) => {
                let material_quantity = quantity.unwrap_or(0);
                if material_quantity < 0 {
                    return Err(DomainError::validation(format!(
                        "stored material_quantity is negative ({material_quantity})"
                    )));
                }
                Ok(SourcingDecision::Existing {
                    material_ref: RawMaterialId::from_uuid(material_ref),
                    material_quantity,
                })
            }
            (SourcingMode::Custom, None, None, Some(json)) => {
                let snapshot: CustomMaterialSnapshot = serde_json::from_value(json).map_err(|e| {
                    DomainError::validation(format!("stored material_snapshot is malformed: {e}"))
                })?;
                Ok(SourcingDecision::Custom { snapshot })
            }
            (mode, material_ref, quantity, snapshot) => Err(DomainError::validation(format!(
                "stored sourcing columns are not exclusive for mode {mode} \
                 (material_ref: {}, material_quantity: {}, material_snapshot: {})",
                material_ref.is_some(),
                quantity.is_some(),
                snapshot.is_some()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn snapshot() -> CustomMaterialSnapshot {
        let now = Utc::now();
        CustomMaterialSnapshot {
            material_name: "Twill".to_string(),
            material_type: "Woven".to_string(),
            material_category: "Fabric".to_string(),
            color: "Black".to_string(),
            unit: "m".to_string(),
            purchase_price: 2500,
            quantity: 15,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn existing_mode_without_reference_is_rejected() {
        let columns = SourcingColumns {
            sourcing_mode: "existing".to_string(),
            material_ref: None,
            material_quantity: Some(3),
            material_snapshot: None,
        };
        assert!(matches!(columns.into_decision(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn reference_and_snapshot_together_are_rejected() {
        let mut columns = SourcingColumns::from_decision(&SourcingDecision::Custom {
            snapshot: snapshot(),
        })
        .unwrap();
        columns.material_ref = Some(Uuid::now_v7());
        assert!(columns.clone().into_decision().is_err());

        columns.sourcing_mode = "existing".to_string();
        assert!(columns.into_decision().is_err());
    }

    #[test]
    fn custom_snapshot_survives_json_column() {
        let decision = SourcingDecision::Custom {
            snapshot: snapshot(),
        };
        let columns = SourcingColumns::from_decision(&decision).unwrap();
        assert_eq!(columns.sourcing_mode, "custom");
        assert_eq!(columns.into_decision().unwrap(), decision);
    }

    fn decision() -> impl Strategy<Value = SourcingDecision> {
        prop_oneof![
            Just(SourcingDecision::None),
            (0i64..10_000).prop_map(|q| SourcingDecision::Existing {
                material_ref: RawMaterialId::new(),
                material_quantity: q,
            }),
            (1i64..1_000_000, 0i64..10_000).prop_map(|(price, quantity)| {
                let mut s = snapshot();
                s.purchase_price = price;
                s.quantity = quantity;
                SourcingDecision::Custom { snapshot: s }
            }),
        ]
    }

    proptest! {
        /// Property: persisted columns never hold both a reference and a snapshot,
        /// and `existing` always carries a reference.
        #[test]
        fn columns_are_exclusive(decision in decision()) {
            let columns = SourcingColumns::from_decision(&decision).unwrap();
            prop_assert!(!(columns.material_ref.is_some() && columns.material_snapshot.is_some()));
            if columns.sourcing_mode == "existing" {
                prop_assert!(columns.material_ref.is_some());
            }
            prop_assert_eq!(columns.into_decision().unwrap(), decision);
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use konveksi_core::{DomainError, RawMaterialId};

/// Sourcing mode flag as exchanged with callers and stored in `variants.sourcing_mode`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcingMode {
    None,
    Existing,
    Custom,
}

impl SourcingMode {
    pub fn code(self) -> &'static str {
        match self {
            SourcingMode::None => "none",
            SourcingMode::Existing => "existing",
            SourcingMode::Custom => "custom",
        }
    }
}

impl core::str::FromStr for SourcingMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SourcingMode::None),
            "existing" => Ok(SourcingMode::Existing),
            "custom" => Ok(SourcingMode::Custom),
            other => Err(DomainError::validation(format!(
                "unknown sourcing mode `{other}`"
            ))),
        }
    }
}

impl core::fmt::Display for SourcingMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Material sourced outside the shared inventory pool, embedded in a variant.
///
/// Never linked to a `RawMaterial` and never moves raw-material stock.
/// `purchase_price` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMaterialSnapshot {
    pub material_name: String,
    pub material_type: String,
    pub material_category: String,
    pub color: String,
    pub unit: String,
    pub purchase_price: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomMaterialSnapshot {
    /// Carry the original creation time over from a previous revision of this snapshot.
    pub fn revised_from(mut self, previous: &CustomMaterialSnapshot) -> Self {
        self.created_at = previous.created_at;
        self
    }

    /// Field-wise equality ignoring timestamps.
    pub fn same_material(&self, other: &CustomMaterialSnapshot) -> bool {
        self.material_name == other.material_name
            && self.material_type == other.material_type
            && self.material_category == other.material_category
            && self.color == other.color
            && self.unit == other.unit
            && self.purchase_price == other.purchase_price
            && self.quantity == other.quantity
    }
}

/// How a variant's material was obtained. Exactly one mode at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SourcingDecision {
    None,
    Existing {
        material_ref: RawMaterialId,
        /// Raw material consumed for the variant's stock batch.
        material_quantity: i64,
    },
    Custom {
        snapshot: CustomMaterialSnapshot,
    },
}

impl SourcingDecision {
    pub fn mode(&self) -> SourcingMode {
        match self {
            SourcingDecision::None => SourcingMode::None,
            SourcingDecision::Existing { .. } => SourcingMode::Existing,
            SourcingDecision::Custom { .. } => SourcingMode::Custom,
        }
    }

    pub fn material_ref(&self) -> Option<RawMaterialId> {
        match self {
            SourcingDecision::Existing { material_ref, .. } => Some(*material_ref),
            _ => None,
        }
    }

    /// Raw-material consumption attributed to this decision: `(material, quantity)`.
    pub fn consumption(&self) -> Option<(RawMaterialId, i64)> {
        match self {
            SourcingDecision::Existing {
                material_ref,
                material_quantity,
            } => Some((*material_ref, *material_quantity)),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&CustomMaterialSnapshot> {
        match self {
            SourcingDecision::Custom { snapshot } => Some(snapshot),
            _ => None,
        }
    }
}

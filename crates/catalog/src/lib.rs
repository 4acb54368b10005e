//! Catalog records: raw materials and product variants.
//!
//! Records carry identity and descriptive fields only. Stock is attached when
//! a record is read back together with its ledger projection.

pub mod persisted;
pub mod raw_material;
pub mod variant;

pub use persisted::SourcingColumns;
pub use raw_material::{MaterialDetails, RawMaterial, RawMaterialDraft, RawMaterialRecord};
pub use variant::{Variant, VariantDraft, VariantRecord};

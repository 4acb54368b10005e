//! Material sourcing for variants.
//!
//! A variant's material either comes from shared raw-material inventory, from a
//! self-contained custom snapshot, or is not recorded at all. This crate owns
//! that tagged union, the pure resolver that builds it from editor input, and
//! the editor-side state machine that keeps custom entries across mode toggles.

pub mod decision;
pub mod form;
pub mod resolver;

pub use decision::{CustomMaterialSnapshot, SourcingDecision, SourcingMode};
pub use form::{CustomEntries, CustomField, FormEvent, FormMode, SourcingFormState};
pub use resolver::{CustomMaterialFields, SourcingInput, resolve};

//! Domain foundation shared by the konveksi crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod version;

pub use error::{DomainError, DomainResult};
pub use id::{RawMaterialId, TransactionId, VariantId};
pub use version::ExpectedVersion;

//! Material sourcing resolution.
//!
//! `resolve` turns a loosely-typed sourcing request (a mode flag plus optional
//! material fields, as an editor produces them) into a `SourcingDecision`.
//! It is pure: creation and editing call it with the same rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use konveksi_core::{DomainError, DomainResult, RawMaterialId};

use crate::decision::{CustomMaterialSnapshot, SourcingDecision, SourcingMode};

/// Custom-material fields as entered. `None` means not provided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMaterialFields {
    pub material_name: Option<String>,
    pub material_type: Option<String>,
    pub material_category: Option<String>,
    pub color: Option<String>,
    pub unit: Option<String>,
    pub purchase_price: Option<i64>,
    pub quantity: Option<i64>,
}

impl CustomMaterialFields {
    /// Name of the first field carrying a value, if any.
    fn first_present(&self) -> Option<&'static str> {
        let texts = [
            ("material_name", &self.material_name),
            ("material_type", &self.material_type),
            ("material_category", &self.material_category),
            ("color", &self.color),
            ("unit", &self.unit),
        ];
        texts
            .into_iter()
            .find(|(_, v)| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
            .map(|(name, _)| name)
            .or_else(|| self.purchase_price.map(|_| "purchase_price"))
            .or_else(|| self.quantity.map(|_| "quantity"))
    }
}

/// Sourcing request handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcingInput {
    /// `"none"`, `"existing"` or `"custom"`.
    pub mode: String,
    pub existing_ref: Option<String>,
    pub existing_quantity: Option<i64>,
    pub custom: Option<CustomMaterialFields>,
}

impl SourcingInput {
    pub fn none() -> Self {
        Self {
            mode: SourcingMode::None.code().to_string(),
            existing_ref: None,
            existing_quantity: None,
            custom: None,
        }
    }

    pub fn existing(material_ref: impl Into<String>, quantity: Option<i64>) -> Self {
        Self {
            mode: SourcingMode::Existing.code().to_string(),
            existing_ref: Some(material_ref.into()),
            existing_quantity: quantity,
            custom: None,
        }
    }

    pub fn custom(fields: CustomMaterialFields) -> Self {
        Self {
            mode: SourcingMode::Custom.code().to_string(),
            existing_ref: None,
            existing_quantity: None,
            custom: Some(fields),
        }
    }
}

/// Resolve a sourcing request into exactly one sourcing mode.
///
/// `now` stamps a custom snapshot's `created_at`/`updated_at`.
pub fn resolve(input: &SourcingInput, now: DateTime<Utc>) -> DomainResult<SourcingDecision> {
    let mode: SourcingMode = input.mode.parse()?;

    match mode {
        SourcingMode::None => {
            reject_existing_fields(input, mode)?;
            reject_custom_fields(input, mode)?;
            Ok(SourcingDecision::None)
        }
        SourcingMode::Existing => {
            reject_custom_fields(input, mode)?;
            resolve_existing(input)
        }
        SourcingMode::Custom => {
            reject_existing_fields(input, mode)?;
            let fields = input
                .custom
                .as_ref()
                .ok_or(DomainError::incomplete("material_name"))?;
            Ok(SourcingDecision::Custom {
                snapshot: snapshot_from_fields(fields, now)?,
            })
        }
    }
}

fn resolve_existing(input: &SourcingInput) -> DomainResult<SourcingDecision> {
    let raw_ref = input
        .existing_ref
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::validation("existing mode requires a material reference"))?;
    let material_ref: RawMaterialId = raw_ref.parse()?;

    let material_quantity = input.existing_quantity.unwrap_or(0);
    if material_quantity < 0 {
        return Err(DomainError::validation(format!(
            "material_quantity must be non-negative (got {material_quantity})"
        )));
    }

    Ok(SourcingDecision::Existing {
        material_ref,
        material_quantity,
    })
}

fn snapshot_from_fields(
    fields: &CustomMaterialFields,
    now: DateTime<Utc>,
) -> DomainResult<CustomMaterialSnapshot> {
    let material_name = required_text(&fields.material_name, "material_name")?;
    let material_type = required_text(&fields.material_type, "material_type")?;
    let material_category = required_text(&fields.material_category, "material_category")?;
    let color = required_text(&fields.color, "color")?;
    let unit = required_text(&fields.unit, "unit")?;
    let purchase_price = fields
        .purchase_price
        .ok_or(DomainError::incomplete("purchase_price"))?;
    let quantity = fields.quantity.ok_or(DomainError::incomplete("quantity"))?;

    if purchase_price <= 0 {
        return Err(DomainError::validation(format!(
            "purchase_price must be greater than zero (got {purchase_price})"
        )));
    }
    if quantity < 0 {
        return Err(DomainError::validation(format!(
            "quantity must be non-negative (got {quantity})"
        )));
    }

    Ok(CustomMaterialSnapshot {
        material_name,
        material_type,
        material_category,
        color,
        unit,
        purchase_price,
        quantity,
        created_at: now,
        updated_at: now,
    })
}

fn required_text(value: &Option<String>, field: &'static str) -> DomainResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(DomainError::incomplete(field))
}

fn reject_existing_fields(input: &SourcingInput, mode: SourcingMode) -> DomainResult<()> {
    let has_ref = input
        .existing_ref
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    if has_ref {
        return Err(DomainError::validation(format!(
            "existing_ref is not accepted in {mode} mode"
        )));
    }
    if input.existing_quantity.is_some() {
        return Err(DomainError::validation(format!(
            "existing_quantity is not accepted in {mode} mode"
        )));
    }
    Ok(())
}

fn reject_custom_fields(input: &SourcingInput, mode: SourcingMode) -> DomainResult<()> {
    match input.custom.as_ref().and_then(CustomMaterialFields::first_present) {
        Some(field) => Err(DomainError::validation(format!(
            "custom material field `{field}` is not accepted in {mode} mode"
        ))),
        None => Ok(()),
    }
}

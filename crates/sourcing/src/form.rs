//! Editor-side sourcing state.
//!
//! An editor toggles between picking a shared raw material and typing a custom
//! material. `SourcingFormState` keeps the custom entries typed so far in a
//! side buffer while the editor shows the existing-material picker, so toggling
//! back restores them. The state is a plain value; `apply` returns the next
//! state and never fails.

use serde::{Deserialize, Serialize};

use konveksi_core::{DomainError, DomainResult};

use crate::decision::{CustomMaterialSnapshot, SourcingDecision};
use crate::resolver::{CustomMaterialFields, SourcingInput};

/// Which half of the sourcing editor is visible.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Existing,
    Custom,
}

/// One of the seven custom-material inputs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomField {
    MaterialName,
    MaterialType,
    MaterialCategory,
    Color,
    Unit,
    PurchasePrice,
    Quantity,
}

impl CustomField {
    pub const ALL: [CustomField; 7] = [
        CustomField::MaterialName,
        CustomField::MaterialType,
        CustomField::MaterialCategory,
        CustomField::Color,
        CustomField::Unit,
        CustomField::PurchasePrice,
        CustomField::Quantity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CustomField::MaterialName => "material_name",
            CustomField::MaterialType => "material_type",
            CustomField::MaterialCategory => "material_category",
            CustomField::Color => "color",
            CustomField::Unit => "unit",
            CustomField::PurchasePrice => "purchase_price",
            CustomField::Quantity => "quantity",
        }
    }
}

/// Custom-material inputs exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntries {
    pub material_name: String,
    pub material_type: String,
    pub material_category: String,
    pub color: String,
    pub unit: String,
    pub purchase_price: String,
    pub quantity: String,
}

impl CustomEntries {
    pub fn from_snapshot(snapshot: &CustomMaterialSnapshot) -> Self {
        Self {
            material_name: snapshot.material_name.clone(),
            material_type: snapshot.material_type.clone(),
            material_category: snapshot.material_category.clone(),
            color: snapshot.color.clone(),
            unit: snapshot.unit.clone(),
            purchase_price: snapshot.purchase_price.to_string(),
            quantity: snapshot.quantity.to_string(),
        }
    }

    pub fn get(&self, field: CustomField) -> &str {
        match field {
            CustomField::MaterialName => &self.material_name,
            CustomField::MaterialType => &self.material_type,
            CustomField::MaterialCategory => &self.material_category,
            CustomField::Color => &self.color,
            CustomField::Unit => &self.unit,
            CustomField::PurchasePrice => &self.purchase_price,
            CustomField::Quantity => &self.quantity,
        }
    }

    fn slot(&mut self, field: CustomField) -> &mut String {
        match field {
            CustomField::MaterialName => &mut self.material_name,
            CustomField::MaterialType => &mut self.material_type,
            CustomField::MaterialCategory => &mut self.material_category,
            CustomField::Color => &mut self.color,
            CustomField::Unit => &mut self.unit,
            CustomField::PurchasePrice => &mut self.purchase_price,
            CustomField::Quantity => &mut self.quantity,
        }
    }

    /// True when every input is blank.
    pub fn is_empty(&self) -> bool {
        CustomField::ALL
            .into_iter()
            .all(|f| self.get(f).trim().is_empty())
    }

    /// Convert typed text into resolver fields. Blank inputs become `None`;
    /// non-integer price or quantity text is a validation error.
    pub fn to_fields(&self) -> DomainResult<CustomMaterialFields> {
        Ok(CustomMaterialFields {
            material_name: text(&self.material_name),
            material_type: text(&self.material_type),
            material_category: text(&self.material_category),
            color: text(&self.color),
            unit: text(&self.unit),
            purchase_price: integer(&self.purchase_price, CustomField::PurchasePrice)?,
            quantity: integer(&self.quantity, CustomField::Quantity)?,
        })
    }
}

fn text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn integer(value: &str, field: CustomField) -> DomainResult<Option<i64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<i64>().map(Some).map_err(|_| {
        DomainError::validation(format!(
            "{} must be a whole number (got `{trimmed}`)",
            field.name()
        ))
    })
}

/// Editor input events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    SwitchMode { mode: FormMode },
    SelectMaterial { material_ref: String },
    SetMaterialQuantity { quantity: String },
    EditCustom { field: CustomField, value: String },
    /// Explicitly discard custom entries, including the remembered ones.
    ClearCustom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcingFormState {
    mode: FormMode,
    existing_ref: Option<String>,
    existing_quantity: String,
    active: CustomEntries,
    last_custom_entries: Option<CustomEntries>,
}

impl Default for SourcingFormState {
    fn default() -> Self {
        Self {
            mode: FormMode::Custom,
            existing_ref: None,
            existing_quantity: String::new(),
            active: CustomEntries::default(),
            last_custom_entries: None,
        }
    }
}

impl SourcingFormState {
    /// Initial editor state for a variant being edited.
    pub fn for_decision(decision: &SourcingDecision) -> Self {
        match decision {
            SourcingDecision::Existing {
                material_ref,
                material_quantity,
            } => Self {
                mode: FormMode::Existing,
                existing_ref: Some(material_ref.to_string()),
                existing_quantity: material_quantity.to_string(),
                ..Self::default()
            },
            SourcingDecision::Custom { snapshot } => Self {
                active: CustomEntries::from_snapshot(snapshot),
                ..Self::default()
            },
            SourcingDecision::None => Self::default(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn existing_ref(&self) -> Option<&str> {
        self.existing_ref.as_deref()
    }

    /// Custom entries currently visible (blank while in `Existing` mode).
    pub fn active_entries(&self) -> &CustomEntries {
        &self.active
    }

    pub fn last_custom_entries(&self) -> Option<&CustomEntries> {
        self.last_custom_entries.as_ref()
    }

    /// Transition function.
    pub fn apply(&self, event: FormEvent) -> SourcingFormState {
        let mut next = self.clone();
        match event {
            FormEvent::SwitchMode { mode } if mode == self.mode => {}
            FormEvent::SwitchMode {
                mode: FormMode::Existing,
            } => {
                let active = std::mem::take(&mut next.active);
                if !active.is_empty() {
                    next.last_custom_entries = Some(active);
                }
                next.existing_ref = None;
                next.existing_quantity.clear();
                next.mode = FormMode::Existing;
            }
            FormEvent::SwitchMode {
                mode: FormMode::Custom,
            } => {
                next.active = next
                    .last_custom_entries
                    .clone()
                    .filter(|entries| !entries.is_empty())
                    .unwrap_or_default();
                next.existing_ref = None;
                next.existing_quantity.clear();
                next.mode = FormMode::Custom;
            }
            // The picker and the custom inputs are never visible together;
            // events for the hidden half are dropped.
            FormEvent::SelectMaterial { material_ref } => {
                if self.mode == FormMode::Existing {
                    next.existing_ref = text(&material_ref);
                }
            }
            FormEvent::SetMaterialQuantity { quantity } => {
                if self.mode == FormMode::Existing {
                    next.existing_quantity = quantity;
                }
            }
            FormEvent::EditCustom { field, value } => {
                if self.mode == FormMode::Custom {
                    *next.active.slot(field) = value;
                }
            }
            FormEvent::ClearCustom => {
                next.active = CustomEntries::default();
                next.last_custom_entries = None;
            }
        }
        next
    }

    /// Build the resolver request for the visible half of the editor.
    ///
    /// A custom editor with every input blank means "no material".
    pub fn to_input(&self) -> DomainResult<SourcingInput> {
        match self.mode {
            FormMode::Existing => {
                let quantity = integer(&self.existing_quantity, CustomField::Quantity)
                    .map_err(|_| {
                        DomainError::validation(format!(
                            "material_quantity must be a whole number (got `{}`)",
                            self.existing_quantity.trim()
                        ))
                    })?;
                Ok(SourcingInput::existing(
                    self.existing_ref.clone().unwrap_or_default(),
                    quantity,
                ))
            }
            FormMode::Custom if self.active.is_empty() => Ok(SourcingInput::none()),
            FormMode::Custom => Ok(SourcingInput::custom(self.active.to_fields()?)),
        }
    }
}

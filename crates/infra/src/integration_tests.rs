//! Integration tests across the inventory services.
//!
//! Flow: SourcingFormState → resolver → VariantProvisioningService → store → ledger
//!
//! Verifies:
//! - Variant creation and updates move raw-material stock exactly once
//! - Rejected requests write nothing
//! - A unit of work interrupted mid-append leaves nothing behind
//! - Concurrent consumers never oversell a material

use std::sync::Arc;

use proptest::prelude::*;

use konveksi_catalog::{MaterialDetails, RawMaterialDraft, SourcingColumns, Variant, VariantDraft};
use konveksi_core::{RawMaterialId, VariantId};
use konveksi_ledger::{StockTransaction, Subject, SubjectKind, TransactionReason};
use konveksi_sourcing::{
    CustomField, CustomMaterialFields, FormEvent, FormMode, SourcingDecision, SourcingFormState, SourcingInput,
};

use crate::config::InventoryConfig;
use crate::error::InventoryError;
use crate::materials::MaterialRegistry;
use crate::movements::StockMovementService;
use crate::provisioning::VariantProvisioningService;
use crate::store::{FaultPoint, InMemoryInventoryStore, InventoryStore, StoreError};

struct Harness {
    store: Arc<InMemoryInventoryStore>,
    materials: MaterialRegistry<Arc<InMemoryInventoryStore>>,
    variants: VariantProvisioningService<Arc<InMemoryInventoryStore>>,
    movements: StockMovementService<Arc<InMemoryInventoryStore>>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(InventoryConfig::default())
    }

    fn with_config(config: InventoryConfig) -> Self {
        konveksi_observability::init_test();
        let store = Arc::new(InMemoryInventoryStore::new());
        Self {
            materials: MaterialRegistry::new(store.clone(), &config),
            variants: VariantProvisioningService::new(store.clone(), &config),
            movements: StockMovementService::new(store.clone(), &config),
            store,
        }
    }

    /// M1 with `[INIT +opening]`.
    fn material(&self, opening: i64) -> RawMaterialId {
        self.materials
            .register(&RawMaterialDraft {
                details: MaterialDetails {
                    name: "Cotton Combed 30s".to_string(),
                    unit: "kg".to_string(),
                    purchase_price: 125_000,
                    buffer_stock: 20,
                    color_ref: None,
                },
                opening_stock: opening,
            })
            .unwrap()
            .id()
    }

    fn stock(&self, subject: impl Into<Subject>) -> i64 {
        let subject = subject.into();
        self.variants
            .ledger()
            .current_stock(subject.kind(), subject.uuid())
            .unwrap()
    }

    fn history(&self, subject: impl Into<Subject>) -> Vec<StockTransaction> {
        self.variants.ledger().history(subject.into()).unwrap()
    }
}

fn draft(sourcing: SourcingInput, initial_stock: i64) -> VariantDraft {
    VariantDraft {
        product_ref: "kaos-oblong".to_string(),
        color_ref: "navy".to_string(),
        size_ref: "M".to_string(),
        sourcing,
        initial_stock,
    }
}

fn existing(material: RawMaterialId, quantity: i64) -> SourcingInput {
    SourcingInput::existing(material.to_string(), Some(quantity))
}

fn custom_fields(quantity: i64, purchase_price: i64) -> CustomMaterialFields {
    CustomMaterialFields {
        material_name: Some("Baby Terry".to_string()),
        material_type: Some("Knit".to_string()),
        material_category: Some("Fabric".to_string()),
        color: Some("Misty".to_string()),
        unit: Some("kg".to_string()),
        purchase_price: Some(purchase_price),
        quantity: Some(quantity),
    }
}

fn deltas(history: &[StockTransaction]) -> Vec<(TransactionReason, i64)> {
    history.iter().map(|t| (t.reason, t.delta)).collect()
}

#[test]
fn existing_material_consumption_on_create() {
    let h = Harness::new();
    let m1 = h.material(100);

    let variant = h.variants.create_variant(&draft(existing(m1, 30), 20)).unwrap();

    assert_eq!(variant.stock, 20);
    assert_eq!(h.stock(m1), 70);
    assert_eq!(deltas(&h.history(variant.id())), vec![(TransactionReason::Init, 20)]);
    assert_eq!(
        deltas(&h.history(m1)),
        vec![(TransactionReason::Init, 100), (TransactionReason::Production, -30)]
    );
}

#[test]
fn oversized_consumption_is_rejected_without_writes() {
    let h = Harness::new();
    let m1 = h.material(100);

    let err = h.variants.create_variant(&draft(existing(m1, 150), 20)).unwrap_err();

    assert!(matches!(
        err,
        InventoryError::InsufficientStock {
            requested: 150,
            available: 100
        }
    ));
    assert!(h.variants.list_variants().unwrap().is_empty());
    assert_eq!(h.store.all_transactions().unwrap().len(), 1);
    assert_eq!(h.stock(m1), 100);
}

#[test]
fn custom_material_is_snapshotted_without_touching_inventory() {
    let h = Harness::new();
    let m1 = h.material(100);

    let variant = h
        .variants
        .create_variant(&draft(SourcingInput::custom(custom_fields(15, 2500)), 0))
        .unwrap();

    let snapshot = variant.sourcing().snapshot().unwrap();
    assert_eq!(snapshot.quantity, 15);
    assert_eq!(snapshot.purchase_price, 2500);
    assert_eq!(h.variants.get_variant(variant.id()).unwrap().record.sourcing, variant.record.sourcing);
    assert_eq!(h.history(m1).len(), 1);
    assert!(h.history(variant.id()).is_empty());
}

#[test]
fn raising_consumption_emits_only_the_increase() {
    let h = Harness::new();
    let m1 = h.material(100);
    let variant = h.variants.create_variant(&draft(existing(m1, 30), 20)).unwrap();
    assert_eq!(h.stock(m1), 70);

    let updated = h.variants.update_variant(variant.id(), &draft(existing(m1, 45), 0)).unwrap();

    assert_eq!(h.stock(m1), 55);
    assert_eq!(
        h.history(m1).last().map(|t| (t.reason, t.delta)),
        Some((TransactionReason::Production, -15))
    );
    assert_eq!(h.history(m1).len(), 3);
    assert_eq!(updated.stock, 20);
}

#[test]
fn lowering_consumption_returns_the_difference() {
    let h = Harness::new();
    let m1 = h.material(100);
    let variant = h.variants.create_variant(&draft(existing(m1, 30), 20)).unwrap();

    h.variants.update_variant(variant.id(), &draft(existing(m1, 10), 0)).unwrap();

    assert_eq!(h.stock(m1), 90);
    assert_eq!(
        h.history(m1).last().map(|t| (t.reason, t.delta)),
        Some((TransactionReason::Production, 20))
    );
}

#[test]
fn unchanged_consumption_emits_nothing() {
    let h = Harness::new();
    let m1 = h.material(100);
    let variant = h.variants.create_variant(&draft(existing(m1, 30), 20)).unwrap();

    let mut renamed = draft(existing(m1, 30), 0);
    renamed.color_ref = "maroon".to_string();
    let updated = h.variants.update_variant(variant.id(), &renamed).unwrap();

    assert_eq!(updated.record.color_ref, "maroon");
    assert_eq!(h.history(m1).len(), 2);
    assert_eq!(h.history(variant.id()).len(), 1);
}

#[test]
fn moving_to_another_material_returns_and_consumes() {
    let h = Harness::new();
    let m1 = h.material(100);
    let m2 = h.material(50);
    let variant = h.variants.create_variant(&draft(existing(m1, 30), 0)).unwrap();

    let err = h
        .variants
        .update_variant(variant.id(), &draft(existing(m2, 60), 0))
        .unwrap_err();
    assert!(matches!(
        err,
        InventoryError::InsufficientStock {
            requested: 60,
            available: 50
        }
    ));
    assert_eq!((h.stock(m1), h.stock(m2)), (70, 50));

    h.variants.update_variant(variant.id(), &draft(existing(m2, 40), 0)).unwrap();
    assert_eq!((h.stock(m1), h.stock(m2)), (100, 10));
}

#[test]
fn interrupted_commit_leaves_nothing_visible() {
    let h = Harness::new();
    let m1 = h.material(100);

    // Fails between the variant's INIT and the material's PRODUCTION append.
    h.store.inject_fault(FaultPoint::BeforeAppend(1));
    let err = h.variants.create_variant(&draft(existing(m1, 30), 20)).unwrap_err();

    assert!(matches!(err, InventoryError::Persistence(StoreError::Unavailable(_))));
    assert!(h.variants.list_variants().unwrap().is_empty());
    assert_eq!(h.stock(m1), 100);
    assert_eq!(h.store.all_transactions().unwrap().len(), 1);

    // Nothing to clean up; the same request simply succeeds on retry.
    let variant = h.variants.create_variant(&draft(existing(m1, 30), 20)).unwrap();
    assert_eq!((variant.stock, h.stock(m1)), (20, 70));
}

#[test]
fn concurrent_consumers_never_oversell() {
    let h = Arc::new(Harness::with_config(InventoryConfig {
        max_commit_attempts: 20,
        ..InventoryConfig::default()
    }));
    let m1 = h.material(100);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let h = h.clone();
            std::thread::spawn(move || h.variants.create_variant(&draft(existing(m1, 15), 1)))
        })
        .collect();
    let results: Vec<Result<Variant, InventoryError>> =
        handles.into_iter().map(|t| t.join().unwrap()).collect();

    let created = results.iter().filter(|r| r.is_ok()).count() as i64;
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(err, InventoryError::InsufficientStock { .. }), "{err:?}");
    }
    assert_eq!(created, 6);
    assert_eq!(h.stock(m1), 10);
    assert_eq!(h.variants.list_variants().unwrap().len() as i64, created);
}

#[test]
fn concurrent_consumption_increases_never_oversell() {
    let h = Arc::new(Harness::with_config(InventoryConfig {
        max_commit_attempts: 20,
        ..InventoryConfig::default()
    }));
    let m1 = h.material(100);
    let ids: Vec<VariantId> = (0..5)
        .map(|_| h.variants.create_variant(&draft(existing(m1, 10), 0)).unwrap().id())
        .collect();
    assert_eq!(h.stock(m1), 50);

    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let (h, id) = (h.clone(), *id);
            std::thread::spawn(move || h.variants.update_variant(id, &draft(existing(m1, 30), 0)))
        })
        .collect();
    let results: Vec<Result<Variant, InventoryError>> =
        handles.into_iter().map(|t| t.join().unwrap()).collect();

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(err, InventoryError::InsufficientStock { requested: 20, .. }), "{err:?}");
    }
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
    assert_eq!(h.stock(m1), 10);

    let consumed: i64 = h
        .variants
        .list_variants()
        .unwrap()
        .iter()
        .filter_map(|v| v.sourcing().consumption().map(|(_, qty)| qty))
        .sum();
    assert_eq!(consumed, 90);
}

#[test]
fn concurrent_updates_of_one_variant_keep_material_in_step() {
    let h = Arc::new(Harness::with_config(InventoryConfig {
        max_commit_attempts: 20,
        ..InventoryConfig::default()
    }));
    let m1 = h.material(100);
    let id = h.variants.create_variant(&draft(existing(m1, 10), 0)).unwrap().id();

    let handles: Vec<_> = [40, 5, 25, 60, 15, 35]
        .into_iter()
        .map(|qty| {
            let h = h.clone();
            std::thread::spawn(move || h.variants.update_variant(id, &draft(existing(m1, qty), 0)))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let last = h.variants.get_variant(id).unwrap();
    assert_eq!(last.record.revision, 7);
    let (_, qty) = last.sourcing().consumption().unwrap();
    assert_eq!(h.stock(m1), 100 - qty);
}

#[test]
fn removing_a_referenced_material_is_a_conflict() {
    let h = Harness::new();
    let m1 = h.material(10);
    let variant = h.variants.create_variant(&draft(existing(m1, 0), 0)).unwrap();

    assert!(matches!(h.materials.remove(m1), Err(InventoryError::Conflict(_))));

    h.variants.update_variant(variant.id(), &draft(SourcingInput::none(), 0)).unwrap();
    h.materials.remove(m1).unwrap();
}

#[test]
fn sales_consume_variant_stock_only() {
    let h = Harness::new();
    let m1 = h.material(100);
    let variant = h.variants.create_variant(&draft(existing(m1, 30), 20)).unwrap();

    h.movements.record_sale(variant.id(), 12, Some("SO-0042")).unwrap();
    h.movements.record_return(variant.id(), 2, None).unwrap();
    assert!(h.movements.record_sale(variant.id(), 11, None).is_err());

    assert_eq!(h.stock(variant.id()), 10);
    assert_eq!(h.stock(m1), 70);
}

#[test]
fn persisted_sourcing_columns_are_exclusive() {
    let h = Harness::new();
    let m1 = h.material(100);
    h.variants.create_variant(&draft(existing(m1, 5), 0)).unwrap();
    h.variants
        .create_variant(&draft(SourcingInput::custom(custom_fields(3, 1000)), 0))
        .unwrap();
    h.variants.create_variant(&draft(SourcingInput::none(), 0)).unwrap();

    for variant in h.variants.list_variants().unwrap() {
        let columns = SourcingColumns::from_decision(variant.sourcing()).unwrap();
        assert!(!(columns.material_ref.is_some() && columns.material_snapshot.is_some()));
        if columns.sourcing_mode == "existing" {
            assert!(columns.material_ref.is_some());
        }
        assert_eq!(&columns.into_decision().unwrap(), variant.sourcing());
    }
}

#[test]
fn editor_round_trip_through_the_service() {
    let h = Harness::new();
    let m1 = h.material(100);

    // Type a custom material, peek at the inventory picker, come back.
    let mut form = SourcingFormState::default();
    for (field, value) in [
        (CustomField::MaterialName, "Baby Terry"),
        (CustomField::MaterialType, "Knit"),
        (CustomField::MaterialCategory, "Fabric"),
        (CustomField::Color, "Misty"),
        (CustomField::Unit, "kg"),
        (CustomField::PurchasePrice, "2500"),
        (CustomField::Quantity, "15"),
    ] {
        form = form.apply(FormEvent::EditCustom {
            field,
            value: value.to_string(),
        });
    }
    let typed = form.active_entries().clone();
    form = form.apply(FormEvent::SwitchMode { mode: FormMode::Existing });
    form = form.apply(FormEvent::SelectMaterial {
        material_ref: m1.to_string(),
    });
    form = form.apply(FormEvent::SwitchMode { mode: FormMode::Custom });
    assert_eq!(form.active_entries(), &typed);

    let variant = h.variants.create_variant(&draft(form.to_input().unwrap(), 4)).unwrap();
    assert_eq!(variant.sourcing().snapshot().map(|s| s.quantity), Some(15));

    // Re-open the saved variant and switch it onto inventory material.
    let form = SourcingFormState::for_decision(variant.sourcing())
        .apply(FormEvent::SwitchMode { mode: FormMode::Existing })
        .apply(FormEvent::SelectMaterial {
            material_ref: m1.to_string(),
        })
        .apply(FormEvent::SetMaterialQuantity {
            quantity: "25".to_string(),
        });
    let updated = h
        .variants
        .update_variant(variant.id(), &draft(form.to_input().unwrap(), 0))
        .unwrap();

    assert_eq!(
        updated.sourcing(),
        &SourcingDecision::Existing {
            material_ref: m1,
            material_quantity: 25
        }
    );
    assert_eq!(h.stock(m1), 75);
    assert_eq!(h.stock(Subject::new(SubjectKind::Variant, *variant.id().as_uuid())), 4);
}

#[test]
fn variants_serialize_with_tagged_sourcing_and_flat_record() {
    let h = Harness::new();
    let m1 = h.material(100);
    let variant = h.variants.create_variant(&draft(existing(m1, 30), 20)).unwrap();

    let json = serde_json::to_value(&variant).unwrap();
    assert_eq!(json["stock"], 20);
    assert_eq!(json["size_ref"], "M");
    assert_eq!(json["sourcing"]["mode"], "existing");
    assert_eq!(json["sourcing"]["material_quantity"], 30);
    assert!(json["sourcing"].get("snapshot").is_none());

    let back: Variant = serde_json::from_value(json).unwrap();
    assert_eq!(back, variant);
}

#[test]
fn unknown_variant_ids_are_not_found() {
    let h = Harness::new();
    assert!(matches!(
        h.variants.get_variant(VariantId::new()),
        Err(InventoryError::NotFound(_))
    ));
}

mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, ..ProptestConfig::default() })]

        /// Accepted consumption never exceeds what was available; rejected
        /// requests leave stock untouched.
        #[test]
        fn consumption_never_oversells(
            opening in 0i64..200,
            requests in prop::collection::vec(0i64..80, 1..12),
        ) {
            let h = Harness::new();
            let m1 = h.material(opening);
            let mut expected = opening;

            for qty in requests {
                match h.variants.create_variant(&draft(existing(m1, qty), 0)) {
                    Ok(_) => {
                        prop_assert!(qty <= expected);
                        expected -= qty;
                    }
                    Err(InventoryError::InsufficientStock { requested, available }) => {
                        prop_assert_eq!(requested, qty);
                        prop_assert_eq!(available, expected);
                        prop_assert!(qty > expected);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
                }
                prop_assert_eq!(h.stock(m1), expected);
                prop_assert!(expected >= 0);
            }
        }
    }
}

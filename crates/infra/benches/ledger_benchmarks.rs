use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use konveksi_catalog::{MaterialDetails, RawMaterialDraft, VariantDraft};
use konveksi_core::{RawMaterialId, TransactionId, VariantId};
use konveksi_infra::{InMemoryInventoryStore, InventoryConfig, MaterialRegistry, VariantProvisioningService};
use konveksi_ledger::{NewStockTransaction, StockProjection, StockTransaction, Subject, TransactionReason};
use konveksi_sourcing::SourcingInput;
use std::sync::Arc;

/// `count` transactions spread round-robin over `subjects` subjects.
fn synthetic_log(count: usize, subjects: usize) -> Vec<StockTransaction> {
    let ids: Vec<Subject> = (0..subjects)
        .map(|i| {
            if i % 2 == 0 {
                Subject::from(RawMaterialId::new())
            } else {
                Subject::from(VariantId::new())
            }
        })
        .collect();

    let mut log = Vec::with_capacity(count);
    for n in 0..count {
        let subject = ids[n % subjects];
        let delta = if n % 3 == 0 { 7 } else { -2 };
        let tx = NewStockTransaction::new(subject, delta, TransactionReason::Adjustment, Utc::now())
            .expect("non-zero delta");
        log.push(tx.commit(TransactionId::new(), (n / subjects) as u64 + 1));
    }
    log
}

fn bench_projection_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection_rebuild");

    for count in [100usize, 1_000, 10_000].iter() {
        let log = synthetic_log(*count, 50);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("from_log", count), &log, |b, log| {
            b.iter(|| {
                let projection = StockProjection::from_log(black_box(log)).expect("monotonic log");
                black_box(projection)
            });
        });
    }

    group.finish();
}

fn bench_create_variant(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_variant");
    group.sample_size(200);

    group.bench_function("existing_material", |b| {
        let store = Arc::new(InMemoryInventoryStore::new());
        let config = InventoryConfig::default();
        let material = MaterialRegistry::new(store.clone(), &config)
            .register(&RawMaterialDraft {
                details: MaterialDetails {
                    name: "Cotton Combed 30s".to_string(),
                    unit: "kg".to_string(),
                    purchase_price: 125_000,
                    buffer_stock: 0,
                    color_ref: None,
                },
                opening_stock: i64::MAX / 2,
            })
            .expect("register material");
        let service = VariantProvisioningService::new(store, &config);
        let draft = VariantDraft {
            product_ref: "kaos".to_string(),
            color_ref: "black".to_string(),
            size_ref: "L".to_string(),
            sourcing: SourcingInput::existing(material.id().to_string(), Some(3)),
            initial_stock: 10,
        };

        b.iter(|| black_box(service.create_variant(black_box(&draft)).expect("create variant")));
    });

    group.finish();
}

criterion_group!(benches, bench_projection_rebuild, bench_create_variant);
criterion_main!(benches);

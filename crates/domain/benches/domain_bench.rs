use std::sync::Arc;

use common::UserId;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use domain::{Cart, CartItem, CartService};
use record_store::InMemoryRecordStore;

fn item(n: usize) -> CartItem {
    CartItem::new(format!("p{n}"), "Benchmark Toy", 1, 99.0)
}

fn bench_cart_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("domain/cart_merge");

    for lines in [10usize, 100, 1000] {
        let batch: Vec<CartItem> = (0..lines).map(item).collect();
        group.bench_with_input(BenchmarkId::from_parameter(lines), &batch, |b, batch| {
            b.iter(|| {
                let mut cart = Cart::new(UserId::new());
                cart.merge_items(batch.iter().cloned());
                cart.merge_items(batch.iter().cloned());
                cart
            });
        });
    }

    group.finish();
}

fn bench_service_add(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryRecordStore::new(Arc::new(domain::collection_registry()));
    let service = CartService::new(store);
    let user_id = UserId::new();

    c.bench_function("domain/cart_service_add", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.add(user_id, item(1)).await.unwrap();
            });
        });
    });
}

fn bench_service_sync(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/cart_service_sync_50", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryRecordStore::new(Arc::new(domain::collection_registry()));
                let service = CartService::new(store);
                let batch: Vec<CartItem> = (0..50).map(item).collect();
                service.sync(UserId::new(), batch).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_cart_merge,
    bench_service_add,
    bench_service_sync
);
criterion_main!(benches);

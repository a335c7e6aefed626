use criterion::{criterion_group, criterion_main, Criterion};
use food_ledger::models::{FoodItem, NutrientVector};
use food_ledger::services::{derive_display, normalize, BrandCatalog};
use std::hint::black_box;

fn benchmark_brand_matching(c: &mut Criterion) {
    // Load the catalog once
    let catalog =
        BrandCatalog::load_from_file("data/brands.json").expect("Failed to load brand catalog");

    let branded = "grabbed a ZestBev Citrus Kick and a CrunchCo Granola Bar on the way in";
    // Long unbranded text exercises the full scan without a hit
    let unbranded = "two scrambled eggs with toast, butter and a glass of orange juice ".repeat(20);

    let mut group = c.benchmark_group("brand_matching");

    group.bench_function("branded_sentence", |b| {
        b.iter(|| catalog.estimate_for(black_box(branded)))
    });

    group.bench_function("long_unbranded_text", |b| {
        b.iter(|| catalog.estimate_for(black_box(&unbranded)))
    });

    group.finish();
}

fn benchmark_summary(c: &mut Criterion) {
    let goal = NutrientVector::new(2150.0, 205.0, 138.0, 29.0, 71.0);
    let remaining = NutrientVector::new(1234.5, 101.2, 40.7, 3.3, 0.0);
    let items: Vec<FoodItem> = (0..8)
        .map(|i| FoodItem {
            name: format!("item {}", i),
            quantity: 1.5,
            nutrients: NutrientVector::new(120.0, 14.5, 6.0, 1.2, 4.8),
        })
        .collect();
    let totals = items.iter().map(|i| &i.nutrients).sum::<NutrientVector>();

    let mut group = c.benchmark_group("summary");

    group.bench_function("derive_display", |b| {
        b.iter(|| derive_display(black_box(&goal), black_box(&remaining)))
    });

    group.bench_function("normalize_eight_items", |b| {
        b.iter(|| normalize(black_box(&items), black_box(&totals)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_brand_matching, benchmark_summary);
criterion_main!(benches);

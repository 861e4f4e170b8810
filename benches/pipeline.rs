//! Benchmarks for the ingestion pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use poly_movers::market::RawMarket;
use poly_movers::pipeline::{Pipeline, ProcessOptions};
use serde_json::json;

fn synthetic_batch(n: usize) -> Vec<RawMarket> {
    (0..n)
        .map(|i| {
            let yes = (i % 100) as f64 / 100.0;
            RawMarket::new(json!({
                "id": i.to_string(),
                "question": format!("Will event {i} happen before the 2026 election?"),
                "closed": i % 7 == 0,
                "archived": i % 11 == 0,
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": format!("[\"{}\", \"{}\"]", yes, 1.0 - yes),
                "volume24hr": (i * 37) as f64,
                "tags": [{"label": "All"}],
            }))
        })
        .collect()
}

fn benchmark_process(c: &mut Criterion) {
    let pipeline = Pipeline::default();
    let batch = synthetic_batch(1_000);
    let options = ProcessOptions::default();

    c.bench_function("pipeline_process_1k", |b| {
        b.iter(|| pipeline.process(black_box(&batch), black_box(&options)))
    });
}

fn benchmark_keyword_fallback(c: &mut Criterion) {
    let pipeline = Pipeline::default();
    let batch: Vec<RawMarket> = synthetic_batch(1_000)
        .into_iter()
        .map(|raw| {
            let mut value = raw.into_value();
            value["archived"] = json!(true);
            RawMarket::new(value)
        })
        .collect();
    let options = ProcessOptions::default();

    c.bench_function("pipeline_keyword_fallback_1k", |b| {
        b.iter(|| pipeline.process(black_box(&batch), black_box(&options)))
    });
}

criterion_group!(benches, benchmark_process, benchmark_keyword_fallback);
criterion_main!(benches);

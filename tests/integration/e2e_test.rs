//! End-to-end integration tests

use poly_movers::config::{Config, SourceMode};
use poly_movers::market::RawMarket;
use poly_movers::pipeline::{Pipeline, ProcessOptions};
use poly_movers::source::{extract_records, flatten_events};
use serde_json::json;

#[test]
fn test_config_example_loads() {
    let config = Config::from_toml(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.source.mode, SourceMode::Markets);
    assert_eq!(config.pipeline.min_viable_results, 1);
    assert!(config.pipeline.synthetic_jitter);
}

#[test]
fn test_config_drives_pipeline() {
    let toml = r#"
        [pipeline]
        synthetic_jitter = false
        seed = 7

        [filters]
        min_movement = 0.1
        limit = 1
    "#;
    let config = Config::from_toml(toml).unwrap();
    let pipeline = Pipeline::new(&config.pipeline);
    let options = ProcessOptions::from(&config.filters);

    let records: Vec<RawMarket> = extract_records(
        json!({"data": [
            {"id": "narrow", "question": "A", "outcomes": "[\"Yes\",\"No\"]", "outcomePrices": "[\"0.51\",\"0.49\"]"},
            {"id": "wide", "question": "B", "outcomes": "[\"Yes\",\"No\"]", "outcomePrices": "[\"0.6\",\"0.4\"]"},
            {"id": "mid", "question": "C", "outcomes": "[\"Yes\",\"No\"]", "outcomePrices": "[\"0.55\",\"0.45\"]"}
        ]}),
        &["data"],
    )
    .into_iter()
    .map(RawMarket::new)
    .collect();

    let output = pipeline.process(&records, &options);
    assert_eq!(output.markets.len(), 1);
    assert_eq!(output.markets[0].id(), "wide");
    assert_eq!(output.diagnostics.dropped.below_min_movement, 1);
    assert_eq!(output.diagnostics.dropped.over_limit, 1);
}

#[test]
fn test_events_dump_end_to_end() {
    let events = extract_records(
        json!([{
            "id": "ev",
            "title": "2026 Midterms",
            "tags": [{"label": "All"}, {"label": "Politics"}],
            "markets": [
                {"id": "m1", "question": "Democrats win the House?", "outcomes": ["Yes", "No"], "outcomePrices": ["0.58", "0.42"]},
                {"id": "m2", "question": "Republicans win the Senate?", "outcomes": ["Yes", "No"], "outcomePrices": ["0.7", "0.3"]}
            ]
        }]),
        &["events"],
    );
    let records = flatten_events(events);
    let output = Pipeline::default().process(&records, &ProcessOptions::default());

    assert_eq!(output.markets.len(), 2);
    assert!(output
        .markets
        .iter()
        .all(|m| m.category.as_str() == "politics"));
}

//! Integration tests for the ingestion pipeline

use chrono::{Duration, Utc};
use poly_movers::config::PipelineConfig;
use poly_movers::market::{Category, Market, RawMarket};
use poly_movers::movement::PriceSample;
use poly_movers::pipeline::{HistoryMap, Pipeline, ProcessOptions, TierKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn raw(records: Vec<Value>) -> Vec<RawMarket> {
    records.into_iter().map(RawMarket::new).collect()
}

fn deterministic() -> Pipeline {
    Pipeline::new(&PipelineConfig {
        synthetic_jitter: false,
        ..Default::default()
    })
}

fn ids(markets: &[Market]) -> Vec<&str> {
    markets.iter().map(Market::id).collect()
}

#[test]
fn test_single_record_scenario() {
    let records = raw(vec![json!({
        "id": "m1",
        "closed": false,
        "archived": false,
        "question": "X",
        "tokens": [{"outcome": "Yes", "price": "0.6"}]
    })]);

    let output = Pipeline::default().process(&records, &ProcessOptions::default());

    assert_eq!(output.markets.len(), 1);
    let market = &output.markets[0];
    assert_eq!(market.current_price(), dec!(0.6));
    assert_eq!(market.category, Category::Other);
    assert!(market.estimate.is_consistent());
    assert_eq!(output.diagnostics.selected_tier, Some(TierKind::Strict));
}

#[test]
fn test_all_archived_without_keywords_is_empty() {
    let records: Vec<RawMarket> = (0..10)
        .map(|i| {
            RawMarket::new(json!({
                "id": format!("a{i}"),
                "question": format!("Market number {i}"),
                "archived": true
            }))
        })
        .collect();

    let output = Pipeline::default().process(&records, &ProcessOptions::default());

    assert!(output.markets.is_empty());
    assert_eq!(output.diagnostics.selected_tier, None);
    assert_eq!(output.diagnostics.tier_count(TierKind::Strict), Some(0));
    assert_eq!(output.diagnostics.tier_count(TierKind::Relaxed), Some(0));
    assert_eq!(output.diagnostics.tier_count(TierKind::KeywordFallback), Some(0));
}

#[test]
fn test_all_archived_with_keywords_uses_fallback() {
    let mut values: Vec<Value> = (0..8)
        .map(|i| json!({"id": format!("a{i}"), "question": format!("Market {i}"), "archived": true}))
        .collect();
    values.push(json!({"id": "e1", "question": "Election winner?", "archived": true}));
    values.push(json!({"id": "e2", "question": "Bitcoin above 150k in 2026?", "archived": true}));

    let output = deterministic().process(&raw(values), &ProcessOptions::default());

    assert_eq!(output.diagnostics.selected_tier, Some(TierKind::KeywordFallback));
    let mut got = ids(&output.markets);
    got.sort();
    assert_eq!(got, vec!["e1", "e2"]);
}

#[test]
fn test_equal_movement_keeps_encounter_order() {
    let records = raw(vec![
        json!({"id": "first", "question": "A"}),
        json!({"id": "big", "question": "B"}),
        json!({"id": "second", "question": "C"}),
    ]);
    let base = Utc::now() - Duration::hours(6);
    let series = |low: Decimal, high: Decimal| {
        vec![
            PriceSample {
                timestamp: base,
                price: low,
            },
            PriceSample {
                timestamp: base + Duration::hours(1),
                price: high,
            },
        ]
    };
    let mut history = HistoryMap::new();
    history.insert("first".to_string(), series(dec!(0.5), dec!(0.6)));
    history.insert("big".to_string(), series(dec!(0.2), dec!(0.7)));
    history.insert("second".to_string(), series(dec!(0.3), dec!(0.4)));

    let output =
        Pipeline::default().process_with_history(&records, &ProcessOptions::default(), &history);

    assert_eq!(ids(&output.markets), vec!["big", "first", "second"]);
    assert_eq!(output.markets[1].movement(), dec!(0.10));
    assert_eq!(output.markets[2].movement(), dec!(0.10));
}

#[test]
fn test_strict_tier_result_is_exact() {
    let records = raw(vec![
        json!({"id": "open1", "question": "A", "closed": false, "archived": false}),
        json!({"id": "closed1", "question": "B", "closed": true}),
        json!({"id": "open2", "question": "C"}),
        json!({"id": "arch", "question": "Election D", "archived": true}),
    ]);

    let output = deterministic().process(&records, &ProcessOptions::default());

    let mut got = ids(&output.markets);
    got.sort();
    assert_eq!(got, vec!["open1", "open2"]);
    assert_eq!(output.diagnostics.selected_tier, Some(TierKind::Strict));
    assert_eq!(output.diagnostics.tiers.len(), 1);
}

#[test]
fn test_stricter_variant_requires_five() {
    let mut values = vec![json!({"id": "open", "question": "A"})];
    for i in 0..6 {
        values.push(json!({"id": format!("closed{i}"), "question": "B", "closed": true}));
    }
    let pipeline = Pipeline::new(&PipelineConfig {
        min_viable_results: 5,
        synthetic_jitter: false,
        ..Default::default()
    });

    let output = pipeline.process(&raw(values), &ProcessOptions::default());

    assert_eq!(output.diagnostics.selected_tier, Some(TierKind::Relaxed));
    assert_eq!(output.markets.len(), 7);
}

#[test]
fn test_invariants_hold_for_degenerate_inputs() {
    let records = raw(vec![
        json!({"id": "1", "question": "No tokens"}),
        json!({"id": "2", "question": "Empty lists", "outcomes": "[]", "outcomePrices": "[]"}),
        json!({"id": "3", "question": "Garbage prices", "outcomes": ["Yes", "No"], "outcomePrices": ["x", null]}),
        json!({"id": "4", "question": "At one", "outcomes": ["Yes", "No"], "outcomePrices": ["1", "0"]}),
        json!({"id": "5", "question": "At zero", "outcomes": ["Yes", "No"], "outcomePrices": ["0", "1"]}),
        json!({"id": "6", "question": "Out of range", "outcomes": ["Yes"], "outcomePrices": ["7.5"]}),
        json!({"id": "7", "question": "Many", "outcomes": ["A", "B", "C", "D"], "outcomePrices": [0.1, 0.2, 0.3, 0.4]}),
        json!({"id": "8", "question": "Bad tokens", "tokens": "not an array"}),
        json!({"id": 9, "question": "Numeric id", "volume24hr": "12.5", "endDate": "garbage"}),
    ]);

    for _ in 0..20 {
        let output = Pipeline::default().process(&records, &ProcessOptions::default());
        assert_eq!(output.markets.len(), 9);

        for market in &output.markets {
            let e = &market.estimate;
            assert!(e.is_consistent(), "inconsistent estimate for {}", market.id());
            assert_eq!(e.movement, e.high - e.low);
            assert!(e.low >= Decimal::ZERO && e.high <= Decimal::ONE);
            assert_eq!(e.current_price, e.current_price.round_dp(4));
            assert!(!market.info.tokens.is_empty());
        }

        for pair in output.markets.windows(2) {
            assert!(pair[0].movement() >= pair[1].movement());
        }
    }
}

#[test]
fn test_reprocessing_is_stable_outside_jitter() {
    let records = raw(vec![
        json!({"id": "1", "question": "Will Bitcoin hit $150k?", "outcomes": ["Yes", "No"], "outcomePrices": ["0.3", "0.7"]}),
        json!({"id": "2", "question": "NBA Finals winner", "tags": [{"label": "Sports"}]}),
        json!({"id": "3", "question": "X"}),
    ]);
    let pipeline = Pipeline::default();

    let summarize = |markets: Vec<Market>| {
        let mut rows: Vec<(String, String, String)> = markets
            .into_iter()
            .map(|m| {
                (
                    m.info.id.clone(),
                    m.info.question.clone(),
                    m.category.as_str().to_string(),
                )
            })
            .collect();
        rows.sort();
        rows
    };

    let first = summarize(pipeline.process(&records, &ProcessOptions::default()).markets);
    let second = summarize(pipeline.process(&records, &ProcessOptions::default()).markets);

    assert_eq!(first, second);
    assert_eq!(first[0].2, "crypto");
    assert_eq!(first[1].2, "sports");
    assert_eq!(first[2].2, "other");
}

#[test]
fn test_seeded_runs_are_identical() {
    let pipeline = Pipeline::new(&PipelineConfig {
        seed: Some(1234),
        placeholder_volume: true,
        ..Default::default()
    });
    let records = raw(vec![
        json!({"id": "1", "question": "A", "outcomes": ["Yes", "No"], "outcomePrices": ["0.3", "0.7"]}),
        json!({"id": "2", "question": "B"}),
    ]);

    let a = pipeline.process(&records, &ProcessOptions::default());
    let b = pipeline.process(&records, &ProcessOptions::default());
    assert_eq!(a.markets, b.markets);
    assert!(a.markets.iter().all(|m| m.info.volume_estimated));
}

#[test]
fn test_empty_input() {
    let output = Pipeline::default().process(&[], &ProcessOptions::default());
    assert!(output.markets.is_empty());
    assert_eq!(output.diagnostics.records_in, 0);
    assert_eq!(output.diagnostics.records_out, 0);
}

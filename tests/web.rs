//! Browser-side checks for the WASM tracker. Run with `wasm-pack test --node`.

#![cfg(target_arch = "wasm32")]

use census_engine::CensusTracker;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn tick_reports_and_summary() {
    let mut tracker = CensusTracker::new();
    assert!(tracker.summary().is_null());

    tracker.set_count("support_unit", 5);
    for _ in 0..3 {
        assert!(!tracker.tick().is_null());
    }
    tracker.set_count("support_unit", 1);
    for _ in 0..4 {
        tracker.tick();
    }

    assert!(!tracker.summary().is_null());
    assert!(tracker.in_disaster());
    assert!(tracker.compare("recent3").is_null());
    assert!(!tracker.compare("full").is_null());
    assert!(tracker.compare("sideways").is_null());
}

#[wasm_bindgen_test]
fn bad_config_json_is_an_error() {
    assert!(CensusTracker::from_config_json(r#"{ "history_capacity": 0 }"#).is_err());
    assert!(CensusTracker::from_config_json("{}").is_ok());
}

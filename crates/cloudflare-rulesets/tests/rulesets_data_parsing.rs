//! Integration tests for parsing ruleset API data.
//!
//! These tests validate that the models can deserialize captured rulesets API
//! responses and that unknown fields survive a round trip.

use std::fs;
use std::path::PathBuf;

use cloudflare_rulesets::models::{Rule, Ruleset};
use serde_json::Value;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture and return its `result` member.
fn load_result(name: &str) -> Value {
    let fixture_path = fixtures_dir().join(name);
    let raw = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    let mut envelope: Value = serde_json::from_str(&raw)
        .unwrap_or_else(|e| panic!("Fixture {name} is not valid JSON: {e}"));
    envelope["result"].take()
}

#[test]
fn test_deserialize_ruleset_list() {
    let rulesets: Vec<Ruleset> = serde_json::from_value(load_result("ruleset_list.json"))
        .unwrap_or_else(|e| panic!("Failed to deserialize ruleset list: {e}"));

    assert_eq!(rulesets.len(), 4, "Expected 4 rulesets in test data");
    assert!(rulesets.iter().all(|rs| rs.id().is_some()));
    assert!(rulesets.iter().all(|rs| rs.last_updated().is_some()));

    let phases: Vec<_> = rulesets.iter().filter_map(Ruleset::phase).collect();
    assert_eq!(
        phases,
        vec![
            "http_request_firewall_custom",
            "http_request_dynamic_redirect",
            "http_request_firewall_managed",
            "http_request_transform"
        ]
    );
    assert_eq!(rulesets[2].kind(), Some("managed"));
}

#[test]
fn test_deserialize_ruleset_detail() {
    let ruleset: Ruleset = serde_json::from_value(load_result("ruleset_detail.json"))
        .unwrap_or_else(|e| panic!("Failed to deserialize ruleset detail: {e}"));

    assert_eq!(ruleset.id(), Some("67013aa153df4388ab6b8ab1f0c7bd32"));
    assert_eq!(ruleset.name(), Some("Redirects"));
    assert_eq!(ruleset.version(), Some("12"));

    let rules = ruleset.rules();
    assert_eq!(rules.len(), 3);

    let names: Vec<_> = rules.iter().map(Rule::description).collect();
    assert_eq!(
        names,
        vec![Some("News to blog"), Some("Support to contact"), None]
    );
    assert_eq!(rules[1].enabled(), Some(false));
    assert_eq!(rules[0].action(), Some("redirect"));
    assert_eq!(
        rules[0].get("action_parameters").unwrap()["from_value"]["status_code"],
        301
    );
}

#[test]
fn test_ruleset_detail_round_trip_is_lossless() {
    let raw = load_result("ruleset_detail.json");
    let ruleset: Ruleset = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&ruleset).unwrap(), raw);
}

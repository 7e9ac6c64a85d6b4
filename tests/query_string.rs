//! Query String Tests
//!
//! Tests for view URL construction:
//! - Parsing a built query string reproduces every compiled field
//! - Absent optional fields never appear
//! - Output is stable across builds

use serde_json::{json, Value};
use viewquery::planner::{CompiledQuery, FilterClause, RangeCompiler};
use viewquery::wire::{build, build_query_string, parse_query_string};

// =============================================================================
// Helper Functions
// =============================================================================

fn compiled(clauses: &[FilterClause], include_docs: bool, limit: Option<u64>) -> CompiledQuery {
    let mut c = RangeCompiler::compile(clauses).unwrap();
    c.include_docs = include_docs;
    c.limit = limit;
    c
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

fn json_param(params: &[(String, String)], name: &str) -> Option<Vec<Value>> {
    param(params, name).map(|v| serde_json::from_str(v).unwrap())
}

fn cases() -> Vec<CompiledQuery> {
    vec![
        compiled(&[], false, None),
        compiled(&[FilterClause::eq("title", json!("a&b=c d/é"))], true, Some(10)),
        compiled(
            &[
                FilterClause::eq("type", json!("Page")),
                FilterClause::desc("created_at"),
            ],
            false,
            Some(0),
        ),
        compiled(
            &[FilterClause::gte("created_at", json!({"nested": [1, null]}))],
            false,
            None,
        ),
        compiled(
            &[
                FilterClause::eq("n", json!(1.5)),
                FilterClause::lte("created_at", json!("2024-01-01T00:00:00Z")),
            ],
            true,
            None,
        ),
    ]
}

// =============================================================================
// Round trip
// =============================================================================

/// Every field survives build → parse.
#[test]
fn test_round_trip() {
    for c in cases() {
        let qs = build_query_string(&c);
        let params = parse_query_string(&qs).unwrap();

        assert_eq!(json_param(&params, "key"), c.key, "{}", qs);
        assert_eq!(json_param(&params, "startkey"), c.start_key, "{}", qs);
        assert_eq!(json_param(&params, "endkey"), c.end_key, "{}", qs);
        assert_eq!(param(&params, "descending"), Some(c.descending.to_string().as_str()));
        assert_eq!(param(&params, "include_docs"), Some(c.include_docs.to_string().as_str()));
        assert_eq!(param(&params, "reduce"), Some("false"));
        assert_eq!(
            param(&params, "limit").map(|l| l.parse::<u64>().unwrap()),
            c.limit
        );
    }
}

/// The raw JSON text of key parameters is preserved exactly.
#[test]
fn test_json_text_preserved() {
    for c in cases() {
        let params = parse_query_string(&build_query_string(&c)).unwrap();
        if let Some(key) = &c.start_key {
            assert_eq!(
                param(&params, "startkey").unwrap(),
                Value::Array(key.clone()).to_string()
            );
        }
    }
}

/// Absent optionals are omitted, not encoded as null.
#[test]
fn test_absent_fields_omitted() {
    let qs = build_query_string(&compiled(&[], false, None));
    for name in ["key=", "startkey=", "endkey=", "limit="] {
        assert!(!qs.contains(name), "{} in {}", name, qs);
    }
    assert!(!qs.contains("null"));
}

/// Same input, same string.
#[test]
fn test_stable_output() {
    for c in cases() {
        assert_eq!(
            build("_design/example", "QC-Page", &c),
            build("_design/example", "QC-Page", &c.clone())
        );
    }
}

/// Query strings never contain raw separators from values.
#[test]
fn test_values_cannot_inject_parameters() {
    let c = compiled(&[FilterClause::eq("title", json!("x&limit=1"))], false, None);
    let params = parse_query_string(&build_query_string(&c)).unwrap();
    assert_eq!(param(&params, "limit"), None);
    assert_eq!(json_param(&params, "key"), Some(vec![json!("x&limit=1")]));
}

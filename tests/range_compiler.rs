//! Range Compiler Tests
//!
//! Tests for clause compilation:
//! - Equality clauses accumulate into `key` in insertion order
//! - A range clause opens its free end with a type sentinel
//! - Nothing may follow a range clause
//! - An order clause opens its key position; only orders may follow it
//! - View names depend on clause fields only

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use viewquery::index::derive_index_name;
use viewquery::planner::{
    high_sentinel, low_sentinel, FilterClause, PlannerErrorCode, RangeCompiler,
};
use viewquery::{QueryBuilder, ViewConfig};

// =============================================================================
// Helper Functions
// =============================================================================

fn equalities(values: &[Value]) -> Vec<FilterClause> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| FilterClause::eq(format!("f{}", i), v.clone()))
        .collect()
}

fn sample_values() -> Vec<Value> {
    vec![
        json!("Page"),
        json!(42),
        json!(null),
        json!(true),
        json!(["nested", 1]),
        json!({"a": 1}),
    ]
}

// =============================================================================
// Equality
// =============================================================================

/// Any prefix of pure equalities compiles to exactly those values as `key`.
#[test]
fn test_pure_equality_key() {
    let values = sample_values();
    for n in 1..=values.len() {
        let compiled = RangeCompiler::compile(&equalities(&values[..n])).unwrap();
        assert_eq!(compiled.key.as_deref(), Some(&values[..n]));
        assert!(compiled.start_key.is_none());
        assert!(compiled.end_key.is_none());
    }
}

/// Reordering equality clauses reorders the key.
#[test]
fn test_equality_order_sensitive() {
    let a = RangeCompiler::compile(&[
        FilterClause::eq("x", json!(1)),
        FilterClause::eq("y", json!(2)),
    ])
    .unwrap();
    let b = RangeCompiler::compile(&[
        FilterClause::eq("y", json!(2)),
        FilterClause::eq("x", json!(1)),
    ])
    .unwrap();
    assert_ne!(a.key, b.key);
}

// =============================================================================
// Ranges
// =============================================================================

/// Lower bound: start = equalities ++ [value], end = equalities ++ [{}].
#[test]
fn test_lower_bound_after_equalities() {
    let values = sample_values();
    for n in 0..=values.len() {
        let mut clauses = equalities(&values[..n]);
        clauses.push(FilterClause::gte("t", json!(7)));

        let compiled = RangeCompiler::compile(&clauses).unwrap();

        let mut start = values[..n].to_vec();
        start.push(json!(7));
        let mut end = values[..n].to_vec();
        end.push(high_sentinel());

        assert_eq!(compiled.key, None);
        assert_eq!(compiled.start_key, Some(start));
        assert_eq!(compiled.end_key, Some(end));
    }
}

/// Upper bound: start = equalities ++ [null], end = equalities ++ [value].
#[test]
fn test_upper_bound_after_equalities() {
    let values = sample_values();
    for n in 0..=values.len() {
        let mut clauses = equalities(&values[..n]);
        clauses.push(FilterClause::lte("t", json!("z")));

        let compiled = RangeCompiler::compile(&clauses).unwrap();

        let mut start = values[..n].to_vec();
        start.push(low_sentinel());
        let mut end = values[..n].to_vec();
        end.push(json!("z"));

        assert_eq!(compiled.start_key, Some(start));
        assert_eq!(compiled.end_key, Some(end));
    }
}

/// Every clause kind is rejected after a range clause.
#[test]
fn test_nothing_follows_a_range() {
    let ranges = [
        FilterClause::gte("t", json!(1)),
        FilterClause::lte("t", json!(1)),
    ];
    let followers = [
        FilterClause::eq("x", json!(1)),
        FilterClause::gte("u", json!(1)),
        FilterClause::lte("u", json!(1)),
        FilterClause::asc("u"),
        FilterClause::desc("u"),
    ];

    for range in &ranges {
        for follower in &followers {
            let err = RangeCompiler::compile(&[
                FilterClause::eq("type", json!("Page")),
                range.clone(),
                follower.clone(),
            ])
            .unwrap_err();
            assert_eq!(
                err.code(),
                PlannerErrorCode::ClauseOrderViolation,
                "{:?} after {:?}",
                follower,
                range
            );
        }
    }
}

/// The builder surfaces ordering errors at filter-add time.
#[test]
fn test_builder_rejects_second_same_direction_range() {
    let err = QueryBuilder::new("Page", &ViewConfig::default())
        .unwrap()
        .filter("created_at >=", json!(1))
        .unwrap()
        .filter("updated_at >=", json!(2))
        .unwrap_err();
    assert_eq!(err.code(), PlannerErrorCode::ClauseOrderViolation);
}

// =============================================================================
// Ordering
// =============================================================================

/// An order clause leaves its key position open, scanning the whole prefix.
#[test]
fn test_order_scans_open_component() {
    let ascending = RangeCompiler::compile(&[
        FilterClause::eq("type", json!("Page")),
        FilterClause::asc("created_at"),
    ])
    .unwrap();
    assert_eq!(ascending.key, None);
    assert_eq!(ascending.start_key, Some(vec![json!("Page"), low_sentinel()]));
    assert_eq!(ascending.end_key, Some(vec![json!("Page"), high_sentinel()]));
    assert!(!ascending.descending);

    let descending = RangeCompiler::compile(&[
        FilterClause::eq("type", json!("Page")),
        FilterClause::desc("created_at"),
    ])
    .unwrap();
    assert_eq!(descending.start_key, ascending.end_key);
    assert_eq!(descending.end_key, ascending.start_key);
    assert!(descending.descending);
}

/// Only further order clauses may follow an order clause.
#[test]
fn test_only_orders_follow_an_order() {
    for order in [FilterClause::asc("t"), FilterClause::desc("t")] {
        for follower in [
            FilterClause::eq("x", json!(1)),
            FilterClause::gte("t", json!(1)),
            FilterClause::lte("t", json!(1)),
        ] {
            let err = RangeCompiler::compile(&[order.clone(), follower.clone()]).unwrap_err();
            assert_eq!(
                err.code(),
                PlannerErrorCode::ClauseOrderViolation,
                "{:?} after {:?}",
                follower,
                order
            );
        }

        assert!(RangeCompiler::compile(&[order.clone(), FilterClause::desc("u")]).is_ok());
    }
}

/// `-created_at` then `created_at >=` is refused when it is added.
#[test]
fn test_builder_rejects_bound_after_descending_order() {
    let err = QueryBuilder::new("Page", &ViewConfig::default())
        .unwrap()
        .filter("type ==", json!("Page"))
        .unwrap()
        .order("-created_at")
        .unwrap()
        .filter("created_at >=", json!(5))
        .unwrap_err();
    assert_eq!(err.code(), PlannerErrorCode::ClauseOrderViolation);
}

// =============================================================================
// End-to-end compile scenario
// =============================================================================

/// `type == "Page"` then `created_at <= T`.
#[test]
fn test_page_created_before() {
    let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let t = serde_json::to_value(t).unwrap();

    let compiled = QueryBuilder::new("Page", &ViewConfig::default())
        .unwrap()
        .filter("type ==", json!("Page"))
        .unwrap()
        .filter("created_at <=", t.clone())
        .unwrap()
        .compile()
        .unwrap();

    assert_eq!(compiled.key, None);
    assert_eq!(compiled.start_key, Some(vec![json!("Page"), json!(null)]));
    assert_eq!(compiled.end_key, Some(vec![json!("Page"), t]));
}

/// A lone upper bound compiles to `[null] .. [T]`.
#[test]
fn test_lone_upper_bound() {
    let compiled = QueryBuilder::new("Page", &ViewConfig::default())
        .unwrap()
        .filter("created_at <=", json!("2024-03-01T12:00:00Z"))
        .unwrap()
        .compile()
        .unwrap();

    assert_eq!(compiled.key, None);
    assert_eq!(compiled.start_key, Some(vec![json!(null)]));
    assert_eq!(compiled.end_key, Some(vec![json!("2024-03-01T12:00:00Z")]));
}

// =============================================================================
// View names
// =============================================================================

/// Names ignore operators and values, but not field order.
#[test]
fn test_view_name_tracks_shape() {
    let a = QueryBuilder::new("Page", &ViewConfig::default())
        .unwrap()
        .filter("type ==", json!("Page"))
        .unwrap()
        .filter("created_at >=", json!(1))
        .unwrap();
    let b = QueryBuilder::new("Page", &ViewConfig::default())
        .unwrap()
        .filter("type =", json!("Other"))
        .unwrap()
        .filter("created_at <=", json!(99))
        .unwrap();

    assert_eq!(a.index_name(), b.index_name());
    assert_eq!(a.index_name(), derive_index_name("Page", &["type", "created_at"]));
    assert_ne!(
        derive_index_name("Page", &["created_at"]),
        derive_index_name("Page", &["updated_at"])
    );
}

/// Separators inside type or field names never merge two shapes.
#[test]
fn test_view_name_components_do_not_collide() {
    let names = [
        derive_index_name("Page", &["a-b"]),
        derive_index_name("Page", &["a", "b"]),
        derive_index_name("Page-a", &["b"]),
        derive_index_name("Page", &["a%2Db"]),
    ];
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

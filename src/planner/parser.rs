//! Condition and order text parsing
//!
//! Conditions are two tokens, `"<field> <op>"`, split on the last space so
//! field names may themselves contain spaces. Order instructions are a field
//! name with an optional leading `-` (descending) or `+` (ascending).

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::ast::{Bound, FilterClause, OrderDirection};
use super::errors::{PlannerError, PlannerResult};

static CONDITION: OnceLock<Regex> = OnceLock::new();
static ORDER: OnceLock<Regex> = OnceLock::new();

fn condition_pattern() -> &'static Regex {
    CONDITION.get_or_init(|| Regex::new(r"^(.*) (.*?)$").expect("static pattern"))
}

fn order_pattern() -> &'static Regex {
    ORDER.get_or_init(|| Regex::new(r"^([-+]?)(.*)$").expect("static pattern"))
}

/// Parses `"<field> <op>"` plus a bound value into a filter clause.
pub fn parse_condition(condition: &str, value: Value) -> PlannerResult<FilterClause> {
    let caps = condition_pattern()
        .captures(condition)
        .ok_or_else(|| PlannerError::invalid_syntax(condition, "expected \"<field> <operator>\""))?;

    let field = &caps[1];
    let op = &caps[2];

    if field.is_empty() {
        return Err(PlannerError::invalid_syntax(condition, "missing field name"));
    }
    if op.is_empty() {
        return Err(PlannerError::invalid_syntax(condition, "missing operator"));
    }

    match op {
        "==" | "=" => Ok(FilterClause::eq(field, value)),
        ">=" => Ok(FilterClause::Range {
            field: field.to_string(),
            bound: Bound::Lower,
            value,
        }),
        "<=" => Ok(FilterClause::Range {
            field: field.to_string(),
            bound: Bound::Upper,
            value,
        }),
        other => Err(PlannerError::unknown_operator(other)),
    }
}

/// Parses an order instruction such as `"-created_at"` into an order clause.
pub fn parse_order(instruction: &str) -> PlannerResult<FilterClause> {
    let caps = order_pattern()
        .captures(instruction)
        .ok_or_else(|| PlannerError::invalid_syntax(instruction, "unreadable order instruction"))?;

    let direction = match &caps[1] {
        "-" => OrderDirection::Descending,
        _ => OrderDirection::Ascending,
    };

    let field = &caps[2];
    if field.is_empty() {
        return Err(PlannerError::invalid_syntax(instruction, "missing order field"));
    }

    Ok(FilterClause::Order {
        field: field.to_string(),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::errors::PlannerErrorCode;
    use serde_json::json;

    #[test]
    fn test_equality_aliases() {
        assert_eq!(
            parse_condition("type ==", json!("Page")).unwrap(),
            FilterClause::eq("type", json!("Page"))
        );
        assert_eq!(
            parse_condition("type =", json!("Page")).unwrap(),
            FilterClause::eq("type", json!("Page"))
        );
    }

    #[test]
    fn test_range_operators() {
        assert_eq!(
            parse_condition("created_at >=", json!(5)).unwrap(),
            FilterClause::gte("created_at", json!(5))
        );
        assert_eq!(
            parse_condition("created_at <=", json!(5)).unwrap(),
            FilterClause::lte("created_at", json!(5))
        );
    }

    #[test]
    fn test_field_with_spaces_splits_on_last_space() {
        let clause = parse_condition("first name ==", json!("Ada")).unwrap();
        assert_eq!(clause.field(), "first name");
    }

    #[test]
    fn test_unknown_operator() {
        let err = parse_condition("age >", json!(3)).unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::UnknownOperator);
        assert_eq!(err.clause(), Some(">"));
    }

    #[test]
    fn test_malformed_conditions() {
        for text in ["age", "", " ==", "age "] {
            let err = parse_condition(text, json!(1)).unwrap_err();
            assert_eq!(
                err.code(),
                PlannerErrorCode::InvalidClauseSyntax,
                "condition {:?}",
                text
            );
        }
    }

    #[test]
    fn test_order_signs() {
        assert_eq!(parse_order("-created_at").unwrap(), FilterClause::desc("created_at"));
        assert_eq!(parse_order("+created_at").unwrap(), FilterClause::asc("created_at"));
        assert_eq!(parse_order("created_at").unwrap(), FilterClause::asc("created_at"));
    }

    #[test]
    fn test_order_without_field() {
        for text in ["", "-", "+"] {
            let err = parse_order(text).unwrap_err();
            assert_eq!(err.code(), PlannerErrorCode::InvalidClauseSyntax);
        }
    }
}

//! View request paths and query strings
//!
//! Parameters are emitted in a fixed order:
//! `reduce`, `include_docs`, `limit`, `key`, `startkey`, `endkey`, `descending`.
//! Key parameters are JSON-encoded and then percent-encoded; scalar parameters
//! use their plain textual form. Absent optional parameters are left out.

use std::string::FromUtf8Error;

use serde_json::Value;

use crate::planner::CompiledQuery;

/// Path of a view inside its design document: `{container}/_view/{name}`
pub fn view_path(index_container_id: &str, index_name: &str) -> String {
    format!(
        "{}/_view/{}",
        index_container_id.trim_end_matches('/'),
        urlencoding::encode(index_name)
    )
}

/// Ordered wire parameters of a compiled query, values not yet percent-encoded
pub fn query_params(compiled: &CompiledQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("reduce", compiled.reduce.to_string()),
        ("include_docs", compiled.include_docs.to_string()),
    ];

    if let Some(limit) = compiled.limit {
        params.push(("limit", limit.to_string()));
    }

    let keys = [
        ("key", &compiled.key),
        ("startkey", &compiled.start_key),
        ("endkey", &compiled.end_key),
    ];
    for (name, key) in keys {
        if let Some(components) = key {
            params.push((name, encode_key(components)));
        }
    }

    params.push(("descending", compiled.descending.to_string()));
    params
}

fn encode_key(components: &[Value]) -> String {
    Value::Array(components.to_vec()).to_string()
}

/// Serializes a compiled query into a query string (without the leading `?`).
pub fn build_query_string(compiled: &CompiledQuery) -> String {
    query_params(compiled)
        .into_iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(&value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the full relative view URL: `{container}/_view/{name}?{query}`.
pub fn build(index_container_id: &str, index_name: &str, compiled: &CompiledQuery) -> String {
    format!(
        "{}?{}",
        view_path(index_container_id, index_name),
        build_query_string(compiled)
    )
}

/// Splits a query string back into decoded `(name, value)` pairs, in order.
pub fn parse_query_string(query: &str) -> Result<Vec<(String, String)>, FromUtf8Error> {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return Ok(Vec::new());
    }

    query
        .split('&')
        .map(|pair| -> Result<(String, String), FromUtf8Error> {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((
                urlencoding::decode(name)?.into_owned(),
                urlencoding::decode(value)?.into_owned(),
            ))
        })
        .collect()
}

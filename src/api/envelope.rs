//! List response shapes
//!
//! Depending on how the backend is deployed, a list endpoint answers either
//! with a bare JSON array or with a pagination envelope
//! (`{"count": .., "next": .., "previous": .., "results": [..]}`).

use serde_json::{Map, Value};

/// Pagination envelope wrapping one page of results
///
/// Only `results` is required; metadata of an unexpected type reads as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Value>,
}

impl Page {
    fn from_map(mut map: Map<String, Value>) -> Result<Self, Map<String, Value>> {
        let results = match map.remove("results") {
            Some(Value::Array(results)) => results,
            Some(other) => {
                map.insert("results".to_string(), other);
                return Err(map);
            }
            None => return Err(map),
        };
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Page {
            count: map.get("count").and_then(count_of),
            next: text("next"),
            previous: text("previous"),
            results,
        })
    }
}

fn count_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A decoded list response, tagged by shape
#[derive(Debug, Clone, PartialEq)]
pub enum ListResponse {
    Direct(Vec<Value>),
    Paginated(Page),
    /// Any other JSON value: a lone object, a string, null...
    Unrecognized(Value),
}

impl ListResponse {
    pub fn from_value(body: Value) -> Self {
        match body {
            Value::Array(items) => ListResponse::Direct(items),
            Value::Object(map) => match Page::from_map(map) {
                Ok(page) => ListResponse::Paginated(page),
                Err(map) => ListResponse::Unrecognized(Value::Object(map)),
            },
            other => ListResponse::Unrecognized(other),
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            ListResponse::Direct(items) => items,
            ListResponse::Paginated(page) => page.results,
            ListResponse::Unrecognized(_) => Vec::new(),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            ListResponse::Direct(_) => "list",
            ListResponse::Paginated(_) => "paginated",
            ListResponse::Unrecognized(_) => "unrecognized",
        }
    }
}

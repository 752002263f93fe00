use serde_json::{Map, Value};

use crate::errors::AppError;

const ITEM_KEYS: [&str; 3] = ["data", "items", "results"];
const TOTAL_KEYS: [&str; 4] = ["totalRecords", "total", "count", "totalCount"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// A bare JSON array: the complete, unpaged collection.
    Bare,
    /// An object carrying one page plus paging metadata.
    Envelope,
}

/// A list response reduced to its rows and paging metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub items: Vec<Value>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub total: u64,
    pub shape: ListShape,
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn meta(map: &Map<String, Value>, key: &str) -> Option<u32> {
    map.get(key)
        .and_then(as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

/// Accepts either list shape the backend produces and normalises it.
///
/// Rows are looked up under `collection_key` first, then `data`, `items` and
/// `results`; one level of `{ "data": { ... } }` wrapping is unwrapped. The
/// total comes from the first count field present and falls back to the
/// number of rows.
pub fn normalize_list(body: Value, collection_key: &str) -> Result<RawPage, AppError> {
    let body = match body {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    match body {
        Value::Array(items) => Ok(RawPage {
            total: items.len() as u64,
            items,
            page: None,
            limit: None,
            shape: ListShape::Bare,
        }),
        Value::Object(mut map) => {
            let key = std::iter::once(collection_key)
                .chain(ITEM_KEYS)
                .find(|k| matches!(map.get(*k), Some(Value::Array(_))))
                .ok_or_else(|| {
                    AppError::Decode(format!("list response has no `{collection_key}` array"))
                })?;
            let items = match map.remove(key) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let total = TOTAL_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(as_u64))
                .unwrap_or(items.len() as u64);
            Ok(RawPage {
                page: meta(&map, "page"),
                limit: meta(&map, "limit"),
                total,
                items,
                shape: ListShape::Envelope,
            })
        }
        other => Err(AppError::Decode(format!(
            "expected a list response, got {}",
            kind(&other)
        ))),
    }
}

/// Single-record responses are sometimes wrapped in `{ "data": { ... } }`.
pub fn unwrap_record(body: Value) -> Value {
    match body {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_is_the_whole_set() {
        let page = normalize_list(json!([{"_id": "1"}, {"_id": "2"}]), "users").unwrap();
        assert_eq!(page.shape, ListShape::Bare);
        assert_eq!(page.total, 2);
        assert_eq!(page.page, None);
    }

    #[test]
    fn envelope_uses_collection_key_and_total_records() {
        let page = normalize_list(
            json!({"products": [{"_id": "1"}], "page": 2, "limit": 5, "totalRecords": 11}),
            "products",
        )
        .unwrap();
        assert_eq!(page.shape, ListShape::Envelope);
        assert_eq!(page.items.len(), 1);
        assert_eq!((page.page, page.limit, page.total), (Some(2), Some(5), 11));
    }

    #[test]
    fn falls_back_through_item_and_count_keys() {
        let page = normalize_list(json!({"items": [1, 2, 3], "count": "40"}), "brands").unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 40);

        let uncounted = normalize_list(json!({"results": [1, 2]}), "brands").unwrap();
        assert_eq!(uncounted.total, 2);
    }

    #[test]
    fn unwraps_one_nested_data_object() {
        let page = normalize_list(
            json!({"data": {"roles": [{"_id": "r"}], "totalCount": 7}}),
            "roles",
        )
        .unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn data_array_is_not_unwrapped_as_an_object() {
        let page = normalize_list(json!({"data": [{"_id": "a"}], "total": 9}), "brands").unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 9);
    }

    #[test]
    fn rejects_non_list_bodies() {
        assert!(matches!(
            normalize_list(json!({"message": "ok"}), "brands"),
            Err(AppError::Decode(_))
        ));
        assert!(normalize_list(Value::Null, "brands").is_err());
    }

    #[test]
    fn unwrap_record_handles_both_shapes() {
        assert_eq!(unwrap_record(json!({"data": {"_id": "1"}})), json!({"_id": "1"}));
        assert_eq!(unwrap_record(json!({"_id": "1"})), json!({"_id": "1"}));
    }
}

//! Tolerant serde helpers for backend payloads.
//!
//! The backend is not consistent about wire types: numbers sometimes arrive
//! as strings (multipart forms, query echoes), timestamps come as RFC 3339,
//! naive datetimes or plain dates, and role lists are sometimes a single
//! value.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decimal_from_value(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// `Option<DateTime<Utc>>` from an RFC 3339 string, a naive datetime, a date
/// or epoch milliseconds. Unparseable values decode as `None`.
pub mod timestamp {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => parse_timestamp(&s),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            _ => None,
        })
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&format_timestamp(v)),
            None => serializer.serialize_none(),
        }
    }
}

/// `BigDecimal` written as a JSON number, read from a number or a string.
pub mod decimal {
    use super::*;
    use serde::de::Error as _;
    use serde::ser::Error as _;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        decimal_from_value(&raw).ok_or_else(|| D::Error::custom(format!("invalid decimal: {raw}")))
    }

    pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let number = serde_json::Number::from_str(&value.to_string()).map_err(S::Error::custom)?;
        number.serialize(serializer)
    }
}

/// Optional variant of [`decimal`]; blank strings decode as `None`.
pub mod opt_decimal {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw.as_ref().and_then(decimal_from_value))
    }

    pub fn serialize<S>(value: &Option<BigDecimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => super::decimal::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }
}

pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    int_from_value(&raw).ok_or_else(|| D::Error::custom(format!("invalid integer: {raw}")))
}

pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(int_from_value))
}

pub fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(float_from_value).unwrap_or_default())
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// A list that may arrive as a single bare value.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[derive(Debug, Deserialize, Serialize)]
    struct Probe {
        #[serde(default, with = "timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(with = "decimal")]
        price: BigDecimal,
        #[serde(deserialize_with = "int")]
        stock: i64,
        #[serde(default, deserialize_with = "one_or_many")]
        tags: Vec<String>,
    }

    #[test]
    fn parses_several_timestamp_shapes() {
        assert!(parse_timestamp("2024-03-01T10:00:00.000Z").is_some());
        assert!(parse_timestamp("2024-03-01T10:00:00").is_some());
        assert_eq!(parse_timestamp("2024-03-01").map(|d| d.day()), Some(1));
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn numbers_may_arrive_as_strings() {
        let probe: Probe =
            serde_json::from_value(serde_json::json!({"price": "12.50", "stock": "7"})).unwrap();
        assert_eq!(probe.price, BigDecimal::from_str("12.5").unwrap());
        assert_eq!(probe.stock, 7);
        assert!(probe.at.is_none());
        assert!(probe.tags.is_empty());
    }

    #[test]
    fn single_value_becomes_a_list() {
        let probe: Probe = serde_json::from_value(
            serde_json::json!({"price": 1, "stock": 1, "tags": "admin"}),
        )
        .unwrap();
        assert_eq!(probe.tags, vec!["admin".to_string()]);
    }

    #[test]
    fn decimal_serializes_as_number() {
        let probe = Probe {
            at: None,
            price: BigDecimal::from_str("9.99").unwrap(),
            stock: 1,
            tags: vec![],
        };
        let value = serde_json::to_value(&probe).unwrap();
        assert_eq!(value["price"], serde_json::json!(9.99));
    }
}

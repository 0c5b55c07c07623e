//! Upstream payload tree and its normalization into plain JSON.
//!
//! Upstream collaborators may hand over dates and arbitrary-precision
//! decimals; the engine works on `serde_json::Value` only.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

/// JSON-like tree with the extra scalar types upstream services produce.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Decimal(Decimal),
    Array(Vec<RawPayload>),
    Object(BTreeMap<String, RawPayload>),
}

impl RawPayload {
    /// Convenience constructor for object payloads.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawPayload)>,
    {
        RawPayload::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<Value> for RawPayload {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => RawPayload::Null,
            Value::Bool(b) => RawPayload::Bool(b),
            Value::Number(n) => RawPayload::Number(n),
            Value::String(s) => RawPayload::String(s),
            Value::Array(items) => RawPayload::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                RawPayload::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<NaiveDate> for RawPayload {
    fn from(d: NaiveDate) -> Self {
        RawPayload::Date(d)
    }
}

impl From<NaiveDateTime> for RawPayload {
    fn from(dt: NaiveDateTime) -> Self {
        RawPayload::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for RawPayload {
    fn from(ts: DateTime<Utc>) -> Self {
        RawPayload::Timestamp(ts)
    }
}

impl From<Decimal> for RawPayload {
    fn from(d: Decimal) -> Self {
        RawPayload::Decimal(d)
    }
}

impl From<&str> for RawPayload {
    fn from(s: &str) -> Self {
        RawPayload::String(s.to_string())
    }
}

/// Convert to plain JSON: dates become ISO-8601 strings, decimals become
/// floats. Containers recurse, everything else passes through.
pub fn normalize(raw: RawPayload) -> Value {
    match raw {
        RawPayload::Null => Value::Null,
        RawPayload::Bool(b) => Value::Bool(b),
        RawPayload::Number(n) => Value::Number(n),
        RawPayload::String(s) => Value::String(s),
        RawPayload::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        RawPayload::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        RawPayload::Timestamp(ts) => Value::String(ts.to_rfc3339()),
        RawPayload::Decimal(d) => decimal_to_json(d),
        RawPayload::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        RawPayload::Object(map) => {
            let out: Map<String, Value> = map.into_iter().map(|(k, v)| (k, normalize(v))).collect();
            Value::Object(out)
        }
    }
}

// Decimals always fit an f64 approximately; the string form is a fallback
// for values serde_json refuses (non-finite).
fn decimal_to_json(d: Decimal) -> Value {
    d.to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(d.to_string()))
}

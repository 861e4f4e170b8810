//! Raw upstream market records
//!
//! The Gamma API is loose about field shapes: numbers arrive as strings,
//! arrays arrive as serialized JSON strings, and flags may be missing.
//! `RawMarket` wraps the untouched JSON and exposes permissive readers.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Field names that may carry a stable market identifier, in priority order
const ID_FIELDS: &[&str] = &["id", "conditionId", "condition_id", "marketId", "slug"];

/// Field names that may carry the market end date
const END_DATE_FIELDS: &[&str] = &["endDate", "end_date", "endDateIso", "end_date_iso"];

/// An unvalidated market record as returned by the upstream API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMarket(Value);

impl RawMarket {
    /// Wrap a JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the underlying JSON
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Look up a field, treating JSON `null` as absent
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// First present field among `names`
    pub fn first_field(&self, names: &[&str]) -> Option<&Value> {
        names.iter().find_map(|name| self.field(name))
    }

    /// Stable identifier, if any identifier field is present and non-empty
    pub fn id(&self) -> Option<String> {
        ID_FIELDS
            .iter()
            .filter_map(|name| self.field(name))
            .find_map(value_to_id)
    }

    /// Trimmed, non-empty question text
    pub fn question(&self) -> Option<&str> {
        self.field("question")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Optional string field, trimmed
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str).map(str::trim)
    }

    /// Whether the record carries both a question and an identifier
    pub fn has_required_fields(&self) -> bool {
        self.question().is_some() && self.id().is_some()
    }

    /// Boolean flag with a default for absent or unreadable values
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.field(name).and_then(parse_bool).unwrap_or(default)
    }

    pub fn is_closed(&self) -> bool {
        self.flag("closed", false)
    }

    pub fn is_archived(&self) -> bool {
        self.flag("archived", false)
    }

    /// `active` is true unless explicitly false
    pub fn is_active(&self) -> bool {
        self.flag("active", true)
    }

    /// Market end date, if present in any supported encoding
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.first_field(END_DATE_FIELDS).and_then(parse_timestamp)
    }

    /// Numeric field parsed permissively; anything unreadable yields zero
    pub fn number(&self, name: &str) -> Decimal {
        self.field(name).and_then(parse_decimal).unwrap_or(Decimal::ZERO)
    }

    /// Sequence field that may be a real array or a serialized JSON array
    pub fn list(&self, name: &str) -> Vec<Value> {
        self.field(name).map(parse_list).unwrap_or_default()
    }
}

impl From<Value> for RawMarket {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a boolean from a bool, a "true"/"false" string, or 0/1
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

/// Parse a decimal from a JSON number or a numeric string
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            n.as_f64()
                .filter(|f| f.is_finite())
                .and_then(|f| Decimal::try_from(f).ok())
        }
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

/// Parse a decimal string, accepting scientific notation
pub fn parse_decimal_str(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a list from a JSON array or a string holding a serialized array
pub fn parse_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Parse a timestamp from RFC 3339, a bare date, or unix seconds/milliseconds
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return date
                    .and_hms_opt(0, 0, 0)
                    .map(|naive| Utc.from_utc_datetime(&naive));
            }
            s.parse::<i64>().ok().and_then(from_unix)
        }
        Value::Number(n) => n.as_i64().and_then(from_unix),
        _ => None,
    }
}

fn from_unix(raw: i64) -> Option<DateTime<Utc>> {
    // Values past year 5000 in seconds are assumed to be milliseconds
    if raw.abs() > 100_000_000_000 {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}

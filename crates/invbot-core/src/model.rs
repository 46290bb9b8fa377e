//! Inventory and subscriber data model.
//!
//! Field names on the wire follow the upstream inventory API, so a persisted
//! snapshot has the same record shape as a raw `results` entry.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One offered vehicle.
///
/// Every field decodes leniently: a mistyped value degrades to empty rather
/// than failing the record, so a known VIN never drops out of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Stable identifier. Upstream occasionally omits it.
    #[serde(
        rename = "VIN",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vin: Option<String>,
    #[serde(rename = "Model", default, deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(rename = "TrimName", default, deserialize_with = "lenient_text")]
    pub trim_name: Option<String>,
    #[serde(rename = "Price", default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    #[serde(rename = "InventoryPrice", default, deserialize_with = "lenient_price")]
    pub inventory_price: Option<f64>,
    #[serde(rename = "PAINT", default, deserialize_with = "lenient_codes")]
    pub paint: Vec<String>,
    #[serde(rename = "INTERIOR", default, deserialize_with = "lenient_codes")]
    pub interior: Vec<String>,
    #[serde(rename = "WHEELS", default, deserialize_with = "lenient_codes")]
    pub wheels: Vec<String>,
    #[serde(rename = "OptionCodeData", default, deserialize_with = "lenient_options")]
    pub options: Vec<OptionSpec>,
}

/// A named spec entry such as `SPECS_RANGE = 568 km`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub group: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit_short: String,
}

impl InventoryRecord {
    /// Price shown to users: the inventory price, else the list price.
    pub fn display_price(&self) -> Option<f64> {
        self.inventory_price.or(self.price)
    }

    pub fn paint_code(&self) -> Option<&str> {
        self.paint.first().map(String::as_str)
    }

    pub fn interior_code(&self) -> Option<&str> {
        self.interior.first().map(String::as_str)
    }

    pub fn wheels_code(&self) -> Option<&str> {
        self.wheels.first().map(String::as_str)
    }

    /// First option entry in `group`.
    pub fn option(&self, group: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.group == group)
    }
}

/// The single persisted record of the last observed inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Capture time in epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub vehicles: Vec<InventoryRecord>,
    #[serde(default)]
    pub total_matches_found: Option<String>,
}

impl Snapshot {
    /// Snapshot stamped with the current time.
    pub fn capture(vehicles: Vec<InventoryRecord>, total_matches_found: Option<String>) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            vehicles,
            total_matches_found,
        }
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// One fetch result: the records plus upstream's total-count string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub records: Vec<InventoryRecord>,
    pub total_matches_found: Option<String>,
}

/// A chat that receives inventory notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Subscriber {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            username: None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Non-blank string or number; anything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A number or a numeric string such as `"2199000"`; anything else is absent.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|p| p.is_finite()),
        _ => None,
    })
}

/// A list of codes, or a bare code. Non-text entries are skipped.
fn lenient_codes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

/// Option entries that fail to decode are skipped, not fatal.
fn lenient_options<'de, D>(deserializer: D) -> Result<Vec<OptionSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Upstream sends spec values as strings, but numbers show up now and then.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

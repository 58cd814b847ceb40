//! Coercion of loosely-typed device payloads into a [`Batch`].
//!
//! This is the only place where untyped values are interpreted. A value that
//! cannot be read as a number (or date) becomes absent instead of an error.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{Batch, ChannelKey, Reading};

/// Accepted date layouts for the date channel.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Raw ingest body: channel name to array of numeric-or-mixed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngestPayload(pub Map<String, Value>);

/// Outcome of coercing a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload {
    pub batch: Batch,
    /// Field names that did not match any known channel
    pub ignored: Vec<String>,
}

impl IngestPayload {
    /// Coerce every known channel; unknown ones are reported and dropped.
    pub fn into_batch(self) -> ParsedPayload {
        let mut batch = Batch::new();
        let mut ignored = Vec::new();

        for (name, value) in self.0 {
            let Some(key) = ChannelKey::parse(&name) else {
                debug!("Ignoring unknown channel '{}'", name);
                ignored.push(name);
                continue;
            };

            let items = match value {
                Value::Array(items) => items,
                other => {
                    warn!(
                        "Channel '{}' is not an array (got {}); treating it as empty",
                        name,
                        json_kind(&other)
                    );
                    Vec::new()
                }
            };

            match key {
                ChannelKey::Numeric(channel) => {
                    batch.set_channel(channel, items.iter().map(coerce_reading).collect())
                }
                ChannelKey::Date => batch.set_dates(items.iter().map(coerce_date).collect()),
            }
        }

        ParsedPayload { batch, ignored }
    }
}

/// Read a JSON value as a finite number.
///
/// Numbers and numeric strings are accepted; everything else is absent.
pub fn coerce_reading(value: &Value) -> Reading {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// Read a JSON string as a calendar date.
pub fn coerce_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

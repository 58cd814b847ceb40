//! Data Transfer Objects for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ingest::BatchSnapshot;
use crate::models::{Batch, PatientInfo};
use crate::report::{ReportModel, TransportMap};

/// Response for the health check endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Samples in the current batch (longest channel)
    pub samples: usize,
}

/// Response for a device ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub sequence: u64,
    /// Stored length per channel
    pub channels: BTreeMap<String, usize>,
    /// Payload keys that matched no known channel
    pub ignored: Vec<String>,
}

/// Status of the currently stored batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatusResponse {
    pub sequence: u64,
    pub received_at: Option<DateTime<Utc>>,
    pub channels: BTreeMap<String, usize>,
}

impl From<&BatchSnapshot> for BatchStatusResponse {
    fn from(snapshot: &BatchSnapshot) -> Self {
        Self {
            sequence: snapshot.sequence,
            received_at: snapshot.received_at,
            channels: channel_lengths(&snapshot.batch),
        }
    }
}

/// Length of every channel keyed by device name.
pub fn channel_lengths(batch: &Batch) -> BTreeMap<String, usize> {
    batch
        .lengths()
        .into_iter()
        .map(|(name, len)| (name.to_string(), len))
        .collect()
}

/// Patient metadata as typed by the operator.
///
/// Every field arrives as text; `age` and `sampling_minutes` must parse as
/// non-negative integers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub sampling_minutes: String,
}

impl PatientForm {
    /// Validate the numeric fields and build the patient metadata.
    pub fn into_patient(self) -> Result<PatientInfo, String> {
        let age = parse_whole("age", &self.age)?;
        let sampling_minutes = parse_whole("sampling_minutes", &self.sampling_minutes)?;
        Ok(PatientInfo {
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            id: self.id.trim().to_string(),
            age,
            sampling_minutes,
        })
    }
}

fn parse_whole(field: &str, raw: &str) -> Result<u32, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("Field '{}' is required", field));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| format!("Field '{}' must be a whole number, got '{}'", field, trimmed))
}

/// View response: the report plus the flat map the export action posts back.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub report: ReportModel,
    pub transport: TransportMap,
}

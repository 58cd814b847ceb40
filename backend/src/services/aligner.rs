//! Alignment of ragged channels into per-index records.
//!
//! Channels delivered by the device do not always share a length. Alignment
//! never fails: any field whose channel is too short is absent.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{AlignedRecord, Batch, Channel, SampleTime};

/// How many records a ragged batch produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// One record per index of the longest channel; short channels read as absent.
    #[default]
    Longest,
    /// One record per index of the shortest non-empty channel.
    Shortest,
}

impl FromStr for LengthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "longest" | "max" => Ok(Self::Longest),
            "shortest" | "min" => Ok(Self::Shortest),
            _ => Err(format!("Unknown length policy: {}", s)),
        }
    }
}

/// Combine every channel of `batch` into aligned records.
///
/// Derived metrics are left absent; see [`crate::services::metrics::derive`].
pub fn align(batch: &Batch, policy: LengthPolicy) -> Vec<AlignedRecord> {
    let count = match policy {
        LengthPolicy::Longest => batch.max_len(),
        LengthPolicy::Shortest => batch.min_len(),
    };

    (0..count)
        .map(|i| {
            let time = batch.value(Channel::Hour, i).map(|hour| SampleTime {
                hour,
                minute: batch.value(Channel::Minute, i),
                date: batch.date(i),
            });

            AlignedRecord {
                index: i + 1,
                systolic: batch.value(Channel::Systolic, i),
                diastolic: batch.value(Channel::Diastolic, i),
                pulse_rate: batch.value(Channel::PulseRate, i),
                mean_arterial: batch.value(Channel::MeanArterial, i),
                time,
                pulse_pressure: None,
                double_product: None,
            }
        })
        .collect()
}

//! Aligned per-sample records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Reading;

/// Time-of-day composite of one sample. Only exists when the hour is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleTime {
    pub hour: f64,
    pub minute: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl SampleTime {
    /// `HH:MM` axis label; an unknown minute is shown as `00`.
    pub fn label(&self) -> String {
        let minute = self.minute.unwrap_or(0.0);
        format!("{:02}:{:02}", self.hour.trunc() as i64, minute.trunc() as i64)
    }
}

/// One row combining every channel at a given sample index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    /// 1-based position within the batch
    pub index: usize,
    pub systolic: Reading,
    pub diastolic: Reading,
    pub pulse_rate: Reading,
    pub mean_arterial: Reading,
    pub time: Option<SampleTime>,
    /// systolic - diastolic
    pub pulse_pressure: Reading,
    /// systolic * pulse rate
    pub double_product: Reading,
}

impl AlignedRecord {
    /// Record with no readings at all.
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            systolic: None,
            diastolic: None,
            pulse_rate: None,
            mean_arterial: None,
            time: None,
            pulse_pressure: None,
            double_product: None,
        }
    }

    pub fn hour(&self) -> Option<f64> {
        self.time.map(|t| t.hour)
    }

    pub fn value(&self, variable: Variable) -> Reading {
        match variable {
            Variable::Systolic => self.systolic,
            Variable::Diastolic => self.diastolic,
            Variable::MeanArterial => self.mean_arterial,
            Variable::PulseRate => self.pulse_rate,
            Variable::PulsePressure => self.pulse_pressure,
            Variable::DoubleProduct => self.double_product,
        }
    }
}

/// Clinical variables that get summarized in a report.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Systolic,
    Diastolic,
    MeanArterial,
    PulseRate,
    PulsePressure,
    DoubleProduct,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Systolic,
        Variable::Diastolic,
        Variable::MeanArterial,
        Variable::PulseRate,
        Variable::PulsePressure,
        Variable::DoubleProduct,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Variable::Systolic => "systolic",
            Variable::Diastolic => "diastolic",
            Variable::MeanArterial => "mean_arterial",
            Variable::PulseRate => "pulse_rate",
            Variable::PulsePressure => "pulse_pressure",
            Variable::DoubleProduct => "double_product",
        }
    }

    /// Human-readable label used by renderers.
    pub fn label(&self) -> &'static str {
        match self {
            Variable::Systolic => "Presión Sistólica",
            Variable::Diastolic => "Presión Diastólica",
            Variable::MeanArterial => "Presión Arterial Media",
            Variable::PulseRate => "Pulso",
            Variable::PulsePressure => "Presión de Pulso",
            Variable::DoubleProduct => "Doble Producto",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Variable::PulseRate => "lpm",
            Variable::DoubleProduct => "mmHg·lpm",
            _ => "mmHg",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

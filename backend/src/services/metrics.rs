//! Derived hemodynamic metrics.

use crate::models::{AlignedRecord, Reading};

/// Pulse pressure: systolic minus diastolic.
pub fn pulse_pressure(systolic: Reading, diastolic: Reading) -> Reading {
    Some(systolic? - diastolic?).filter(|v| v.is_finite())
}

/// Double (rate-pressure) product: systolic times pulse rate.
pub fn double_product(systolic: Reading, pulse_rate: Reading) -> Reading {
    Some(systolic? * pulse_rate?).filter(|v| v.is_finite())
}

/// Populate the derived fields of every record.
///
/// An absent input makes the derived value absent; it is never read as zero.
pub fn derive(records: Vec<AlignedRecord>) -> Vec<AlignedRecord> {
    records
        .into_iter()
        .map(|mut record| {
            record.pulse_pressure = pulse_pressure(record.systolic, record.diastolic);
            record.double_product = double_product(record.systolic, record.pulse_rate);
            record
        })
        .collect()
}

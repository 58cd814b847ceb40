//! Diurnal / nocturnal classification of samples.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::AlignedRecord;

/// First hour (inclusive) of the diurnal window.
pub const DIURNAL_START_HOUR: f64 = 7.0;
/// First hour of the nocturnal window (exclusive end of the diurnal one).
pub const NOCTURNAL_START_HOUR: f64 = 22.0;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Total,
    Diurnal,
    Nocturnal,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 3] = [TimeWindow::Total, TimeWindow::Diurnal, TimeWindow::Nocturnal];

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Total => "Total",
            TimeWindow::Diurnal => "Diurno",
            TimeWindow::Nocturnal => "Nocturno",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const TOTAL_ONLY: &[TimeWindow] = &[TimeWindow::Total];
const TOTAL_DIURNAL: &[TimeWindow] = &[TimeWindow::Total, TimeWindow::Diurnal];
const TOTAL_NOCTURNAL: &[TimeWindow] = &[TimeWindow::Total, TimeWindow::Nocturnal];

/// Clock window of an hour of day: diurnal for `[7, 22)`, nocturnal otherwise.
pub fn clock_window(hour: f64) -> TimeWindow {
    if (DIURNAL_START_HOUR..NOCTURNAL_START_HOUR).contains(&hour) {
        TimeWindow::Diurnal
    } else {
        TimeWindow::Nocturnal
    }
}

/// Every window a record contributes to. Records without an hour only count
/// towards [`TimeWindow::Total`].
pub fn classify(record: &AlignedRecord) -> &'static [TimeWindow] {
    match record.hour().map(clock_window) {
        Some(TimeWindow::Diurnal) => TOTAL_DIURNAL,
        Some(_) => TOTAL_NOCTURNAL,
        None => TOTAL_ONLY,
    }
}

pub fn belongs_to(record: &AlignedRecord, window: TimeWindow) -> bool {
    classify(record).contains(&window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SampleTime;

    fn at_hour(hour: Option<f64>) -> AlignedRecord {
        AlignedRecord {
            time: hour.map(|hour| SampleTime {
                hour,
                minute: None,
                date: None,
            }),
            ..AlignedRecord::empty(1)
        }
    }

    #[test]
    fn test_window_boundaries() {
        assert_eq!(classify(&at_hour(Some(6.0))), TOTAL_NOCTURNAL);
        assert_eq!(classify(&at_hour(Some(7.0))), TOTAL_DIURNAL);
        assert_eq!(classify(&at_hour(Some(21.0))), TOTAL_DIURNAL);
        assert_eq!(classify(&at_hour(Some(21.9))), TOTAL_DIURNAL);
        assert_eq!(classify(&at_hour(Some(22.0))), TOTAL_NOCTURNAL);
        assert_eq!(classify(&at_hour(Some(0.0))), TOTAL_NOCTURNAL);
    }

    #[test]
    fn test_absent_hour_is_total_only() {
        let record = at_hour(None);
        assert_eq!(classify(&record), TOTAL_ONLY);
        assert!(belongs_to(&record, TimeWindow::Total));
        assert!(!belongs_to(&record, TimeWindow::Diurnal));
        assert!(!belongs_to(&record, TimeWindow::Nocturnal));
    }

    #[test]
    fn test_every_record_is_in_total() {
        for hour in [None, Some(3.0), Some(12.0), Some(23.5)] {
            assert!(belongs_to(&at_hour(hour), TimeWindow::Total));
        }
    }
}

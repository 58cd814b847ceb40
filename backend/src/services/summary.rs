//! Summary statistics per variable and time window.
//!
//! The same functions serve the view and the export path, so both always show
//! identical figures for the same records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::windows::{belongs_to, TimeWindow};
use crate::models::{AlignedRecord, Reading, Variable};

/// Max / min / mean / sample standard deviation of one subset.
///
/// Every field is absent when the subset has no readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSummary {
    pub max: Reading,
    pub min: Reading,
    pub mean: Reading,
    pub stdev: Reading,
}

impl VariableSummary {
    pub fn is_empty(&self) -> bool {
        self.max.is_none()
    }
}

/// Round to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Summarize a sequence of readings, skipping absent entries.
///
/// `mean` and `stdev` are rounded with [`round_tenth`]; `max`/`min` are kept as
/// read. A single reading has a standard deviation of `0`.
pub fn summarize<I>(values: I) -> VariableSummary
where
    I: IntoIterator<Item = Reading>,
{
    let values: Vec<f64> = values.into_iter().flatten().collect();
    if values.is_empty() {
        return VariableSummary::default();
    }

    let count = values.len() as f64;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = values.iter().sum::<f64>() / count;

    let stdev = if values.len() == 1 {
        0.0
    } else {
        let variance = values
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (count - 1.0);
        variance.sqrt()
    };

    VariableSummary {
        max: Some(max),
        min: Some(min),
        mean: Some(round_tenth(mean)),
        stdev: Some(round_tenth(stdev)),
    }
}

/// Summaries of one variable over the three windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSummaries {
    pub total: VariableSummary,
    pub diurnal: VariableSummary,
    pub nocturnal: VariableSummary,
}

impl WindowSummaries {
    pub fn get(&self, window: TimeWindow) -> &VariableSummary {
        match window {
            TimeWindow::Total => &self.total,
            TimeWindow::Diurnal => &self.diurnal,
            TimeWindow::Nocturnal => &self.nocturnal,
        }
    }
}

/// Every (variable, window) summary of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryTable(BTreeMap<Variable, WindowSummaries>);

impl SummaryTable {
    pub fn get(&self, variable: Variable, window: TimeWindow) -> VariableSummary {
        self.0
            .get(&variable)
            .map(|w| *w.get(window))
            .unwrap_or_default()
    }

    pub fn variable(&self, variable: Variable) -> Option<&WindowSummaries> {
        self.0.get(&variable)
    }

    /// Number of (variable, window) entries.
    pub fn len(&self) -> usize {
        self.0.len() * TimeWindow::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn summarize_window(records: &[AlignedRecord], variable: Variable, window: TimeWindow) -> VariableSummary {
    summarize(
        records
            .iter()
            .filter(|r| belongs_to(r, window))
            .map(|r| r.value(variable)),
    )
}

/// Compute all six variables over all three windows.
pub fn summarize_records(records: &[AlignedRecord]) -> SummaryTable {
    let table = Variable::ALL
        .iter()
        .map(|variable| {
            let summaries = WindowSummaries {
                total: summarize_window(records, *variable, TimeWindow::Total),
                diurnal: summarize_window(records, *variable, TimeWindow::Diurnal),
                nocturnal: summarize_window(records, *variable, TimeWindow::Nocturnal),
            };
            (*variable, summaries)
        })
        .collect();
    SummaryTable(table)
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod summary_tests;

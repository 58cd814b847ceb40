//! The canonical, renderer-agnostic report.

use serde::Serialize;
use std::collections::BTreeMap;

use super::chart::{chart_series, ChartImage, ChartOptions, ChartRenderer};
use super::error::{ReportError, ReportResult};
use crate::models::{AlignedRecord, Batch, PatientInfo, Variable};
use crate::services::{prepare_records, summarize_records, LengthPolicy, SummaryTable};

/// Variables that get a chart, in display order.
pub const PLOTTED_VARIABLES: [Variable; 4] = [
    Variable::Systolic,
    Variable::Diastolic,
    Variable::MeanArterial,
    Variable::PulseRate,
];

/// Everything a view or an exported document shows.
///
/// Fields are private: a report is never modified once built, and its
/// summaries always match its records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    patient: PatientInfo,
    records: Vec<AlignedRecord>,
    summaries: SummaryTable,
    charts: BTreeMap<String, ChartImage>,
}

impl ReportModel {
    /// Assemble a report, rendering one chart per plotted variable.
    ///
    /// `records` must already carry their derived metrics. Variables without
    /// any reading are not plotted. The first chart failure aborts the build.
    pub fn build(
        patient: PatientInfo,
        records: Vec<AlignedRecord>,
        renderer: &dyn ChartRenderer,
        options: &ChartOptions,
    ) -> ReportResult<Self> {
        let mut charts = BTreeMap::new();

        for variable in PLOTTED_VARIABLES {
            let series = chart_series(&records, variable, options.gap_policy);
            if series.is_empty() {
                continue;
            }

            let name = format!("{} ({})", variable.label(), variable.unit());
            let by_name = BTreeMap::from([(name, series.values)]);
            let image = renderer
                .render(&by_name, Some(series.labels.as_slice()))
                .map_err(|source| ReportError::Chart {
                    chart: variable.key().to_string(),
                    source,
                })?;
            charts.insert(variable.key().to_string(), image);
        }

        Ok(Self::from_parts(patient, records, charts))
    }

    /// Align, derive and build in one step.
    pub fn from_batch(
        patient: PatientInfo,
        batch: &Batch,
        policy: LengthPolicy,
        renderer: &dyn ChartRenderer,
        options: &ChartOptions,
    ) -> ReportResult<Self> {
        Self::build(patient, prepare_records(batch, policy), renderer, options)
    }

    /// Assemble a report from already-rendered charts.
    ///
    /// Summaries are always recomputed from `records`.
    pub fn from_parts(
        patient: PatientInfo,
        records: Vec<AlignedRecord>,
        charts: BTreeMap<String, ChartImage>,
    ) -> Self {
        let summaries = summarize_records(&records);
        Self {
            patient,
            records,
            summaries,
            charts,
        }
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn records(&self) -> &[AlignedRecord] {
        &self.records
    }

    pub fn summaries(&self) -> &SummaryTable {
        &self.summaries
    }

    pub fn charts(&self) -> &BTreeMap<String, ChartImage> {
        &self.charts
    }

    pub fn chart(&self, variable: Variable) -> Option<&ChartImage> {
        self.charts.get(variable.key())
    }
}

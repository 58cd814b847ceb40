//! Aggregation pipeline: alignment, derived metrics, windows and summaries.
//!
//! Everything in this module is pure and synchronous. The HTTP layer decides
//! where it runs.

pub mod aligner;
pub mod metrics;
pub mod summary;
pub mod windows;

pub use aligner::{align, LengthPolicy};
pub use metrics::derive;
pub use summary::{summarize, summarize_records, SummaryTable, VariableSummary, WindowSummaries};
pub use windows::{classify, clock_window, TimeWindow};

use crate::models::{AlignedRecord, Batch};

/// Align a batch and populate its derived metrics.
pub fn prepare_records(batch: &Batch, policy: LengthPolicy) -> Vec<AlignedRecord> {
    derive(align(batch, policy))
}

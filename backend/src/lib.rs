//! # Blood Pressure Monitor Backend
//!
//! Receives raw channel batches from an ambulatory blood pressure device,
//! turns them into per-sample records with derived hemodynamic metrics,
//! summarizes them over the total, diurnal and nocturnal windows, and
//! renders a report that can be viewed and then exported as a document.
//!
//! ## Architecture
//!
//! - [`models`]: channels, batches, aligned records and patient metadata
//! - [`ingest`]: device payload coercion and the latest-batch store
//! - [`services`]: alignment, derived metrics, time windows and summaries
//! - [`report`]: the report model, chart and document collaborators, and
//!   the stateless transport codec used between view and export
//! - [`config`]: TOML configuration with environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Pipeline
//!
//! ```text
//! POST /v1/ingest ─► IngestionStore::replace
//! POST /v1/report ─► snapshot ─► align ─► derive ─► summarize ─► ReportModel ─► encode
//! POST /v1/report/export ─► decode ─► ReportModel ─► DocumentRenderer
//! ```

pub mod config;
pub mod ingest;
pub mod models;
pub mod report;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

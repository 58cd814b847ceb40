//! HTTP server module.
//!
//! Thin axum layer over the library: handlers parse requests, run the
//! pipeline and map library errors onto JSON error bodies.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing and validation                         │
//! │  - JSON / form serialization                              │
//! │  - CORS, compression, tracing, error mapping              │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Pipeline (services/, report/)                            │
//! │  - Alignment, derived metrics, summaries                  │
//! │  - Chart and document rendering, transport codec          │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  IngestionStore (ingest/)                                 │
//! │  - Latest device batch, replaced atomically               │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;

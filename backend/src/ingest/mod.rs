//! Device ingestion: payload coercion and the latest-batch store.

pub mod payload;
pub mod store;

pub use payload::{IngestPayload, ParsedPayload};
pub use store::{BatchSnapshot, IngestionStore};

//! Single-slot store for the most recent device batch.
//!
//! The slot holds an `Arc<Batch>`. `replace` swaps the whole `Arc` under the
//! write lock and readers only ever clone it, so a reader keeps one complete,
//! immutable batch for as long as it needs it.

use chrono::{DateTime, Utc};
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::Batch;

/// The current batch along with when it was received.
#[derive(Debug, Clone, Default)]
pub struct BatchSnapshot {
    pub batch: Arc<Batch>,
    /// Number of `replace` calls so far; 0 before the first ingest
    pub sequence: u64,
    pub received_at: Option<DateTime<Utc>>,
}

/// Process-wide latest-batch slot, cheap to clone and share between handlers.
#[derive(Debug, Clone, Default)]
pub struct IngestionStore {
    slot: Arc<RwLock<BatchSnapshot>>,
}

impl IngestionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored batch and return the new sequence number.
    ///
    /// Channels missing from `batch` are cleared; nothing is merged with the
    /// previous batch.
    pub fn replace(&self, batch: Batch) -> u64 {
        let lengths = batch.lengths();
        let batch = Arc::new(batch);

        let sequence = {
            let mut slot = self.slot.write();
            let sequence = slot.sequence + 1;
            *slot = BatchSnapshot {
                batch,
                sequence,
                received_at: Some(Utc::now()),
            };
            sequence
        };

        info!("Stored batch #{} with channel lengths {:?}", sequence, lengths);
        sequence
    }

    /// The current batch.
    pub fn snapshot(&self) -> Arc<Batch> {
        Arc::clone(&self.slot.read().batch)
    }

    /// The current batch with its metadata.
    pub fn current(&self) -> BatchSnapshot {
        self.slot.read().clone()
    }
}

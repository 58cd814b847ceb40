//! Typed data model shared by the aggregation pipeline.
//!
//! Every numeric sample is a [`Reading`]: `None` marks an absent value and is
//! never conflated with a genuine `0.0` reading.

pub mod channel;
pub mod patient;
pub mod record;

pub use channel::{Batch, Channel, ChannelKey, SampleChannel, DATE_CHANNEL};
pub use patient::PatientInfo;
pub use record::{AlignedRecord, SampleTime, Variable};

/// A single possibly-absent numeric sample.
pub type Reading = Option<f64>;

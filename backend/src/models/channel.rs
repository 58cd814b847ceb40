//! Named sample channels and the batch that groups them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Reading;

/// Numeric channels produced by the measuring device.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Systolic,
    Diastolic,
    PulseRate,
    MeanArterial,
    Hour,
    Minute,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Systolic,
        Channel::Diastolic,
        Channel::PulseRate,
        Channel::MeanArterial,
        Channel::Hour,
        Channel::Minute,
    ];

    /// Name used by the device payload.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Channel::Systolic => "sistolica",
            Channel::Diastolic => "diastolica",
            Channel::PulseRate => "pulso",
            Channel::MeanArterial => "pam",
            Channel::Hour => "hora",
            Channel::Minute => "minuto",
        }
    }

    /// Snake-case key used in reports and the transport map.
    pub fn key(&self) -> &'static str {
        match self {
            Channel::Systolic => "systolic",
            Channel::Diastolic => "diastolic",
            Channel::PulseRate => "pulse_rate",
            Channel::MeanArterial => "mean_arterial",
            Channel::Hour => "hour",
            Channel::Minute => "minute",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Name of the temporal (date) channel in device payloads.
pub const DATE_CHANNEL: &str = "fecha";

/// Result of resolving an ingest field name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelKey {
    Numeric(Channel),
    Date,
}

impl ChannelKey {
    /// Resolve a payload field name, accepting device names and English aliases.
    ///
    /// Returns `None` for unknown channels, which callers ignore.
    pub fn parse(name: &str) -> Option<Self> {
        let key = match name.trim().to_lowercase().as_str() {
            "sistolica" | "systolic" => ChannelKey::Numeric(Channel::Systolic),
            "diastolica" | "diastolic" => ChannelKey::Numeric(Channel::Diastolic),
            "pulso" | "pulse" | "pulse_rate" => ChannelKey::Numeric(Channel::PulseRate),
            "pam" | "map" | "mean_arterial" => ChannelKey::Numeric(Channel::MeanArterial),
            "hora" | "hour" => ChannelKey::Numeric(Channel::Hour),
            "minuto" | "minute" => ChannelKey::Numeric(Channel::Minute),
            "fecha" | "date" => ChannelKey::Date,
            _ => return None,
        };
        Some(key)
    }
}

/// A named, possibly ragged series of readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleChannel {
    pub name: Channel,
    pub values: Vec<Reading>,
}

impl SampleChannel {
    /// Build a channel; non-finite numbers are stored as absent.
    pub fn new(name: Channel, values: Vec<Reading>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Self { name, values }
    }

    /// Reading at `index`, absent when out of range.
    pub fn get(&self, index: usize) -> Reading {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One device upload: every numeric channel plus the date channel.
///
/// Channels that were not supplied are simply empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    channels: BTreeMap<Channel, SampleChannel>,
    dates: Vec<Option<NaiveDate>>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Batch::set_channel`].
    pub fn with_channel(mut self, channel: Channel, values: Vec<Reading>) -> Self {
        self.set_channel(channel, values);
        self
    }

    pub fn with_dates(mut self, dates: Vec<Option<NaiveDate>>) -> Self {
        self.dates = dates;
        self
    }

    pub fn set_channel(&mut self, channel: Channel, values: Vec<Reading>) {
        self.channels
            .insert(channel, SampleChannel::new(channel, values));
    }

    pub fn set_dates(&mut self, dates: Vec<Option<NaiveDate>>) {
        self.dates = dates;
    }

    pub fn channel(&self, channel: Channel) -> Option<&SampleChannel> {
        self.channels.get(&channel)
    }

    /// Values of `channel`, empty when the channel was not supplied.
    pub fn values(&self, channel: Channel) -> &[Reading] {
        self.channels
            .get(&channel)
            .map(|c| c.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn value(&self, channel: Channel, index: usize) -> Reading {
        self.channels.get(&channel).and_then(|c| c.get(index))
    }

    pub fn dates(&self) -> &[Option<NaiveDate>] {
        &self.dates
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied().flatten()
    }

    /// Length of every channel keyed by device name, including empty ones.
    pub fn lengths(&self) -> BTreeMap<&'static str, usize> {
        let mut lengths: BTreeMap<&'static str, usize> = Channel::ALL
            .iter()
            .map(|c| (c.wire_name(), self.values(*c).len()))
            .collect();
        lengths.insert(DATE_CHANNEL, self.dates.len());
        lengths
    }

    /// Longest channel length (0 for an empty batch).
    pub fn max_len(&self) -> usize {
        self.lengths().into_values().max().unwrap_or(0)
    }

    /// Shortest length among the channels that carry data.
    pub fn min_len(&self) -> usize {
        self.lengths()
            .into_values()
            .filter(|len| *len > 0)
            .min()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.max_len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_key_aliases() {
        assert_eq!(
            ChannelKey::parse("sistolica"),
            Some(ChannelKey::Numeric(Channel::Systolic))
        );
        assert_eq!(
            ChannelKey::parse(" Pulse "),
            Some(ChannelKey::Numeric(Channel::PulseRate))
        );
        assert_eq!(ChannelKey::parse("fecha"), Some(ChannelKey::Date));
        assert_eq!(ChannelKey::parse("temperature"), None);
    }

    #[test]
    fn test_non_finite_values_are_absent() {
        let channel = SampleChannel::new(
            Channel::Systolic,
            vec![Some(120.0), Some(f64::NAN), Some(f64::INFINITY), None],
        );
        assert_eq!(channel.values, vec![Some(120.0), None, None, None]);
    }

    #[test]
    fn test_out_of_range_is_absent() {
        let batch = Batch::new().with_channel(Channel::Systolic, vec![Some(120.0)]);
        assert_eq!(batch.value(Channel::Systolic, 0), Some(120.0));
        assert_eq!(batch.value(Channel::Systolic, 1), None);
        assert_eq!(batch.value(Channel::Diastolic, 0), None);
    }

    #[test]
    fn test_lengths_cover_every_channel() {
        let batch = Batch::new()
            .with_channel(Channel::Systolic, vec![Some(1.0), Some(2.0), Some(3.0)])
            .with_channel(Channel::Diastolic, vec![Some(1.0)]);
        let lengths = batch.lengths();
        assert_eq!(lengths.len(), 7);
        assert_eq!(lengths["sistolica"], 3);
        assert_eq!(lengths["pulso"], 0);
        assert_eq!(batch.max_len(), 3);
        assert_eq!(batch.min_len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let batch = Batch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.max_len(), 0);
        assert_eq!(batch.min_len(), 0);
    }
}

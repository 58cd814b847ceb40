//! Flat key/value transport encoding of a [`ReportModel`].
//!
//! The view response embeds the encoded map in its export action, and the
//! export request decodes it back into an equal report without any shared
//! storage. The map layout is a wire contract; changing a key, the delimiter
//! or the absent token breaks in-flight exports.
//!
//! Derived metrics and summaries are not transported: [`decode`] recomputes
//! them with the same functions used to build the view, so
//! `decode(&encode(&r)) == Ok(r)`.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::chart::ChartImage;
use super::error::TransportError;
use super::model::ReportModel;
use crate::models::{AlignedRecord, Channel, PatientInfo, Reading, SampleTime};
use crate::services::derive;

/// Flat transport map, ordered by key.
pub type TransportMap = BTreeMap<String, String>;

pub const FORMAT_VERSION: &str = "1";
pub const SERIES_DELIMITER: char = ';';
pub const ABSENT_TOKEN: &str = "NA";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub const KEY_VERSION: &str = "v";
pub const KEY_CHECKSUM: &str = "checksum";
pub const KEY_PATIENT_NAME: &str = "patient.name";
pub const KEY_PATIENT_SURNAME: &str = "patient.surname";
pub const KEY_PATIENT_ID: &str = "patient.id";
pub const KEY_PATIENT_AGE: &str = "patient.age";
pub const KEY_PATIENT_SAMPLING: &str = "patient.sampling_minutes";
pub const KEY_RECORD_COUNT: &str = "records.count";
pub const KEY_SERIES_DATE: &str = "series.date";
pub const CHART_PREFIX: &str = "chart.";

/// Channels carried as numeric series.
const SERIES_CHANNELS: [Channel; 6] = Channel::ALL;

pub fn series_key(channel: Channel) -> String {
    format!("series.{}", channel.key())
}

pub fn chart_key(name: &str) -> String {
    format!("{}{}", CHART_PREFIX, name)
}

fn channel_value(record: &AlignedRecord, channel: Channel) -> Reading {
    match channel {
        Channel::Systolic => record.systolic,
        Channel::Diastolic => record.diastolic,
        Channel::PulseRate => record.pulse_rate,
        Channel::MeanArterial => record.mean_arterial,
        Channel::Hour => record.hour(),
        Channel::Minute => record.time.and_then(|t| t.minute),
    }
}

fn join_tokens<I>(tokens: I) -> String
where
    I: IntoIterator<Item = String>,
{
    tokens
        .into_iter()
        .collect::<Vec<_>>()
        .join(&SERIES_DELIMITER.to_string())
}

fn encode_reading(value: Reading) -> String {
    match value {
        Some(v) => v.to_string(),
        None => ABSENT_TOKEN.to_string(),
    }
}

fn encode_date(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => d.format(DATE_FORMAT).to_string(),
        None => ABSENT_TOKEN.to_string(),
    }
}

/// SHA-256 over every entry except the checksum itself.
///
/// Keys and values are each prefixed with their byte length, so no choice of
/// patient text can make two different maps hash alike.
fn checksum(map: &TransportMap) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in map.iter().filter(|(k, _)| k.as_str() != KEY_CHECKSUM) {
        for field in [key, value] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

/// Encode a report into its flat transport map.
pub fn encode(report: &ReportModel) -> TransportMap {
    let patient = report.patient();
    let records = report.records();
    let mut map = TransportMap::new();

    map.insert(KEY_VERSION.to_string(), FORMAT_VERSION.to_string());
    map.insert(KEY_PATIENT_NAME.to_string(), patient.name.clone());
    map.insert(KEY_PATIENT_SURNAME.to_string(), patient.surname.clone());
    map.insert(KEY_PATIENT_ID.to_string(), patient.id.clone());
    map.insert(KEY_PATIENT_AGE.to_string(), patient.age.to_string());
    map.insert(KEY_PATIENT_SAMPLING.to_string(), patient.sampling_minutes.to_string());
    map.insert(KEY_RECORD_COUNT.to_string(), records.len().to_string());

    for channel in SERIES_CHANNELS {
        let series = join_tokens(records.iter().map(|r| encode_reading(channel_value(r, channel))));
        map.insert(series_key(channel), series);
    }
    let dates = join_tokens(records.iter().map(|r| encode_date(r.time.and_then(|t| t.date))));
    map.insert(KEY_SERIES_DATE.to_string(), dates);

    for (name, image) in report.charts() {
        map.insert(chart_key(name), image.to_data_url());
    }

    let sum = checksum(&map);
    map.insert(KEY_CHECKSUM.to_string(), sum);
    map
}

fn require<'a>(map: &'a TransportMap, key: &str) -> Result<&'a str, TransportError> {
    map.get(key)
        .map(String::as_str)
        .ok_or_else(|| TransportError::MissingKey(key.to_string()))
}

fn parse_unsigned<T: std::str::FromStr>(map: &TransportMap, key: &str) -> Result<T, TransportError> {
    let raw = require(map, key)?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| TransportError::malformed(key, format!("'{}' is not an unsigned integer", raw)))
}

/// Split a series into exactly `count` tokens.
fn split_series<'a>(key: &str, raw: &'a str, count: usize) -> Result<Vec<&'a str>, TransportError> {
    if count == 0 {
        return if raw.is_empty() {
            Ok(Vec::new())
        } else {
            Err(TransportError::malformed(key, "series is not empty but records.count is 0"))
        };
    }

    let tokens: Vec<&str> = raw.split(SERIES_DELIMITER).collect();
    if tokens.len() != count {
        return Err(TransportError::malformed(
            key,
            format!("expected {} values, found {}", count, tokens.len()),
        ));
    }
    Ok(tokens)
}

fn decode_readings(map: &TransportMap, key: &str, count: usize) -> Result<Vec<Reading>, TransportError> {
    let raw = require(map, key)?;
    split_series(key, raw, count)?
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            if token == ABSENT_TOKEN {
                return Ok(None);
            }
            match token.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(TransportError::malformed(
                    key,
                    format!("invalid number '{}' at position {}", token, i + 1),
                )),
            }
        })
        .collect()
}

fn decode_dates(map: &TransportMap, count: usize) -> Result<Vec<Option<NaiveDate>>, TransportError> {
    let raw = require(map, KEY_SERIES_DATE)?;
    split_series(KEY_SERIES_DATE, raw, count)?
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            if token == ABSENT_TOKEN {
                return Ok(None);
            }
            NaiveDate::parse_from_str(token, DATE_FORMAT)
                .map(Some)
                .map_err(|_| {
                    TransportError::malformed(
                        KEY_SERIES_DATE,
                        format!("invalid date '{}' at position {}", token, i + 1),
                    )
                })
        })
        .collect()
}

/// Rebuild a report from its transport map.
///
/// Fails closed: a missing or malformed key, an unknown version or a checksum
/// mismatch is an error, never an empty series.
pub fn decode(map: &TransportMap) -> Result<ReportModel, TransportError> {
    let version = require(map, KEY_VERSION)?;
    if version != FORMAT_VERSION {
        return Err(TransportError::UnsupportedVersion(version.to_string()));
    }

    let expected = require(map, KEY_CHECKSUM)?;
    if !expected.eq_ignore_ascii_case(&checksum(map)) {
        return Err(TransportError::ChecksumMismatch);
    }

    let patient = PatientInfo {
        name: require(map, KEY_PATIENT_NAME)?.to_string(),
        surname: require(map, KEY_PATIENT_SURNAME)?.to_string(),
        id: require(map, KEY_PATIENT_ID)?.to_string(),
        age: parse_unsigned(map, KEY_PATIENT_AGE)?,
        sampling_minutes: parse_unsigned(map, KEY_PATIENT_SAMPLING)?,
    };

    let count: usize = parse_unsigned(map, KEY_RECORD_COUNT)?;
    let mut series: BTreeMap<Channel, Vec<Reading>> = BTreeMap::new();
    for channel in SERIES_CHANNELS {
        series.insert(channel, decode_readings(map, &series_key(channel), count)?);
    }
    let dates = decode_dates(map, count)?;

    let at = |channel: Channel, i: usize| series.get(&channel).and_then(|v| v.get(i).copied().flatten());
    let records = (0..count)
        .map(|i| AlignedRecord {
            index: i + 1,
            systolic: at(Channel::Systolic, i),
            diastolic: at(Channel::Diastolic, i),
            pulse_rate: at(Channel::PulseRate, i),
            mean_arterial: at(Channel::MeanArterial, i),
            time: at(Channel::Hour, i).map(|hour| SampleTime {
                hour,
                minute: at(Channel::Minute, i),
                date: dates[i],
            }),
            pulse_pressure: None,
            double_product: None,
        })
        .collect();

    let mut charts = BTreeMap::new();
    for (key, value) in map.range(CHART_PREFIX.to_string()..) {
        let Some(name) = key.strip_prefix(CHART_PREFIX) else {
            break;
        };
        let image = ChartImage::from_data_url(value).map_err(|reason| TransportError::malformed(key, reason))?;
        charts.insert(name.to_string(), image);
    }

    Ok(ReportModel::from_parts(patient, derive(records), charts))
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod codec_tests;

use super::*;
use proptest::prelude::*;

fn patient() -> PatientInfo {
    PatientInfo {
        name: "Ana María".to_string(),
        surname: "García; López".to_string(),
        id: "HC=001".to_string(),
        age: 54,
        sampling_minutes: 20,
    }
}

fn time(hour: f64, minute: Option<f64>, date: Option<NaiveDate>) -> Option<SampleTime> {
    Some(SampleTime { hour, minute, date })
}

fn sample_report() -> ReportModel {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9);
    let records = vec![
        AlignedRecord {
            systolic: Some(120.0),
            diastolic: Some(80.0),
            pulse_rate: Some(70.0),
            mean_arterial: Some(93.3),
            time: time(8.0, Some(20.0), date),
            ..AlignedRecord::empty(1)
        },
        AlignedRecord {
            systolic: Some(130.0),
            diastolic: None,
            pulse_rate: Some(75.0),
            mean_arterial: Some(0.0),
            time: time(23.0, None, None),
            ..AlignedRecord::empty(2)
        },
        AlignedRecord {
            systolic: Some(118.5),
            ..AlignedRecord::empty(3)
        },
    ];
    let charts = BTreeMap::from([
        ("systolic".to_string(), ChartImage::svg(b"<svg></svg>".to_vec())),
        ("pulse_rate".to_string(), ChartImage::new("image/png", vec![0, 159, 255])),
    ]);
    ReportModel::from_parts(patient(), derive(records), charts)
}

/// Recompute the checksum after deliberately editing a map.
fn reseal(mut map: TransportMap) -> TransportMap {
    let sum = checksum(&map);
    map.insert(KEY_CHECKSUM.to_string(), sum);
    map
}

#[test]
fn test_round_trip() {
    let report = sample_report();
    let decoded = decode(&encode(&report)).unwrap();
    assert_eq!(decoded, report);
}

#[test]
fn test_empty_report_round_trip() {
    let report = ReportModel::from_parts(patient(), Vec::new(), BTreeMap::new());
    let map = encode(&report);
    assert_eq!(map[KEY_RECORD_COUNT], "0");
    assert_eq!(map[&series_key(Channel::Systolic)], "");
    assert_eq!(decode(&map).unwrap(), report);
}

#[test]
fn test_wire_layout() {
    let map = encode(&sample_report());

    assert_eq!(map[KEY_VERSION], "1");
    assert_eq!(map[&series_key(Channel::Systolic)], "120;130;118.5");
    assert_eq!(map[&series_key(Channel::Diastolic)], "80;NA;NA");
    assert_eq!(map[&series_key(Channel::MeanArterial)], "93.3;0;NA");
    assert_eq!(map[&series_key(Channel::Hour)], "8;23;NA");
    assert_eq!(map[&series_key(Channel::Minute)], "20;NA;NA");
    assert_eq!(map[KEY_SERIES_DATE], "2024-03-09;NA;NA");
    assert_eq!(map["chart.systolic"], "data:image/svg+xml;base64,PHN2Zz48L3N2Zz4=");
    assert_eq!(map[KEY_CHECKSUM].len(), 64);
    assert!(!map.contains_key("series.pulse_pressure"));
}

#[test]
fn test_zero_and_absent_stay_distinct() {
    let decoded = decode(&encode(&sample_report())).unwrap();
    assert_eq!(decoded.records()[1].mean_arterial, Some(0.0));
    assert_eq!(decoded.records()[2].mean_arterial, None);
}

#[test]
fn test_decode_recomputes_derived_values() {
    let decoded = decode(&encode(&sample_report())).unwrap();
    assert_eq!(decoded.records()[0].pulse_pressure, Some(40.0));
    assert_eq!(decoded.records()[1].pulse_pressure, None);
    assert_eq!(decoded.records()[1].double_product, Some(9750.0));
    assert_eq!(decoded.summaries(), sample_report().summaries());
}

#[test]
fn test_missing_checksum() {
    let mut map = encode(&sample_report());
    map.remove(KEY_CHECKSUM);
    assert_eq!(decode(&map), Err(TransportError::MissingKey(KEY_CHECKSUM.to_string())));
}

#[test]
fn test_missing_required_keys() {
    let required = [
        KEY_PATIENT_NAME.to_string(),
        KEY_PATIENT_AGE.to_string(),
        KEY_RECORD_COUNT.to_string(),
        series_key(Channel::Systolic),
        series_key(Channel::Minute),
        KEY_SERIES_DATE.to_string(),
    ];

    for key in required {
        let mut map = encode(&sample_report());
        map.remove(&key);
        assert_eq!(decode(&reseal(map)), Err(TransportError::MissingKey(key.clone())), "key {}", key);
    }
}

#[test]
fn test_missing_version() {
    let mut map = encode(&sample_report());
    map.remove(KEY_VERSION);
    assert_eq!(decode(&map), Err(TransportError::MissingKey(KEY_VERSION.to_string())));
}

#[test]
fn test_unsupported_version() {
    let mut map = encode(&sample_report());
    map.insert(KEY_VERSION.to_string(), "2".to_string());
    assert_eq!(decode(&reseal(map)), Err(TransportError::UnsupportedVersion("2".to_string())));
}

#[test]
fn test_tampered_value_is_rejected() {
    let mut map = encode(&sample_report());
    map.insert(series_key(Channel::Systolic), "180;130;118.5".to_string());
    assert_eq!(decode(&map), Err(TransportError::ChecksumMismatch));
}

#[test]
fn test_checksum_separates_entries() {
    let joined = TransportMap::from([("a".to_string(), "b\nc=d".to_string())]);
    let split = TransportMap::from([
        ("a".to_string(), "b".to_string()),
        ("c".to_string(), "d".to_string()),
    ]);
    assert_ne!(checksum(&joined), checksum(&split));

    let shifted = TransportMap::from([("a=b".to_string(), "c".to_string())]);
    let original = TransportMap::from([("a".to_string(), "b=c".to_string())]);
    assert_ne!(checksum(&shifted), checksum(&original));
}

#[test]
fn test_patient_text_with_separators_round_trips() {
    let mut patient = patient();
    patient.name = "Ana\npatient.surname=x".to_string();
    patient.id = "=\n=".to_string();
    let report = ReportModel::from_parts(patient, Vec::new(), BTreeMap::new());

    let mut map = encode(&report);
    assert_eq!(decode(&map), Ok(report));

    map.insert(KEY_PATIENT_NAME.to_string(), "Ana".to_string());
    assert_eq!(decode(&map), Err(TransportError::ChecksumMismatch));
}

#[test]
fn test_series_length_mismatch() {
    let mut map = encode(&sample_report());
    map.insert(series_key(Channel::Diastolic), "80;NA".to_string());
    let err = decode(&reseal(map)).unwrap_err();
    assert_eq!(err.key(), Some("series.diastolic"));
    assert!(err.to_string().contains("expected 3 values, found 2"));
}

#[test]
fn test_empty_token_is_not_absent() {
    let mut map = encode(&sample_report());
    map.insert(series_key(Channel::Diastolic), "80;;NA".to_string());
    assert!(matches!(
        decode(&reseal(map)),
        Err(TransportError::Malformed { .. })
    ));
}

#[test]
fn test_non_finite_numbers_rejected() {
    for token in ["inf", "NaN", "abc"] {
        let mut map = encode(&sample_report());
        map.insert(series_key(Channel::PulseRate), format!("70;{};NA", token));
        let err = decode(&reseal(map)).unwrap_err();
        assert_eq!(err.key(), Some("series.pulse_rate"), "token {}", token);
    }
}

#[test]
fn test_bad_patient_age() {
    let mut map = encode(&sample_report());
    map.insert(KEY_PATIENT_AGE.to_string(), "-4".to_string());
    let err = decode(&reseal(map)).unwrap_err();
    assert_eq!(err.key(), Some(KEY_PATIENT_AGE));
}

#[test]
fn test_bad_date() {
    let mut map = encode(&sample_report());
    map.insert(KEY_SERIES_DATE.to_string(), "09/03/2024;NA;NA".to_string());
    let err = decode(&reseal(map)).unwrap_err();
    assert_eq!(err.key(), Some(KEY_SERIES_DATE));
}

#[test]
fn test_bad_chart_payload() {
    let mut map = encode(&sample_report());
    map.insert(chart_key("systolic"), "not a data url".to_string());
    let err = decode(&reseal(map)).unwrap_err();
    assert_eq!(err.key(), Some("chart.systolic"));
}

#[test]
fn test_non_empty_series_with_zero_count() {
    let report = ReportModel::from_parts(patient(), Vec::new(), BTreeMap::new());
    let mut map = encode(&report);
    map.insert(series_key(Channel::Hour), "8".to_string());
    assert!(matches!(
        decode(&reseal(map)),
        Err(TransportError::Malformed { .. })
    ));
}

fn reading() -> impl Strategy<Value = Reading> {
    prop::option::of(prop_oneof![-1.0e6..1.0e6f64, Just(0.0), Just(-0.0)])
}

fn sample_time() -> impl Strategy<Value = Option<SampleTime>> {
    prop::option::of(
        (
            0.0..24.0f64,
            prop::option::of(0u32..60),
            prop::option::of(0i64..20_000),
        )
            .prop_map(|(hour, minute, days)| SampleTime {
                hour,
                minute: minute.map(f64::from),
                date: days.map(|d| {
                    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + chrono::Duration::days(d)
                }),
            }),
    )
}

fn records() -> impl Strategy<Value = Vec<AlignedRecord>> {
    prop::collection::vec((reading(), reading(), reading(), reading(), sample_time()), 0..30).prop_map(
        |rows| {
            let records = rows
                .into_iter()
                .enumerate()
                .map(|(i, (systolic, diastolic, pulse_rate, mean_arterial, time))| AlignedRecord {
                    systolic,
                    diastolic,
                    pulse_rate,
                    mean_arterial,
                    time,
                    ..AlignedRecord::empty(i + 1)
                })
                .collect();
            derive(records)
        },
    )
}

fn patient_strategy() -> impl Strategy<Value = PatientInfo> {
    ("\\PC*", "\\PC*", "\\PC*", any::<u32>(), any::<u32>()).prop_map(
        |(name, surname, id, age, sampling_minutes)| PatientInfo {
            name,
            surname,
            id,
            age,
            sampling_minutes,
        },
    )
}

fn charts() -> impl Strategy<Value = BTreeMap<String, ChartImage>> {
    prop::collection::btree_map(
        "[a-z_]{1,12}",
        prop::collection::vec(any::<u8>(), 0..64).prop_map(|data| ChartImage::new("image/png", data)),
        0..4,
    )
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(
        patient in patient_strategy(),
        records in records(),
        charts in charts(),
    ) {
        let report = ReportModel::from_parts(patient, records, charts);
        let decoded = decode(&encode(&report));
        prop_assert_eq!(decoded, Ok(report));
    }
}

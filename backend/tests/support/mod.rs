//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use bp_monitor::models::{Batch, Channel, PatientInfo};
use serde_json::{json, Value};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment, since tests in one binary run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn patient() -> PatientInfo {
    PatientInfo {
        name: "Ana".to_string(),
        surname: "García".to_string(),
        id: "HC-001".to_string(),
        age: 54,
        sampling_minutes: 20,
    }
}

/// Two samples, one diurnal and one nocturnal, with a missing diastolic.
pub fn scenario_batch() -> Batch {
    Batch::new()
        .with_channel(Channel::Systolic, vec![Some(120.0), Some(130.0)])
        .with_channel(Channel::Diastolic, vec![Some(80.0), None])
        .with_channel(Channel::PulseRate, vec![Some(70.0), Some(75.0)])
        .with_channel(Channel::Hour, vec![Some(8.0), Some(23.0)])
}

/// The same scenario as a device payload.
pub fn scenario_payload() -> Value {
    json!({
        "sistolica": [120, "130"],
        "diastolica": [80, null],
        "pulso": [70, 75],
        "hora": [8, 23],
    })
}

pub fn patient_form() -> Value {
    json!({
        "name": "Ana",
        "surname": "García",
        "id": "HC-001",
        "age": "54",
        "sampling_minutes": "20",
    })
}

/// `application/x-www-form-urlencoded` body for a flat map, encoded the way
/// axum's `Form` extractor decodes it.
pub fn form_encode(map: &BTreeMap<String, String>) -> String {
    serde_urlencoded::to_string(map).unwrap()
}

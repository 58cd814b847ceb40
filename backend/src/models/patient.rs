//! Patient metadata submitted by the operator with a view request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: String,
    pub surname: String,
    /// Clinical identifier, free text
    pub id: String,
    /// Age in years
    pub age: u32,
    /// Interval between device measurements, in minutes
    pub sampling_minutes: u32,
}

impl PatientInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }
}

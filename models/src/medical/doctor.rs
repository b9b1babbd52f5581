// models/src/medical/doctor.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::schedule::WeeklySchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoctorStatus {
    Active,
    Inactive,
    Vacation,
}

impl fmt::Display for DoctorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DoctorStatus::Active => "active",
            DoctorStatus::Inactive => "inactive",
            DoctorStatus::Vacation => "vacation",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DoctorStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(DoctorStatus::Active),
            "inactive" => Ok(DoctorStatus::Inactive),
            "vacation" => Ok(DoctorStatus::Vacation),
            other => Err(ValidationError::InvalidValue("doctor status".to_string(), other.to_string())),
        }
    }
}

/// A practicing doctor. Doctors are never deleted, only deactivated, so
/// historical appointments and records keep a valid reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub schedule: WeeklySchedule,
    pub status: DoctorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == DoctorStatus::Active
    }
}

// models/src/medical/medical_record.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One prescribed medication line within a medical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionEntry {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

/// Vital signs taken during a consultation. Every field is optional; a
/// record may carry any subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i32>,
    pub temperature: Option<f32>,
    pub weight: Option<f32>,
}

/// A clinical note from one consultation.
///
/// Records are append-only by policy: there is no `updated_at` because
/// there are no updates. Corrections are written as new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: DateTime<Utc>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    #[serde(default)]
    pub prescriptions: Vec<PrescriptionEntry>,
    pub vital_signs: Option<VitalSigns>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

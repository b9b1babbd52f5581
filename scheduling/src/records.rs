// scheduling/src/records.rs
//! Medical records: created by consultations, readable forever, and never
//! edited or deleted. Corrections are written as new records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use models::errors::{ScheduleError, ScheduleResult, ValidationError};
use models::medical::{MedicalRecord, PrescriptionEntry, VitalSigns};
use storage::{RecordFilter, RecordStore};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewMedicalRecord {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    /// Consultation date; defaults to now.
    pub date: Option<DateTime<Utc>>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub prescriptions: Vec<PrescriptionEntry>,
    pub vital_signs: Option<VitalSigns>,
    pub notes: Option<String>,
}

pub struct RecordsService {
    store: Arc<dyn RecordStore>,
}

impl RecordsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        RecordsService { store }
    }

    pub async fn create_record(&self, new_record: NewMedicalRecord) -> ScheduleResult<MedicalRecord> {
        if new_record.diagnosis.trim().is_empty() {
            return Err(ValidationError::MissingField("diagnosis".to_string()).into());
        }
        if self.store.find_doctor(&new_record.doctor_id).await?.is_none() {
            return Err(ScheduleError::NotFound("doctor".to_string()));
        }
        if self.store.find_patient(&new_record.patient_id).await?.is_none() {
            return Err(ScheduleError::NotFound("patient".to_string()));
        }

        let now = Utc::now();
        let record = MedicalRecord {
            id: Uuid::new_v4(),
            doctor_id: new_record.doctor_id,
            patient_id: new_record.patient_id,
            date: new_record.date.unwrap_or(now),
            diagnosis: new_record.diagnosis,
            treatment: new_record.treatment,
            prescriptions: new_record.prescriptions,
            vital_signs: new_record.vital_signs,
            notes: new_record.notes,
            created_at: now,
        };
        self.store.insert_record(record.clone()).await?;
        info!("Created medical record {} for patient {}", record.id, record.patient_id);
        Ok(record)
    }

    pub async fn get_record(&self, id: &Uuid) -> ScheduleResult<MedicalRecord> {
        self.store
            .find_record(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("medical record".to_string()))
    }

    /// Newest first.
    pub async fn list_for_patient(&self, patient_id: &Uuid) -> ScheduleResult<Vec<MedicalRecord>> {
        self.store.list_records(&RecordFilter::for_patient(*patient_id)).await
    }

    pub async fn list_for_doctor(&self, doctor_id: &Uuid) -> ScheduleResult<Vec<MedicalRecord>> {
        let filter = RecordFilter {
            doctor_id: Some(*doctor_id),
            ..Default::default()
        };
        self.store.list_records(&filter).await
    }

    /// Case-insensitive substring match over the diagnosis text.
    pub async fn search_by_diagnosis(&self, query: &str) -> ScheduleResult<Vec<MedicalRecord>> {
        let needle = query.to_lowercase();
        let mut records = self.store.list_records(&RecordFilter::default()).await?;
        records.retain(|r| r.diagnosis.to_lowercase().contains(&needle));
        Ok(records)
    }

    /// Records are append-only. Both mutation entry points exist so the
    /// policy is an explicit, typed rejection rather than a missing route.
    pub async fn update_record(&self, _id: &Uuid) -> ScheduleResult<MedicalRecord> {
        Err(ScheduleError::RecordImmutable)
    }

    pub async fn delete_record(&self, _id: &Uuid) -> ScheduleResult<()> {
        Err(ScheduleError::RecordImmutable)
    }
}

// storage/src/sled_store.rs
use std::path::Path;

use async_trait::async_trait;
use log::{debug, info};
use models::errors::{ScheduleError, ScheduleResult};
use models::medical::{Appointment, Doctor, MedicalRecord, Patient};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Tree;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::record_store::{
    sort_appointments, sort_doctors, sort_patients, sort_records, AppointmentFilter, DoctorFilter,
    PatientFilter, RecordFilter, RecordStore,
};

const DOCTORS_TREE: &str = "doctors";
const PATIENTS_TREE: &str = "patients";
const APPOINTMENTS_TREE: &str = "appointments";
const RECORDS_TREE: &str = "medical_records";

/// Persistent store: one sled tree per collection, JSON documents keyed by
/// the raw UUID bytes.
#[derive(Debug)]
pub struct SledStore {
    db: sled::Db,
    doctors: Tree,
    patients: Tree,
    appointments: Tree,
    records: Tree,
}

impl SledStore {
    pub fn open(path: &Path, config: &StoreConfig) -> ScheduleResult<Self> {
        let mut builder = sled::Config::new().path(path).temporary(config.temporary);
        if let Some(capacity) = config.cache_capacity {
            builder = builder.cache_capacity(capacity);
        }
        let db = builder.open()?;
        let doctors = db.open_tree(DOCTORS_TREE)?;
        let patients = db.open_tree(PATIENTS_TREE)?;
        let appointments = db.open_tree(APPOINTMENTS_TREE)?;
        let records = db.open_tree(RECORDS_TREE)?;
        info!("Opened sled record store at {:?}", path);
        Ok(SledStore {
            db,
            doctors,
            patients,
            appointments,
            records,
        })
    }

    fn get_document<T: DeserializeOwned>(tree: &Tree, id: &Uuid) -> ScheduleResult<Option<T>> {
        match tree.get(id.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn put_document<T: Serialize>(tree: &Tree, id: &Uuid, document: &T) -> ScheduleResult<()> {
        let raw = serde_json::to_vec(document)?;
        tree.insert(id.as_bytes(), raw)?;
        Ok(())
    }

    fn replace_document<T: Serialize>(
        tree: &Tree,
        id: &Uuid,
        document: &T,
        entity: &str,
    ) -> ScheduleResult<()> {
        if tree.get(id.as_bytes())?.is_none() {
            return Err(ScheduleError::NotFound(entity.to_string()));
        }
        Self::put_document(tree, id, document)
    }

    fn scan<T: DeserializeOwned>(tree: &Tree) -> ScheduleResult<Vec<T>> {
        let mut documents = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let (_, raw) = entry?;
            documents.push(serde_json::from_slice(&raw)?);
        }
        Ok(documents)
    }
}

#[async_trait]
impl RecordStore for SledStore {
    async fn find_doctor(&self, id: &Uuid) -> ScheduleResult<Option<Doctor>> {
        Self::get_document(&self.doctors, id)
    }

    async fn insert_doctor(&self, doctor: Doctor) -> ScheduleResult<()> {
        Self::put_document(&self.doctors, &doctor.id, &doctor)
    }

    async fn update_doctor(&self, doctor: Doctor) -> ScheduleResult<()> {
        Self::replace_document(&self.doctors, &doctor.id, &doctor, "doctor")
    }

    async fn list_doctors(&self, filter: &DoctorFilter) -> ScheduleResult<Vec<Doctor>> {
        let mut doctors: Vec<Doctor> = Self::scan(&self.doctors)?;
        doctors.retain(|d| filter.matches(d));
        sort_doctors(&mut doctors);
        Ok(doctors)
    }

    async fn find_patient(&self, id: &Uuid) -> ScheduleResult<Option<Patient>> {
        Self::get_document(&self.patients, id)
    }

    async fn insert_patient(&self, patient: Patient) -> ScheduleResult<()> {
        Self::put_document(&self.patients, &patient.id, &patient)
    }

    async fn update_patient(&self, patient: Patient) -> ScheduleResult<()> {
        Self::replace_document(&self.patients, &patient.id, &patient, "patient")
    }

    async fn list_patients(&self, filter: &PatientFilter) -> ScheduleResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = Self::scan(&self.patients)?;
        patients.retain(|p| filter.matches(p));
        sort_patients(&mut patients);
        Ok(patients)
    }

    async fn find_appointment(&self, id: &Uuid) -> ScheduleResult<Option<Appointment>> {
        Self::get_document(&self.appointments, id)
    }

    async fn insert_appointment(&self, appointment: Appointment) -> ScheduleResult<()> {
        debug!("Persisting appointment {} for doctor {}", appointment.id, appointment.doctor_id);
        Self::put_document(&self.appointments, &appointment.id, &appointment)
    }

    async fn update_appointment(&self, appointment: Appointment) -> ScheduleResult<()> {
        Self::replace_document(&self.appointments, &appointment.id, &appointment, "appointment")
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> ScheduleResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = Self::scan(&self.appointments)?;
        appointments.retain(|a| filter.matches(a));
        sort_appointments(&mut appointments);
        Ok(appointments)
    }

    async fn find_record(&self, id: &Uuid) -> ScheduleResult<Option<MedicalRecord>> {
        Self::get_document(&self.records, id)
    }

    async fn insert_record(&self, record: MedicalRecord) -> ScheduleResult<()> {
        Self::put_document(&self.records, &record.id, &record)
    }

    async fn list_records(&self, filter: &RecordFilter) -> ScheduleResult<Vec<MedicalRecord>> {
        let mut records: Vec<MedicalRecord> = Self::scan(&self.records)?;
        records.retain(|r| filter.matches(r));
        sort_records(&mut records);
        Ok(records)
    }

    async fn flush(&self) -> ScheduleResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    async fn close(&self) -> ScheduleResult<()> {
        self.db.flush_async().await?;
        info!("SledStore closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use models::medical::{AppointmentStatus, DoctorStatus};
    use models::schedule::WeeklySchedule;
    use tempfile::tempdir;

    fn temp_store(dir: &Path) -> SledStore {
        let config = StoreConfig {
            temporary: true,
            ..StoreConfig::default()
        };
        SledStore::open(dir, &config).unwrap()
    }

    fn doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            first_name: "Elena".to_string(),
            last_name: "Vega".to_string(),
            license_number: "LIC-77".to_string(),
            specialties: vec![],
            phone: None,
            email: None,
            schedule: WeeklySchedule::default(),
            status: DoctorStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn should_persist_and_reload_documents() {
        let dir = tempdir().unwrap();
        let store = temp_store(dir.path());

        let doc = doctor();
        store.insert_doctor(doc.clone()).await.unwrap();
        let found = store.find_doctor(&doc.id).await.unwrap().unwrap();
        assert_eq!(found, doc);

        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doc.id,
            patient_id: Uuid::new_v4(),
            date_time: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            duration_minutes: 30,
            status: AppointmentStatus::Scheduled,
            reason: Some("checkup".to_string()),
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: None,
            cancelled_at: None,
        };
        store.insert_appointment(appointment.clone()).await.unwrap();
        let listed = store
            .list_appointments(&AppointmentFilter::for_doctor(doc.id).blocking())
            .await
            .unwrap();
        assert_eq!(listed, vec![appointment]);
        store.flush().await.unwrap();
    }

    #[tokio::test]
    async fn should_report_not_found_on_update_of_missing_document() {
        let dir = tempdir().unwrap();
        let store = temp_store(dir.path());
        let err = store.update_doctor(doctor()).await.unwrap_err();
        assert_eq!(err, ScheduleError::NotFound("doctor".to_string()));
    }
}

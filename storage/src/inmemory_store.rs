// storage/src/inmemory_store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use log::info;
use models::errors::{ScheduleError, ScheduleResult};
use models::medical::{Appointment, Doctor, MedicalRecord, Patient};
use tokio::sync::Mutex as TokioMutex;
use uuid::Uuid;

use crate::record_store::{
    sort_appointments, sort_doctors, sort_patients, sort_records, AppointmentFilter, DoctorFilter,
    PatientFilter, RecordFilter, RecordStore,
};

/// Ephemeral store backed by per-collection maps. The default for tests
/// and for `--storage inmemory` runs; everything is lost on close.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    doctors: TokioMutex<HashMap<Uuid, Doctor>>,
    patients: TokioMutex<HashMap<Uuid, Patient>>,
    appointments: TokioMutex<HashMap<Uuid, Appointment>>,
    records: TokioMutex<HashMap<Uuid, MedicalRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    pub async fn clear(&self) {
        self.doctors.lock().await.clear();
        self.patients.lock().await.clear();
        self.appointments.lock().await.clear();
        self.records.lock().await.clear();
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_doctor(&self, id: &Uuid) -> ScheduleResult<Option<Doctor>> {
        let doctors = self.doctors.lock().await;
        Ok(doctors.get(id).cloned())
    }

    async fn insert_doctor(&self, doctor: Doctor) -> ScheduleResult<()> {
        let mut doctors = self.doctors.lock().await;
        doctors.insert(doctor.id, doctor);
        Ok(())
    }

    async fn update_doctor(&self, doctor: Doctor) -> ScheduleResult<()> {
        let mut doctors = self.doctors.lock().await;
        if !doctors.contains_key(&doctor.id) {
            return Err(ScheduleError::NotFound("doctor".to_string()));
        }
        doctors.insert(doctor.id, doctor);
        Ok(())
    }

    async fn list_doctors(&self, filter: &DoctorFilter) -> ScheduleResult<Vec<Doctor>> {
        let doctors = self.doctors.lock().await;
        let mut matched: Vec<Doctor> = doctors.values().filter(|d| filter.matches(d)).cloned().collect();
        sort_doctors(&mut matched);
        Ok(matched)
    }

    async fn find_patient(&self, id: &Uuid) -> ScheduleResult<Option<Patient>> {
        let patients = self.patients.lock().await;
        Ok(patients.get(id).cloned())
    }

    async fn insert_patient(&self, patient: Patient) -> ScheduleResult<()> {
        let mut patients = self.patients.lock().await;
        patients.insert(patient.id, patient);
        Ok(())
    }

    async fn update_patient(&self, patient: Patient) -> ScheduleResult<()> {
        let mut patients = self.patients.lock().await;
        if !patients.contains_key(&patient.id) {
            return Err(ScheduleError::NotFound("patient".to_string()));
        }
        patients.insert(patient.id, patient);
        Ok(())
    }

    async fn list_patients(&self, filter: &PatientFilter) -> ScheduleResult<Vec<Patient>> {
        let patients = self.patients.lock().await;
        let mut matched: Vec<Patient> = patients.values().filter(|p| filter.matches(p)).cloned().collect();
        sort_patients(&mut matched);
        Ok(matched)
    }

    async fn find_appointment(&self, id: &Uuid) -> ScheduleResult<Option<Appointment>> {
        let appointments = self.appointments.lock().await;
        Ok(appointments.get(id).cloned())
    }

    async fn insert_appointment(&self, appointment: Appointment) -> ScheduleResult<()> {
        let mut appointments = self.appointments.lock().await;
        appointments.insert(appointment.id, appointment);
        Ok(())
    }

    async fn update_appointment(&self, appointment: Appointment) -> ScheduleResult<()> {
        let mut appointments = self.appointments.lock().await;
        if !appointments.contains_key(&appointment.id) {
            return Err(ScheduleError::NotFound("appointment".to_string()));
        }
        appointments.insert(appointment.id, appointment);
        Ok(())
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> ScheduleResult<Vec<Appointment>> {
        let appointments = self.appointments.lock().await;
        let mut matched: Vec<Appointment> =
            appointments.values().filter(|a| filter.matches(a)).cloned().collect();
        sort_appointments(&mut matched);
        Ok(matched)
    }

    async fn find_record(&self, id: &Uuid) -> ScheduleResult<Option<MedicalRecord>> {
        let records = self.records.lock().await;
        Ok(records.get(id).cloned())
    }

    async fn insert_record(&self, record: MedicalRecord) -> ScheduleResult<()> {
        let mut records = self.records.lock().await;
        records.insert(record.id, record);
        Ok(())
    }

    async fn list_records(&self, filter: &RecordFilter) -> ScheduleResult<Vec<MedicalRecord>> {
        let records = self.records.lock().await;
        let mut matched: Vec<MedicalRecord> =
            records.values().filter(|r| filter.matches(r)).cloned().collect();
        sort_records(&mut matched);
        Ok(matched)
    }

    async fn flush(&self) -> ScheduleResult<()> {
        Ok(())
    }

    async fn close(&self) -> ScheduleResult<()> {
        info!("InMemoryStore closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use models::medical::{AppointmentStatus, DoctorStatus, PatientStatus};
    use models::schedule::WeeklySchedule;

    fn doctor(last_name: &str) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: last_name.to_string(),
            license_number: "LIC-1".to_string(),
            specialties: vec!["cardiology".to_string()],
            phone: None,
            email: None,
            schedule: WeeklySchedule::default(),
            status: DoctorStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn appointment(doctor_id: Uuid, hour: u32, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id: Uuid::new_v4(),
            date_time: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
            duration_minutes: 30,
            status,
            reason: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: None,
            cancelled_at: None,
        }
    }

    #[tokio::test]
    async fn should_round_trip_doctor_documents() {
        let store = InMemoryStore::new();
        let doc = doctor("Reyes");
        store.insert_doctor(doc.clone()).await.unwrap();
        assert_eq!(store.find_doctor(&doc.id).await.unwrap(), Some(doc.clone()));

        let mut updated = doc.clone();
        updated.status = DoctorStatus::Vacation;
        store.update_doctor(updated.clone()).await.unwrap();
        assert_eq!(store.find_doctor(&doc.id).await.unwrap().unwrap().status, DoctorStatus::Vacation);
    }

    #[tokio::test]
    async fn should_fail_update_for_missing_document() {
        let store = InMemoryStore::new();
        let err = store.update_doctor(doctor("Nadie")).await.unwrap_err();
        assert_eq!(err, ScheduleError::NotFound("doctor".to_string()));
    }

    #[tokio::test]
    async fn should_filter_appointments_by_doctor_and_status() {
        let store = InMemoryStore::new();
        let doc_id = Uuid::new_v4();
        store.insert_appointment(appointment(doc_id, 10, AppointmentStatus::Scheduled)).await.unwrap();
        store.insert_appointment(appointment(doc_id, 9, AppointmentStatus::Cancelled)).await.unwrap();
        store.insert_appointment(appointment(Uuid::new_v4(), 11, AppointmentStatus::Scheduled)).await.unwrap();

        let blocking = store
            .list_appointments(&AppointmentFilter::for_doctor(doc_id).blocking())
            .await
            .unwrap();
        assert_eq!(blocking.len(), 1);
        assert_eq!(blocking[0].date_time.format("%H:%M").to_string(), "10:00");

        let all_for_doctor = store
            .list_appointments(&AppointmentFilter::for_doctor(doc_id))
            .await
            .unwrap();
        // sorted by date_time: 09:00 cancelled first
        assert_eq!(all_for_doctor.len(), 2);
        assert_eq!(all_for_doctor[0].status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn should_sort_doctors_by_last_name() {
        let store = InMemoryStore::new();
        store.insert_doctor(doctor("Zamora")).await.unwrap();
        store.insert_doctor(doctor("Alvarez")).await.unwrap();
        let listed = store.list_doctors(&DoctorFilter::default()).await.unwrap();
        assert_eq!(listed[0].last_name, "Alvarez");
        assert_eq!(listed[1].last_name, "Zamora");
    }

    #[tokio::test]
    async fn should_filter_patients_by_status() {
        let store = InMemoryStore::new();
        let mut active = Patient {
            id: Uuid::new_v4(),
            first_name: "Luz".to_string(),
            last_name: "Marin".to_string(),
            date_of_birth: None,
            phone: None,
            email: None,
            status: PatientStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        };
        store.insert_patient(active.clone()).await.unwrap();
        active.id = Uuid::new_v4();
        active.status = PatientStatus::Inactive;
        store.insert_patient(active).await.unwrap();

        let filter = PatientFilter { status: Some(PatientStatus::Active) };
        assert_eq!(store.list_patients(&filter).await.unwrap().len(), 1);
    }
}

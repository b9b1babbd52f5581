// scheduling/src/directory.rs
//! Doctor and patient lifecycle: registration, profile updates, soft
//! deletion, listings, and per-status counts. Reads go through the profile
//! cache; every write invalidates the touched entry.

use std::collections::BTreeMap;
use std::sync::Arc;

use caching::ProfileCache;
use chrono::Utc;
use log::{info, warn};
use models::errors::{ScheduleError, ScheduleResult, ValidationError};
use models::medical::{Doctor, DoctorStatus, Patient, PatientStatus};
use models::schedule::WeeklySchedule;
use serde::Serialize;
use storage::{AppointmentFilter, DoctorFilter, PatientFilter, RecordStore};
use uuid::Uuid;

const PROFILE_CACHE_CAPACITY: u64 = 4_096;

#[derive(Debug, Clone, Default)]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub specialties: Vec<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub schedule: Option<WeeklySchedule>,
}

#[derive(Debug, Clone, Default)]
pub struct DoctorUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub schedule: Option<WeeklySchedule>,
    pub status: Option<DoctorStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Counts by status for a collection, as returned by the stats queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}

pub struct DirectoryService {
    store: Arc<dyn RecordStore>,
    cache: ProfileCache,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        DirectoryService {
            store,
            cache: ProfileCache::new(PROFILE_CACHE_CAPACITY),
        }
    }

    fn require_field(value: &str, name: &str) -> ScheduleResult<()> {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(name.to_string()).into());
        }
        Ok(())
    }

    // =========================================================================
    // DOCTORS
    // =========================================================================

    pub async fn register_doctor(&self, new_doctor: NewDoctor) -> ScheduleResult<Doctor> {
        Self::require_field(&new_doctor.first_name, "first_name")?;
        Self::require_field(&new_doctor.last_name, "last_name")?;
        Self::require_field(&new_doctor.license_number, "license_number")?;

        let schedule = new_doctor.schedule.unwrap_or_default();
        schedule.validate()?;

        let doctor = Doctor {
            id: Uuid::new_v4(),
            first_name: new_doctor.first_name,
            last_name: new_doctor.last_name,
            license_number: new_doctor.license_number,
            specialties: new_doctor.specialties,
            phone: new_doctor.phone,
            email: new_doctor.email,
            schedule,
            status: DoctorStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.store.insert_doctor(doctor.clone()).await?;
        info!("Registered doctor {} ({})", doctor.id, doctor.full_name());
        Ok(doctor)
    }

    pub async fn find_doctor(&self, id: &Uuid) -> ScheduleResult<Doctor> {
        if let Some(cached) = self.cache.get(id).await {
            if let Ok(doctor) = serde_json::from_value::<Doctor>(cached) {
                return Ok(doctor);
            }
            // stale or foreign entry under this id; fall through to the store
            self.cache.invalidate(id).await;
        }

        let doctor = self
            .store
            .find_doctor(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("doctor".to_string()))?;
        let _ = self.cache.insert(doctor.id, serde_json::to_value(&doctor)?).await;
        Ok(doctor)
    }

    pub async fn update_doctor(&self, id: &Uuid, update: DoctorUpdate) -> ScheduleResult<Doctor> {
        let mut doctor = self
            .store
            .find_doctor(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("doctor".to_string()))?;

        if let Some(first_name) = update.first_name {
            Self::require_field(&first_name, "first_name")?;
            doctor.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            Self::require_field(&last_name, "last_name")?;
            doctor.last_name = last_name;
        }
        if let Some(specialties) = update.specialties {
            doctor.specialties = specialties;
        }
        if let Some(phone) = update.phone {
            doctor.phone = Some(phone);
        }
        if let Some(email) = update.email {
            doctor.email = Some(email);
        }
        if let Some(schedule) = update.schedule {
            schedule.validate()?;
            doctor.schedule = schedule;
        }
        if let Some(status) = update.status {
            doctor.status = status;
        }
        doctor.updated_at = Some(Utc::now());

        self.store.update_doctor(doctor.clone()).await?;
        self.cache.invalidate(id).await;
        Ok(doctor)
    }

    /// Soft delete: the doctor stays on file so history keeps resolving.
    pub async fn deactivate_doctor(&self, id: &Uuid) -> ScheduleResult<Doctor> {
        let updated = self
            .update_doctor(
                id,
                DoctorUpdate {
                    status: Some(DoctorStatus::Inactive),
                    ..Default::default()
                },
            )
            .await?;
        info!("Deactivated doctor {}", id);
        Ok(updated)
    }

    pub async fn list_doctors(&self, filter: &DoctorFilter) -> ScheduleResult<Vec<Doctor>> {
        self.store.list_doctors(filter).await
    }

    pub async fn doctor_stats(&self) -> ScheduleResult<DirectoryStats> {
        let doctors = self.store.list_doctors(&DoctorFilter::default()).await?;
        let mut by_status = BTreeMap::new();
        for doctor in &doctors {
            *by_status.entry(doctor.status.to_string()).or_insert(0) += 1;
        }
        Ok(DirectoryStats {
            total: doctors.len(),
            by_status,
        })
    }

    // =========================================================================
    // PATIENTS
    // =========================================================================

    pub async fn register_patient(&self, new_patient: NewPatient) -> ScheduleResult<Patient> {
        Self::require_field(&new_patient.first_name, "first_name")?;
        Self::require_field(&new_patient.last_name, "last_name")?;

        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: new_patient.first_name,
            last_name: new_patient.last_name,
            date_of_birth: new_patient.date_of_birth,
            phone: new_patient.phone,
            email: new_patient.email,
            status: PatientStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.store.insert_patient(patient.clone()).await?;
        info!("Registered patient {} ({})", patient.id, patient.full_name());
        Ok(patient)
    }

    pub async fn find_patient(&self, id: &Uuid) -> ScheduleResult<Patient> {
        if let Some(cached) = self.cache.get(id).await {
            if let Ok(patient) = serde_json::from_value::<Patient>(cached) {
                return Ok(patient);
            }
            self.cache.invalidate(id).await;
        }

        let patient = self
            .store
            .find_patient(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("patient".to_string()))?;
        let _ = self.cache.insert(patient.id, serde_json::to_value(&patient)?).await;
        Ok(patient)
    }

    pub async fn update_patient(&self, id: &Uuid, update: PatientUpdate) -> ScheduleResult<Patient> {
        let mut patient = self
            .store
            .find_patient(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("patient".to_string()))?;

        if let Some(first_name) = update.first_name {
            Self::require_field(&first_name, "first_name")?;
            patient.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            Self::require_field(&last_name, "last_name")?;
            patient.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            patient.phone = Some(phone);
        }
        if let Some(email) = update.email {
            patient.email = Some(email);
        }
        patient.updated_at = Some(Utc::now());

        self.store.update_patient(patient.clone()).await?;
        self.cache.invalidate(id).await;
        Ok(patient)
    }

    /// Soft delete, refused while the patient still has upcoming
    /// appointments that hold a slot.
    pub async fn deactivate_patient(&self, id: &Uuid) -> ScheduleResult<Patient> {
        let mut patient = self
            .store
            .find_patient(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("patient".to_string()))?;

        let mut upcoming = AppointmentFilter::for_patient(*id).blocking();
        upcoming.from = Some(Utc::now());
        if !self.store.list_appointments(&upcoming).await?.is_empty() {
            warn!("Refused to deactivate patient {} with upcoming appointments", id);
            return Err(ScheduleError::UpcomingAppointments);
        }

        patient.status = PatientStatus::Inactive;
        patient.updated_at = Some(Utc::now());
        self.store.update_patient(patient.clone()).await?;
        self.cache.invalidate(id).await;
        info!("Deactivated patient {}", id);
        Ok(patient)
    }

    pub async fn list_patients(&self, filter: &PatientFilter) -> ScheduleResult<Vec<Patient>> {
        self.store.list_patients(filter).await
    }

    pub async fn patient_stats(&self) -> ScheduleResult<DirectoryStats> {
        let patients = self.store.list_patients(&PatientFilter::default()).await?;
        let mut by_status = BTreeMap::new();
        for patient in &patients {
            *by_status.entry(patient.status.to_string()).or_insert(0) += 1;
        }
        Ok(DirectoryStats {
            total: patients.len(),
            by_status,
        })
    }
}

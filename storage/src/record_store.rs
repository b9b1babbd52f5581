// storage/src/record_store.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use models::errors::ScheduleResult;
use models::medical::{Appointment, AppointmentStatus, Doctor, DoctorStatus, MedicalRecord, Patient, PatientStatus};
use uuid::Uuid;

/// Query filter for appointment listings. Every field is optional; an
/// empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status_in: Option<Vec<AppointmentStatus>>,
    /// Inclusive lower bound on `date_time`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `date_time`.
    pub until: Option<DateTime<Utc>>,
}

impl AppointmentFilter {
    pub fn for_doctor(doctor_id: Uuid) -> Self {
        AppointmentFilter {
            doctor_id: Some(doctor_id),
            ..Default::default()
        }
    }

    pub fn for_patient(patient_id: Uuid) -> Self {
        AppointmentFilter {
            patient_id: Some(patient_id),
            ..Default::default()
        }
    }

    pub fn blocking(mut self) -> Self {
        self.status_in = Some(AppointmentStatus::BLOCKING.to_vec());
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(doctor_id) = self.doctor_id {
            if appointment.doctor_id != doctor_id {
                return false;
            }
        }
        if let Some(patient_id) = self.patient_id {
            if appointment.patient_id != patient_id {
                return false;
            }
        }
        if let Some(ref statuses) = self.status_in {
            if !statuses.contains(&appointment.status) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if appointment.date_time < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if appointment.date_time >= until {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorFilter {
    pub specialty: Option<String>,
    pub status: Option<DoctorStatus>,
}

impl DoctorFilter {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        if let Some(ref specialty) = self.specialty {
            if !doctor.specialties.iter().any(|s| s.eq_ignore_ascii_case(specialty)) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if doctor.status != status {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientFilter {
    pub status: Option<PatientStatus>,
}

impl PatientFilter {
    pub fn matches(&self, patient: &Patient) -> bool {
        match self.status {
            Some(status) => patient.status == status,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

impl RecordFilter {
    pub fn for_patient(patient_id: Uuid) -> Self {
        RecordFilter {
            patient_id: Some(patient_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, record: &MedicalRecord) -> bool {
        if let Some(doctor_id) = self.doctor_id {
            if record.doctor_id != doctor_id {
                return false;
            }
        }
        if let Some(patient_id) = self.patient_id {
            if record.patient_id != patient_id {
                return false;
            }
        }
        true
    }
}

/// The record store gateway the scheduling services are built against.
///
/// Updates are whole-document writes keyed by id and fail with `NotFound`
/// when the id is absent. List operations return a deterministic order:
/// appointments by `date_time`, doctors and patients by last name, records
/// newest first.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_doctor(&self, id: &Uuid) -> ScheduleResult<Option<Doctor>>;
    async fn insert_doctor(&self, doctor: Doctor) -> ScheduleResult<()>;
    async fn update_doctor(&self, doctor: Doctor) -> ScheduleResult<()>;
    async fn list_doctors(&self, filter: &DoctorFilter) -> ScheduleResult<Vec<Doctor>>;

    async fn find_patient(&self, id: &Uuid) -> ScheduleResult<Option<Patient>>;
    async fn insert_patient(&self, patient: Patient) -> ScheduleResult<()>;
    async fn update_patient(&self, patient: Patient) -> ScheduleResult<()>;
    async fn list_patients(&self, filter: &PatientFilter) -> ScheduleResult<Vec<Patient>>;

    async fn find_appointment(&self, id: &Uuid) -> ScheduleResult<Option<Appointment>>;
    async fn insert_appointment(&self, appointment: Appointment) -> ScheduleResult<()>;
    async fn update_appointment(&self, appointment: Appointment) -> ScheduleResult<()>;
    async fn list_appointments(&self, filter: &AppointmentFilter) -> ScheduleResult<Vec<Appointment>>;

    async fn find_record(&self, id: &Uuid) -> ScheduleResult<Option<MedicalRecord>>;
    async fn insert_record(&self, record: MedicalRecord) -> ScheduleResult<()>;
    async fn list_records(&self, filter: &RecordFilter) -> ScheduleResult<Vec<MedicalRecord>>;

    async fn flush(&self) -> ScheduleResult<()>;
    async fn close(&self) -> ScheduleResult<()>;
}

pub(crate) fn sort_appointments(appointments: &mut Vec<Appointment>) {
    appointments.sort_by_key(|a| a.date_time);
}

pub(crate) fn sort_doctors(doctors: &mut Vec<Doctor>) {
    doctors.sort_by(|a, b| {
        (a.last_name.as_str(), a.first_name.as_str()).cmp(&(b.last_name.as_str(), b.first_name.as_str()))
    });
}

pub(crate) fn sort_patients(patients: &mut Vec<Patient>) {
    patients.sort_by(|a, b| {
        (a.last_name.as_str(), a.first_name.as_str()).cmp(&(b.last_name.as_str(), b.first_name.as_str()))
    });
}

pub(crate) fn sort_records(records: &mut Vec<MedicalRecord>) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

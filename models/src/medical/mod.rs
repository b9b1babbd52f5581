// models/src/medical/mod.rs

pub mod appointment;
pub mod doctor;
pub mod medical_record;
pub mod patient;

pub use appointment::{Appointment, AppointmentStatus};
pub use doctor::{Doctor, DoctorStatus};
pub use medical_record::{MedicalRecord, PrescriptionEntry, VitalSigns};
pub use patient::{Patient, PatientStatus};

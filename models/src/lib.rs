// models/src/lib.rs

// Declare all top-level modules within the 'models' crate
pub mod errors;
pub mod schedule;

// Declare the 'medical' sub-module
pub mod medical;

// Re-export common core types for convenience when other crates use 'models::*'
pub use errors::{ScheduleError, ScheduleResult, ValidationError};
pub use schedule::{Weekday, WeeklySchedule};
pub use medical::{Appointment, AppointmentStatus, Doctor, DoctorStatus, MedicalRecord, Patient, PatientStatus};

// scheduling/src/lib.rs

// Declare all top-level modules within the 'scheduling' crate
pub mod availability;
pub mod conflict;
pub mod directory;
pub mod policy;
pub mod records;
pub mod scheduler;

// Re-export the service surface callers actually use
pub use availability::{available_slots, SLOT_MINUTES};
pub use conflict::{find_conflict, has_conflict};
pub use directory::{DirectoryService, DirectoryStats, DoctorUpdate, NewDoctor, NewPatient, PatientUpdate};
pub use policy::{is_allowed, Action, Role};
pub use records::{NewMedicalRecord, RecordsService};
pub use scheduler::{AppointmentScheduler, NewAppointment};

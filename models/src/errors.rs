use std::io;
pub use thiserror::Error;
use serde::{Serialize, Deserialize};
use serde_json::Error as SerdeJsonError;

use crate::schedule::Weekday;

/// Typed outcome of every scheduling, directory, and records operation.
///
/// Business rejections and infrastructure faults share this enum but are
/// never conflated: `StorageUnavailable` is the only transient kind, and
/// callers can branch on [`ScheduleError::is_business`] to tell "you cannot
/// book this" apart from "the store is down".
#[derive(Debug, Serialize, Deserialize, Error, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} is not active")]
    InactiveEntity(String),
    #[error("the doctor does not work on {0}")]
    OutsideWorkingDay(Weekday),
    #[error("outside working hours ({start} to {end})")]
    OutsideWorkingHours { start: String, end: String },
    #[error("the doctor already has an appointment in that interval")]
    DoctorConflict,
    #[error("the patient already has an appointment in that interval")]
    PatientConflict,
    #[error("the appointment is already cancelled")]
    AlreadyCancelled,
    #[error("a completed appointment cannot be cancelled")]
    AlreadyCompleted,
    #[error("appointments require at least 24 hours notice to cancel")]
    LeadTimeViolation,
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("the patient still has upcoming appointments")]
    UpcomingAppointments,
    #[error("medical records are append-only and cannot be changed")]
    RecordImmutable,
    #[error("validation error: {0}")]
    Validation(ValidationError),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ScheduleError {
    /// True for business-rule rejections, false for infrastructure faults.
    pub fn is_business(&self) -> bool {
        !matches!(self, ScheduleError::StorageUnavailable(_))
    }
}

impl From<ValidationError> for ScheduleError {
    fn from(err: ValidationError) -> Self {
        ScheduleError::Validation(err)
    }
}

impl From<SerdeJsonError> for ScheduleError {
    fn from(err: SerdeJsonError) -> Self {
        ScheduleError::StorageUnavailable(format!("JSON serialization error: {}", err))
    }
}

impl From<io::Error> for ScheduleError {
    fn from(err: io::Error) -> Self {
        ScheduleError::StorageUnavailable(format!("IO error: {}", err))
    }
}

#[cfg(feature = "sled-errors")]
impl From<sled::Error> for ScheduleError {
    fn from(err: sled::Error) -> Self {
        ScheduleError::StorageUnavailable(format!("Sled error: {}", err))
    }
}

#[derive(Debug, Serialize, Deserialize, Error, PartialEq, Clone)]
pub enum ValidationError {
    #[error("required field {0} is missing or empty")]
    MissingField(String),
    #[error("invalid value '{1}' for {0}")]
    InvalidValue(String, String),
    #[error("invalid time window: start {0} is not before end {1}")]
    InvalidTimeWindow(String, String),
    #[error("invalid weekday name: {0}")]
    InvalidWeekday(String),
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("duration must be positive, got {0}")]
    InvalidDuration(i32),
}

/// A type alias for a `Result` that returns a `ScheduleError` on failure.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

// scheduling/src/policy.rs
//! The authorization table consulted by callers before dispatching to the
//! services. Scheduling itself stays role-agnostic: it enforces domain
//! invariants, and this table decides who may ask for what.

use std::fmt;
use std::str::FromStr;

use models::errors::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Receptionist,
    Patient,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Receptionist => "receptionist",
            Role::Patient => "patient",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "receptionist" => Ok(Role::Receptionist),
            "patient" => Ok(Role::Patient),
            other => Err(ValidationError::InvalidValue("role".to_string(), other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ScheduleAppointment,
    CancelAppointment,
    ChangeAppointmentStatus,
    ViewAppointments,
    ViewAvailability,
    ManageDoctors,
    ManagePatients,
    CreateMedicalRecord,
    ViewMedicalRecords,
}

/// Whether `role` may perform `action`. Identity-level checks (a patient
/// seeing only their own chart, a doctor editing only their own profile)
/// belong to the calling layer; this table is role-granular only.
pub fn is_allowed(role: Role, action: Action) -> bool {
    use Action::*;
    match role {
        Role::Admin => true,
        Role::Doctor => matches!(
            action,
            ScheduleAppointment
                | CancelAppointment
                | ChangeAppointmentStatus
                | ViewAppointments
                | ViewAvailability
                | CreateMedicalRecord
                | ViewMedicalRecords
        ),
        Role::Receptionist => matches!(
            action,
            ScheduleAppointment
                | CancelAppointment
                | ChangeAppointmentStatus
                | ViewAppointments
                | ViewAvailability
                | ManagePatients
        ),
        Role::Patient => matches!(
            action,
            ScheduleAppointment | CancelAppointment | ViewAppointments | ViewAvailability
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::Action::*;
    use super::*;

    #[test]
    fn should_let_admin_do_everything() {
        for action in [
            ScheduleAppointment,
            CancelAppointment,
            ChangeAppointmentStatus,
            ViewAppointments,
            ViewAvailability,
            ManageDoctors,
            ManagePatients,
            CreateMedicalRecord,
            ViewMedicalRecords,
        ] {
            assert!(is_allowed(Role::Admin, action));
        }
    }

    #[test]
    fn should_restrict_record_creation_to_doctor_and_admin() {
        assert!(is_allowed(Role::Doctor, CreateMedicalRecord));
        assert!(!is_allowed(Role::Receptionist, CreateMedicalRecord));
        assert!(!is_allowed(Role::Patient, CreateMedicalRecord));
    }

    #[test]
    fn should_keep_directory_management_away_from_care_roles() {
        assert!(!is_allowed(Role::Doctor, ManageDoctors));
        assert!(!is_allowed(Role::Patient, ManagePatients));
        assert!(is_allowed(Role::Receptionist, ManagePatients));
        assert!(!is_allowed(Role::Receptionist, ManageDoctors));
    }

    #[test]
    fn should_let_patients_book_and_cancel_but_not_transition() {
        assert!(is_allowed(Role::Patient, ScheduleAppointment));
        assert!(is_allowed(Role::Patient, CancelAppointment));
        assert!(!is_allowed(Role::Patient, ChangeAppointmentStatus));
        assert!(!is_allowed(Role::Patient, ViewMedicalRecords));
    }

    #[test]
    fn should_parse_roles() {
        use std::str::FromStr;
        assert_eq!(Role::from_str("Admin").unwrap(), Role::Admin);
        assert!(Role::from_str("nurse").is_err());
    }
}

// scheduling/src/conflict.rs
//! Conflict detection between a proposed time interval and an entity's
//! existing appointments. Pure functions, deterministic over the given
//! appointment set; callers decide which entity's appointments to pass.

use chrono::{DateTime, Utc};
use models::medical::Appointment;

/// Returns the first existing appointment that overlaps the proposed
/// half-open interval `[start, end)`.
///
/// An appointment counts only while it holds its slot (status scheduled or
/// confirmed); completed, cancelled, and no-show appointments never block.
/// The overlap test is the standard half-open one, so back-to-back
/// appointments (one ending exactly when the next starts) do not conflict.
pub fn find_conflict<'a>(
    existing: &'a [Appointment],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<&'a Appointment> {
    existing
        .iter()
        .find(|a| a.status.blocks_schedule() && a.date_time < end && a.end_time() > start)
}

/// Boolean form of [`find_conflict`].
pub fn has_conflict(existing: &[Appointment], start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    find_conflict(existing, start, end).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use models::medical::AppointmentStatus;
    use uuid::Uuid;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
    }

    fn appointment(start: DateTime<Utc>, minutes: i32, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            date_time: start,
            duration_minutes: minutes,
            status,
            reason: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn should_detect_partial_overlap() {
        let existing = vec![appointment(at(10, 0), 30, AppointmentStatus::Scheduled)];
        // [10:15, 10:45) overlaps [10:00, 10:30)
        assert!(has_conflict(&existing, at(10, 15), at(10, 45)));
        // [09:45, 10:15) overlaps from the other side
        assert!(has_conflict(&existing, at(9, 45), at(10, 15)));
        // proposal fully containing the existing appointment
        assert!(has_conflict(&existing, at(9, 30), at(11, 0)));
    }

    #[test]
    fn should_not_flag_back_to_back_intervals() {
        let existing = vec![appointment(at(10, 0), 30, AppointmentStatus::Confirmed)];
        assert!(!has_conflict(&existing, at(10, 30), at(11, 0)));
        assert!(!has_conflict(&existing, at(9, 30), at(10, 0)));
    }

    #[test]
    fn should_ignore_non_blocking_statuses() {
        let existing = vec![
            appointment(at(10, 0), 30, AppointmentStatus::Cancelled),
            appointment(at(10, 0), 30, AppointmentStatus::Completed),
            appointment(at(10, 0), 30, AppointmentStatus::NoShow),
        ];
        assert!(!has_conflict(&existing, at(10, 0), at(10, 30)));
    }

    #[test]
    fn should_return_the_conflicting_appointment() {
        let blocker = appointment(at(11, 0), 45, AppointmentStatus::Scheduled);
        let existing = vec![
            appointment(at(9, 0), 30, AppointmentStatus::Scheduled),
            blocker.clone(),
        ];
        let hit = find_conflict(&existing, at(11, 30), at(11, 30) + Duration::minutes(30)).unwrap();
        assert_eq!(hit.id, blocker.id);
    }
}

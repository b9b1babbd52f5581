// scheduling/src/scheduler.rs
//! The appointment scheduler: validates and applies every booking,
//! cancellation, and status change against the current persisted state.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, info, warn};
use models::errors::{ScheduleError, ScheduleResult, ValidationError};
use models::medical::appointment::DEFAULT_DURATION_MINUTES;
use models::medical::{Appointment, AppointmentStatus};
use models::schedule::Weekday;
use storage::{AppointmentFilter, RecordStore};
use tokio::sync::Mutex as TokioMutex;
use uuid::Uuid;

use crate::availability;
use crate::conflict::find_conflict;

pub const CANCELLATION_LEAD_TIME_HOURS: i64 = 24;

/// Booking request. Duration defaults to the standard 30-minute slot.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date_time: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub reason: Option<String>,
}

/// Orchestrates availability, conflict detection, and persistence.
///
/// The store is injected at construction; the scheduler holds no other
/// state except the write gate. The gate is a single-writer serialization
/// point: conflict re-check and insert happen under it, so two racing
/// bookings for overlapping intervals can never both land. The second one
/// re-reads the store after the first committed and is rejected.
pub struct AppointmentScheduler {
    store: Arc<dyn RecordStore>,
    write_gate: TokioMutex<()>,
}

impl AppointmentScheduler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        AppointmentScheduler {
            store,
            write_gate: TokioMutex::new(()),
        }
    }

    /// Books a new appointment. Checks run in a fixed order: doctor, then
    /// patient, then working day, then working hours, then doctor and
    /// patient conflicts; the first failure wins.
    pub async fn schedule(&self, request: NewAppointment) -> ScheduleResult<Appointment> {
        let duration_minutes = request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if duration_minutes <= 0 {
            return Err(ValidationError::InvalidDuration(duration_minutes).into());
        }

        let doctor = self
            .store
            .find_doctor(&request.doctor_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("doctor".to_string()))?;
        if !doctor.is_active() {
            return Err(ScheduleError::InactiveEntity("doctor".to_string()));
        }

        let patient = self
            .store
            .find_patient(&request.patient_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("patient".to_string()))?;
        if !patient.is_active() {
            return Err(ScheduleError::InactiveEntity("patient".to_string()));
        }

        let day = Weekday::of(request.date_time.date_naive());
        if !doctor.schedule.works_on(day) {
            return Err(ScheduleError::OutsideWorkingDay(day));
        }
        if !doctor.schedule.admits(request.date_time.time()) {
            return Err(ScheduleError::OutsideWorkingHours {
                start: doctor.schedule.start_time.format("%H:%M").to_string(),
                end: doctor.schedule.end_time.format("%H:%M").to_string(),
            });
        }

        let start = request.date_time;
        let end = start + Duration::minutes(duration_minutes as i64);

        // Conflict checks and insert form one critical section; everything
        // read inside reflects the latest committed bookings.
        let _gate = self.write_gate.lock().await;

        let doctor_appointments = self
            .store
            .list_appointments(&AppointmentFilter::for_doctor(doctor.id).blocking())
            .await?;
        if let Some(hit) = find_conflict(&doctor_appointments, start, end) {
            debug!("Doctor {} conflict against appointment {}", doctor.id, hit.id);
            return Err(ScheduleError::DoctorConflict);
        }

        let patient_appointments = self
            .store
            .list_appointments(&AppointmentFilter::for_patient(patient.id).blocking())
            .await?;
        if let Some(hit) = find_conflict(&patient_appointments, start, end) {
            debug!("Patient {} conflict against appointment {}", patient.id, hit.id);
            return Err(ScheduleError::PatientConflict);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            patient_id: patient.id,
            date_time: start,
            duration_minutes,
            status: AppointmentStatus::Scheduled,
            reason: request.reason,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: None,
            cancelled_at: None,
        };
        self.store.insert_appointment(appointment.clone()).await?;
        info!(
            "Scheduled appointment {} for doctor {} at {}",
            appointment.id, appointment.doctor_id, appointment.date_time
        );
        Ok(appointment)
    }

    /// Cancels an appointment with the required lead time.
    ///
    /// The check order is fixed: not-found, then terminal-state errors,
    /// then lead time. Appointments closer than 24 hours to their start
    /// stay booked no matter what their status is.
    pub async fn cancel(&self, id: &Uuid, reason: Option<String>) -> ScheduleResult<Appointment> {
        let mut appointment = self
            .store
            .find_appointment(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("appointment".to_string()))?;

        match appointment.status {
            AppointmentStatus::Cancelled => return Err(ScheduleError::AlreadyCancelled),
            AppointmentStatus::Completed => return Err(ScheduleError::AlreadyCompleted),
            _ => {}
        }

        if appointment.date_time - Utc::now() < Duration::hours(CANCELLATION_LEAD_TIME_HOURS) {
            warn!("Rejected late cancellation of appointment {}", id);
            return Err(ScheduleError::LeadTimeViolation);
        }

        let now = Utc::now();
        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancellation_reason = reason;
        appointment.cancelled_at = Some(now);
        appointment.updated_at = Some(now);
        self.store.update_appointment(appointment.clone()).await?;
        info!("Cancelled appointment {}", id);
        Ok(appointment)
    }

    /// Applies a status transition.
    ///
    /// Re-asserting the current status is a no-op success that only
    /// refreshes `updated_at`. Moving to `cancelled` goes through the full
    /// cancellation path, lead time included. Every other change must be
    /// legal under the appointment state machine.
    pub async fn change_status(
        &self,
        id: &Uuid,
        new_status: AppointmentStatus,
        reason: Option<String>,
    ) -> ScheduleResult<Appointment> {
        let mut appointment = self
            .store
            .find_appointment(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("appointment".to_string()))?;

        if appointment.status == new_status {
            appointment.updated_at = Some(Utc::now());
            self.store.update_appointment(appointment.clone()).await?;
            return Ok(appointment);
        }

        if new_status == AppointmentStatus::Cancelled {
            return self.cancel(id, reason).await;
        }

        if !appointment.status.can_transition_to(new_status) {
            return Err(ScheduleError::InvalidStatus(format!(
                "cannot move a {} appointment to {}",
                appointment.status, new_status
            )));
        }

        appointment.status = new_status;
        appointment.updated_at = Some(Utc::now());
        self.store.update_appointment(appointment.clone()).await?;
        info!("Appointment {} moved to {}", id, new_status);
        Ok(appointment)
    }

    /// Bookable 30-minute slots for a doctor on a calendar date.
    pub async fn available_slots(
        &self,
        doctor_id: &Uuid,
        date: NaiveDate,
    ) -> ScheduleResult<Vec<DateTime<Utc>>> {
        let doctor = self
            .store
            .find_doctor(doctor_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("doctor".to_string()))?;
        let existing = self
            .store
            .list_appointments(&AppointmentFilter::for_doctor(doctor.id).blocking())
            .await?;
        Ok(availability::available_slots(&doctor.schedule, date, &existing))
    }

    /// Appointment listing, sorted by start time.
    pub async fn list(&self, filter: &AppointmentFilter) -> ScheduleResult<Vec<Appointment>> {
        self.store.list_appointments(filter).await
    }

    pub async fn find(&self, id: &Uuid) -> ScheduleResult<Appointment> {
        self.store
            .find_appointment(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("appointment".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use models::medical::{Doctor, DoctorStatus, Patient, PatientStatus};
    use models::schedule::{Weekday, WeeklySchedule};
    use storage::InMemoryStore;

    fn doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            first_name: "Carmen".to_string(),
            last_name: "Ruiz".to_string(),
            license_number: "LIC-1001".to_string(),
            specialties: vec!["general".to_string()],
            phone: None,
            email: None,
            schedule: WeeklySchedule::default(),
            status: DoctorStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            first_name: "Diego".to_string(),
            last_name: "Soto".to_string(),
            date_of_birth: None,
            phone: None,
            email: None,
            status: PatientStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    async fn setup() -> (Arc<InMemoryStore>, AppointmentScheduler, Doctor, Patient) {
        let store = Arc::new(InMemoryStore::new());
        let doc = doctor();
        let pat = patient();
        store.insert_doctor(doc.clone()).await.unwrap();
        store.insert_patient(pat.clone()).await.unwrap();
        let scheduler = AppointmentScheduler::new(store.clone());
        (store, scheduler, doc, pat)
    }

    // Monday 2024-01-15 inside default working hours
    fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
    }

    fn request(doc: &Doctor, pat: &Patient, at: DateTime<Utc>) -> NewAppointment {
        NewAppointment {
            doctor_id: doc.id,
            patient_id: pat.id,
            date_time: at,
            duration_minutes: None,
            reason: Some("checkup".to_string()),
        }
    }

    #[tokio::test]
    async fn should_schedule_and_persist_with_defaults() {
        let (store, scheduler, doc, pat) = setup().await;
        let created = scheduler.schedule(request(&doc, &pat, monday_at(10, 0))).await.unwrap();

        assert_eq!(created.status, AppointmentStatus::Scheduled);
        assert_eq!(created.duration_minutes, 30);
        let stored = store.find_appointment(&created.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn should_reject_missing_and_inactive_doctor() {
        let (store, scheduler, doc, pat) = setup().await;

        let mut req = request(&doc, &pat, monday_at(10, 0));
        req.doctor_id = Uuid::new_v4();
        assert_eq!(
            scheduler.schedule(req).await.unwrap_err(),
            ScheduleError::NotFound("doctor".to_string())
        );

        let mut on_vacation = doc.clone();
        on_vacation.status = DoctorStatus::Vacation;
        store.update_doctor(on_vacation).await.unwrap();
        assert_eq!(
            scheduler.schedule(request(&doc, &pat, monday_at(10, 0))).await.unwrap_err(),
            ScheduleError::InactiveEntity("doctor".to_string())
        );
    }

    #[tokio::test]
    async fn should_reject_missing_and_inactive_patient() {
        let (store, scheduler, doc, pat) = setup().await;

        let mut req = request(&doc, &pat, monday_at(10, 0));
        req.patient_id = Uuid::new_v4();
        assert_eq!(
            scheduler.schedule(req).await.unwrap_err(),
            ScheduleError::NotFound("patient".to_string())
        );

        let mut inactive = pat.clone();
        inactive.status = PatientStatus::Inactive;
        store.update_patient(inactive).await.unwrap();
        assert_eq!(
            scheduler.schedule(request(&doc, &pat, monday_at(10, 0))).await.unwrap_err(),
            ScheduleError::InactiveEntity("patient".to_string())
        );
    }

    #[tokio::test]
    async fn should_reject_outside_working_day_and_hours() {
        let (_store, scheduler, doc, pat) = setup().await;

        // 2024-01-14 is a Sunday
        let sunday = Utc.with_ymd_and_hms(2024, 1, 14, 10, 0, 0).unwrap();
        assert_eq!(
            scheduler.schedule(request(&doc, &pat, sunday)).await.unwrap_err(),
            ScheduleError::OutsideWorkingDay(Weekday::Sunday)
        );

        assert_eq!(
            scheduler.schedule(request(&doc, &pat, monday_at(8, 30))).await.unwrap_err(),
            ScheduleError::OutsideWorkingHours {
                start: "09:00".to_string(),
                end: "17:00".to_string()
            }
        );
        assert_eq!(
            scheduler.schedule(request(&doc, &pat, monday_at(17, 30))).await.unwrap_err(),
            ScheduleError::OutsideWorkingHours {
                start: "09:00".to_string(),
                end: "17:00".to_string()
            }
        );

        // the window is closed at the end: 17:00 exactly is admitted
        assert!(scheduler.schedule(request(&doc, &pat, monday_at(17, 0))).await.is_ok());
    }

    #[tokio::test]
    async fn should_reject_overlapping_doctor_bookings() {
        let (store, scheduler, doc, pat) = setup().await;
        scheduler.schedule(request(&doc, &pat, monday_at(10, 0))).await.unwrap();

        let other = patient();
        store.insert_patient(other.clone()).await.unwrap();
        // [10:15, 10:45) overlaps [10:00, 10:30)
        assert_eq!(
            scheduler.schedule(request(&doc, &other, monday_at(10, 15))).await.unwrap_err(),
            ScheduleError::DoctorConflict
        );
        // back-to-back is fine
        assert!(scheduler.schedule(request(&doc, &other, monday_at(10, 30))).await.is_ok());
    }

    #[tokio::test]
    async fn should_reject_patient_double_booking_across_doctors() {
        let (store, scheduler, doc, pat) = setup().await;
        scheduler.schedule(request(&doc, &pat, monday_at(11, 0))).await.unwrap();

        let second_doctor = doctor();
        store.insert_doctor(second_doctor.clone()).await.unwrap();
        assert_eq!(
            scheduler.schedule(request(&second_doctor, &pat, monday_at(11, 0))).await.unwrap_err(),
            ScheduleError::PatientConflict
        );
    }

    #[tokio::test]
    async fn should_free_the_slot_once_blocking_status_clears() {
        let (_store, scheduler, doc, pat) = setup().await;
        let booked = scheduler.schedule(request(&doc, &pat, monday_at(14, 0))).await.unwrap();
        scheduler
            .change_status(&booked.id, AppointmentStatus::NoShow, None)
            .await
            .unwrap();

        assert!(scheduler.schedule(request(&doc, &pat, monday_at(14, 0))).await.is_ok());
    }

    #[tokio::test]
    async fn should_allow_exactly_one_of_two_racing_bookings() {
        let (store, scheduler, doc, pat) = setup().await;
        let other = patient();
        store.insert_patient(other.clone()).await.unwrap();
        let scheduler = Arc::new(scheduler);

        let first = {
            let scheduler = scheduler.clone();
            let req = request(&doc, &pat, monday_at(10, 0));
            tokio::spawn(async move { scheduler.schedule(req).await })
        };
        let second = {
            let scheduler = scheduler.clone();
            let req = request(&doc, &other, monday_at(10, 15));
            tokio::spawn(async move { scheduler.schedule(req).await })
        };

        let outcomes = [first.await.unwrap(), second.await.unwrap()];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(ScheduleError::DoctorConflict))));

        let persisted = store
            .list_appointments(&AppointmentFilter::for_doctor(doc.id).blocking())
            .await
            .unwrap();
        assert_eq!(persisted.len(), 1);
    }

    #[tokio::test]
    async fn should_walk_the_cancel_ladder_in_order() {
        let (store, scheduler, doc, pat) = setup().await;

        assert_eq!(
            scheduler.cancel(&Uuid::new_v4(), None).await.unwrap_err(),
            ScheduleError::NotFound("appointment".to_string())
        );

        // far enough out that lead time passes
        let far = Utc::now() + Duration::days(10);
        let mut booked = scheduler
            .schedule(NewAppointment {
                doctor_id: doc.id,
                patient_id: pat.id,
                date_time: far,
                duration_minutes: None,
                reason: None,
            })
            .await
            .ok();
        // the fixed date may fall outside working days; book directly if so
        let appointment = match booked.take() {
            Some(a) => a,
            None => {
                let a = Appointment {
                    id: Uuid::new_v4(),
                    doctor_id: doc.id,
                    patient_id: pat.id,
                    date_time: far,
                    duration_minutes: 30,
                    status: AppointmentStatus::Scheduled,
                    reason: None,
                    cancellation_reason: None,
                    created_at: Utc::now(),
                    updated_at: None,
                    cancelled_at: None,
                };
                store.insert_appointment(a.clone()).await.unwrap();
                a
            }
        };

        let cancelled = scheduler
            .cancel(&appointment.id, Some("patient request".to_string()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("patient request"));
        assert!(cancelled.cancelled_at.is_some());
        assert!(cancelled.updated_at.is_some());

        // terminal-state error outranks lead time
        assert_eq!(
            scheduler.cancel(&appointment.id, None).await.unwrap_err(),
            ScheduleError::AlreadyCancelled
        );
    }

    #[tokio::test]
    async fn should_enforce_the_24_hour_lead_time() {
        let (store, scheduler, doc, pat) = setup().await;

        let mut soon = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doc.id,
            patient_id: pat.id,
            date_time: Utc::now() + Duration::hours(23),
            duration_minutes: 30,
            status: AppointmentStatus::Scheduled,
            reason: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: None,
            cancelled_at: None,
        };
        store.insert_appointment(soon.clone()).await.unwrap();
        assert_eq!(
            scheduler.cancel(&soon.id, None).await.unwrap_err(),
            ScheduleError::LeadTimeViolation
        );

        // the same appointment moved to 25h out can be cancelled
        soon.date_time = Utc::now() + Duration::hours(25);
        store.update_appointment(soon.clone()).await.unwrap();
        assert!(scheduler.cancel(&soon.id, None).await.is_ok());
    }

    #[tokio::test]
    async fn should_check_completed_before_lead_time() {
        let (store, scheduler, doc, pat) = setup().await;

        let done = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doc.id,
            patient_id: pat.id,
            date_time: Utc::now() + Duration::hours(1),
            duration_minutes: 30,
            status: AppointmentStatus::Completed,
            reason: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: None,
            cancelled_at: None,
        };
        store.insert_appointment(done.clone()).await.unwrap();
        assert_eq!(
            scheduler.cancel(&done.id, None).await.unwrap_err(),
            ScheduleError::AlreadyCompleted
        );
    }

    #[tokio::test]
    async fn should_treat_same_status_as_a_timestamp_touch() {
        let (_store, scheduler, doc, pat) = setup().await;
        let booked = scheduler.schedule(request(&doc, &pat, monday_at(9, 0))).await.unwrap();
        assert!(booked.updated_at.is_none());

        let touched = scheduler
            .change_status(&booked.id, AppointmentStatus::Scheduled, None)
            .await
            .unwrap();
        assert_eq!(touched.status, AppointmentStatus::Scheduled);
        assert!(touched.updated_at.is_some());
        assert_eq!(touched.created_at, booked.created_at);
        assert!(touched.cancelled_at.is_none());
    }

    #[tokio::test]
    async fn should_enforce_the_state_machine_on_status_changes() {
        let (_store, scheduler, doc, pat) = setup().await;
        let booked = scheduler.schedule(request(&doc, &pat, monday_at(9, 30))).await.unwrap();

        // scheduled cannot jump straight to completed
        let err = scheduler
            .change_status(&booked.id, AppointmentStatus::Completed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidStatus(_)));

        let confirmed = scheduler
            .change_status(&booked.id, AppointmentStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        let completed = scheduler
            .change_status(&booked.id, AppointmentStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);

        // terminal: nothing further
        let err = scheduler
            .change_status(&completed.id, AppointmentStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn should_route_cancellation_through_the_lead_time_rule() {
        let (store, scheduler, doc, pat) = setup().await;

        let soon = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doc.id,
            patient_id: pat.id,
            date_time: Utc::now() + Duration::hours(2),
            duration_minutes: 30,
            status: AppointmentStatus::Confirmed,
            reason: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: None,
            cancelled_at: None,
        };
        store.insert_appointment(soon.clone()).await.unwrap();
        assert_eq!(
            scheduler
                .change_status(&soon.id, AppointmentStatus::Cancelled, Some("sick".to_string()))
                .await
                .unwrap_err(),
            ScheduleError::LeadTimeViolation
        );
    }

    #[tokio::test]
    async fn should_list_slots_for_known_doctors_only() {
        let (_store, scheduler, doc, pat) = setup().await;
        assert_eq!(
            scheduler
                .available_slots(&Uuid::new_v4(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
                .await
                .unwrap_err(),
            ScheduleError::NotFound("doctor".to_string())
        );

        scheduler.schedule(request(&doc, &pat, monday_at(10, 0))).await.unwrap();
        let slots = scheduler
            .available_slots(&doc.id, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .await
            .unwrap();
        assert_eq!(slots.len(), 15);
        assert!(!slots.contains(&monday_at(10, 0)));
    }

    #[tokio::test]
    async fn should_reject_non_positive_durations() {
        let (_store, scheduler, doc, pat) = setup().await;
        let mut req = request(&doc, &pat, monday_at(10, 0));
        req.duration_minutes = Some(0);
        assert_eq!(
            scheduler.schedule(req).await.unwrap_err(),
            ScheduleError::Validation(ValidationError::InvalidDuration(0))
        );
    }
}

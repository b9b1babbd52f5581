// scheduling/src/availability.rs
//! Computes the bookable slots for one doctor on one calendar date from
//! the recurring weekly schedule and the day's existing appointments.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use models::medical::Appointment;
use models::schedule::{Weekday, WeeklySchedule};

use crate::conflict::has_conflict;

/// Fixed slot granularity, in minutes.
pub const SLOT_MINUTES: i64 = 30;

/// Ordered slot-start instants within `[start_time, end_time)` on `date`.
///
/// Empty when the date's weekday is not a working day, and when
/// `end_time <= start_time` (the walk must stay finite). Admissibility is
/// tested on the slot *start*: a trailing slot whose end would run past
/// `end_time` is still offered, matching the behavior the service has
/// always had. Each candidate is dropped if it overlaps an existing
/// appointment that still holds its slot.
pub fn available_slots(
    schedule: &WeeklySchedule,
    date: NaiveDate,
    existing: &[Appointment],
) -> Vec<DateTime<Utc>> {
    if !schedule.works_on(Weekday::of(date)) {
        return Vec::new();
    }
    if schedule.end_time <= schedule.start_time {
        return Vec::new();
    }

    let day_end = date.and_time(schedule.end_time).and_utc();
    let mut cursor = date.and_time(schedule.start_time).and_utc();
    let mut slots = Vec::new();

    while cursor < day_end {
        let slot_end = cursor + Duration::minutes(SLOT_MINUTES);
        if !has_conflict(existing, cursor, slot_end) {
            slots.push(cursor);
        }
        cursor = slot_end;
    }

    slots
}

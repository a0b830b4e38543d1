//! Same-day re-inspection check.
//!
//! Advisory only: a positive result asks the caller to get operator
//! confirmation. Several inspections of one unit on one day are valid.

use chrono::{DateTime, NaiveTime, TimeZone};

use crate::entities::Inspection;

/// Local midnight of the calendar day containing `now`, as a naive local time.
fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> chrono::NaiveDateTime {
    now.date_naive().and_time(NaiveTime::MIN)
}

/// The most recent inspection of `equipment_id` completed since local
/// midnight of `now`'s day.
///
/// The day boundary is taken in `now`'s timezone, so pass the operator's
/// local clock.
pub fn inspected_today<'a, Tz: TimeZone>(
    history: &'a [Inspection],
    equipment_id: &str,
    now: &DateTime<Tz>,
) -> Option<&'a Inspection> {
    let tz = now.timezone();
    let midnight = start_of_day(now);
    history
        .iter()
        .filter(|i| i.equipment_id == equipment_id)
        .filter(|i| i.completed_at.with_timezone(&tz).naive_local() >= midnight)
        .max_by_key(|i| i.completed_at)
}

/// Whether `equipment_id` already has an inspection completed today.
pub fn has_run_today<Tz: TimeZone>(
    history: &[Inspection],
    equipment_id: &str,
    now: &DateTime<Tz>,
) -> bool {
    inspected_today(history, equipment_id, now).is_some()
}

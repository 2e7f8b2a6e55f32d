//! Reminder selection against an explicit "now".
//!
//! Nothing here reads the system clock. The caller passes the current local
//! wall-clock time; [`local_now`] converts an instant (typically
//! `Utc::now()`) into that wall-clock time for a given IANA timezone.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{CalendarError, Result};
use crate::event::{Event, Scheduled};

/// Whether `event`'s reminder is due at `now`.
///
/// Due means the event starts in the future and no more than
/// `notification_time` minutes from `now`. A `notification_time` of 0 never fires.
pub fn is_due(event: &Event, now: NaiveDateTime) -> bool {
    if event.notification_time == 0 {
        return false;
    }
    let until_start = event.starts_at() - now;
    until_start > chrono::Duration::zero()
        && until_start <= chrono::Duration::minutes(i64::from(event.notification_time))
}

/// Events whose reminder is due at `now` and that have not been notified yet.
///
/// `notified` holds the ids already shown; the result keeps the input order.
pub fn upcoming_events<'a>(
    events: &'a [Event],
    now: NaiveDateTime,
    notified: &[String],
) -> Vec<&'a Event> {
    let due: Vec<&Event> = events
        .iter()
        .filter(|e| is_due(e, now))
        .filter(|e| !notified.contains(&e.id))
        .collect();
    if !due.is_empty() {
        tracing::debug!(%now, count = due.len(), "reminders due");
    }
    due
}

/// Toast text for a due reminder.
pub fn notification_message(event: &Event) -> String {
    format!(
        "{}분 후 {} 일정이 시작됩니다.",
        event.notification_time, event.title
    )
}

/// The wall-clock time in `timezone` at `instant`.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidTimezone`] if `timezone` is not a valid IANA name.
pub fn local_now(instant: DateTime<Utc>, timezone: &str) -> Result<NaiveDateTime> {
    let tz = timezone
        .parse::<Tz>()
        .map_err(|_| CalendarError::InvalidTimezone(format!("'{}'", timezone)))?;
    Ok(instant.with_timezone(&tz).naive_local())
}

//! Event list filtering: search term plus the visible week or month.

use chrono::NaiveDate;

use crate::dates::{is_date_in_range, view_range, CalendarView};
use crate::event::Event;

/// Whether `event` matches `term` in its title, description, or location.
///
/// Matching is a case-insensitive substring test; a blank term matches everything.
pub fn matches_term(event: &Event, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [&event.title, &event.description, &event.location]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

/// Events shown in the list for `view` around `current`, matching `term`.
///
/// The result is ordered by date, then start time, then id.
pub fn filter_events<'a>(
    events: &'a [Event],
    term: &str,
    current: NaiveDate,
    view: CalendarView,
) -> Vec<&'a Event> {
    let (start, end) = view_range(view, current);
    let mut found: Vec<&Event> = events
        .iter()
        .filter(|e| is_date_in_range(e.date, start, end))
        .filter(|e| matches_term(e, term))
        .collect();
    found.sort_by(|a, b| (a.date, a.start_time, &a.id).cmp(&(b.date, b.start_time, &b.id)));
    found
}

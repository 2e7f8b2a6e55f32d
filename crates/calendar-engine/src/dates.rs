//! Timezone-naive date helpers behind the month and week views.
//!
//! Everything here works on local calendar dates ([`NaiveDate`]) and never
//! reads the system clock. The month grid and week strip are Sunday-first by
//! default, matching the [`WEEK_DAYS`] header order.

use chrono::{Datelike, Months, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::event::Scheduled;

/// Column headers of the calendar views, Sunday first.
pub const WEEK_DAYS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

pub const START_TIME_ERROR: &str = "시작 시간은 종료 시간보다 빨라야 합니다.";
pub const END_TIME_ERROR: &str = "종료 시간은 시작 시간보다 늦어야 합니다.";

// ── Week start ──────────────────────────────────────────────────────────────

/// Which day begins a week in the month grid and week strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    /// Matches the calendar header (`일` first).
    #[default]
    Sunday,
    /// ISO 8601.
    Monday,
}

/// How many days `weekday` is from the week-start day.
fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> i64 {
    match week_start {
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
        WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
    }
}

// ── Formatting ──────────────────────────────────────────────────────────────

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format day `day` of the month containing `month_anchor` as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDate`] if the month has no such day.
pub fn format_date_for_day(month_anchor: NaiveDate, day: u32) -> Result<String> {
    day_of_month(month_anchor, day).map(format_date).ok_or_else(|| {
        CalendarError::InvalidDate(format!(
            "day {} does not exist in {}",
            day,
            format_month(month_anchor)
        ))
    })
}

/// Month heading, e.g. `2025년 11월`.
pub fn format_month(date: NaiveDate) -> String {
    format!("{}년 {}월", date.year(), date.month())
}

/// Week heading, e.g. `2025년 11월 3주`.
///
/// A week belongs to the month holding its Thursday, and is numbered from
/// that month's first Thursday.
pub fn format_week(date: NaiveDate) -> String {
    let offset = 4 - date.weekday().num_days_from_sunday() as i64;
    let thursday = date + chrono::Duration::days(offset);
    let week_number = (thursday.day() - 1) / 7 + 1;
    format!(
        "{}년 {}월 {}주",
        thursday.year(),
        thursday.month(),
        week_number
    )
}

// ── Month arithmetic ────────────────────────────────────────────────────────

/// Number of days in `month` of `year`, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((next - first).num_days() as u32)
}

/// Day `day` of the month containing `month_anchor`.
pub fn day_of_month(month_anchor: NaiveDate, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(month_anchor.year(), month_anchor.month(), day)
}

/// Whether `date` lies in `[start, end]`.
pub fn is_date_in_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}

// ── Grids ───────────────────────────────────────────────────────────────────

/// The weeks of the month containing `month_anchor`, Sunday first.
///
/// Each week has seven cells holding a day number, with `None` padding
/// before the 1st and after the last day.
pub fn get_weeks_at_month(month_anchor: NaiveDate) -> Vec<[Option<u32>; 7]> {
    get_weeks_at_month_with(month_anchor, WeekStartDay::Sunday)
}

/// [`get_weeks_at_month`] with a configurable week start.
pub fn get_weeks_at_month_with(
    month_anchor: NaiveDate,
    week_start: WeekStartDay,
) -> Vec<[Option<u32>; 7]> {
    let Some(first) = day_of_month(month_anchor, 1) else {
        return Vec::new();
    };
    let Some(total) = days_in_month(first.year(), first.month()) else {
        return Vec::new();
    };
    let lead = days_from_week_start(first.weekday(), week_start) as usize;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut column = lead;
    for day in 1..=total {
        week[column] = Some(day);
        column += 1;
        if column == 7 {
            weeks.push(week);
            week = [None; 7];
            column = 0;
        }
    }
    if column > 0 {
        weeks.push(week);
    }
    weeks
}

/// The seven dates of the Sunday-first week containing `date`.
pub fn get_week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    get_week_dates_with(date, WeekStartDay::Sunday)
}

/// [`get_week_dates`] with a configurable week start.
pub fn get_week_dates_with(date: NaiveDate, week_start: WeekStartDay) -> [NaiveDate; 7] {
    let start = date - chrono::Duration::days(days_from_week_start(date.weekday(), week_start));
    std::array::from_fn(|i| start + chrono::Duration::days(i as i64))
}

/// Events falling on day `day` of the month containing `month_anchor`.
pub fn get_events_for_day<E: Scheduled>(
    events: &[E],
    month_anchor: NaiveDate,
    day: u32,
) -> Vec<&E> {
    match day_of_month(month_anchor, day) {
        Some(target) => events.iter().filter(|e| e.date() == target).collect(),
        None => Vec::new(),
    }
}

// ── View navigation ─────────────────────────────────────────────────────────

/// The two calendar layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Week,
    #[default]
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Step the displayed date one week or one month.
///
/// Month steps clamp the day (Jan 31 → Feb 28), unlike monthly recurrence.
pub fn navigate(view: CalendarView, date: NaiveDate, direction: Direction) -> Result<NaiveDate> {
    let stepped = match (view, direction) {
        (CalendarView::Week, Direction::Prev) => date.checked_sub_signed(chrono::Duration::days(7)),
        (CalendarView::Week, Direction::Next) => date.checked_add_signed(chrono::Duration::days(7)),
        (CalendarView::Month, Direction::Prev) => date.checked_sub_months(Months::new(1)),
        (CalendarView::Month, Direction::Next) => date.checked_add_months(Months::new(1)),
    };
    stepped.ok_or_else(|| CalendarError::InvalidDate(format!("cannot step past {}", date)))
}

/// The inclusive date range shown by `view` around `date`.
pub fn view_range(view: CalendarView, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    match view {
        CalendarView::Week => {
            let week = get_week_dates(date);
            (week[0], week[6])
        }
        CalendarView::Month => {
            let first = date.with_day(1).unwrap_or(date);
            let last = days_in_month(date.year(), date.month())
                .and_then(|n| date.with_day(n))
                .unwrap_or(date);
            (first, last)
        }
    }
}

// ── Time validation ─────────────────────────────────────────────────────────

/// Per-field messages for the start/end inputs, shown while the user types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRangeErrors {
    pub start: Option<&'static str>,
    pub end: Option<&'static str>,
}

impl TimeRangeErrors {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Field errors for a possibly incomplete start/end pair.
pub fn time_range_errors(start: Option<NaiveTime>, end: Option<NaiveTime>) -> TimeRangeErrors {
    match (start, end) {
        (Some(s), Some(e)) if s >= e => TimeRangeErrors {
            start: Some(START_TIME_ERROR),
            end: Some(END_TIME_ERROR),
        },
        _ => TimeRangeErrors::default(),
    }
}

/// Require `start < end`.
pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<()> {
    if start >= end {
        return Err(CalendarError::InvalidTimeRange(format!(
            "{} - {}: {}",
            start.format("%H:%M"),
            end.format("%H:%M"),
            START_TIME_ERROR
        )));
    }
    Ok(())
}

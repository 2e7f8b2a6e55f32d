//! Turn one recurring event definition into its concrete dated instances.
//!
//! The repeat rule is rendered as an iCalendar `DTSTART`/`RRULE` block and
//! expanded with the [`rrule`] crate. RFC 5545 semantics give the
//! "same day number" behaviour for free: a monthly rule anchored on the 31st
//! produces nothing in 30-day months, and a yearly rule anchored on Feb 29
//! produces nothing in common years. Occurrences are never clamped.
//!
//! # Horizon
//!
//! A rule with an `end_date` stops at that date (inclusive). A rule without
//! one stops [`ExpandOptions::horizon_months`] months after the anchor
//! (inclusive). Either way at most [`ExpandOptions::max_instances`]
//! instances are produced.

use chrono::{Months, NaiveDate};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::dates::validate_time_range;
use crate::error::{CalendarError, Result};
use crate::event::{EventDraft, GroupId, RepeatRule, RepeatType};

pub const DEFAULT_HORIZON_MONTHS: u32 = 12;
pub const DEFAULT_MAX_INSTANCES: u16 = 1000;

/// Bounds applied to every expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandOptions {
    /// Span after the anchor covered by a rule without an end date.
    pub horizon_months: u32,
    /// Hard cap on generated instances, with or without an end date.
    pub max_instances: u16,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

/// Expand a recurring draft into one draft per occurrence.
///
/// Every returned draft is a copy of `anchor` with its own `date` and with
/// `repeat.id` set to `group`. The first draft is on the anchor date and the
/// sequence is strictly date-ascending.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidRule`] if the rule does not recur, has an
/// interval outside `1..=`[`MAX_INTERVAL`](crate::event::MAX_INTERVAL), or
/// ends before the anchor date, and
/// [`CalendarError::InvalidTimeRange`] if the anchor's start is not before
/// its end.
pub fn expand(
    anchor: &EventDraft,
    group: GroupId,
    options: &ExpandOptions,
) -> Result<Vec<EventDraft>> {
    validate_time_range(anchor.start_time, anchor.end_time)?;
    let dates = occurrences(anchor.date, &anchor.repeat, options)?;

    tracing::debug!(
        %group,
        kind = ?anchor.repeat.kind,
        interval = anchor.repeat.interval,
        count = dates.len(),
        "expanded recurring event"
    );

    let mut repeat = anchor.repeat.clone();
    repeat.id = Some(group);

    Ok(dates
        .into_iter()
        .map(|date| EventDraft {
            date,
            repeat: repeat.clone(),
            ..anchor.clone()
        })
        .collect())
}

/// The occurrence dates of `rule` anchored at `anchor`, date-ascending.
///
/// # Errors
///
/// Same rule errors as [`expand`].
pub fn occurrences(
    anchor: NaiveDate,
    rule: &RepeatRule,
    options: &ExpandOptions,
) -> Result<Vec<NaiveDate>> {
    if !rule.is_recurring() {
        return Err(CalendarError::InvalidRule(
            "non-recurring event cannot be expanded".to_string(),
        ));
    }
    rule.validate()?;
    if options.max_instances == 0 {
        return Err(CalendarError::Expansion(
            "max_instances must be at least 1".to_string(),
        ));
    }

    let until = expansion_end(anchor, rule, options)?;
    let block = rrule_block(anchor, rule.kind, rule.interval, Some(until))?;
    let set = block
        .parse::<RRuleSet>()
        .map_err(|e| {
            CalendarError::Expansion(format!("'{}': {}", block.replace('\n', " "), e))
        })?;

    let result = set.all(options.max_instances);
    if result.limited {
        tracing::warn!(
            %anchor,
            %until,
            max_instances = options.max_instances,
            "recurrence truncated at instance cap"
        );
    }

    let mut dates: Vec<NaiveDate> = result.dates.iter().map(|dt| dt.date_naive()).collect();
    dates.dedup();
    Ok(dates)
}

/// Render `rule` anchored at `anchor` as an iCalendar `DTSTART`/`RRULE` block.
///
/// An open-ended rule renders without `UNTIL`.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidRule`] for a non-recurring rule or an
/// interval outside `1..=`[`MAX_INTERVAL`](crate::event::MAX_INTERVAL).
pub fn to_rrule(anchor: NaiveDate, rule: &RepeatRule) -> Result<String> {
    rule.validate()?;
    rrule_block(anchor, rule.kind, rule.interval, rule.end_date)
}

/// Last date an expansion may produce.
fn expansion_end(
    anchor: NaiveDate,
    rule: &RepeatRule,
    options: &ExpandOptions,
) -> Result<NaiveDate> {
    match rule.end_date {
        Some(end) if end < anchor => Err(CalendarError::InvalidRule(format!(
            "end date {} is before the first occurrence {}",
            end, anchor
        ))),
        Some(end) => Ok(end),
        None => anchor
            .checked_add_months(Months::new(options.horizon_months))
            .ok_or_else(|| {
                CalendarError::Expansion(format!(
                    "horizon of {} months from {} is out of range",
                    options.horizon_months, anchor
                ))
            }),
    }
}

fn rrule_block(
    anchor: NaiveDate,
    kind: RepeatType,
    interval: u32,
    until: Option<NaiveDate>,
) -> Result<String> {
    let freq = match kind {
        RepeatType::Daily => "DAILY",
        RepeatType::Weekly => "WEEKLY",
        RepeatType::Monthly => "MONTHLY",
        RepeatType::Yearly => "YEARLY",
        RepeatType::None => {
            return Err(CalendarError::InvalidRule(
                "non-recurring event has no RRULE".to_string(),
            ))
        }
    };

    // rrule needs a datetime; whole days become midnight UTC and UNTIL covers the last day.
    let mut rrule = format!("RRULE:FREQ={};INTERVAL={}", freq, interval);
    if let Some(until) = until {
        rrule.push_str(&format!(";UNTIL={}T235959Z", until.format("%Y%m%d")));
    }
    Ok(format!(
        "DTSTART:{}T000000Z\n{}",
        anchor.format("%Y%m%d"),
        rrule
    ))
}

//! # calendar-engine
//!
//! Deterministic calendar domain logic for a personal event manager.
//!
//! Every function is pure and synchronous: callers pass in the events they
//! fetched and, where time matters, an explicit "now". Nothing here performs
//! I/O; the results are plain values (serializable to the `/api/events` JSON
//! shape) that the UI layer persists.
//!
//! ## Modules
//!
//! - [`event`]: Event, draft, repeat rule, and category types
//! - [`expander`]: Repeat rule → date-ascending list of dated instances
//! - [`conflict`]: Detect overlapping events on the same date
//! - [`dates`]: Month grid, week strip, formatting, and view navigation
//! - [`search`]: Search-term and visible-range filtering
//! - [`notification`]: Reminder selection against an explicit "now"
//! - [`store`]: In-memory event cache with a series index
//! - [`planner`]: Create/edit/move submission flow with overlap checks
//! - [`error`]: Error types

pub mod conflict;
pub mod dates;
pub mod error;
pub mod event;
pub mod expander;
pub mod notification;
pub mod planner;
pub mod search;
pub mod store;

pub use conflict::{
    find_batch_overlaps, find_overlapping, overlaps, BatchConflict, Conflict, Exclude,
};
pub use dates::{
    format_date, format_month, format_week, get_events_for_day, get_week_dates,
    get_weeks_at_month, CalendarView, Direction, WeekStartDay,
};
pub use error::CalendarError;
pub use event::{
    Category, Event, EventDraft, EventsPayload, GroupId, NotificationLead, RepeatRule, RepeatType,
    Scheduled,
};
pub use expander::{expand, occurrences, to_rrule, ExpandOptions};
pub use notification::{local_now, notification_message, upcoming_events};
pub use planner::{plan_create, plan_edit, plan_move, Action, EditScope, Plan, PlanOptions};
pub use search::filter_events;
pub use store::{EventStore, IdSource, SequentialIds, UuidIds};

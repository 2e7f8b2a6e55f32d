//! Calendar event data model.
//!
//! [`EventDraft`] is what a form submits (no id yet) and what the expander
//! produces; [`Event`] is a persisted instance carrying the id assigned by
//! the events API. Both serialize to the `/api/events` JSON shape: camelCase
//! keys, `YYYY-MM-DD` dates and `HH:MM` times.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CalendarError, Result};

// ── Category ────────────────────────────────────────────────────────────────

/// The closed set of event categories offered by the form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "업무")]
    Work,
    #[serde(rename = "개인")]
    Personal,
    #[serde(rename = "가족")]
    Family,
    #[default]
    #[serde(rename = "기타")]
    Other,
}

impl Category {
    /// Form ordering.
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Personal,
        Category::Family,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Work => "업무",
            Category::Personal => "개인",
            Category::Family => "가족",
            Category::Other => "기타",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label.trim())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Repeat rule ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatType {
    /// Short unit label shown next to recurring events ("2주마다" etc.).
    pub fn label(&self) -> &'static str {
        match self {
            RepeatType::None => "",
            RepeatType::Daily => "일",
            RepeatType::Weekly => "주",
            RepeatType::Monthly => "월",
            RepeatType::Yearly => "년",
        }
    }
}

/// Identifier shared by every instance generated from one recurring definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Mint a fresh random group id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Largest interval a recurring rule accepts.
pub const MAX_INTERVAL: u32 = u16::MAX as u32;

/// Whether and how an event recurs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatRule {
    #[serde(rename = "type")]
    pub kind: RepeatType,
    /// Step between occurrences in units of `kind`. Zero for non-recurring events.
    #[serde(default)]
    pub interval: u32,
    /// Inclusive upper bound for generated instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GroupId>,
}

impl RepeatRule {
    /// The rule of a non-recurring event.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(kind: RepeatType, interval: u32, end_date: Option<NaiveDate>) -> Self {
        Self {
            kind,
            interval,
            end_date,
            id: None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.kind != RepeatType::None
    }

    /// This rule, or [`RepeatRule::none`] if it does not recur.
    ///
    /// A non-recurring rule keeps no interval, end date, or group id.
    pub fn normalized(self) -> Self {
        if self.is_recurring() {
            self
        } else {
            Self::none()
        }
    }

    /// Reject rules that cannot be expanded.
    ///
    /// A recurring rule needs an interval in `1..=MAX_INTERVAL`. Non-recurring
    /// rules always pass; the interval is not consulted for them.
    pub fn validate(&self) -> Result<()> {
        if !self.is_recurring() {
            return Ok(());
        }
        if self.interval == 0 {
            return Err(CalendarError::InvalidRule(format!(
                "{:?} rule needs an interval of at least 1",
                self.kind
            )));
        }
        if self.interval > MAX_INTERVAL {
            return Err(CalendarError::InvalidRule(format!(
                "{:?} rule interval {} exceeds {}",
                self.kind, self.interval, MAX_INTERVAL
            )));
        }
        Ok(())
    }
}

// ── Notification leads ──────────────────────────────────────────────────────

/// Reminder lead times offered by the event form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLead {
    OneMinute,
    TenMinutes,
    OneHour,
    TwoHours,
    OneDay,
}

impl NotificationLead {
    pub const ALL: [NotificationLead; 5] = [
        NotificationLead::OneMinute,
        NotificationLead::TenMinutes,
        NotificationLead::OneHour,
        NotificationLead::TwoHours,
        NotificationLead::OneDay,
    ];

    pub fn minutes(&self) -> u32 {
        match self {
            NotificationLead::OneMinute => 1,
            NotificationLead::TenMinutes => 10,
            NotificationLead::OneHour => 60,
            NotificationLead::TwoHours => 120,
            NotificationLead::OneDay => 1440,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationLead::OneMinute => "1분 전",
            NotificationLead::TenMinutes => "10분 전",
            NotificationLead::OneHour => "1시간 전",
            NotificationLead::TwoHours => "2시간 전",
            NotificationLead::OneDay => "1일 전",
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|lead| lead.minutes() == minutes)
    }
}

// ── Scheduled ───────────────────────────────────────────────────────────────

/// Anything that occupies a wall-clock interval on one calendar date.
pub trait Scheduled {
    fn date(&self) -> NaiveDate;
    fn start_time(&self) -> NaiveTime;
    fn end_time(&self) -> NaiveTime;

    fn starts_at(&self) -> NaiveDateTime {
        self.date().and_time(self.start_time())
    }

    fn ends_at(&self) -> NaiveDateTime {
        self.date().and_time(self.end_time())
    }
}

// ── EventDraft ──────────────────────────────────────────────────────────────

/// Event fields as submitted by the form, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub repeat: RepeatRule,
    /// Minutes before the start at which to remind; 0 disables the reminder.
    #[serde(default)]
    pub notification_time: u32,
}

impl EventDraft {
    /// A non-recurring draft in the default category with no reminder.
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            start_time,
            end_time,
            description: String::new(),
            location: String::new(),
            category: Category::default(),
            repeat: RepeatRule::none(),
            notification_time: 0,
        }
    }

    /// Build a draft from raw form strings (`YYYY-MM-DD`, `HH:MM`).
    pub fn parse(title: &str, date: &str, start_time: &str, end_time: &str) -> Result<Self> {
        Ok(Self::new(
            title,
            parse_date(date)?,
            parse_time(start_time)?,
            parse_time(end_time)?,
        ))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatRule) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_notification(mut self, minutes: u32) -> Self {
        self.notification_time = minutes;
        self
    }

    /// Form-level validation: non-empty title, `start < end`, expandable rule.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CalendarError::MissingField("title".to_string()));
        }
        crate::dates::validate_time_range(self.start_time, self.end_time)?;
        self.repeat.validate()
    }

    pub fn into_event(self, id: impl Into<String>) -> Event {
        Event {
            id: id.into(),
            title: self.title,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            description: self.description,
            location: self.location,
            category: self.category,
            repeat: self.repeat,
            notification_time: self.notification_time,
        }
    }
}

impl Scheduled for EventDraft {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
}

// ── Event ───────────────────────────────────────────────────────────────────

/// A persisted event instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub repeat: RepeatRule,
    #[serde(default)]
    pub notification_time: u32,
}

impl Event {
    pub fn is_recurring(&self) -> bool {
        self.repeat.is_recurring()
    }

    pub fn group_id(&self) -> Option<&GroupId> {
        self.repeat.id.as_ref()
    }

    /// The editable fields of this event, without its id.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            description: self.description.clone(),
            location: self.location.clone(),
            category: self.category,
            repeat: self.repeat.clone(),
            notification_time: self.notification_time,
        }
    }

    /// Replace every field but the id with the draft's.
    pub fn apply(&mut self, draft: EventDraft) {
        let id = std::mem::take(&mut self.id);
        *self = draft.into_event(id);
    }
}

impl Scheduled for Event {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
}

/// Request body for creating a batch of instances in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsPayload {
    pub events: Vec<EventDraft>,
}

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` form value.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| CalendarError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse an `HH:MM` (or `HH:MM:SS`) form value.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| CalendarError::InvalidTime(format!("'{}': {}", s, e)))
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(de::Error::custom)
    }
}

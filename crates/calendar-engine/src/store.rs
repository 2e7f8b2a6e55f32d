//! In-memory cache of persisted events with a series index.
//!
//! The store mirrors what the events API holds: events keyed by id, plus a
//! `group id → instance ids` index so whole-series edits and deletes never
//! scan. Every mutation keeps the index consistent with the events.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{CalendarError, Result};
use crate::event::{Event, EventDraft, GroupId, RepeatRule};

// ── Id assignment ───────────────────────────────────────────────────────────

/// Assigns ids to new events when the store stands in for persistence.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `"1"`, `"2"`, … for deterministic tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    last: u64,
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        self.last += 1;
        self.last.to_string()
    }
}

// ── EventStore ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: BTreeMap<String, Event>,
    series: HashMap<GroupId, BTreeSet<String>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load events fetched from the API.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut store = Self::new();
        for event in events {
            store.insert(event);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    /// All events ordered by date, start time, then id.
    pub fn all(&self) -> Vec<&Event> {
        let mut all: Vec<&Event> = self.events.values().collect();
        all.sort_by(|a, b| (a.date, a.start_time, &a.id).cmp(&(b.date, b.start_time, &b.id)));
        all
    }

    /// Owned snapshot in [`EventStore::all`] order, for the overlap checks.
    pub fn to_vec(&self) -> Vec<Event> {
        self.all().into_iter().cloned().collect()
    }

    /// Instances of `group`, date-ascending. Empty for an unknown group.
    pub fn series(&self, group: &GroupId) -> Vec<&Event> {
        let mut instances: Vec<&Event> = self
            .series
            .get(group)
            .into_iter()
            .flatten()
            .filter_map(|id| self.events.get(id))
            .collect();
        instances.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        instances
    }

    /// Ids indexed under `group`.
    pub fn series_ids(&self, group: &GroupId) -> Option<&BTreeSet<String>> {
        self.series.get(group)
    }

    /// Insert or replace an event by id, returning the replaced one.
    ///
    /// Only recurring events are indexed under their group id.
    pub fn insert(&mut self, event: Event) -> Option<Event> {
        let previous = self.remove_entry(&event.id);
        if let Some(group) = event.group_id().filter(|_| event.is_recurring()) {
            self.series
                .entry(group.clone())
                .or_default()
                .insert(event.id.clone());
        }
        self.events.insert(event.id.clone(), event);
        previous
    }

    /// Assign an id to `draft` and insert it.
    pub fn create(&mut self, draft: EventDraft, ids: &mut impl IdSource) -> Event {
        let event = draft.into_event(ids.next_id());
        self.insert(event.clone());
        event
    }

    /// Create every draft in order, e.g. the instances of a new series.
    pub fn create_all(&mut self, drafts: Vec<EventDraft>, ids: &mut impl IdSource) -> Vec<Event> {
        drafts
            .into_iter()
            .map(|draft| self.create(draft, ids))
            .collect()
    }

    /// Edit one instance, keeping its id.
    ///
    /// An instance of a series is detached: it leaves the series index and
    /// its repeat rule is reset to non-recurring. The stored event is always
    /// non-recurring afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotFound`] for an unknown id.
    pub fn update_instance(&mut self, id: &str, mut draft: EventDraft) -> Result<&Event> {
        let mut event = self
            .remove_entry(id)
            .ok_or_else(|| CalendarError::NotFound(format!("event '{}'", id)))?;
        if let Some(group) = event.group_id() {
            tracing::debug!(id, %group, "detaching instance from series");
        }
        draft.repeat = RepeatRule::none();
        event.apply(draft);
        self.events.insert(id.to_string(), event);
        self.events
            .get(id)
            .ok_or_else(|| CalendarError::NotFound(format!("event '{}'", id)))
    }

    /// Remove one event.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotFound`] for an unknown id.
    pub fn delete_instance(&mut self, id: &str) -> Result<Event> {
        self.remove_entry(id)
            .ok_or_else(|| CalendarError::NotFound(format!("event '{}'", id)))
    }

    /// Remove every instance of `group`, date-ascending.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotFound`] for an unknown group.
    pub fn delete_series(&mut self, group: &GroupId) -> Result<Vec<Event>> {
        let ids = self
            .series
            .remove(group)
            .ok_or_else(|| CalendarError::NotFound(format!("series '{}'", group)))?;
        let mut removed: Vec<Event> = ids.iter().filter_map(|id| self.events.remove(id)).collect();
        removed.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        tracing::debug!(%group, removed = removed.len(), "deleted series");
        Ok(removed)
    }

    /// Replace the whole series `group` with freshly created `drafts`.
    ///
    /// Returns the created events.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotFound`] for an unknown group.
    pub fn replace_series(
        &mut self,
        group: &GroupId,
        drafts: Vec<EventDraft>,
        ids: &mut impl IdSource,
    ) -> Result<Vec<Event>> {
        self.delete_series(group)?;
        Ok(self.create_all(drafts, ids))
    }

    /// Move an event to another date, keeping its times.
    ///
    /// Moving to the event's current date changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotFound`] for an unknown id and
    /// [`CalendarError::RecurringMove`] for an instance of a series.
    pub fn move_event(&mut self, id: &str, date: NaiveDate) -> Result<&Event> {
        let event = self
            .events
            .get_mut(id)
            .ok_or_else(|| CalendarError::NotFound(format!("event '{}'", id)))?;
        if event.is_recurring() {
            tracing::warn!(id, "refusing to move recurring instance");
            return Err(CalendarError::RecurringMove(format!("event '{}'", id)));
        }
        event.date = date;
        Ok(event)
    }

    fn remove_entry(&mut self, id: &str) -> Option<Event> {
        let event = self.events.remove(id)?;
        if let Some(group) = event.group_id() {
            if let Some(ids) = self.series.get_mut(group) {
                ids.remove(id);
                if ids.is_empty() {
                    self.series.remove(group);
                }
            }
        }
        Some(event)
    }
}

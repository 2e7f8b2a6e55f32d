//! Submission flow: validate → expand → check overlaps → commit.
//!
//! A [`Plan`] is what the form layer gets back before anything is persisted.
//! If [`Plan::requires_confirmation`] is true the UI shows the overlap
//! warning; once the user continues (or nothing overlapped) the plan is
//! committed, here against an [`EventStore`] standing in for the events API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::conflict::{find_batch_overlaps, BatchConflict, Exclude};
use crate::error::{CalendarError, Result};
use crate::event::{Event, EventDraft, GroupId, RepeatRule};
use crate::expander::{expand, ExpandOptions};
use crate::store::{EventStore, IdSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanOptions {
    pub expand: ExpandOptions,
}

/// Which part of a series an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// Only the chosen instance ("이 일정만").
    Instance,
    /// Every instance sharing its group id ("모든 일정").
    Series,
}

/// What committing a plan does to the stored events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create every draft.
    Create,
    /// Overwrite one event in place.
    UpdateInstance { id: String },
    /// Delete a single event and create the drafts as a new series.
    ConvertToSeries { id: String },
    /// Delete every instance of a series and create the drafts.
    ReplaceSeries { group: GroupId },
    /// Change one event's date.
    Move { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub action: Action,
    /// Instances to persist, date-ascending.
    pub drafts: Vec<EventDraft>,
    pub conflicts: Vec<BatchConflict>,
}

impl Plan {
    /// Whether the overlap warning must be confirmed before committing.
    pub fn requires_confirmation(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Existing events named in the warning dialog, once each, sorted by id.
    pub fn conflicting_events(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .conflicts
            .iter()
            .flat_map(|c| c.existing.iter().map(|conflict| &conflict.event))
            .collect();
        events.sort_by(|a, b| a.id.cmp(&b.id));
        events.dedup_by(|a, b| a.id == b.id);
        events
    }

    /// Apply the plan to `store`, returning the events created or changed.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotFound`] if the targeted event or series is
    /// gone, or [`CalendarError::RecurringMove`] for a move of a series instance.
    pub fn commit(self, store: &mut EventStore, ids: &mut impl IdSource) -> Result<Vec<Event>> {
        match self.action {
            Action::Create => Ok(store.create_all(self.drafts, ids)),
            Action::UpdateInstance { id } => {
                let draft = single(self.drafts, &id)?;
                Ok(vec![store.update_instance(&id, draft)?.clone()])
            }
            Action::ConvertToSeries { id } => {
                store.delete_instance(&id)?;
                Ok(store.create_all(self.drafts, ids))
            }
            Action::ReplaceSeries { group } => store.replace_series(&group, self.drafts, ids),
            Action::Move { id } => {
                let draft = single(self.drafts, &id)?;
                Ok(vec![store.move_event(&id, draft.date)?.clone()])
            }
        }
    }
}

fn single(drafts: Vec<EventDraft>, id: &str) -> Result<EventDraft> {
    drafts
        .into_iter()
        .next()
        .ok_or_else(|| CalendarError::MissingField(format!("draft for event '{}'", id)))
}

/// Drafts for a submission: the expanded series for a recurring draft, else
/// the draft itself with its rule reset to [`RepeatRule::none`].
fn instances(
    mut draft: EventDraft,
    group: GroupId,
    options: &PlanOptions,
) -> Result<Vec<EventDraft>> {
    if draft.repeat.is_recurring() {
        expand(&draft, group, &options.expand)
    } else {
        draft.repeat = draft.repeat.normalized();
        Ok(vec![draft])
    }
}

/// Plan the creation of a new event or series.
///
/// # Errors
///
/// Returns the draft's validation error, or an expansion error for a bad rule.
pub fn plan_create(draft: EventDraft, store: &EventStore, options: &PlanOptions) -> Result<Plan> {
    draft.validate()?;
    let drafts = instances(draft, GroupId::new(), options)?;
    let conflicts = find_batch_overlaps(&drafts, &store.to_vec(), Exclude::Nothing);
    Ok(Plan {
        action: Action::Create,
        drafts,
        conflicts,
    })
}

/// Plan an edit of event `id`.
///
/// - A series instance edited with [`EditScope::Instance`] is detached and
///   becomes a single event.
/// - A series edited with [`EditScope::Series`] is re-expanded under the same
///   group id and replaces every existing instance. If the draft keeps the
///   edited instance's date, expansion restarts from the series' first date;
///   a changed date becomes the new anchor.
/// - A single event given a recurring rule becomes a new series.
///
/// The edited event (or the whole series) is excluded from the overlap check.
///
/// # Errors
///
/// Returns [`CalendarError::NotFound`] for an unknown id, or the draft's
/// validation and expansion errors.
pub fn plan_edit(
    id: &str,
    mut draft: EventDraft,
    scope: EditScope,
    store: &EventStore,
    options: &PlanOptions,
) -> Result<Plan> {
    let current = store
        .get(id)
        .ok_or_else(|| CalendarError::NotFound(format!("event '{}'", id)))?;
    draft.validate()?;
    let existing = store.to_vec();

    let (action, drafts, conflicts) = match (scope, current.group_id()) {
        (EditScope::Series, Some(group)) => {
            if draft.date == current.date {
                if let Some(first) = store.series(group).first() {
                    draft.date = first.date;
                }
            }
            let drafts = instances(draft, group.clone(), options)?;
            let conflicts = find_batch_overlaps(&drafts, &existing, Exclude::Series(group));
            let action = Action::ReplaceSeries {
                group: group.clone(),
            };
            (action, drafts, conflicts)
        }
        (_, Some(_)) => {
            draft.repeat = RepeatRule::none();
            let drafts = vec![draft];
            let conflicts = find_batch_overlaps(&drafts, &existing, Exclude::Event(id));
            (Action::UpdateInstance { id: id.to_string() }, drafts, conflicts)
        }
        (_, None) if draft.repeat.is_recurring() => {
            let drafts = instances(draft, GroupId::new(), options)?;
            let conflicts = find_batch_overlaps(&drafts, &existing, Exclude::Event(id));
            (Action::ConvertToSeries { id: id.to_string() }, drafts, conflicts)
        }
        (_, None) => {
            draft.repeat = RepeatRule::none();
            let drafts = vec![draft];
            let conflicts = find_batch_overlaps(&drafts, &existing, Exclude::Event(id));
            (Action::UpdateInstance { id: id.to_string() }, drafts, conflicts)
        }
    };

    Ok(Plan {
        action,
        drafts,
        conflicts,
    })
}

/// Plan a drag-and-drop move of event `id` to `date`, keeping its times.
///
/// # Errors
///
/// Returns [`CalendarError::NotFound`] for an unknown id and
/// [`CalendarError::RecurringMove`] for a series instance.
pub fn plan_move(id: &str, date: NaiveDate, store: &EventStore) -> Result<Plan> {
    let current = store
        .get(id)
        .ok_or_else(|| CalendarError::NotFound(format!("event '{}'", id)))?;
    if current.is_recurring() {
        return Err(CalendarError::RecurringMove(format!("event '{}'", id)));
    }

    let mut draft = current.to_draft();
    draft.date = date;
    let drafts = vec![draft];
    let conflicts = find_batch_overlaps(&drafts, &store.to_vec(), Exclude::Event(id));
    Ok(Plan {
        action: Action::Move { id: id.to_string() },
        drafts,
        conflicts,
    })
}

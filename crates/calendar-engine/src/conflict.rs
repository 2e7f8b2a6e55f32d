//! Detect events that share wall-clock time on the same date.
//!
//! Intervals are half-open: two events overlap when they are on the same
//! date and `a.start < b.end && b.start < a.end`. Adjacent events (where one
//! ends exactly when another starts) are NOT conflicts.

use crate::event::{Event, EventDraft, GroupId, Scheduled};

/// An existing event that overlaps a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub event: Event,
    pub overlap_minutes: i64,
}

/// Overlaps found for one instance of a batch being created together.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConflict {
    /// Position of the instance in the batch.
    pub index: usize,
    /// Existing events it overlaps, sorted by id.
    pub existing: Vec<Conflict>,
    /// Positions of other batch instances it overlaps, ascending.
    pub siblings: Vec<usize>,
}

/// Existing events left out of an overlap check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Exclude<'a> {
    #[default]
    Nothing,
    /// The event being edited or moved.
    Event(&'a str),
    /// Every instance of the series being replaced.
    Series(&'a GroupId),
}

impl Exclude<'_> {
    fn matches(&self, event: &Event) -> bool {
        match self {
            Exclude::Nothing => false,
            Exclude::Event(id) => event.id == *id,
            Exclude::Series(group) => event.group_id() == Some(*group),
        }
    }
}

/// Whether `a` and `b` share any time on the same date.
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: Scheduled + ?Sized,
    B: Scheduled + ?Sized,
{
    a.date() == b.date() && a.start_time() < b.end_time() && b.start_time() < a.end_time()
}

/// Minutes shared by `a` and `b`; zero when they do not overlap.
///
/// The overlap is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn overlap_minutes<A, B>(a: &A, b: &B) -> i64
where
    A: Scheduled + ?Sized,
    B: Scheduled + ?Sized,
{
    if !overlaps(a, b) {
        return 0;
    }
    let start = a.starts_at().max(b.starts_at());
    let end = a.ends_at().min(b.ends_at());
    (end - start).num_minutes()
}

/// Every event in `existing` that overlaps `candidate`, sorted by id.
pub fn find_overlapping<C>(candidate: &C, existing: &[Event], exclude: Exclude<'_>) -> Vec<Conflict>
where
    C: Scheduled + ?Sized,
{
    let mut conflicts: Vec<Conflict> = existing
        .iter()
        .filter(|event| !exclude.matches(event))
        .filter(|event| overlaps(candidate, *event))
        .map(|event| Conflict {
            event: event.clone(),
            overlap_minutes: overlap_minutes(candidate, event),
        })
        .collect();
    conflicts.sort_by(|a, b| a.event.id.cmp(&b.event.id));
    conflicts
}

/// Check every instance of `batch` against `existing` and against the rest of the batch.
///
/// Only instances with at least one overlap are reported, in batch order.
pub fn find_batch_overlaps(
    batch: &[EventDraft],
    existing: &[Event],
    exclude: Exclude<'_>,
) -> Vec<BatchConflict> {
    let mut found = Vec::new();

    for (index, instance) in batch.iter().enumerate() {
        let existing_conflicts = find_overlapping(instance, existing, exclude);
        let siblings: Vec<usize> = batch
            .iter()
            .enumerate()
            .filter(|(other, sibling)| *other != index && overlaps(instance, *sibling))
            .map(|(other, _)| other)
            .collect();

        if !existing_conflicts.is_empty() || !siblings.is_empty() {
            found.push(BatchConflict {
                index,
                existing: existing_conflicts,
                siblings,
            });
        }
    }

    tracing::debug!(
        batch = batch.len(),
        existing = existing.len(),
        conflicting = found.len(),
        "checked batch for overlaps"
    );
    found
}

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Task, TaskStatus};
use crate::occurrence::{project_with_cap, DEFAULT_ITERATION_CAP};

/// What the exception ledger does to one natural occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    /// Shown on its own date with the given display status.
    Kept { date: NaiveDate, status: TaskStatus },
    /// Not an occurrence of the task at all.
    Suppressed,
    /// Moved away from `from`; it is materialised on `to` instead.
    Relocated { from: NaiveDate, to: NaiveDate },
}

/// A concrete, displayable instance of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Occurrence {
    /// Date the occurrence is shown on.
    pub date: NaiveDate,
    /// Natural series date it belongs to; differs from `date` when deferred.
    pub origin: NaiveDate,
    pub status: TaskStatus,
}

impl Occurrence {
    pub fn is_relocated(&self) -> bool {
        self.date != self.origin
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OccurrenceWindow {
    pub occurrences: Vec<Occurrence>,
    pub truncated: bool,
}

/// Whether `date` is a natural occurrence: on the series and within the deadline.
pub fn is_natural_occurrence(task: &Task, date: NaiveDate) -> bool {
    let Some(series) = task.recurrence() else {
        return false;
    };
    if task.deadline.is_some_and(|deadline| date > deadline) {
        return false;
    }
    series.index_of(date).is_some()
}

/// Display status of the occurrence whose natural date is `origin`.
///
/// Precedence: skipped, explicit per-occurrence status, the task status for the
/// anchor, and TODO for every later repeat so one DONE never marks the series.
pub fn display_status(task: &Task, origin: NaiveDate) -> TaskStatus {
    if task.history.is_skipped(origin) {
        return TaskStatus::Skipped;
    }
    if let Some(status) = task.history.statuses.get(&origin) {
        return *status;
    }
    match task.scheduled_date {
        Some(anchor) if origin > anchor => TaskStatus::Todo,
        _ => task.status,
    }
}

pub fn resolve(task: &Task, date: NaiveDate) -> Resolution {
    if !is_natural_occurrence(task, date) {
        return Resolution::Suppressed;
    }
    // skip wins over a conflicting deferral
    if task.history.is_skipped(date) {
        return Resolution::Kept {
            date,
            status: TaskStatus::Skipped,
        };
    }
    if let Some(to) = task.history.deferred_target(date) {
        return Resolution::Relocated { from: date, to };
    }
    Resolution::Kept {
        date,
        status: display_status(task, date),
    }
}

pub fn occurrences(task: &Task, start: NaiveDate, end: NaiveDate) -> OccurrenceWindow {
    occurrences_with_cap(task, start, end, DEFAULT_ITERATION_CAP)
}

/// Occurrences displayed in `[start, end]`: kept natural occurrences plus the
/// deferred ones whose target falls in the window, in date order.
///
/// Deferred arrivals are shown even past the deadline; the deferral was
/// granted for an occurrence that existed when it was made.
pub fn occurrences_with_cap(
    task: &Task,
    start: NaiveDate,
    end: NaiveDate,
    cap: u32,
) -> OccurrenceWindow {
    if task.scheduled_date.is_none() {
        return OccurrenceWindow::default();
    }

    let projection = project_with_cap(task, start, end, cap);
    let mut occurrences: Vec<Occurrence> = projection
        .dates
        .iter()
        .filter_map(|date| match resolve(task, *date) {
            Resolution::Kept { date, status } => Some(Occurrence {
                date,
                origin: date,
                status,
            }),
            Resolution::Suppressed | Resolution::Relocated { .. } => None,
        })
        .collect();

    for (&origin, &target) in &task.history.deferred {
        if target < start || target > end || task.history.is_skipped(origin) {
            continue;
        }
        occurrences.push(Occurrence {
            date: target,
            origin,
            status: display_status(task, origin),
        });
    }

    occurrences.sort();
    occurrences.dedup();
    OccurrenceWindow {
        occurrences,
        truncated: projection.truncated,
    }
}

/// Occurrences of `task` shown on a single day.
pub fn day_view(task: &Task, day: NaiveDate) -> Vec<Occurrence> {
    occurrences(task, day, day).occurrences
}

pub fn is_active_on(task: &Task, day: NaiveDate) -> bool {
    !day_view(task, day).is_empty()
}

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::model::Task;

/// Iterations allowed per projection before it is cut short.
pub const DEFAULT_ITERATION_CAP: u32 = 5000;
/// Smallest cap that still covers a two-year daily horizon.
pub const MIN_ITERATION_CAP: u32 = 1500;

/// Dates on which a task naturally recurs inside a window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub dates: Vec<NaiveDate>,
    /// Set when the iteration cap stopped the walk before the window or
    /// deadline did, meaning `dates` undercounts.
    pub truncated: bool,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

pub fn project(task: &Task, start: NaiveDate, end: NaiveDate) -> Projection {
    project_with_cap(task, start, end, DEFAULT_ITERATION_CAP)
}

/// Walks the task's series from its anchor and keeps the dates in
/// `[start, end]` that do not pass the deadline. Both bounds are inclusive.
pub fn project_with_cap(task: &Task, start: NaiveDate, end: NaiveDate, cap: u32) -> Projection {
    let Some(series) = task.recurrence() else {
        return Projection::default();
    };

    let mut projection = Projection::default();
    let mut iterations: u32 = 0;
    let mut index: u32 = 0;

    while let Some(ptr) = series.nth(index) {
        if ptr > end {
            break;
        }
        if task.deadline.is_some_and(|deadline| ptr > deadline) {
            break;
        }
        if iterations >= cap {
            projection.truncated = true;
            break;
        }
        iterations += 1;

        if ptr >= start {
            projection.dates.push(ptr);
        }
        if !series.frequency.is_repeating() {
            break;
        }
        index += 1;
    }

    if projection.truncated {
        warn!(
            task_id = %task.id,
            cap,
            emitted = projection.dates.len(),
            "occurrence projection truncated by iteration cap"
        );
    }
    projection
}

use chrono::NaiveDate;
use tracing::debug;

use crate::model::{Plan, Task};

/// Latest of each task's deadline (or scheduled date when it has none),
/// never earlier than `floor`.
pub fn aggregate_deadline<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    floor: Option<NaiveDate>,
) -> Option<NaiveDate> {
    tasks
        .into_iter()
        .filter_map(|task| task.deadline.or(task.scheduled_date))
        .chain(floor)
        .max()
}

impl Plan {
    /// Recomputes the rollup after a task mutation, keeping the prior value as
    /// a floor.
    pub fn refresh_deadline(&mut self) -> Option<NaiveDate> {
        let refreshed = aggregate_deadline(&self.tasks, self.deadline);
        if refreshed != self.deadline {
            debug!(
                plan_id = %self.id,
                previous = ?self.deadline,
                ?refreshed,
                "plan deadline moved"
            );
        }
        self.deadline = refreshed;
        refreshed
    }

    /// Recomputes the rollup from the tasks alone, letting it shrink.
    pub fn recompute_deadline(&mut self) -> Option<NaiveDate> {
        self.deadline = aggregate_deadline(&self.tasks, None);
        self.deadline
    }
}

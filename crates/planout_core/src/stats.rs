use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::model::{Plan, Task};
use crate::occurrence::{project_with_cap, DEFAULT_ITERATION_CAP};

/// Default walk length for a task with neither deadline nor horizon.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// Occurrence counts for one task.
///
/// Future occurrences that were skipped ahead of time land in
/// `skipped_future`: they are neither pending nor part of the past, so
/// `completed_past() + skipped_past == past` and
/// `past + pending_future + skipped_future == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: u32,
    pub past: u32,
    pub skipped_past: u32,
    pub skipped_future: u32,
    pub pending_future: u32,
    pub truncated: bool,
}

impl TaskStats {
    /// Derived from `past`, never counted separately.
    pub fn completed_past(&self) -> u32 {
        self.past - self.skipped_past
    }
}

pub fn task_stats(task: &Task, horizon: Option<NaiveDate>, today: NaiveDate) -> TaskStats {
    task_stats_with_cap(task, horizon, today, DEFAULT_ITERATION_CAP)
}

/// Walks every occurrence from the anchor to `min(deadline, horizon)`.
pub fn task_stats_with_cap(
    task: &Task,
    horizon: Option<NaiveDate>,
    today: NaiveDate,
    cap: u32,
) -> TaskStats {
    let Some(anchor) = task.scheduled_date else {
        return TaskStats::default();
    };
    let end = match (task.deadline, horizon) {
        (Some(deadline), Some(horizon)) => deadline.min(horizon),
        (Some(deadline), None) => deadline,
        (None, Some(horizon)) => horizon,
        (None, None) => today
            .checked_add_months(Months::new(DEFAULT_HORIZON_MONTHS))
            .unwrap_or(today),
    };

    let projection = project_with_cap(task, anchor, end, cap);
    let mut stats = TaskStats {
        truncated: projection.truncated,
        ..TaskStats::default()
    };
    for date in projection.dates {
        stats.total += 1;
        let skipped = task.history.is_skipped(date);
        if date < today {
            stats.past += 1;
            if skipped {
                stats.skipped_past += 1;
            }
        } else if skipped {
            stats.skipped_future += 1;
        } else {
            stats.pending_future += 1;
        }
    }
    stats
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanStats {
    pub tasks: Vec<(String, TaskStats)>,
    pub total_minutes: u64,
    pub completed_minutes: u64,
    pub truncated: bool,
}

impl PlanStats {
    /// Completed share of scheduled minutes, 0 to 100.
    pub fn percentage(&self) -> u8 {
        if self.total_minutes == 0 {
            return 0;
        }
        let ratio = 100.0 * self.completed_minutes as f64 / self.total_minutes as f64;
        ratio.round().clamp(0.0, 100.0) as u8
    }
}

/// Aggregates every task of the plan, using the plan deadline as horizon.
pub fn plan_stats(plan: &Plan, today: NaiveDate) -> PlanStats {
    plan_stats_with_cap(plan, today, DEFAULT_ITERATION_CAP)
}

pub fn plan_stats_with_cap(plan: &Plan, today: NaiveDate, cap: u32) -> PlanStats {
    let mut stats = PlanStats::default();
    for task in &plan.tasks {
        let task_stats = task_stats_with_cap(task, plan.deadline, today, cap);
        let minutes = u64::from(task.duration_minutes);
        stats.total_minutes += u64::from(task_stats.total) * minutes;
        stats.completed_minutes += u64::from(task_stats.completed_past()) * minutes;
        stats.truncated |= task_stats.truncated;
        stats.tasks.push((task.id.clone(), task_stats));
    }
    stats
}

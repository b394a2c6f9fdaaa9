//! Task drafts: suggested or user-entered tasks before they join a plan.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{lenient_date, Frequency};
use crate::model::{
    History, Task, TaskStatus, DEFAULT_DURATION_MINUTES, DEFAULT_ESTIMATED_HOURS,
    DEFAULT_PLAN_COLOR,
};

/// Prefix given to the single fallback draft of an unstructured description.
const FALLBACK_PREFIX: &str = "Execute plan: ";
const FALLBACK_TITLE_CHARS: usize = 50;
const STEP_MARKER: &str = "Step ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_estimated_hours")]
    pub estimated_hours: f64,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            estimated_hours: DEFAULT_ESTIMATED_HOURS,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            frequency: Frequency::Once,
            scheduled_date: None,
            deadline: None,
        }
    }

    /// Turns the draft into a task with an empty history.
    pub fn into_task(self, id: impl Into<String>) -> Task {
        Task {
            id: id.into(),
            title: self.title,
            description: self.description,
            status: TaskStatus::Todo,
            estimated_hours: self.estimated_hours,
            duration_minutes: self.duration_minutes,
            frequency: self.frequency,
            scheduled_date: self.scheduled_date,
            deadline: self.deadline,
            history: History::default(),
        }
    }

    /// Fills a missing deadline from the effort estimate.
    pub fn with_estimated_deadline(mut self, today: NaiveDate) -> Self {
        if self.deadline.is_none() {
            self.deadline = estimate(
                self.estimated_hours,
                self.duration_minutes,
                self.frequency,
                self.scheduled_date.unwrap_or(today),
            );
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
}

impl PlanDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            color: default_color(),
            deadline: None,
        }
    }
}

/// Gives consecutive dates to drafts lacking one, `per_day` drafts per day
/// starting at `start`. Drafts that already carry a date are left alone and
/// do not use up a slot.
pub fn schedule_drafts(drafts: &mut [TaskDraft], start: NaiveDate, per_day: usize) {
    let per_day = per_day.max(1);
    let mut current = start;
    let mut placed_today = 0;
    for draft in drafts.iter_mut().filter(|d| d.scheduled_date.is_none()) {
        draft.scheduled_date = Some(current);
        placed_today += 1;
        if placed_today >= per_day {
            current += Duration::days(1);
            placed_today = 0;
        }
    }
}

/// Deadline implied by the effort estimate: one session per period until
/// `estimated_hours` are used up, counted from the scheduled date (or
/// `today`). One-off tasks spread their sessions over consecutive days.
pub fn estimate_deadline(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    estimate(
        task.estimated_hours,
        task.duration_minutes,
        task.frequency,
        task.scheduled_date.unwrap_or(today),
    )
}

fn estimate(
    hours: f64,
    duration_minutes: u32,
    frequency: Frequency,
    start: NaiveDate,
) -> Option<NaiveDate> {
    if hours <= 0.0 || !hours.is_finite() {
        return None;
    }
    let session_minutes = match duration_minutes {
        0 => 60,
        minutes => minutes,
    };
    let sessions = hours / (f64::from(session_minutes) / 60.0);
    let periods = i32::try_from(sessions.floor() as i64).ok()?;
    match frequency {
        Frequency::Once => Frequency::Daily.advance(start, periods),
        frequency => frequency.advance(start, periods),
    }
}

/// Breaks a free-text description into draft titles, one per line. A line
/// holding several "Step " markers is split at each marker.
pub fn suggest_drafts(description: &str) -> Vec<TaskDraft> {
    let mut drafts = Vec::new();
    for line in description.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.matches(STEP_MARKER).count() > 1 {
            let mut parts = line.split(STEP_MARKER).map(str::trim);
            if let Some(lead) = parts.next().filter(|p| !p.is_empty()) {
                drafts.push(TaskDraft::new(lead));
            }
            drafts.extend(
                parts
                    .filter(|p| !p.is_empty())
                    .map(|p| TaskDraft::new(format!("{STEP_MARKER}{p}"))),
            );
        } else {
            drafts.push(TaskDraft::new(line));
        }
    }

    if drafts.is_empty() && !description.is_empty() {
        let head: String = description.chars().take(FALLBACK_TITLE_CHARS).collect();
        drafts.push(TaskDraft::new(format!("{FALLBACK_PREFIX}{head}")));
    }
    drafts
}

fn default_color() -> String {
    DEFAULT_PLAN_COLOR.to_string()
}

fn default_duration_minutes() -> u32 {
    DEFAULT_DURATION_MINUTES
}

fn default_estimated_hours() -> f64 {
    DEFAULT_ESTIMATED_HOURS
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{lenient_date, Frequency, Recurrence};
use crate::error::ModelError;

pub const DEFAULT_PLAN_COLOR: &str = "#3b82f6";
pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const DEFAULT_ESTIMATED_HOURS: f64 = 1.0;

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    Skipped,
    Deferred,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Skipped => "SKIPPED",
            TaskStatus::Deferred => "DEFERRED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            "SKIPPED" => Ok(TaskStatus::Skipped),
            "DEFERRED" => Ok(TaskStatus::Deferred),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Exception ledger of a task, keyed by the occurrence's natural date.
///
/// A date is either skipped or a deferral origin, never both; the engine keeps
/// it that way and treats a ledger that violates it as "skip wins".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct History {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub skipped: BTreeSet<NaiveDate>,
    /// origin date -> target date
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deferred: BTreeMap<NaiveDate, NaiveDate>,
    /// Sparse per-occurrence status; absent means the default for that occurrence.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub statuses: BTreeMap<NaiveDate, TaskStatus>,
}

impl History {
    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty() && self.deferred.is_empty() && self.statuses.is_empty()
    }

    pub fn is_skipped(&self, date: NaiveDate) -> bool {
        self.skipped.contains(&date)
    }

    pub fn deferred_target(&self, origin: NaiveDate) -> Option<NaiveDate> {
        self.deferred.get(&origin).copied()
    }

    /// Origins whose occurrence was moved onto `day`.
    pub fn arrivals_on(&self, day: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        self.deferred
            .iter()
            .filter(move |(_, target)| **target == day)
            .map(|(origin, _)| *origin)
    }
}

/// A schedulable chunk of work belonging to exactly one plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Status of the anchor (or last acted-on) occurrence, not of every repeat.
    #[serde(default)]
    pub status: TaskStatus,
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
    #[serde(default, skip_serializing_if = "History::is_empty")]
    pub history: History,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            estimated_hours: DEFAULT_ESTIMATED_HOURS,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            frequency: Frequency::Once,
            scheduled_date: None,
            deadline: None,
            history: History::default(),
        }
    }

    pub fn scheduled(mut self, date: NaiveDate, frequency: Frequency) -> Self {
        self.scheduled_date = Some(date);
        self.frequency = frequency;
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// The series this task generates; `None` while unscheduled.
    pub fn recurrence(&self) -> Option<Recurrence> {
        self.scheduled_date
            .map(|anchor| Recurrence::new(anchor, self.frequency))
    }

    pub fn is_repeating(&self) -> bool {
        self.frequency.is_repeating()
    }
}

/// Partial task update handed to the persistence collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<History>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(minutes) = self.duration_minutes {
            task.duration_minutes = minutes;
        }
        if let Some(frequency) = self.frequency {
            task.frequency = frequency;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = Some(deadline);
        }
        if let Some(history) = &self.history {
            task.history = history.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Derived rollup of the task deadlines; never authoritative.
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
    #[serde(default, rename = "chunks", alias = "tasks")]
    pub tasks: Vec<Task>,
}

impl Plan {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            color: default_color(),
            created_at: None,
            deadline: None,
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        default,
        with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
}

impl PlanPatch {
    pub fn apply(&self, plan: &mut Plan) {
        if let Some(title) = &self.title {
            plan.title = title.clone();
        }
        if let Some(description) = &self.description {
            plan.description = description.clone();
        }
        if let Some(color) = &self.color {
            plan.color = color.clone();
        }
        if let Some(deadline) = self.deadline {
            plan.deadline = Some(deadline);
        }
    }
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

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::Frequency;
use crate::model::{Plan, Task};
use crate::overlay::{occurrences_with_cap, Occurrence};

/// One occurrence placed on the calendar, with enough plan context to render it.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaEntry {
    pub plan_id: String,
    pub plan_title: String,
    pub plan_color: String,
    pub task_id: String,
    pub title: String,
    pub duration_minutes: u32,
    pub frequency: Frequency,
    pub occurrence: Occurrence,
}

impl AgendaEntry {
    pub fn new(plan: &Plan, task: &Task, occurrence: Occurrence) -> Self {
        Self {
            plan_id: plan.id.clone(),
            plan_title: plan.title.clone(),
            plan_color: plan.color.clone(),
            task_id: task.id.clone(),
            title: task.title.clone(),
            duration_minutes: task.duration_minutes,
            frequency: task.frequency,
            occurrence,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.occurrence.date
    }
}

impl PartialEq for AgendaEntry {
    fn eq(&self, other: &Self) -> bool {
        self.plan_id == other.plan_id
            && self.task_id == other.task_id
            && self.occurrence == other.occurrence
    }
}

impl Eq for AgendaEntry {}

impl PartialOrd for AgendaEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AgendaEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.occurrence
            .date
            .cmp(&other.occurrence.date)
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.plan_id.cmp(&other.plan_id))
            .then_with(|| self.task_id.cmp(&other.task_id))
            .then_with(|| self.occurrence.origin.cmp(&other.occurrence.origin))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Agenda {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub entries: Vec<AgendaEntry>,
    /// Some task hit the projection cap; counts may be low.
    pub truncated: bool,
}

impl Agenda {
    pub fn on(&self, day: NaiveDate) -> impl Iterator<Item = &AgendaEntry> {
        self.entries.iter().filter(move |entry| entry.date() == day)
    }
}

/// Projects every task of every plan into `[start, end]`.
pub fn build_agenda(plans: &[Plan], start: NaiveDate, end: NaiveDate, cap: u32) -> Agenda {
    let mut agenda = Agenda {
        start,
        end,
        ..Agenda::default()
    };
    for plan in plans {
        for task in &plan.tasks {
            let window = occurrences_with_cap(task, start, end, cap);
            agenda.truncated |= window.truncated;
            agenda.entries.extend(
                window
                    .occurrences
                    .into_iter()
                    .map(|occurrence| AgendaEntry::new(plan, task, occurrence)),
            );
        }
    }
    agenda.entries.sort();
    agenda
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    Week,
    Month,
    Year,
}

/// Calendar range shown for `mode` around `date`. Weeks start on Sunday.
pub fn view_range(mode: ViewMode, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    match mode {
        ViewMode::Day => (date, date),
        ViewMode::Week => {
            let back = i64::from(date.weekday().num_days_from_sunday());
            let start = date - Duration::days(back);
            (start, start + Duration::days(6))
        }
        ViewMode::Month => {
            let start = date.with_day(1).unwrap_or(date);
            let end = Frequency::Monthly
                .advance(start, 1)
                .and_then(|next| next.pred_opt())
                .unwrap_or(start);
            (start, end)
        }
        ViewMode::Year => {
            let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
            let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
            (start, end)
        }
    }
}

/// Moves the calendar `steps` views forward (negative for backward).
pub fn navigate(mode: ViewMode, date: NaiveDate, steps: i32) -> NaiveDate {
    let moved = match mode {
        ViewMode::Day => Frequency::Daily.advance(date, steps),
        ViewMode::Week => Frequency::Weekly.advance(date, steps),
        ViewMode::Month => Frequency::Monthly.advance(date, steps),
        ViewMode::Year => steps
            .checked_mul(12)
            .and_then(|months| Frequency::Monthly.advance(date, months)),
    };
    moved.unwrap_or(date)
}

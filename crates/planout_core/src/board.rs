use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Plan, TaskStatus};
use crate::occurrence::DEFAULT_ITERATION_CAP;
use crate::overlay::occurrences_with_cap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardCard {
    pub task_id: String,
    pub title: String,
    pub duration_minutes: u32,
    pub origin: NaiveDate,
    pub status: TaskStatus,
}

impl BoardCard {
    pub fn is_relocated(&self, day: NaiveDate) -> bool {
        self.origin != day
    }
}

/// Status columns for the tasks of one plan that are active on `day`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub day: NaiveDate,
    pub todo: Vec<BoardCard>,
    pub in_progress: Vec<BoardCard>,
    pub done: Vec<BoardCard>,
    pub skipped: Vec<BoardCard>,
    /// Some task's projection hit the iteration cap before reaching `day`.
    pub truncated: bool,
}

impl Board {
    fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            todo: Vec::new(),
            in_progress: Vec::new(),
            done: Vec::new(),
            skipped: Vec::new(),
            truncated: false,
        }
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<BoardCard> {
        match status {
            // a deferred occurrence is still waiting to be done
            TaskStatus::Todo | TaskStatus::Deferred => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Done => &mut self.done,
            TaskStatus::Skipped => &mut self.skipped,
        }
    }
}

pub fn board(plan: &Plan, day: NaiveDate) -> Board {
    board_with_cap(plan, day, DEFAULT_ITERATION_CAP)
}

pub fn board_with_cap(plan: &Plan, day: NaiveDate, cap: u32) -> Board {
    let mut board = Board::empty(day);
    for task in &plan.tasks {
        let window = occurrences_with_cap(task, day, day, cap);
        board.truncated |= window.truncated;
        for occurrence in window.occurrences {
            board.column_mut(occurrence.status).push(BoardCard {
                task_id: task.id.clone(),
                title: task.title.clone(),
                duration_minutes: task.duration_minutes,
                origin: occurrence.origin,
                status: occurrence.status,
            });
        }
    }
    board
}

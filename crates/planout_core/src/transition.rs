//! Occurrence-level actions: skip, unskip, defer and status changes.
//!
//! Each action mutates the task in place and returns the [`TaskPatch`] the
//! persistence collaborator needs, or `None` when nothing changed. `date` is
//! always the occurrence's natural (origin) date.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::calendar::Frequency;
use crate::model::{Task, TaskPatch, TaskStatus};
use crate::overlay::is_natural_occurrence;

/// Days a one-off task may be deferred ahead of today.
pub const ONCE_DEFER_WINDOW_DAYS: i64 = 365;

/// Natural date of the occurrence shown on `date`.
///
/// A natural occurrence still sitting on its own date wins; otherwise a
/// deferred occurrence that arrived on `date` is mapped back to its origin.
fn occurrence_origin(task: &Task, date: NaiveDate) -> NaiveDate {
    let stays_put =
        is_natural_occurrence(task, date) && task.history.deferred_target(date).is_none();
    if stays_put {
        return date;
    }
    task.history.arrivals_on(date).next().unwrap_or(date)
}

/// Keeps the anchor's display status when `task.status` is about to be
/// overwritten on behalf of a later repeat.
fn pin_anchor_status(task: &mut Task, anchor: NaiveDate) {
    if task.history.is_skipped(anchor) || task.history.statuses.contains_key(&anchor) {
        return;
    }
    let status = match task.status {
        TaskStatus::Skipped => TaskStatus::Todo,
        status => status,
    };
    task.history.statuses.insert(anchor, status);
}

/// Marks one occurrence skipped and grows the series by one period.
///
/// `date` may be the occurrence's natural date or the date a deferral moved it
/// to. Dates that are not occurrences of the task are ignored.
pub fn skip(task: &mut Task, date: NaiveDate) -> Option<TaskPatch> {
    let series = task.recurrence()?;
    let origin = occurrence_origin(task, date);
    if task.history.is_skipped(origin) {
        debug!(task_id = %task.id, %origin, "occurrence already skipped");
        return None;
    }
    if !is_natural_occurrence(task, origin) {
        debug!(task_id = %task.id, %date, "not an occurrence; skip ignored");
        return None;
    }

    if origin != series.anchor {
        pin_anchor_status(task, series.anchor);
    }
    task.history.skipped.insert(origin);
    task.history.deferred.remove(&origin);
    task.history.statuses.remove(&origin);
    task.status = TaskStatus::Skipped;

    let baseline = task.deadline.unwrap_or(series.anchor);
    let extended = series.shift(baseline, 1).unwrap_or(baseline);
    task.deadline = Some(extended);
    debug!(task_id = %task.id, %origin, %baseline, %extended, "occurrence skipped");

    Some(TaskPatch {
        status: Some(TaskStatus::Skipped),
        deadline: Some(extended),
        history: Some(task.history.clone()),
        ..TaskPatch::default()
    })
}

/// Reverses [`skip`]: the deadline shrinks by one period but never before the
/// anchor.
pub fn unskip(task: &mut Task, date: NaiveDate) -> Option<TaskPatch> {
    let series = task.recurrence()?;
    let origin = occurrence_origin(task, date);
    if !task.history.skipped.remove(&origin) {
        return None;
    }

    let baseline = task.deadline.unwrap_or(series.anchor);
    let retracted = series
        .shift(baseline, -1)
        .unwrap_or(baseline)
        .max(series.anchor);
    task.deadline = Some(retracted);
    debug!(task_id = %task.id, %origin, %baseline, %retracted, "occurrence unskipped");

    let mut patch = TaskPatch {
        deadline: Some(retracted),
        history: Some(task.history.clone()),
        ..TaskPatch::default()
    };
    if origin == series.anchor && task.status == TaskStatus::Skipped {
        task.status = TaskStatus::Todo;
        patch.status = Some(TaskStatus::Todo);
    }
    Some(patch)
}

/// Relocates the occurrence shown on `from` to `to` without touching the
/// deadline.
///
/// `from` may be a natural date or the current target of an earlier deferral;
/// in the latter case the existing deferral is re-pointed, and moving an
/// occurrence back onto its origin clears the deferral. Skipped occurrences
/// must be unskipped before they can be deferred.
pub fn defer(task: &mut Task, from: NaiveDate, to: NaiveDate) -> Option<TaskPatch> {
    task.recurrence()?;
    if from == to {
        return None;
    }

    let origin = occurrence_origin(task, from);
    if task.history.is_skipped(origin) {
        debug!(task_id = %task.id, %origin, "refusing to defer a skipped occurrence");
        return None;
    }
    if !is_natural_occurrence(task, origin) {
        debug!(task_id = %task.id, %from, "not an occurrence; deferral ignored");
        return None;
    }

    if origin == to {
        task.history.deferred.remove(&origin);
    } else {
        task.history.deferred.insert(origin, to);
    }
    debug!(task_id = %task.id, %origin, %to, "occurrence deferred");

    Some(TaskPatch {
        history: Some(task.history.clone()),
        ..TaskPatch::default()
    })
}

/// Moves one occurrence to `status`.
///
/// SKIPPED delegates to [`skip`]. DEFERRED needs a target date and is ignored
/// here; use [`defer`]. Any other status first unskips the occurrence when it
/// was skipped. Only the anchor occurrence mirrors its status into
/// `task.status`; later repeats keep theirs in the history.
pub fn set_occurrence_status(
    task: &mut Task,
    date: NaiveDate,
    status: TaskStatus,
) -> Option<TaskPatch> {
    match status {
        TaskStatus::Skipped => return skip(task, date),
        TaskStatus::Deferred => {
            debug!(task_id = %task.id, %date, "deferral requires a target date");
            return None;
        }
        TaskStatus::Todo | TaskStatus::InProgress | TaskStatus::Done => {}
    }

    let series = task.recurrence()?;
    let origin = occurrence_origin(task, date);
    if !task.history.is_skipped(origin) && !is_natural_occurrence(task, origin) {
        debug!(task_id = %task.id, %date, "not an occurrence; status ignored");
        return None;
    }

    let before = (task.history.clone(), task.status);
    let mut patch = unskip(task, origin).unwrap_or_default();
    if status == TaskStatus::Todo {
        task.history.statuses.remove(&origin);
    } else {
        task.history.statuses.insert(origin, status);
    }
    if origin == series.anchor {
        task.status = status;
        patch.status = Some(status);
    }
    if (task.history.clone(), task.status) == before {
        return None;
    }
    patch.history = Some(task.history.clone());
    debug!(task_id = %task.id, %origin, %status, "occurrence status set");
    Some(patch)
}

/// Dates an occurrence may be deferred to: tomorrow through one period ahead.
pub fn defer_window(task: &Task, today: NaiveDate) -> Vec<NaiveDate> {
    let Some(first) = today.succ_opt() else {
        return Vec::new();
    };
    let last = match task.frequency {
        Frequency::Once => today.checked_add_signed(Duration::days(ONCE_DEFER_WINDOW_DAYS)),
        frequency => frequency.advance(today, 1),
    };
    let Some(last) = last else {
        return Vec::new();
    };
    first.iter_days().take_while(|day| *day <= last).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{day_view, display_status, occurrences};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly() -> Task {
        Task::new("t", "Lesson").scheduled(date(2024, 1, 1), Frequency::Weekly)
    }

    #[test]
    fn skip_extends_from_the_anchor_when_no_deadline() {
        let mut task = weekly();
        let patch = skip(&mut task, date(2024, 1, 8)).expect("skip applies");
        assert_eq!(task.deadline, Some(date(2024, 1, 8)));
        assert_eq!(task.status, TaskStatus::Skipped);
        assert_eq!(patch.deadline, Some(date(2024, 1, 8)));
        assert_eq!(patch.status, Some(TaskStatus::Skipped));
        assert!(patch
            .history
            .as_ref()
            .is_some_and(|h| h.is_skipped(date(2024, 1, 8))));
    }

    #[test]
    fn skip_extends_an_existing_deadline() {
        let mut task = weekly().with_deadline(date(2024, 2, 26));
        skip(&mut task, date(2024, 1, 15));
        assert_eq!(task.deadline, Some(date(2024, 3, 4)));
    }

    #[test]
    fn skipping_twice_is_a_no_op() {
        let mut task = weekly();
        skip(&mut task, date(2024, 1, 8));
        assert!(skip(&mut task, date(2024, 1, 8)).is_none());
        assert_eq!(task.deadline, Some(date(2024, 1, 8)));
    }

    #[test]
    fn skip_then_unskip_round_trips_the_deadline() {
        let mut task = weekly().with_deadline(date(2024, 3, 4));
        skip(&mut task, date(2024, 1, 22));
        unskip(&mut task, date(2024, 1, 22)).expect("unskip applies");
        assert_eq!(task.deadline, Some(date(2024, 3, 4)));
        assert!(task.history.skipped.is_empty());
    }

    #[test]
    fn unskip_clamps_to_the_anchor() {
        let mut task = weekly();
        task.history.skipped.insert(date(2024, 1, 1));
        unskip(&mut task, date(2024, 1, 1));
        assert_eq!(task.deadline, Some(date(2024, 1, 1)));
    }

    #[test]
    fn unskip_of_an_active_date_changes_nothing() {
        let mut task = weekly().with_deadline(date(2024, 2, 5));
        assert!(unskip(&mut task, date(2024, 1, 8)).is_none());
        assert_eq!(task.deadline, Some(date(2024, 2, 5)));
    }

    #[test]
    fn monthly_skip_uses_the_projection_month_rule() {
        let mut task = Task::new("t", "Rent").scheduled(date(2024, 1, 31), Frequency::Monthly);
        skip(&mut task, date(2024, 1, 31));
        assert_eq!(task.deadline, Some(date(2024, 2, 29)));
        skip(&mut task, date(2024, 2, 29));
        assert_eq!(task.deadline, Some(date(2024, 3, 31)));
        unskip(&mut task, date(2024, 2, 29));
        assert_eq!(task.deadline, Some(date(2024, 2, 29)));
    }

    #[test]
    fn once_task_skip_pins_the_deadline_to_the_anchor() {
        let mut task = Task::new("t", "Dentist").scheduled(date(2024, 3, 1), Frequency::Once);
        skip(&mut task, date(2024, 3, 1));
        assert_eq!(task.deadline, Some(date(2024, 3, 1)));
    }

    #[test]
    fn unscheduled_tasks_ignore_occurrence_actions() {
        let mut task = Task::new("t", "Someday");
        assert!(skip(&mut task, date(2024, 1, 1)).is_none());
        assert!(defer(&mut task, date(2024, 1, 1), date(2024, 1, 2)).is_none());
        assert!(task.history.is_empty());
    }

    #[test]
    fn defer_leaves_the_deadline_alone() {
        let mut task = weekly().with_deadline(date(2024, 2, 26));
        let patch = defer(&mut task, date(2024, 1, 8), date(2024, 1, 10)).expect("deferred");
        assert_eq!(patch.deadline, None);
        assert_eq!(task.deadline, Some(date(2024, 2, 26)));
        assert_eq!(
            task.history.deferred_target(date(2024, 1, 8)),
            Some(date(2024, 1, 10))
        );
    }

    #[test]
    fn deferring_an_arrival_re_points_the_origin() {
        let mut task = weekly();
        defer(&mut task, date(2024, 1, 8), date(2024, 1, 10));
        defer(&mut task, date(2024, 1, 10), date(2024, 1, 12));
        assert_eq!(task.history.deferred.len(), 1);
        assert_eq!(
            task.history.deferred_target(date(2024, 1, 8)),
            Some(date(2024, 1, 12))
        );

        defer(&mut task, date(2024, 1, 12), date(2024, 1, 8));
        assert!(task.history.deferred.is_empty());
    }

    #[test]
    fn skipping_a_deferred_origin_drops_the_deferral() {
        let mut task = weekly();
        defer(&mut task, date(2024, 1, 8), date(2024, 1, 10));
        skip(&mut task, date(2024, 1, 8));
        assert!(task.history.deferred.is_empty());
        assert!(defer(&mut task, date(2024, 1, 8), date(2024, 1, 9)).is_none());
    }

    #[test]
    fn marking_done_unskips_and_records_the_occurrence() {
        let mut task = weekly();
        skip(&mut task, date(2024, 1, 8));
        let patch = set_occurrence_status(&mut task, date(2024, 1, 8), TaskStatus::Done)
            .expect("status applied");
        assert_eq!(patch.deadline, Some(date(2024, 1, 1)));
        assert_eq!(task.deadline, Some(date(2024, 1, 1)));
        assert!(!task.history.is_skipped(date(2024, 1, 8)));
        assert_eq!(
            task.history.statuses.get(&date(2024, 1, 8)),
            Some(&TaskStatus::Done)
        );
    }

    #[test]
    fn acting_on_a_repeat_leaves_the_anchor_alone() {
        let mut task = weekly().with_deadline(date(2024, 1, 29));
        skip(&mut task, date(2024, 1, 8)).expect("skip applies");
        assert_eq!(task.status, TaskStatus::Skipped);
        assert_eq!(display_status(&task, date(2024, 1, 1)), TaskStatus::Todo);
        let shown: Vec<(NaiveDate, TaskStatus)> =
            occurrences(&task, date(2024, 1, 1), date(2024, 1, 8))
                .occurrences
                .iter()
                .map(|o| (o.date, o.status))
                .collect();
        assert_eq!(
            shown,
            vec![
                (date(2024, 1, 1), TaskStatus::Todo),
                (date(2024, 1, 8), TaskStatus::Skipped)
            ]
        );

        let patch = set_occurrence_status(&mut task, date(2024, 1, 15), TaskStatus::Done)
            .expect("status applied");
        assert_eq!(patch.status, None);
        assert_eq!(display_status(&task, date(2024, 1, 1)), TaskStatus::Todo);
        assert_eq!(display_status(&task, date(2024, 1, 15)), TaskStatus::Done);
    }

    #[test]
    fn anchor_status_is_mirrored_into_the_task() {
        let mut task = weekly();
        let patch = set_occurrence_status(&mut task, date(2024, 1, 1), TaskStatus::InProgress)
            .expect("status applied");
        assert_eq!(patch.status, Some(TaskStatus::InProgress));
        assert_eq!(task.status, TaskStatus::InProgress);

        skip(&mut task, date(2024, 1, 1));
        unskip(&mut task, date(2024, 1, 1)).expect("unskip applies");
        assert_eq!(display_status(&task, date(2024, 1, 1)), TaskStatus::Todo);
    }

    #[test]
    fn skipping_an_arrival_skips_its_origin() {
        let mut task = weekly().with_deadline(date(2024, 1, 29));
        defer(&mut task, date(2024, 1, 8), date(2024, 1, 10));
        skip(&mut task, date(2024, 1, 10)).expect("skip applies");

        assert!(task.history.is_skipped(date(2024, 1, 8)));
        assert!(!task.history.is_skipped(date(2024, 1, 10)));
        assert!(task.history.deferred.is_empty());
        assert_eq!(task.deadline, Some(date(2024, 2, 5)));
        assert!(day_view(&task, date(2024, 1, 10)).is_empty());
        assert_eq!(day_view(&task, date(2024, 1, 8))[0].status, TaskStatus::Skipped);
    }

    #[test]
    fn dates_off_the_series_are_ignored() {
        let mut task = weekly().with_deadline(date(2024, 1, 29));
        assert!(skip(&mut task, date(2024, 1, 9)).is_none());
        assert!(skip(&mut task, date(2024, 2, 5)).is_none());
        assert!(set_occurrence_status(&mut task, date(2024, 1, 9), TaskStatus::Done).is_none());
        assert!(defer(&mut task, date(2024, 1, 9), date(2024, 1, 10)).is_none());
        assert_eq!(task.deadline, Some(date(2024, 1, 29)));
        assert!(task.history.is_empty());
    }

    #[test]
    fn deferred_status_needs_a_target() {
        let mut task = weekly();
        assert!(set_occurrence_status(&mut task, date(2024, 1, 8), TaskStatus::Deferred).is_none());
    }

    #[test]
    fn defer_window_spans_one_period() {
        let today = date(2024, 1, 10);
        let daily = Task::new("t", "x").scheduled(today, Frequency::Daily);
        assert_eq!(defer_window(&daily, today), vec![date(2024, 1, 11)]);

        let weekly = Task::new("t", "x").scheduled(today, Frequency::Weekly);
        let window = defer_window(&weekly, today);
        assert_eq!(window.first(), Some(&date(2024, 1, 11)));
        assert_eq!(window.last(), Some(&date(2024, 1, 17)));

        let once = Task::new("t", "x").scheduled(today, Frequency::Once);
        assert_eq!(defer_window(&once, today).len(), 365);
    }
}

use chrono::{Duration, NaiveDate};

use planout_core::bucket::build_slots;
use planout_core::overlay::{display_status, occurrences};
use planout_core::stats::task_stats;
use planout_core::transition::{skip, unskip};
use planout_core::{project, Frequency, Plan, Task, TaskStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn weekly_lesson() -> Task {
    Task::new("lesson", "Guitar lesson").scheduled(date(2024, 1, 1), Frequency::Weekly)
}

#[test]
fn weekly_task_projects_every_monday_in_january() {
    let projection = project(&weekly_lesson(), date(2024, 1, 1), date(2024, 1, 31));
    assert!(!projection.truncated);
    assert_eq!(
        projection.dates,
        vec![
            date(2024, 1, 1),
            date(2024, 1, 8),
            date(2024, 1, 15),
            date(2024, 1, 22),
            date(2024, 1, 29),
        ]
    );
}

#[test]
fn skipping_the_second_lesson_sets_the_deadline_one_week_out() {
    let mut task = weekly_lesson();
    skip(&mut task, date(2024, 1, 8)).expect("skip applies");

    assert_eq!(task.deadline, Some(date(2024, 1, 8)));
    assert_eq!(display_status(&task, date(2024, 1, 8)), TaskStatus::Skipped);
    assert_eq!(display_status(&task, date(2024, 1, 15)), TaskStatus::Todo);
    assert_eq!(display_status(&task, date(2024, 1, 1)), TaskStatus::Todo);
}

#[test]
fn monthly_projection_and_deadline_share_one_month_rule() {
    let mut task = Task::new("rent", "Pay rent").scheduled(date(2024, 1, 31), Frequency::Monthly);
    let projection = project(&task, date(2024, 1, 1), date(2024, 4, 30));
    assert_eq!(
        projection.dates,
        vec![
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2024, 3, 31),
            date(2024, 4, 30),
        ]
    );

    task.deadline = Some(date(2024, 2, 29));
    skip(&mut task, date(2024, 1, 31));
    assert_eq!(task.deadline, Some(date(2024, 3, 31)));
    assert!(project(&task, date(2024, 1, 1), date(2024, 12, 31))
        .dates
        .contains(&date(2024, 3, 31)));
}

#[test]
fn once_task_yields_at_most_its_anchor() {
    let task = Task::new("dentist", "Dentist").scheduled(date(2024, 3, 1), Frequency::Once);
    assert_eq!(
        project(&task, date(2024, 1, 1), date(2024, 12, 31)).dates,
        vec![date(2024, 3, 1)]
    );
    assert!(project(&task, date(2024, 3, 2), date(2024, 12, 31)).is_empty());
    assert!(project(&task, date(2024, 1, 1), date(2024, 2, 29)).is_empty());
}

#[test]
fn degenerate_inputs_produce_empty_projections() {
    let task = weekly_lesson().with_deadline(date(2023, 12, 1));
    assert!(project(&task, date(2023, 1, 1), date(2025, 1, 1)).is_empty());
    assert!(project(&weekly_lesson(), date(2023, 1, 1), date(2023, 12, 31)).is_empty());
    assert!(project(&Task::new("u", "Unscheduled"), date(2023, 1, 1), date(2025, 1, 1)).is_empty());
}

#[test]
fn skip_unskip_round_trips_across_many_dates() {
    let original = weekly_lesson().with_deadline(date(2024, 6, 24));
    for k in 0..20 {
        let day = date(2024, 1, 1) + Duration::weeks(k);
        let mut task = original.clone();
        skip(&mut task, day);
        unskip(&mut task, day);
        assert_eq!(task.deadline, original.deadline, "round trip on {day}");
        assert!(task.history.skipped.is_empty());
    }
}

#[test]
fn completed_and_skipped_always_add_up_to_past() {
    let mut task = Task::new("run", "Run").scheduled(date(2024, 1, 1), Frequency::Daily);
    for day in [date(2024, 1, 3), date(2024, 1, 9), date(2024, 2, 20)] {
        skip(&mut task, day);
    }
    for today in [date(2024, 1, 1), date(2024, 1, 10), date(2024, 3, 1), date(2025, 1, 1)] {
        let stats = task_stats(&task, None, today);
        assert_eq!(stats.completed_past() + stats.skipped_past, stats.past);
        assert_eq!(
            stats.past + stats.pending_future + stats.skipped_future,
            stats.total
        );
    }
}

#[test]
fn slots_never_gap_or_overlap() {
    for start in [date(2024, 1, 31), date(2024, 2, 29), date(2023, 12, 25)] {
        let slots = build_slots(start);
        assert_eq!(slots[0].start, start);
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end + Duration::days(1), pair[1].start);
            assert!(pair[0].start <= pair[0].end);
        }
    }
}

#[test]
fn plan_occurrences_respect_the_ledger() {
    let mut plan = Plan::new("guitar", "Guitar");
    plan.tasks.push(weekly_lesson().with_deadline(date(2024, 1, 29)));
    let task = plan.task_mut("lesson").expect("task exists");
    skip(task, date(2024, 1, 15));
    plan.refresh_deadline();

    let task = plan.task("lesson").expect("task exists");
    let window = occurrences(task, date(2024, 1, 1), date(2024, 1, 31));
    let skipped: Vec<NaiveDate> = window
        .occurrences
        .iter()
        .filter(|o| o.status == TaskStatus::Skipped)
        .map(|o| o.date)
        .collect();
    assert_eq!(skipped, vec![date(2024, 1, 15)]);
    assert_eq!(window.occurrences.len(), 5);
    assert_eq!(plan.deadline, Some(date(2024, 2, 5)));
}

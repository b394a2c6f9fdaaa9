use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use chrono::{Duration, Local, NaiveDate};
use planout_core::agenda::{navigate, view_range, AgendaEntry, ViewMode};
use planout_core::board::{Board, BoardCard};
use planout_core::bucket::SlotKind;
use planout_core::calendar::parse_date;
use planout_core::draft::{PlanDraft, TaskDraft};
use planout_core::{
    Frequency, ModelError, Task, TaskStatus, DEFAULT_ITERATION_CAP, MIN_ITERATION_CAP,
};
use planout_store::{JsonPlanStore, PlanService, PlanStore};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) root: PathBuf,
    pub(crate) agenda_span_days: usize,
    pub(crate) agenda_start_offset_days: i64,
    pub(crate) iteration_cap: u32,
    pub(crate) today: Option<NaiveDate>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, keeping the default for any
    /// value that is missing or does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup("PLANOUT_ROOT").filter(|root| !root.trim().is_empty()) {
            config.root = PathBuf::from(root);
        }
        if let Some(span) = lookup("PLANOUT_AGENDA_SPAN_DAYS") {
            match span.trim().parse::<usize>() {
                Ok(value) if value > 0 => config.agenda_span_days = value,
                _ => warn!(%span, "ignoring PLANOUT_AGENDA_SPAN_DAYS"),
            }
        }
        if let Some(offset) = lookup("PLANOUT_AGENDA_START_OFFSET_DAYS") {
            match offset.trim().parse::<i64>() {
                Ok(value) => config.agenda_start_offset_days = value,
                Err(_) => warn!(%offset, "ignoring PLANOUT_AGENDA_START_OFFSET_DAYS"),
            }
        }
        if let Some(cap) = lookup("PLANOUT_ITERATION_CAP") {
            match cap.trim().parse::<u32>() {
                Ok(value) => config.iteration_cap = value.max(MIN_ITERATION_CAP),
                Err(_) => warn!(%cap, "ignoring PLANOUT_ITERATION_CAP"),
            }
        }
        if let Some(today) = lookup("PLANOUT_TODAY") {
            match parse_date(&today) {
                Ok(date) => config.today = Some(date),
                Err(err) => warn!(%err, "ignoring PLANOUT_TODAY"),
            }
        }
        config
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn agenda_start(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_signed(Duration::days(self.agenda_start_offset_days))
            .unwrap_or(today)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("plans"),
            agenda_span_days: 7,
            agenda_start_offset_days: 0,
            iteration_cap: DEFAULT_ITERATION_CAP,
            today: None,
        }
    }
}

/// Plans, recurring tasks and their occurrences.
#[derive(Debug, Parser)]
#[command(name = "planout")]
#[command(about = "Recurring plan and task planner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The chosen subcommand; a bare `planout` prints the agenda.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Agenda { start: None })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Upcoming occurrences of every plan
    Agenda {
        /// First day shown, YYYY-MM-DD (defaults to today plus the configured offset)
        #[arg(value_parser = parse_date)]
        start: Option<NaiveDate>,
    },
    /// Day, week, month or year calendar around a date
    Calendar {
        /// day, week, month or year
        #[arg(value_parser = view_mode_arg)]
        mode: ViewMode,
        /// Date the view is centred on, YYYY-MM-DD
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Views to move forwards (or backwards when negative)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        step: i32,
    },
    /// Occurrences bucketed into days, weeks, months and years
    Timeline,
    /// List plans with their deadlines
    Plans,
    /// Status columns of one plan for a day
    Board {
        plan_id: String,
        #[arg(value_parser = parse_date)]
        day: Option<NaiveDate>,
    },
    /// Occurrence counts and completion of one plan
    Stats { plan_id: String },
    /// Create an empty plan
    NewPlan {
        title: String,
        description: Option<String>,
    },
    /// Add tasks scheduled from today
    Add {
        plan_id: String,
        /// Task titles (quoted if they have spaces)
        #[arg(required = true)]
        titles: Vec<String>,
        /// once, daily, weekly or monthly
        #[arg(short, long, default_value_t = Frequency::Once)]
        frequency: Frequency,
    },
    /// Task drafts split from the plan description
    Suggest { plan_id: String },
    /// Skip one occurrence, extending the task by one period
    Skip {
        plan_id: String,
        task_id: String,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Restore a skipped occurrence
    Unskip {
        plan_id: String,
        task_id: String,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Move one occurrence to another day
    Defer {
        plan_id: String,
        task_id: String,
        #[arg(value_parser = parse_date)]
        from: NaiveDate,
        #[arg(value_parser = parse_date)]
        to: NaiveDate,
    },
    /// Days an occurrence of the task may be deferred to
    DeferOptions { plan_id: String, task_id: String },
    /// Set the status of one occurrence
    Status {
        plan_id: String,
        task_id: String,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// todo, in_progress, done or skipped
        #[arg(value_parser = status_arg)]
        status: TaskStatus,
    },
    /// Remove a task from its plan
    DeleteTask { plan_id: String, task_id: String },
}

/// Opens the plan directory named by `config` and runs one command.
pub fn run(config: &AppConfig, command: Command) -> Result<String> {
    let store = JsonPlanStore::open(&config.root)
        .with_context(|| format!("failed to open plan directory {}", config.root.display()))?;
    let service = PlanService::builder(store)
        .iteration_cap(config.iteration_cap)
        .build();
    execute(&service, config, command)
}

pub fn execute<S: PlanStore>(
    service: &PlanService<S>,
    config: &AppConfig,
    command: Command,
) -> Result<String> {
    let started = Instant::now();
    let today = config.today();
    debug!(?command, %today, "executing command");
    let output = match command {
        Command::Agenda { start } => {
            let start = start.unwrap_or_else(|| config.agenda_start(today));
            let days = i64::try_from(config.agenda_span_days).unwrap_or(i64::MAX);
            let end = start
                .checked_add_signed(Duration::days(days - 1))
                .unwrap_or(start);
            render_days(service, start, end, today)?
        }
        Command::Calendar { mode, date, step } => {
            let focus = navigate(mode, date.unwrap_or(today), step);
            let (start, end) = view_range(mode, focus);
            render_days(service, start, end, today)?
        }
        Command::Timeline => render_timeline(service, today)?,
        Command::Plans => render_plans(service)?,
        Command::Board { plan_id, day } => {
            let board = service.board(&plan_id, day.unwrap_or(today))?;
            render_board(&board, today)
        }
        Command::Stats { plan_id } => render_stats(service, &plan_id, today)?,
        Command::NewPlan { title, description } => {
            let mut draft = PlanDraft::new(title);
            draft.description = description.unwrap_or_default();
            let plan = service.create_plan(draft)?;
            format!("created plan {} ({})\n", plan.title, plan.id)
        }
        Command::Add { plan_id, frequency, titles } => {
            let drafts = titles
                .into_iter()
                .map(|title| {
                    let mut draft = TaskDraft::new(title);
                    draft.frequency = frequency;
                    draft
                })
                .collect();
            let tasks = service.add_tasks(&plan_id, drafts, today)?;
            tasks.iter().map(describe_task).collect()
        }
        Command::Suggest { plan_id } => {
            let mut out = String::new();
            for draft in service.suggest(&plan_id, today)? {
                let deadline = draft
                    .deadline
                    .map(|d| format!(" by {d}"))
                    .unwrap_or_default();
                let _ = writeln!(out, "- {}{deadline}", draft.title);
            }
            out
        }
        Command::Skip { plan_id, task_id, date } => {
            outcome(
                service.skip(&plan_id, &task_id, date)?,
                "already skipped or not an occurrence",
            )
        }
        Command::Unskip { plan_id, task_id, date } => {
            outcome(service.unskip(&plan_id, &task_id, date)?, "was not skipped")
        }
        Command::Defer { plan_id, task_id, from, to } => {
            let allowed = service.defer_options(&plan_id, &task_id, today)?;
            if !allowed.contains(&to) {
                let last = allowed.last().ok_or_else(|| anyhow!("no deferral targets"))?;
                bail!("{to} is outside the deferral window (tomorrow through {last})");
            }
            outcome(
                service.defer(&plan_id, &task_id, from, to)?,
                "occurrence cannot be deferred",
            )
        }
        Command::DeferOptions { plan_id, task_id } => {
            let options = service.defer_options(&plan_id, &task_id, today)?;
            match (options.first(), options.last()) {
                (Some(first), Some(last)) => format!("{first} through {last}\n"),
                _ => "no deferral targets\n".to_string(),
            }
        }
        Command::Status { plan_id, task_id, date, status } => {
            match service.set_status(&plan_id, &task_id, date, status)? {
                Some(task) => format!("{} on {date} is now {status}\n", task.title),
                None => "nothing changed: status unchanged or not an occurrence\n".to_string(),
            }
        }
        Command::DeleteTask { plan_id, task_id } => {
            service.delete_task(&plan_id, &task_id)?;
            format!("deleted task {task_id}\n")
        }
    };
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "command finished");
    Ok(output)
}

fn render_days<S: PlanStore>(
    service: &PlanService<S>,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<String> {
    let agenda = service.agenda(start, end)?;
    let mut out = String::new();
    for day in start.iter_days().take_while(|day| *day <= end) {
        let _ = writeln!(out, "{}", format_day_heading(day, today));
        let mut any = false;
        for entry in agenda.on(day) {
            any = true;
            let _ = writeln!(out, "  {}", describe_entry(entry));
        }
        if !any {
            let _ = writeln!(out, "  (nothing scheduled)");
        }
    }
    if agenda.truncated {
        let _ = writeln!(out, "note: some repeating tasks were cut short by the iteration cap");
    }
    Ok(out)
}

fn render_timeline<S: PlanStore>(service: &PlanService<S>, today: NaiveDate) -> Result<String> {
    let timeline = service.timeline(today)?;
    let mut out = String::new();
    for bucket in timeline.buckets.iter().filter(|bucket| !bucket.is_empty()) {
        let _ = writeln!(out, "{}", bucket.slot.label());
        match bucket.slot.kind {
            SlotKind::Day | SlotKind::Week => {
                for entry in &bucket.entries {
                    let _ = writeln!(out, "  {} {}", entry.date(), describe_entry(entry));
                }
            }
            SlotKind::Month | SlotKind::Year => {
                for (plan_id, count) in bucket.plan_counts() {
                    let title = bucket
                        .entries
                        .iter()
                        .find(|entry| entry.plan_id == plan_id)
                        .map_or(plan_id, |entry| entry.plan_title.as_str());
                    let _ = writeln!(out, "  {title}: {count} occurrences");
                }
            }
        }
    }
    if timeline.truncated {
        let _ = writeln!(out, "note: some repeating tasks were cut short by the iteration cap");
    }
    Ok(out)
}

fn render_plans<S: PlanStore>(service: &PlanService<S>) -> Result<String> {
    let mut out = String::new();
    for plan in service.plans()? {
        let deadline = plan
            .deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "no deadline".to_string());
        let _ = writeln!(
            out,
            "{} {} ({} tasks, {deadline})",
            plan.id,
            plan.title,
            plan.tasks.len()
        );
    }
    Ok(out)
}

fn render_stats<S: PlanStore>(
    service: &PlanService<S>,
    plan_id: &str,
    today: NaiveDate,
) -> Result<String> {
    let plan = service.plan(plan_id)?;
    let stats = service.stats(plan_id, today)?;
    let mut out = String::new();
    let _ = writeln!(out, "{}: {}% complete", plan.title, stats.percentage());
    for (task_id, task_stats) in &stats.tasks {
        let title = plan.task(task_id).map_or(task_id.as_str(), |t| t.title.as_str());
        let _ = writeln!(
            out,
            "  {title}: {} done, {} skipped, {} pending of {}",
            task_stats.completed_past(),
            task_stats.skipped_past + task_stats.skipped_future,
            task_stats.pending_future,
            task_stats.total
        );
    }
    if stats.truncated {
        let _ = writeln!(out, "note: counts were cut short by the iteration cap");
    }
    Ok(out)
}

fn render_board(board: &Board, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format_day_heading(board.day, today));
    let columns: [(&str, &[BoardCard]); 4] = [
        ("To do", board.todo.as_slice()),
        ("In progress", board.in_progress.as_slice()),
        ("Done", board.done.as_slice()),
        ("Skipped", board.skipped.as_slice()),
    ];
    for (name, cards) in columns {
        let _ = writeln!(out, "{name} ({})", cards.len());
        for card in cards {
            let moved = if card.is_relocated(board.day) {
                format!(", moved from {}", card.origin)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "  {} [{}] {}m{moved}",
                card.title, card.task_id, card.duration_minutes
            );
        }
    }
    if board.truncated {
        let _ = writeln!(out, "note: some repeating tasks were cut short by the iteration cap");
    }
    out
}

fn describe_entry(entry: &AgendaEntry) -> String {
    let mut line = format!(
        "[{}] {} ({}, {}m)",
        entry.occurrence.status, entry.title, entry.plan_title, entry.duration_minutes
    );
    if entry.occurrence.is_relocated() {
        let _ = write!(line, " moved from {}", entry.occurrence.origin);
    }
    line
}

fn describe_task(task: &Task) -> String {
    let scheduled = task
        .scheduled_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unscheduled".to_string());
    format!("{} {} ({}, {scheduled})\n", task.id, task.title, task.frequency)
}

fn outcome(task: Option<Task>, unchanged: &str) -> String {
    match task {
        Some(task) => {
            let deadline = task
                .deadline
                .map(|d| format!(", deadline {d}"))
                .unwrap_or_default();
            format!("{} is now {}{deadline}\n", task.title, task.status)
        }
        None => format!("nothing changed: {unchanged}\n"),
    }
}

fn view_mode_arg(raw: &str) -> Result<ViewMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "day" => Ok(ViewMode::Day),
        "week" => Ok(ViewMode::Week),
        "month" => Ok(ViewMode::Month),
        "year" => Ok(ViewMode::Year),
        other => Err(format!("unknown calendar view `{other}`")),
    }
}

fn status_arg(raw: &str) -> Result<TaskStatus, ModelError> {
    raw.to_ascii_uppercase().parse()
}

fn format_day_heading(date: NaiveDate, today: NaiveDate) -> String {
    let calendar = date.format("%A, %B %d, %Y");
    format!("{} | {}", format_relative_label(date, today), calendar)
}

fn format_relative_label(date: NaiveDate, today: NaiveDate) -> String {
    let diff = date.signed_duration_since(today).num_days();
    match diff {
        -1 => "Yesterday".to_string(),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        d if d < 0 => format!("{} days ago", -d),
        d => format!("In {} days", d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use planout_core::Plan;
    use planout_store::MemoryPlanStore;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    fn guitar_service() -> PlanService<MemoryPlanStore> {
        let mut plan = Plan::new("guitar", "Guitar");
        plan.tasks.push(
            Task::new("lesson", "Lesson")
                .scheduled(date(2024, 1, 1), Frequency::Weekly)
                .with_deadline(date(2024, 1, 29)),
        );
        plan.refresh_deadline();
        PlanService::builder(MemoryPlanStore::with_plans([plan])).build()
    }

    #[test]
    fn config_reads_and_validates_environment() {
        let config = config_from(&[
            ("PLANOUT_ROOT", "/tmp/plans"),
            ("PLANOUT_AGENDA_SPAN_DAYS", "14"),
            ("PLANOUT_AGENDA_START_OFFSET_DAYS", "-2"),
            ("PLANOUT_ITERATION_CAP", "10"),
            ("PLANOUT_TODAY", "2024-01-08"),
        ]);
        assert_eq!(config.root, PathBuf::from("/tmp/plans"));
        assert_eq!(config.agenda_span_days, 14);
        assert_eq!(config.agenda_start_offset_days, -2);
        assert_eq!(config.iteration_cap, MIN_ITERATION_CAP);
        assert_eq!(config.today(), date(2024, 1, 8));
        assert_eq!(config.agenda_start(config.today()), date(2024, 1, 6));

        let fallback = config_from(&[
            ("PLANOUT_AGENDA_SPAN_DAYS", "0"),
            ("PLANOUT_ITERATION_CAP", "lots"),
            ("PLANOUT_TODAY", "soon"),
        ]);
        assert_eq!(fallback, AppConfig::default());
    }

    fn parse(list: &[&str]) -> Result<Command, clap::Error> {
        let argv = std::iter::once("planout").chain(list.iter().copied());
        Cli::try_parse_from(argv).map(Cli::into_command)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse(&[]).unwrap(), Command::Agenda { start: None });
        assert_eq!(
            parse(&["skip", "guitar", "lesson", "2024-01-08"]).unwrap(),
            Command::Skip {
                plan_id: "guitar".into(),
                task_id: "lesson".into(),
                date: date(2024, 1, 8),
            }
        );
        assert_eq!(
            parse(&["status", "g", "t", "2024-01-08", "in_progress"]).unwrap(),
            Command::Status {
                plan_id: "g".into(),
                task_id: "t".into(),
                date: date(2024, 1, 8),
                status: TaskStatus::InProgress,
            }
        );
        assert_eq!(
            parse(&["calendar", "week", "2024-01-10", "--step", "-1"]).unwrap(),
            Command::Calendar {
                mode: ViewMode::Week,
                date: Some(date(2024, 1, 10)),
                step: -1,
            }
        );
        assert_eq!(
            parse(&["add", "p", "Scales", "Chords", "-f", "weekly"]).unwrap(),
            Command::Add {
                plan_id: "p".into(),
                titles: vec!["Scales".into(), "Chords".into()],
                frequency: Frequency::Weekly,
            }
        );
        assert_eq!(
            parse(&["new-plan", "Guitar"]).unwrap(),
            Command::NewPlan {
                title: "Guitar".into(),
                description: None,
            }
        );
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert!(parse(&["status", "g", "t", "2024-01-08", "FINISHED"]).is_err());
        assert!(parse(&["skip", "g", "t", "tomorrow"]).is_err());
        assert!(parse(&["calendar", "fortnight"]).is_err());
        assert!(parse(&["add", "p"]).is_err());
        assert!(parse(&["launch"]).is_err());
    }

    #[test]
    fn relative_labels() {
        let today = date(2024, 1, 10);
        assert_eq!(format_relative_label(date(2024, 1, 9), today), "Yesterday");
        assert_eq!(format_relative_label(today, today), "Today");
        assert_eq!(format_relative_label(date(2024, 1, 11), today), "Tomorrow");
        assert_eq!(format_relative_label(date(2024, 1, 7), today), "3 days ago");
        assert_eq!(format_relative_label(date(2024, 1, 15), today), "In 5 days");
    }

    #[test]
    fn agenda_lists_each_day() {
        let service = guitar_service();
        let config = config_from(&[
            ("PLANOUT_TODAY", "2024-01-07"),
            ("PLANOUT_AGENDA_SPAN_DAYS", "2"),
        ]);
        let output = execute(&service, &config, Command::Agenda { start: None }).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Today"));
        assert_eq!(lines[1], "  (nothing scheduled)");
        assert!(lines[2].starts_with("Tomorrow"));
        assert_eq!(lines[3], "  [TODO] Lesson (Guitar, 30m)");
    }

    #[test]
    fn defer_respects_the_window() {
        let service = guitar_service();
        let config = config_from(&[("PLANOUT_TODAY", "2024-01-07")]);
        let too_far = Command::Defer {
            plan_id: "guitar".into(),
            task_id: "lesson".into(),
            from: date(2024, 1, 8),
            to: date(2024, 1, 20),
        };
        assert!(execute(&service, &config, too_far).is_err());

        let ok = Command::Defer {
            plan_id: "guitar".into(),
            task_id: "lesson".into(),
            from: date(2024, 1, 8),
            to: date(2024, 1, 10),
        };
        let output = execute(&service, &config, ok).unwrap();
        assert!(output.starts_with("Lesson is now TODO"));

        let board = execute(
            &service,
            &config,
            Command::Board {
                plan_id: "guitar".into(),
                day: Some(date(2024, 1, 10)),
            },
        )
        .unwrap();
        assert!(board.contains("moved from 2024-01-08"));
    }

    #[test]
    fn skip_reports_the_new_deadline() {
        let service = guitar_service();
        let config = config_from(&[("PLANOUT_TODAY", "2024-01-07")]);
        let command = Command::Skip {
            plan_id: "guitar".into(),
            task_id: "lesson".into(),
            date: date(2024, 1, 8),
        };
        let output = execute(&service, &config, command.clone()).unwrap();
        assert_eq!(output, "Lesson is now SKIPPED, deadline 2024-02-05\n");
        let again = execute(&service, &config, command).unwrap();
        assert_eq!(again, "nothing changed: already skipped or not an occurrence\n");

        let off_series = Command::Skip {
            plan_id: "guitar".into(),
            task_id: "lesson".into(),
            date: date(2024, 1, 9),
        };
        let ignored = execute(&service, &config, off_series).unwrap();
        assert!(ignored.starts_with("nothing changed"));

        let stats = execute(
            &service,
            &config,
            Command::Stats {
                plan_id: "guitar".into(),
            },
        )
        .unwrap();
        let lines: Vec<&str> = stats.lines().collect();
        assert_eq!(lines[0], "Guitar: 17% complete");
        assert_eq!(lines[1], "  Lesson: 1 done, 1 skipped, 4 pending of 6");
    }

    #[test]
    fn status_reports_the_occurrence_it_changed() {
        let service = guitar_service();
        let config = config_from(&[("PLANOUT_TODAY", "2024-01-07")]);
        let command = Command::Status {
            plan_id: "guitar".into(),
            task_id: "lesson".into(),
            date: date(2024, 1, 15),
            status: TaskStatus::Done,
        };
        let output = execute(&service, &config, command).unwrap();
        assert_eq!(output, "Lesson on 2024-01-15 is now DONE\n");

        let plan = service.plan("guitar").unwrap();
        assert_eq!(plan.tasks[0].status, TaskStatus::Todo);
    }
}

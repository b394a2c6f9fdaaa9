use chrono::NaiveDate;
use parking_lot::Mutex;
use planout_core::agenda::{build_agenda, Agenda};
use planout_core::board::{board_with_cap, Board};
use planout_core::bucket::{project_timeline, Timeline};
use planout_core::draft::{schedule_drafts, suggest_drafts, PlanDraft, TaskDraft};
use planout_core::stats::{plan_stats_with_cap, PlanStats};
use planout_core::transition::{defer, defer_window, set_occurrence_status, skip, unskip};
use planout_core::{
    Plan, PlanPatch, Task, TaskPatch, TaskStatus, DEFAULT_ITERATION_CAP, MIN_ITERATION_CAP,
};
use tracing::{debug, instrument};

use crate::error::{Result, StoreError};
use crate::store::PlanStore;

/// Drafts placed on each day when new tasks are added without a date.
pub const DEFAULT_DRAFTS_PER_DAY: usize = 1;

/// Read views and occurrence actions over a [`PlanStore`].
///
/// Occurrence actions are applied to a loaded copy first, then persisted as a
/// task patch plus the refreshed plan deadline. Actions go through one mutex
/// so two updates to the same task never interleave their read and write.
pub struct PlanService<S> {
    store: S,
    iteration_cap: u32,
    drafts_per_day: usize,
    mutations: Mutex<()>,
}

pub struct PlanServiceBuilder<S> {
    store: S,
    iteration_cap: u32,
    drafts_per_day: usize,
}

impl<S: PlanStore> PlanServiceBuilder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            iteration_cap: DEFAULT_ITERATION_CAP,
            drafts_per_day: DEFAULT_DRAFTS_PER_DAY,
        }
    }

    /// Caps below the two-year daily horizon are raised to it.
    pub fn iteration_cap(mut self, cap: u32) -> Self {
        self.iteration_cap = cap.max(MIN_ITERATION_CAP);
        self
    }

    pub fn drafts_per_day(mut self, per_day: usize) -> Self {
        self.drafts_per_day = per_day.max(1);
        self
    }

    pub fn build(self) -> PlanService<S> {
        PlanService {
            store: self.store,
            iteration_cap: self.iteration_cap,
            drafts_per_day: self.drafts_per_day,
            mutations: Mutex::new(()),
        }
    }
}

impl<S: PlanStore> PlanService<S> {
    pub fn builder(store: S) -> PlanServiceBuilder<S> {
        PlanServiceBuilder::new(store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn iteration_cap(&self) -> u32 {
        self.iteration_cap
    }

    pub fn plans(&self) -> Result<Vec<Plan>> {
        self.store.list_plans()
    }

    pub fn plan(&self, plan_id: &str) -> Result<Plan> {
        self.store.load_plan(plan_id)
    }

    pub fn agenda(&self, start: NaiveDate, end: NaiveDate) -> Result<Agenda> {
        let plans = self.store.list_plans()?;
        Ok(build_agenda(&plans, start, end, self.iteration_cap))
    }

    pub fn timeline(&self, today: NaiveDate) -> Result<Timeline> {
        let plans = self.store.list_plans()?;
        Ok(project_timeline(&plans, today, self.iteration_cap))
    }

    pub fn stats(&self, plan_id: &str, today: NaiveDate) -> Result<PlanStats> {
        let plan = self.store.load_plan(plan_id)?;
        Ok(plan_stats_with_cap(&plan, today, self.iteration_cap))
    }

    pub fn board(&self, plan_id: &str, day: NaiveDate) -> Result<Board> {
        let plan = self.store.load_plan(plan_id)?;
        Ok(board_with_cap(&plan, day, self.iteration_cap))
    }

    pub fn defer_options(
        &self,
        plan_id: &str,
        task_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let plan = self.store.load_plan(plan_id)?;
        let task = plan
            .task(task_id)
            .ok_or_else(|| StoreError::task_not_found(plan_id, task_id))?;
        Ok(defer_window(task, today))
    }

    /// Local task suggestions for the plan's description, with deadlines
    /// estimated from `today`. Nothing is stored.
    pub fn suggest(&self, plan_id: &str, today: NaiveDate) -> Result<Vec<TaskDraft>> {
        let plan = self.store.load_plan(plan_id)?;
        Ok(suggest_drafts(&plan.description)
            .into_iter()
            .map(|draft| draft.with_estimated_deadline(today))
            .collect())
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub fn create_plan(&self, draft: PlanDraft) -> Result<Plan> {
        self.store.create_plan(draft)
    }

    #[instrument(skip(self, patch))]
    pub fn update_plan(&self, plan_id: &str, patch: &PlanPatch) -> Result<Plan> {
        let _guard = self.mutations.lock();
        self.store.patch_plan(plan_id, patch)
    }

    /// Stores the drafts as tasks, giving undated ones consecutive days from
    /// `start`.
    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    pub fn add_tasks(
        &self,
        plan_id: &str,
        mut drafts: Vec<TaskDraft>,
        start: NaiveDate,
    ) -> Result<Vec<Task>> {
        let _guard = self.mutations.lock();
        schedule_drafts(&mut drafts, start, self.drafts_per_day);
        self.store.create_tasks(plan_id, drafts)
    }

    #[instrument(skip(self, patch))]
    pub fn update_task(&self, plan_id: &str, task_id: &str, patch: &TaskPatch) -> Result<Task> {
        let _guard = self.mutations.lock();
        self.store.patch_task(plan_id, task_id, patch)
    }

    #[instrument(skip(self))]
    pub fn delete_task(&self, plan_id: &str, task_id: &str) -> Result<()> {
        let _guard = self.mutations.lock();
        self.store.delete_task(plan_id, task_id)
    }

    #[instrument(skip(self))]
    pub fn delete_plan(&self, plan_id: &str) -> Result<()> {
        let _guard = self.mutations.lock();
        self.store.delete_plan(plan_id)
    }

    #[instrument(skip(self))]
    pub fn skip(&self, plan_id: &str, task_id: &str, date: NaiveDate) -> Result<Option<Task>> {
        self.mutate_task(plan_id, task_id, |task| skip(task, date))
    }

    #[instrument(skip(self))]
    pub fn unskip(&self, plan_id: &str, task_id: &str, date: NaiveDate) -> Result<Option<Task>> {
        self.mutate_task(plan_id, task_id, |task| unskip(task, date))
    }

    #[instrument(skip(self))]
    pub fn defer(
        &self,
        plan_id: &str,
        task_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<Task>> {
        self.mutate_task(plan_id, task_id, |task| defer(task, from, to))
    }

    #[instrument(skip(self))]
    pub fn set_status(
        &self,
        plan_id: &str,
        task_id: &str,
        date: NaiveDate,
        status: TaskStatus,
    ) -> Result<Option<Task>> {
        self.mutate_task(plan_id, task_id, |task| {
            set_occurrence_status(task, date, status)
        })
    }

    /// Runs one engine transition and persists what it changed. Returns the
    /// stored task, or `None` when the transition was a no-op.
    fn mutate_task(
        &self,
        plan_id: &str,
        task_id: &str,
        transition: impl FnOnce(&mut Task) -> Option<TaskPatch>,
    ) -> Result<Option<Task>> {
        let _guard = self.mutations.lock();
        let mut plan = self.store.load_plan(plan_id)?;
        let previous_deadline = plan.deadline;
        let task = plan
            .task_mut(task_id)
            .ok_or_else(|| StoreError::task_not_found(plan_id, task_id))?;

        let Some(patch) = transition(task) else {
            debug!(plan_id, task_id, "transition changed nothing");
            return Ok(None);
        };

        let stored = self.store.patch_task(plan_id, task_id, &patch)?;
        let deadline = plan.refresh_deadline();
        if deadline != previous_deadline {
            let rollup = PlanPatch {
                deadline,
                ..PlanPatch::default()
            };
            self.store.patch_plan(plan_id, &rollup)?;
        }
        Ok(Some(stored))
    }
}

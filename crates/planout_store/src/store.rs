use chrono::Local;
use planout_core::draft::{PlanDraft, TaskDraft};
use planout_core::{Plan, PlanPatch, Task, TaskPatch};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Persistence collaborator for plans and their tasks.
///
/// Implementations only store what they are given: engine transitions and
/// deadline rollups happen before a patch reaches the store.
pub trait PlanStore: Send + Sync {
    fn list_plans(&self) -> Result<Vec<Plan>>;

    fn load_plan(&self, plan_id: &str) -> Result<Plan>;

    fn create_plan(&self, draft: PlanDraft) -> Result<Plan>;

    fn patch_plan(&self, plan_id: &str, patch: &PlanPatch) -> Result<Plan>;

    /// Appends the drafts as new tasks and returns them with their ids.
    fn create_tasks(&self, plan_id: &str, drafts: Vec<TaskDraft>) -> Result<Vec<Task>>;

    fn patch_task(&self, plan_id: &str, task_id: &str, patch: &TaskPatch) -> Result<Task>;

    /// Removes the task and lets the plan deadline shrink to what remains.
    fn delete_task(&self, plan_id: &str, task_id: &str) -> Result<()>;

    fn delete_plan(&self, plan_id: &str) -> Result<()>;
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn plan_from_draft(draft: PlanDraft) -> Plan {
    let mut plan = Plan::new(new_id(), draft.title);
    plan.description = draft.description;
    plan.color = draft.color;
    plan.deadline = draft.deadline;
    plan.created_at = Some(Local::now().naive_local());
    plan
}

pub(crate) fn append_tasks(plan: &mut Plan, drafts: Vec<TaskDraft>) -> Vec<Task> {
    let created: Vec<Task> = drafts
        .into_iter()
        .map(|draft| draft.into_task(new_id()))
        .collect();
    plan.tasks.extend(created.iter().cloned());
    plan.refresh_deadline();
    debug!(plan_id = %plan.id, count = created.len(), "tasks appended");
    created
}

pub(crate) fn patch_task_in(plan: &mut Plan, task_id: &str, patch: &TaskPatch) -> Result<Task> {
    let plan_id = plan.id.clone();
    let task = plan
        .task_mut(task_id)
        .ok_or_else(|| StoreError::task_not_found(&plan_id, task_id))?;
    patch.apply(task);
    Ok(task.clone())
}

pub(crate) fn remove_task(plan: &mut Plan, task_id: &str) -> Result<()> {
    let before = plan.tasks.len();
    plan.tasks.retain(|task| task.id != task_id);
    if plan.tasks.len() == before {
        return Err(StoreError::task_not_found(&plan.id, task_id));
    }
    plan.recompute_deadline();
    Ok(())
}

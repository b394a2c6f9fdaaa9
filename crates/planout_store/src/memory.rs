use std::collections::BTreeMap;

use parking_lot::RwLock;
use planout_core::draft::{PlanDraft, TaskDraft};
use planout_core::{Plan, PlanPatch, Task, TaskPatch};

use crate::error::{Result, StoreError};
use crate::store::{append_tasks, patch_task_in, plan_from_draft, remove_task, PlanStore};

/// Keeps plans in memory only.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    plans: RwLock<BTreeMap<String, Plan>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: impl IntoIterator<Item = Plan>) -> Self {
        let plans = plans
            .into_iter()
            .map(|plan| (plan.id.clone(), plan))
            .collect();
        Self {
            plans: RwLock::new(plans),
        }
    }

    fn with_plan_mut<T>(&self, plan_id: &str, f: impl FnOnce(&mut Plan) -> Result<T>) -> Result<T> {
        let mut plans = self.plans.write();
        let plan = plans
            .get_mut(plan_id)
            .ok_or_else(|| StoreError::PlanNotFound(plan_id.to_string()))?;
        f(plan)
    }
}

impl PlanStore for MemoryPlanStore {
    fn list_plans(&self) -> Result<Vec<Plan>> {
        Ok(self.plans.read().values().cloned().collect())
    }

    fn load_plan(&self, plan_id: &str) -> Result<Plan> {
        self.plans
            .read()
            .get(plan_id)
            .cloned()
            .ok_or_else(|| StoreError::PlanNotFound(plan_id.to_string()))
    }

    fn create_plan(&self, draft: PlanDraft) -> Result<Plan> {
        let plan = plan_from_draft(draft);
        self.plans.write().insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    fn patch_plan(&self, plan_id: &str, patch: &PlanPatch) -> Result<Plan> {
        self.with_plan_mut(plan_id, |plan| {
            patch.apply(plan);
            Ok(plan.clone())
        })
    }

    fn create_tasks(&self, plan_id: &str, drafts: Vec<TaskDraft>) -> Result<Vec<Task>> {
        self.with_plan_mut(plan_id, |plan| Ok(append_tasks(plan, drafts)))
    }

    fn patch_task(&self, plan_id: &str, task_id: &str, patch: &TaskPatch) -> Result<Task> {
        self.with_plan_mut(plan_id, |plan| patch_task_in(plan, task_id, patch))
    }

    fn delete_task(&self, plan_id: &str, task_id: &str) -> Result<()> {
        self.with_plan_mut(plan_id, |plan| remove_task(plan, task_id))
    }

    fn delete_plan(&self, plan_id: &str) -> Result<()> {
        self.plans
            .write()
            .remove(plan_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::PlanNotFound(plan_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use planout_core::{Frequency, TaskStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn creates_plans_and_tasks_with_fresh_ids() {
        let store = MemoryPlanStore::new();
        let plan = store.create_plan(PlanDraft::new("Guitar")).unwrap();
        assert!(plan.created_at.is_some());

        let mut draft = TaskDraft::new("Scales");
        draft.frequency = Frequency::Daily;
        draft.scheduled_date = Some(date(2024, 1, 1));
        let tasks = store
            .create_tasks(&plan.id, vec![draft, TaskDraft::new("Buy picks")])
            .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_ne!(tasks[0].id, tasks[1].id);

        let loaded = store.load_plan(&plan.id).unwrap();
        assert_eq!(loaded.tasks.len(), 2);
        assert_eq!(loaded.deadline, Some(date(2024, 1, 1)));
    }

    #[test]
    fn patches_and_deletes_tasks() {
        let mut plan = Plan::new("p", "House");
        plan.tasks.push(
            planout_core::Task::new("t", "Bins")
                .scheduled(date(2024, 1, 1), Frequency::Weekly)
                .with_deadline(date(2024, 6, 1)),
        );
        plan.deadline = Some(date(2024, 6, 1));
        let store = MemoryPlanStore::with_plans([plan]);

        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        let task = store.patch_task("p", "t", &patch).unwrap();
        assert_eq!(task.status, TaskStatus::Done);

        assert!(matches!(
            store.patch_task("p", "missing", &patch),
            Err(StoreError::TaskNotFound { .. })
        ));
        store.delete_task("p", "t").unwrap();
        let plan = store.load_plan("p").unwrap();
        assert!(plan.tasks.is_empty());
        assert_eq!(plan.deadline, None);

        store.delete_plan("p").unwrap();
        assert!(matches!(
            store.load_plan("p"),
            Err(StoreError::PlanNotFound(_))
        ));
    }
}

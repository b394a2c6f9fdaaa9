use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use planout_core::draft::{PlanDraft, TaskDraft};
use planout_core::{Plan, PlanPatch, Task, TaskPatch};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::document::PlanDocument;
use crate::error::{Result, StoreError};
use crate::store::{append_tasks, patch_task_in, plan_from_draft, remove_task, PlanStore};

type Documents = HashMap<String, PlanDocument>;

/// Plans stored as `<root>/<plan-id>.json`, cached in memory.
pub struct JsonPlanStore {
    root: PathBuf,
    documents: Arc<RwLock<Documents>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl JsonPlanStore {
    /// Opens `root`, creating it when missing, and loads every plan file below
    /// it. Files that fail to parse are skipped with a warning.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        let documents = ingest_root(&root)?;
        info!(root = %root.display(), plans = documents.len(), "plan store opened");
        Ok(Self {
            root,
            documents: Arc::new(RwLock::new(documents)),
            watcher: Mutex::new(None),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drops the cache and reads every plan file again.
    pub fn reload_all(&self) -> Result<usize> {
        let fresh = ingest_root(&self.root)?;
        let count = fresh.len();
        *self.documents.write() = fresh;
        info!(plans = count, "plan store reloaded");
        Ok(count)
    }

    /// Keeps the cache in step with edits made to the files by other programs.
    pub fn watch(&self) -> Result<()> {
        let mut slot = self.watcher.lock();
        if slot.is_some() {
            return Ok(());
        }
        let documents = Arc::clone(&self.documents);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    debug!(?event, "filesystem change detected");
                    for path in event.paths.iter().filter(|p| PlanDocument::is_plan_file(p)) {
                        apply_change(&documents, path);
                    }
                }
                Err(err) => warn!(%err, "plan watcher error"),
            }
        })?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        *slot = Some(watcher);
        Ok(())
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }

    fn plan_path(&self, plan_id: &str) -> PathBuf {
        self.root.join(format!("{plan_id}.json"))
    }

    /// Applies `f` to a copy of the plan and writes it back; the cache only
    /// changes once the file has been written.
    fn with_plan_mut<T>(&self, plan_id: &str, f: impl FnOnce(&mut Plan) -> Result<T>) -> Result<T> {
        let mut docs = self.documents.write();
        let doc = docs
            .get_mut(plan_id)
            .ok_or_else(|| StoreError::PlanNotFound(plan_id.to_string()))?;
        let mut plan = doc.plan().clone();
        let value = f(&mut plan)?;
        doc.save(plan)?;
        Ok(value)
    }
}

impl PlanStore for JsonPlanStore {
    fn list_plans(&self) -> Result<Vec<Plan>> {
        let docs = self.documents.read();
        let mut plans: Vec<Plan> = docs.values().map(|doc| doc.plan().clone()).collect();
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(plans)
    }

    fn load_plan(&self, plan_id: &str) -> Result<Plan> {
        self.documents
            .read()
            .get(plan_id)
            .map(|doc| doc.plan().clone())
            .ok_or_else(|| StoreError::PlanNotFound(plan_id.to_string()))
    }

    fn create_plan(&self, draft: PlanDraft) -> Result<Plan> {
        let plan = plan_from_draft(draft);
        let mut doc = PlanDocument::from_plan(self.plan_path(&plan.id), plan.clone());
        doc.save(plan.clone())?;
        debug!(plan_id = %plan.id, path = %doc.path().display(), "plan created");
        self.documents.write().insert(plan.id.clone(), doc);
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
        let mut docs = self.documents.write();
        let doc = docs
            .remove(plan_id)
            .ok_or_else(|| StoreError::PlanNotFound(plan_id.to_string()))?;
        fs::remove_file(doc.path()).map_err(|source| StoreError::Io {
            path: doc.path().to_path_buf(),
            source,
        })?;
        debug!(plan_id, "plan deleted");
        Ok(())
    }
}

fn ingest_root(root: &Path) -> Result<Documents> {
    let mut docs = Documents::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !PlanDocument::is_plan_file(path) {
            continue;
        }
        match PlanDocument::load(path) {
            Ok(doc) => {
                let plan_id = doc.plan().id.clone();
                if let Some(existing) = docs.get(&plan_id) {
                    warn!(
                        %plan_id,
                        kept = %existing.path().display(),
                        ignored = %path.display(),
                        "duplicate plan id"
                    );
                    continue;
                }
                docs.insert(plan_id, doc);
            }
            Err(err) => warn!(path = %path.display(), %err, "skipping unreadable plan file"),
        }
    }
    Ok(docs)
}

fn apply_change(documents: &RwLock<Documents>, path: &Path) {
    if !path.exists() {
        documents.write().retain(|_, doc| doc.path() != path);
        debug!(path = %path.display(), "plan file removed");
        return;
    }
    // a half-written file keeps the cached copy until the next event
    match PlanDocument::load(path) {
        Ok(doc) => {
            let mut docs = documents.write();
            docs.retain(|_, cached| cached.path() != path);
            debug!(path = %path.display(), plan_id = %doc.plan().id, "plan file reloaded");
            docs.insert(doc.plan().id.clone(), doc);
        }
        Err(err) => warn!(path = %path.display(), %err, "ignoring unreadable plan file"),
    }
}

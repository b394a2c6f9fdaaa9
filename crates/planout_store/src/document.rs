use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use planout_core::Plan;

use crate::error::{Result, StoreError};

/// A plan as stored in one JSON file.
#[derive(Debug, Clone)]
pub struct PlanDocument {
    path: PathBuf,
    plan: Plan,
    loaded_at: DateTime<Utc>,
}

impl PlanDocument {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let plan = serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            plan,
            loaded_at: Utc::now(),
        })
    }

    pub fn from_plan(path: impl AsRef<Path>, plan: Plan) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            plan,
            loaded_at: Utc::now(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Writes `plan` to disk and adopts it as the cached copy.
    pub fn save(&mut self, plan: Plan) -> Result<()> {
        let raw = serde_json::to_string_pretty(&plan).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, raw).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.plan = plan;
        self.loaded_at = Utc::now();
        Ok(())
    }

    pub fn is_plan_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

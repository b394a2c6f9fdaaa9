use std::path::PathBuf;

use planout_core::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("plan `{0}` not found")]
    PlanNotFound(String),

    #[error("task `{task_id}` not found in plan `{plan_id}`")]
    TaskNotFound { plan_id: String, task_id: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed plan file {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to walk plan directory")]
    Walk(#[from] walkdir::Error),

    #[error("failed to watch plan directory")]
    Watch(#[from] notify::Error),
}

impl StoreError {
    pub(crate) fn task_not_found(plan_id: &str, task_id: &str) -> Self {
        StoreError::TaskNotFound {
            plan_id: plan_id.to_string(),
            task_id: task_id.to_string(),
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

pub mod agenda;
pub mod board;
pub mod bucket;
pub mod calendar;
pub mod draft;
pub mod error;
pub mod model;
pub mod occurrence;
pub mod overlay;
pub mod rollup;
pub mod stats;
pub mod transition;

pub use crate::calendar::{Frequency, Recurrence};
pub use crate::error::ModelError;
pub use crate::model::{History, Plan, PlanPatch, Task, TaskPatch, TaskStatus};
pub use crate::occurrence::{project, Projection, DEFAULT_ITERATION_CAP, MIN_ITERATION_CAP};
pub use crate::overlay::{Occurrence, Resolution};

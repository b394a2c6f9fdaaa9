pub mod document;
pub mod error;
pub mod json;
pub mod memory;
pub mod service;
pub mod store;

pub use crate::error::StoreError;
pub use crate::json::JsonPlanStore;
pub use crate::memory::MemoryPlanStore;
pub use crate::service::{PlanService, PlanServiceBuilder};
pub use crate::store::PlanStore;

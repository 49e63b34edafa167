//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services orchestrate between repositories and contain domain logic.

pub mod dispatch;
pub mod resolver;
pub mod result;

// Re-export for convenience
pub use dispatch::{DispatchError, JobDispatcher};
pub use result as result_service;

//! Service layer
//!
//! Job executors and the registry that routes a job definition to the
//! executor registered for its type.
//!
//! Executors are trait-based so the dispatcher can be tested with stubs and
//! new job types can be added without touching dispatch logic.

mod execution;
mod http_call;

// Re-export traits
pub use execution::JobExecutor;

// Re-export implementations
pub use execution::ExecutorRegistry;
pub use http_call::HttpCallExecutor;

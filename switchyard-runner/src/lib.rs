//! Switchyard Runner
//!
//! Job executors for the Switchyard dispatcher.
//!
//! Architecture:
//! - Configuration: Settings shared by every executor (timeouts, user agent)
//! - Services: The `JobExecutor` capability trait, one implementation per job
//!   type, and the registry the dispatcher uses to look them up
//! - Payload: Request body encoding (JSON or XML)
//! - Matching: Success evaluation against the stringified job result
//!
//! Executors never return errors: transport failures, template errors and
//! invalid definitions are downgraded into a failed `ExecutionResult`.

pub mod config;
pub mod matching;
pub mod payload;
pub mod service;

pub use config::ExecutorConfig;
pub use service::{ExecutorRegistry, HttpCallExecutor, JobExecutor};

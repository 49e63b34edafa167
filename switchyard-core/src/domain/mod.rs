//! Core domain types
//!
//! This module contains the core domain structures used across Switchyard.
//! Job definitions and inventory entities are read-only to the dispatcher;
//! runs are created at dispatch time and completed by the execution unit.

pub mod inventory;
pub mod job;
pub mod run;
pub mod task;

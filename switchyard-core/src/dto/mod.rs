//! Data Transfer Objects for the Switchyard API
//!
//! This module contains DTOs exchanged between API callers (client, CLI)
//! and the orchestrator. DTOs mirror the JSON shapes of the REST interface.

pub mod run;

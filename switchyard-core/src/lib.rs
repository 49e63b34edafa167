//! Switchyard Core
//!
//! Core types and abstractions for the Switchyard job dispatcher.
//!
//! This crate contains:
//! - Domain types: Core business entities (JobDefinition, Run, Device, etc.)
//! - DTOs: Data transfer objects exchanged with API callers
//! - Template: Variable substitution against an explicit binding environment
//! - Runtime: Runtime token minting

pub mod domain;
pub mod dto;
pub mod runtime;
pub mod template;

//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod consultation_scheduler;
pub mod orchestrator_controller;
pub mod propose_roles;
pub mod session_handle;
pub mod spawn_delegates;
pub mod synthesize;

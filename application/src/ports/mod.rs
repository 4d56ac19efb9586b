//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation
//! adapters must implement.

pub mod approval;
pub mod generation;
pub mod graph_store;
pub mod progress;
pub mod role_catalog;
pub mod session_logger;

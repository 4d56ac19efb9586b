//! Infrastructure layer for panel-consult
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod graph;
pub mod logging;
pub mod providers;
pub mod roles;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileConsultationConfig, FileLoggingConfig,
    FileProviderConfig, FileRoleConfig,
};
pub use graph::{GraphEdge, GraphNode, InMemoryGraphStore};
pub use logging::JsonlSessionLogger;
pub use providers::OpenAiGenerationService;
pub use roles::StaticRoleCatalog;

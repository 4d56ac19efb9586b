//! Application layer for panel-consult
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::ConsultationParams;
pub use ports::{
    approval::{ApprovalDecision, ApprovalError, ApprovalPort, AutoApproveAll, AutoCancel},
    generation::{GenerationError, GenerationService},
    graph_store::{GraphStore, GraphStoreError, NewNode},
    progress::{ConsultationProgressNotifier, NoProgress},
    role_catalog::RoleCatalog,
    session_logger::{NoSessionLogger, SessionEvent, SessionLogger},
};
pub use use_cases::consultation_scheduler::{
    ConsultationReport, ConsultationScheduler, DelegateGenerationError,
};
pub use use_cases::orchestrator_controller::{
    ConsultationOutcome, ControllerError, OrchestratorController,
};
pub use use_cases::propose_roles::{ProposalError, RoleProposalResult, RoleProposer};
pub use use_cases::session_handle::SessionHandle;
pub use use_cases::spawn_delegates::{DelegateBrief, DelegateSpawner, SpawnError, SpawnResult};
pub use use_cases::synthesize::{SynthesisEngine, SynthesisError};

//! Domain layer for panel-consult
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Consultation
//!
//! A user question on a *master node* is answered by a *panel* of
//! specialist roles:
//!
//! - **Proposal**: a model proposes a ranked panel with tailored sub-questions
//! - **Approval**: the user accepts or rejects each proposed role
//! - **Consultation**: every approved specialist answers concurrently
//! - **Synthesis**: all answers are merged into one combined response
//!
//! [`OrchestratorSession`] is the aggregate that tracks a consultation
//! through these stages.

pub mod consultation;
pub mod core;
pub mod graph;
pub mod prompt;
pub mod role;

// Re-export commonly used types
pub use consultation::{
    approval_gate::ApprovalGate,
    parsing::{RoleCandidate, RoleProposal, parse_role_proposal, parse_role_proposal_json},
    session::{CANCELLATION_REASON, OrchestratorSession, PREVIEW_CHARS, SessionStatus},
    value_objects::{DelegateState, DelegateStatus, ProposedRole, SessionId, SpawnedDelegate},
};
pub use core::{error::DomainError, question::Question};
pub use graph::{ConversationTurn, EdgeId, NodeId, ProjectId, TurnRole};
pub use prompt::PromptTemplate;
pub use role::{ExpertiseLevel, RoleDefinition, RoleId};

//! Approval port for the proposed panel.
//!
//! Between proposal and spawning the consultation pauses for a human to
//! accept or reject each proposed role.
//!
//! # Architecture
//!
//! Following the Ports and Adapters pattern:
//! - **Port**: [`ApprovalPort`] - defined here in application layer
//! - **Adapter**: `InteractiveApproval` - implemented in presentation layer
//!
//! UIs that drive the controller directly (toggle, set-all, confirm,
//! cancel) do not need this port; it serves callers that run the whole
//! flow in one call, such as the CLI.
//!
//! # Built-in Implementations
//!
//! - [`AutoApproveAll`] - Confirms every proposed role
//! - [`AutoCancel`] - Cancels the consultation

use async_trait::async_trait;
use panel_domain::{ProposedRole, RoleId};

/// Error type for approval operations.
///
/// These errors represent failures while asking, not the user's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    /// Input/output error (e.g., terminal read failure).
    IoError(String),
}

impl std::fmt::Display for ApprovalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ApprovalError {}

/// The user's verdict on a proposed panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// Spawn exactly these roles
    Confirm { approved: Vec<RoleId> },
    /// Stop the consultation; nothing is spawned
    Cancel,
}

/// Port for collecting the user's accept/reject decision per role.
#[async_trait]
pub trait ApprovalPort: Send + Sync {
    /// Present the proposed roles (in ranked order, with their current
    /// pre-selection) and return the user's decision.
    async fn review(
        &self,
        prompt: &str,
        reason: &str,
        roles: &[ProposedRole],
    ) -> Result<ApprovalDecision, ApprovalError>;
}

/// Confirms every proposed role without asking.
pub struct AutoApproveAll;

#[async_trait]
impl ApprovalPort for AutoApproveAll {
    async fn review(
        &self,
        _prompt: &str,
        _reason: &str,
        roles: &[ProposedRole],
    ) -> Result<ApprovalDecision, ApprovalError> {
        Ok(ApprovalDecision::Confirm {
            approved: roles.iter().map(|r| r.role_id.clone()).collect(),
        })
    }
}

/// Cancels every consultation at the approval step.
pub struct AutoCancel;

#[async_trait]
impl ApprovalPort for AutoCancel {
    async fn review(
        &self,
        _prompt: &str,
        _reason: &str,
        _roles: &[ProposedRole],
    ) -> Result<ApprovalDecision, ApprovalError> {
        Ok(ApprovalDecision::Cancel)
    }
}

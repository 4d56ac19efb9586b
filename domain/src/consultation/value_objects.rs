//! Consultation value objects.
//!
//! - [`SessionId`] - opaque identifier of one consultation
//! - [`ProposedRole`] - a role suggested for the panel, pending approval
//! - [`DelegateState`] / [`DelegateStatus`] - per-specialist progress
//! - [`SpawnedDelegate`] - what the spawner produced for one approved role

use crate::graph::{EdgeId, NodeId};
use crate::role::RoleId;
use serde::{Deserialize, Serialize};

/// Opaque identifier of an orchestrator session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A role proposed for the panel.
///
/// Order within a proposal is the model's ranking and is never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedRole {
    pub id: String,
    pub role_id: RoleId,
    pub role_name: String,
    pub justification: String,
    pub tailored_question: String,
    pub is_approved: bool,
}

impl ProposedRole {
    /// Creates a proposed role. Proposals start pre-selected; the user
    /// deselects the specialists they do not want.
    pub fn new(
        role_id: RoleId,
        role_name: impl Into<String>,
        justification: impl Into<String>,
        tailored_question: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role_id,
            role_name: role_name.into(),
            justification: justification.into(),
            tailored_question: tailored_question.into(),
            is_approved: true,
        }
    }

    pub fn rejected(mut self) -> Self {
        self.is_approved = false;
        self
    }
}

/// Progress of a single delegate.
///
/// `Waiting -> Thinking -> Responded | Failed`, or `Waiting -> Failed` when
/// the delegate never started (spawn failure, cancellation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DelegateState {
    Waiting,
    Thinking,
    Responded { preview: String },
    Failed { reason: String },
}

impl DelegateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelegateState::Waiting => "waiting",
            DelegateState::Thinking => "thinking",
            DelegateState::Responded { .. } => "responded",
            DelegateState::Failed { .. } => "failed",
        }
    }

    /// `true` once the delegate has responded or failed
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            DelegateState::Responded { .. } | DelegateState::Failed { .. }
        )
    }

    pub fn can_advance_to(&self, next: &DelegateState) -> bool {
        matches!(
            (self, next),
            (DelegateState::Waiting, DelegateState::Thinking)
                | (DelegateState::Waiting, DelegateState::Failed { .. })
                | (DelegateState::Thinking, DelegateState::Responded { .. })
                | (DelegateState::Thinking, DelegateState::Failed { .. })
        )
    }
}

/// UI-facing status row for one spawned delegate.
///
/// `node_id` is the delegate node id, absent only when the graph store
/// could not create the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateStatus {
    pub node_id: Option<NodeId>,
    pub role_id: RoleId,
    pub role_name: String,
    pub question: String,
    #[serde(flatten)]
    pub state: DelegateState,
}

impl DelegateStatus {
    pub fn response_preview(&self) -> Option<&str> {
        match &self.state {
            DelegateState::Responded { preview } => Some(preview),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            DelegateState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Result of spawning one approved role into the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedDelegate {
    pub role_id: RoleId,
    pub role_name: String,
    pub question: String,
    pub node_id: Option<NodeId>,
    pub master_to_delegate_edge: Option<EdgeId>,
    pub delegate_to_master_edge: Option<EdgeId>,
    /// Set when node or edge creation failed
    pub failure: Option<String>,
}

impl SpawnedDelegate {
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

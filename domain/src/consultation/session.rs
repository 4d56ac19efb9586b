//! The orchestrator session aggregate.
//!
//! [`OrchestratorSession`] is the single source of truth for one
//! consultation. Every mutation goes through a guarded method so the
//! state machine below cannot be bypassed:
//!
//! ```text
//! proposing ─> awaiting_approval ─> spawning ─> consulting ─> synthesizing ─> completed
//!     │                                                                         ^
//!     └──────────────────────── (no panel needed) ──────────────────────────────┘
//!
//! any non-terminal ─> cancelled | failed
//! ```

use super::approval_gate::ApprovalGate;
use super::value_objects::{
    DelegateState, DelegateStatus, ProposedRole, SessionId, SpawnedDelegate,
};
use crate::core::error::DomainError;
use crate::core::question::Question;
use crate::graph::{EdgeId, NodeId, ProjectId};
use crate::role::RoleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum characters kept in a delegate's response preview
pub const PREVIEW_CHARS: usize = 100;

/// Failure reason given to delegates that were still outstanding on cancel
pub const CANCELLATION_REASON: &str = "cancelled by user before responding";

/// Stage of a consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Proposing,
    AwaitingApproval,
    Spawning,
    Consulting,
    Synthesizing,
    Completed,
    Cancelled,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Proposing => "proposing",
            SessionStatus::AwaitingApproval => "awaiting_approval",
            SessionStatus::Spawning => "spawning",
            SessionStatus::Consulting => "consulting",
            SessionStatus::Synthesizing => "synthesizing",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SessionStatus::Proposing => "Proposing panel",
            SessionStatus::AwaitingApproval => "Awaiting approval",
            SessionStatus::Spawning => "Spawning specialists",
            SessionStatus::Consulting => "Consulting specialists",
            SessionStatus::Synthesizing => "Synthesizing",
            SessionStatus::Completed => "Completed",
            SessionStatus::Cancelled => "Cancelled",
            SessionStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::Failed
        )
    }

    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (*self, next) {
            (Proposing, AwaitingApproval)
            | (Proposing, Completed)
            | (AwaitingApproval, Spawning)
            | (Spawning, Consulting)
            | (Consulting, Synthesizing)
            | (Synthesizing, Completed) => true,
            (from, Cancelled | Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One master-node-initiated consultation (Aggregate Root)
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorSession {
    id: SessionId,
    master_node_id: NodeId,
    project_id: ProjectId,
    original_prompt: Question,
    status: SessionStatus,
    proposal_reason: Option<String>,
    proposed_roles: Vec<ProposedRole>,
    delegate_statuses: Vec<DelegateStatus>,
    delegate_node_ids: Vec<Option<NodeId>>,
    master_to_delegate_edge_ids: Vec<Option<EdgeId>>,
    delegate_to_master_edge_ids: Vec<Option<EdgeId>>,
    final_response: Option<String>,
    created_at: DateTime<Utc>,
    proposed_at: Option<DateTime<Utc>>,
    approved_at: Option<DateTime<Utc>>,
    consultation_started_at: Option<DateTime<Utc>>,
    synthesis_started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
}

fn stamp(slot: &mut Option<DateTime<Utc>>) {
    if slot.is_none() {
        *slot = Some(Utc::now());
    }
}

impl OrchestratorSession {
    pub fn new(master_node_id: NodeId, project_id: ProjectId, original_prompt: Question) -> Self {
        Self {
            id: SessionId::generate(),
            master_node_id,
            project_id,
            original_prompt,
            status: SessionStatus::Proposing,
            proposal_reason: None,
            proposed_roles: Vec::new(),
            delegate_statuses: Vec::new(),
            delegate_node_ids: Vec::new(),
            master_to_delegate_edge_ids: Vec::new(),
            delegate_to_master_edge_ids: Vec::new(),
            final_response: None,
            created_at: Utc::now(),
            proposed_at: None,
            approved_at: None,
            consultation_started_at: None,
            synthesis_started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn master_node_id(&self) -> &NodeId {
        &self.master_node_id
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn original_prompt(&self) -> &Question {
        &self.original_prompt
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The proposing model's explanation of its panel decision
    pub fn proposal_reason(&self) -> Option<&str> {
        self.proposal_reason.as_deref()
    }

    pub fn proposed_roles(&self) -> &[ProposedRole] {
        &self.proposed_roles
    }

    pub fn delegate_statuses(&self) -> &[DelegateStatus] {
        &self.delegate_statuses
    }

    pub fn delegate_node_ids(&self) -> &[Option<NodeId>] {
        &self.delegate_node_ids
    }

    pub fn master_to_delegate_edge_ids(&self) -> &[Option<EdgeId>] {
        &self.master_to_delegate_edge_ids
    }

    pub fn delegate_to_master_edge_ids(&self) -> &[Option<EdgeId>] {
        &self.delegate_to_master_edge_ids
    }

    pub fn final_response(&self) -> Option<&str> {
        self.final_response.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn proposed_at(&self) -> Option<DateTime<Utc>> {
        self.proposed_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn consultation_started_at(&self) -> Option<DateTime<Utc>> {
        self.consultation_started_at
    }

    pub fn synthesis_started_at(&self) -> Option<DateTime<Utc>> {
        self.synthesis_started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    // ==================== Derived progress ====================

    pub fn total_delegates(&self) -> usize {
        self.delegate_statuses.len()
    }

    pub fn responded_count(&self) -> usize {
        self.delegate_statuses
            .iter()
            .filter(|d| matches!(d.state, DelegateState::Responded { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.delegate_statuses
            .iter()
            .filter(|d| matches!(d.state, DelegateState::Failed { .. }))
            .count()
    }

    pub fn settled_count(&self) -> usize {
        self.delegate_statuses
            .iter()
            .filter(|d| d.state.is_settled())
            .count()
    }

    /// `responded / total`, in `[0, 1]`; `0.0` before any delegate exists
    pub fn progress(&self) -> f64 {
        let total = self.total_delegates();
        if total == 0 {
            return 0.0;
        }
        self.responded_count() as f64 / total as f64
    }

    /// `true` when every delegate has responded or failed
    pub fn is_barrier_satisfied(&self) -> bool {
        self.settled_count() == self.total_delegates()
    }

    /// Roles currently marked approved, in proposal order
    pub fn approved_roles(&self) -> Vec<ProposedRole> {
        ApprovalGate::approved_subset(&self.proposed_roles)
    }

    /// Checks the structural invariants of the aggregate.
    pub fn invariants_hold(&self) -> bool {
        let n = self.delegate_statuses.len();
        let parallel = self.delegate_node_ids.len() == n
            && self.master_to_delegate_edge_ids.len() == n
            && self.delegate_to_master_edge_ids.len() == n;
        let completion = self.completed_at.is_some() == self.status.is_terminal();
        let error = self.error_message.is_none() || self.status == SessionStatus::Failed;
        parallel && completion && error && self.responded_count() <= n
    }

    // ==================== Transitions ====================

    fn ensure_status(&self, expected: SessionStatus) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::UnexpectedStatus {
                expected,
                actual: self.status,
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: SessionStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        if to.is_terminal() {
            stamp(&mut self.completed_at);
        }
        Ok(())
    }

    /// Store the proposed panel and wait for the user.
    ///
    /// An empty panel short-circuits to `completed`.
    pub fn record_proposal(
        &mut self,
        reason: impl Into<String>,
        roles: Vec<ProposedRole>,
    ) -> Result<(), DomainError> {
        if roles.is_empty() {
            return self.complete_without_panel(reason);
        }
        self.transition(SessionStatus::AwaitingApproval)?;
        stamp(&mut self.proposed_at);
        self.proposal_reason = Some(reason.into());
        self.proposed_roles = roles;
        Ok(())
    }

    /// The model decided no panel is needed; the session ends here.
    pub fn complete_without_panel(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition(SessionStatus::Completed)?;
        stamp(&mut self.proposed_at);
        self.proposal_reason = Some(reason.into());
        Ok(())
    }

    /// Returns whether a role with `role_id` was found.
    pub fn toggle_role_approval(&mut self, role_id: &RoleId) -> Result<bool, DomainError> {
        self.ensure_status(SessionStatus::AwaitingApproval)?;
        Ok(ApprovalGate::new(&mut self.proposed_roles).toggle(role_id))
    }

    pub fn set_all_roles_approval(&mut self, approved: bool) -> Result<(), DomainError> {
        self.ensure_status(SessionStatus::AwaitingApproval)?;
        ApprovalGate::new(&mut self.proposed_roles).set_all(approved);
        Ok(())
    }

    /// Confirm the panel and move to `spawning`.
    ///
    /// Returns the approved subset frozen at this moment; later toggles
    /// are rejected by the status guard.
    pub fn approve(&mut self) -> Result<Vec<ProposedRole>, DomainError> {
        self.ensure_status(SessionStatus::AwaitingApproval)?;
        let approved = self.approved_roles();
        if approved.is_empty() {
            return Err(DomainError::NoRolesApproved);
        }
        self.transition(SessionStatus::Spawning)?;
        stamp(&mut self.approved_at);
        Ok(approved)
    }

    /// Record every spawn attempt, in approval order.
    ///
    /// Moves to `consulting` if at least one delegate was created, otherwise
    /// fails the session.
    pub fn record_spawn(&mut self, delegates: Vec<SpawnedDelegate>) -> Result<(), DomainError> {
        self.ensure_status(SessionStatus::Spawning)?;

        let all_failed = delegates.iter().all(SpawnedDelegate::is_failed);
        for delegate in delegates {
            let state = match delegate.failure {
                Some(reason) => DelegateState::Failed { reason },
                None => DelegateState::Waiting,
            };
            self.delegate_statuses.push(DelegateStatus {
                node_id: delegate.node_id.clone(),
                role_id: delegate.role_id,
                role_name: delegate.role_name,
                question: delegate.question,
                state,
            });
            self.delegate_node_ids.push(delegate.node_id);
            self.master_to_delegate_edge_ids
                .push(delegate.master_to_delegate_edge);
            self.delegate_to_master_edge_ids
                .push(delegate.delegate_to_master_edge);
        }

        if all_failed {
            return self.fail("no specialist could be added to the canvas");
        }
        self.transition(SessionStatus::Consulting)?;
        stamp(&mut self.consultation_started_at);
        Ok(())
    }

    /// Advance one delegate's state in place.
    pub fn update_delegate_status(
        &mut self,
        index: usize,
        next: DelegateState,
    ) -> Result<(), DomainError> {
        self.ensure_status(SessionStatus::Consulting)?;
        let delegate = self
            .delegate_statuses
            .get_mut(index)
            .ok_or(DomainError::UnknownDelegate(index))?;
        if !delegate.state.can_advance_to(&next) {
            return Err(DomainError::InvalidDelegateTransition {
                index,
                from: delegate.state.as_str(),
                to: next.as_str(),
            });
        }
        delegate.state = next;
        Ok(())
    }

    /// Pass the barrier and move to `synthesizing`.
    pub fn begin_synthesis(&mut self) -> Result<(), DomainError> {
        self.ensure_status(SessionStatus::Consulting)?;
        let pending = self.total_delegates() - self.settled_count();
        if pending > 0 {
            return Err(DomainError::BarrierNotSatisfied { pending });
        }
        self.transition(SessionStatus::Synthesizing)?;
        stamp(&mut self.synthesis_started_at);
        Ok(())
    }

    pub fn complete(&mut self, final_response: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_status(SessionStatus::Synthesizing)?;
        self.transition(SessionStatus::Completed)?;
        self.final_response = Some(final_response.into());
        Ok(())
    }

    /// Fail the session from any non-terminal state.
    ///
    /// Delegate rows are kept as they are so per-specialist detail survives.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), DomainError> {
        self.transition(SessionStatus::Failed)?;
        self.error_message = Some(message.into());
        Ok(())
    }

    /// Cancel from any non-terminal state.
    ///
    /// Settled delegates keep their state; outstanding ones are marked
    /// failed with [`CANCELLATION_REASON`]. Returns how many were marked.
    pub fn cancel(&mut self) -> Result<usize, DomainError> {
        self.transition(SessionStatus::Cancelled)?;
        let mut marked = 0;
        for delegate in &mut self.delegate_statuses {
            if !delegate.state.is_settled() {
                delegate.state = DelegateState::Failed {
                    reason: CANCELLATION_REASON.to_string(),
                };
                marked += 1;
            }
        }
        Ok(marked)
    }
}

//! Orchestrator Controller
//!
//! Drives one consultation through its state machine:
//!
//! ```text
//! proposing -> awaiting_approval -> spawning -> consulting -> synthesizing -> completed
//!                      (cancelled | failed from any non-terminal state)
//! ```
//!
//! The controller is the only writer of the session aggregate. Stage
//! methods check the current status before acting, so out-of-order calls
//! are rejected with a [`DomainError`] instead of corrupting the session.

use crate::config::ConsultationParams;
use crate::ports::approval::{ApprovalDecision, ApprovalError, ApprovalPort};
use crate::ports::generation::GenerationService;
use crate::ports::graph_store::GraphStore;
use crate::ports::progress::{ConsultationProgressNotifier, NoProgress};
use crate::ports::role_catalog::RoleCatalog;
use crate::ports::session_logger::{NoSessionLogger, SessionEvent, SessionLogger};
use crate::use_cases::consultation_scheduler::ConsultationScheduler;
use crate::use_cases::propose_roles::RoleProposer;
use crate::use_cases::session_handle::SessionHandle;
use crate::use_cases::spawn_delegates::DelegateSpawner;
use crate::use_cases::synthesize::SynthesisEngine;
use panel_domain::{
    ConversationTurn, DelegateState, DomainError, NodeId, OrchestratorSession, ProjectId,
    Question, RoleId, SessionStatus,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced to the caller of a controller method.
///
/// Stage failures (proposal, zero spawns, synthesis) are not errors: they
/// move the session to `failed` and return [`ConsultationOutcome::Failed`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Approval failed: {0}")]
    Approval(#[from] ApprovalError),
}

/// Where a stage method left the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsultationOutcome {
    /// Proposal recorded; waiting for the user to confirm or cancel
    AwaitingApproval,
    /// The model chose to answer directly; no panel was formed
    NoPanelNeeded { reason: String },
    Completed { final_response: String },
    Failed { message: String },
    Cancelled,
}

impl ConsultationOutcome {
    fn of_terminal(session: &OrchestratorSession) -> Option<Self> {
        match session.status() {
            SessionStatus::Completed => Some(match session.final_response() {
                Some(text) => Self::Completed {
                    final_response: text.to_string(),
                },
                None => Self::NoPanelNeeded {
                    reason: session.proposal_reason().unwrap_or_default().to_string(),
                },
            }),
            SessionStatus::Failed => Some(Self::Failed {
                message: session.error_message().unwrap_or_default().to_string(),
            }),
            SessionStatus::Cancelled => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Application-layer coordinator for consultations
pub struct OrchestratorController {
    generation: Arc<dyn GenerationService>,
    graph: Arc<dyn GraphStore>,
    catalog: Arc<dyn RoleCatalog>,
    params: ConsultationParams,
    progress: Arc<dyn ConsultationProgressNotifier>,
    logger: Arc<dyn SessionLogger>,
}

impl OrchestratorController {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        graph: Arc<dyn GraphStore>,
        catalog: Arc<dyn RoleCatalog>,
    ) -> Self {
        Self {
            generation,
            graph,
            catalog,
            params: ConsultationParams::default(),
            progress: Arc::new(NoProgress),
            logger: Arc::new(NoSessionLogger),
        }
    }

    pub fn with_params(mut self, params: ConsultationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ConsultationProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_session_logger(mut self, logger: Arc<dyn SessionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &ConsultationParams {
        &self.params
    }

    /// Open a session for `prompt` asked on `master_node_id`.
    pub fn start(
        &self,
        master_node_id: NodeId,
        project_id: ProjectId,
        prompt: &str,
    ) -> Result<SessionHandle, ControllerError> {
        let question = Question::new(prompt)?;
        let session = OrchestratorSession::new(master_node_id, project_id, question);
        info!(session_id = %session.id(), "Consultation started");
        self.logger.log(SessionEvent::new(
            "session_started",
            json!({
                "session_id": session.id(),
                "master_node_id": session.master_node_id(),
                "project_id": session.project_id(),
                "prompt": session.original_prompt().content(),
            }),
        ));
        let handle = SessionHandle::new(session);
        self.progress.on_stage_change(SessionStatus::Proposing);
        Ok(handle)
    }

    // ==================== Proposing ====================

    /// Ask the model for a panel and record it.
    pub async fn propose(
        &self,
        handle: &SessionHandle,
    ) -> Result<ConsultationOutcome, ControllerError> {
        self.ensure_status(handle, SessionStatus::Proposing)?;
        let prompt = handle.snapshot().original_prompt().content().to_string();
        let proposer = RoleProposer::new(
            Arc::clone(&self.generation),
            Arc::clone(&self.catalog),
            self.params.max_roles,
        );

        let token = handle.cancellation_token().clone();
        let proposal = tokio::select! {
            _ = token.cancelled() => return Ok(self.finish_cancelled(handle)),
            proposal = proposer.propose(&prompt) => proposal,
        };

        let result = match proposal {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Role proposal failed");
                return self.fail(handle, e.to_string());
            }
        };

        self.logger.log(SessionEvent::new(
            "roles_proposed",
            json!({
                "session_id": handle.id(),
                "needs_panel": result.needs_panel,
                "reason": result.reason,
                "roles": result.roles.iter().map(|r| r.role_id.as_str()).collect::<Vec<_>>(),
            }),
        ));

        if result.is_no_panel() {
            let reason = result.reason;
            return match self.apply(handle, |s| s.complete_without_panel(reason.clone())) {
                Ok(()) => Ok(ConsultationOutcome::NoPanelNeeded { reason }),
                Err(e) => self.after_rejected(handle, e),
            };
        }

        match self.apply(handle, |s| s.record_proposal(result.reason, result.roles)) {
            Ok(()) => Ok(ConsultationOutcome::AwaitingApproval),
            Err(e) => self.after_rejected(handle, e),
        }
    }

    // ==================== Approval ====================

    /// Flip one proposed role's approval; `Ok(false)` if no such role.
    pub fn toggle_role_approval(
        &self,
        handle: &SessionHandle,
        role_id: &RoleId,
    ) -> Result<bool, ControllerError> {
        Ok(handle.try_mutate(|s| s.toggle_role_approval(role_id))?)
    }

    pub fn set_all_roles_approval(
        &self,
        handle: &SessionHandle,
        approved: bool,
    ) -> Result<(), ControllerError> {
        Ok(handle.try_mutate(|s| s.set_all_roles_approval(approved))?)
    }

    // ==================== Spawn, consult, synthesize ====================

    /// Confirm the approved panel and run the consultation to the end.
    ///
    /// Rejected with [`DomainError::NoRolesApproved`] while every role is
    /// deselected; the session then stays in `awaiting_approval`.
    pub async fn confirm(
        &self,
        handle: &SessionHandle,
    ) -> Result<ConsultationOutcome, ControllerError> {
        let approved = self.apply(handle, |s| s.approve())?;
        let snapshot = handle.snapshot();
        let token = handle.cancellation_token().clone();

        // Spawning
        let spawner = DelegateSpawner::new(
            Arc::clone(&self.graph),
            Arc::clone(&self.catalog),
            self.params.expertise_level,
        );
        let spawned = spawner
            .spawn(
                snapshot.project_id(),
                snapshot.master_node_id(),
                &approved,
                &token,
            )
            .await;
        if token.is_cancelled() {
            return Ok(self.finish_cancelled(handle));
        }
        if let Err(e) = self.apply(handle, |s| s.record_spawn(spawned.delegates)) {
            return self.after_rejected(handle, e);
        }
        let snapshot = handle.snapshot();
        if let Some(outcome) = ConsultationOutcome::of_terminal(&snapshot) {
            return Ok(outcome);
        }
        self.progress
            .on_consultation_start(snapshot.delegate_statuses());

        // Consulting
        let context = self.master_context(snapshot.master_node_id()).await;
        let scheduler = ConsultationScheduler::new(
            Arc::clone(&self.generation),
            Arc::clone(&self.graph),
            Arc::clone(&self.progress),
            Arc::clone(&self.logger),
        )
        .with_max_concurrency(self.params.max_concurrency)
        .with_delegate_timeout(self.params.delegate_timeout);
        let report = scheduler.run(handle, spawned.briefs, context).await;
        if report.cancelled {
            return Ok(self.finish_cancelled(handle));
        }

        // Synthesizing
        if let Err(e) = self.apply(handle, |s| s.begin_synthesis()) {
            return self.after_rejected(handle, e);
        }
        let snapshot = handle.snapshot();
        let responses: Vec<(String, String)> = snapshot
            .delegate_statuses()
            .iter()
            .zip(report.responses)
            .filter_map(|(row, text)| match (&row.state, text) {
                (DelegateState::Responded { .. }, Some(text)) => Some((row.role_name.clone(), text)),
                _ => None,
            })
            .collect();
        self.progress.on_synthesis_start(responses.len());

        let engine = SynthesisEngine::new(Arc::clone(&self.generation));
        let synthesis = tokio::select! {
            _ = token.cancelled() => return Ok(self.finish_cancelled(handle)),
            synthesis = engine.synthesize(
                snapshot.original_prompt().content(),
                &responses,
                snapshot.failed_count(),
            ) => synthesis,
        };

        let final_response = match synthesis {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Synthesis failed");
                return self.fail(handle, e.to_string());
            }
        };

        if let Err(e) = self
            .graph
            .append_turn(
                snapshot.master_node_id(),
                ConversationTurn::assistant(final_response.clone()),
            )
            .await
        {
            warn!(error = %e, "Could not write synthesis to master node");
        }

        match self.apply(handle, |s| s.complete(final_response.clone())) {
            Ok(()) => {
                self.logger.log(SessionEvent::new(
                    "synthesis_completed",
                    json!({
                        "session_id": handle.id(),
                        "contributors": responses.len(),
                        "failed": snapshot.failed_count(),
                        "final_response": final_response,
                    }),
                ));
                info!(
                    responded = snapshot.responded_count(),
                    failed = snapshot.failed_count(),
                    "Consultation completed"
                );
                Ok(ConsultationOutcome::Completed { final_response })
            }
            Err(e) => self.after_rejected(handle, e),
        }
    }

    // ==================== Cancellation ====================

    /// Cancel the session and abort every outstanding task.
    ///
    /// Returns `false` when the session had already finished.
    pub fn cancel(&self, handle: &SessionHandle) -> bool {
        let cancelled = match self.apply(handle, |s| s.cancel()) {
            Ok(marked) => {
                info!(session_id = %handle.id(), marked, "Consultation cancelled");
                true
            }
            Err(e) => {
                debug!(error = %e, "Cancel ignored");
                false
            }
        };
        handle.cancellation_token().cancel();
        cancelled
    }

    // ==================== Convenience ====================

    /// Propose, ask `approval` for a decision, then confirm.
    ///
    /// An approval that keeps no roles cancels the session.
    pub async fn run(
        &self,
        handle: &SessionHandle,
        approval: &dyn ApprovalPort,
    ) -> Result<ConsultationOutcome, ControllerError> {
        let outcome = self.propose(handle).await?;
        if outcome != ConsultationOutcome::AwaitingApproval {
            return Ok(outcome);
        }

        let snapshot = handle.snapshot();
        let token = handle.cancellation_token().clone();
        let decision = tokio::select! {
            _ = token.cancelled() => return Ok(self.finish_cancelled(handle)),
            decision = approval.review(
                snapshot.original_prompt().content(),
                snapshot.proposal_reason().unwrap_or_default(),
                snapshot.proposed_roles(),
            ) => decision?,
        };

        let approved = match decision {
            ApprovalDecision::Confirm { approved } => approved,
            ApprovalDecision::Cancel => {
                self.cancel(handle);
                return Ok(ConsultationOutcome::Cancelled);
            }
        };

        // A cancel may land while the port is still deciding
        if handle.is_cancelled() || handle.status().is_terminal() {
            return Ok(self.finish_cancelled(handle));
        }

        let keep: HashSet<RoleId> = approved.into_iter().collect();
        if let Err(e) = handle.try_mutate(|s| s.set_all_roles_approval(false)) {
            return self.after_rejected(handle, e);
        }
        for role in snapshot.proposed_roles() {
            if keep.contains(&role.role_id)
                && let Err(e) = handle.try_mutate(|s| s.toggle_role_approval(&role.role_id))
            {
                return self.after_rejected(handle, e);
            }
        }
        if handle.snapshot().approved_roles().is_empty() {
            info!("No roles kept at approval");
            self.cancel(handle);
            return Ok(ConsultationOutcome::Cancelled);
        }

        self.confirm(handle).await
    }

    // ==================== Internals ====================

    fn ensure_status(
        &self,
        handle: &SessionHandle,
        expected: SessionStatus,
    ) -> Result<(), DomainError> {
        let actual = handle.status();
        if actual != expected {
            return Err(DomainError::UnexpectedStatus { expected, actual });
        }
        Ok(())
    }

    /// Mutate the session and report a stage change when one happened
    fn apply<R>(
        &self,
        handle: &SessionHandle,
        mutate: impl FnOnce(&mut OrchestratorSession) -> Result<R, DomainError>,
    ) -> Result<R, DomainError> {
        let (result, from, to) = handle.try_mutate(|s| {
            let from = s.status();
            let result = mutate(s)?;
            Ok((result, from, s.status()))
        })?;
        if from != to {
            debug!(from = %from, to = %to, "Session status changed");
            self.logger.log(SessionEvent::new(
                "status_changed",
                json!({ "session_id": handle.id(), "from": from, "to": to }),
            ));
            self.progress.on_stage_change(to);
        }
        Ok(result)
    }

    fn fail(
        &self,
        handle: &SessionHandle,
        message: String,
    ) -> Result<ConsultationOutcome, ControllerError> {
        match self.apply(handle, |s| s.fail(message.clone())) {
            Ok(()) => Ok(ConsultationOutcome::Failed { message }),
            Err(e) => self.after_rejected(handle, e),
        }
    }

    /// A stage write was refused. A concurrent cancel is the expected
    /// cause; anything else is a caller error.
    fn after_rejected(
        &self,
        handle: &SessionHandle,
        error: DomainError,
    ) -> Result<ConsultationOutcome, ControllerError> {
        match ConsultationOutcome::of_terminal(&handle.snapshot()) {
            Some(outcome) => {
                debug!(error = %error, "Stage write refused after session ended");
                Ok(outcome)
            }
            None => Err(error.into()),
        }
    }

    /// Make sure a fired token is reflected on the session
    fn finish_cancelled(&self, handle: &SessionHandle) -> ConsultationOutcome {
        self.cancel(handle);
        ConsultationOutcome::of_terminal(&handle.snapshot()).unwrap_or(ConsultationOutcome::Cancelled)
    }

    async fn master_context(&self, master: &NodeId) -> Vec<ConversationTurn> {
        if !self.params.include_master_context {
            return Vec::new();
        }
        match self.graph.conversation(master).await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(error = %e, "Master context unavailable, consulting without it");
                Vec::new()
            }
        }
    }
}

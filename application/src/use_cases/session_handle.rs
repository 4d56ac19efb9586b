//! Shared, observable ownership of one orchestrator session.
//!
//! The aggregate lives inside a `tokio::sync::watch` channel. Every write
//! goes through [`SessionHandle::try_mutate`], which holds the channel's
//! lock for the duration of the closure, so concurrent delegate tasks are
//! serialized and observers are notified after each successful mutation.

use panel_domain::{DomainError, OrchestratorSession, SessionId, SessionStatus};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Cloneable handle to a live session and its cancellation signal
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<watch::Sender<OrchestratorSession>>,
    cancellation: CancellationToken,
}

impl SessionHandle {
    pub fn new(session: OrchestratorSession) -> Self {
        let (state, _) = watch::channel(session);
        Self {
            state: Arc::new(state),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.state.borrow().id().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    /// Point-in-time copy of the aggregate, for polling UIs
    pub fn snapshot(&self) -> OrchestratorSession {
        self.state.borrow().clone()
    }

    /// Receive a notification after every mutation
    pub fn subscribe(&self) -> watch::Receiver<OrchestratorSession> {
        self.state.subscribe()
    }

    /// Session-scoped cancellation signal shared with every delegate task
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Apply a guarded mutation with exclusive access.
    ///
    /// Observers are only notified when the mutation succeeds.
    pub(crate) fn try_mutate<R>(
        &self,
        mutate: impl FnOnce(&mut OrchestratorSession) -> Result<R, DomainError>,
    ) -> Result<R, DomainError> {
        let mut mutate = Some(mutate);
        let mut outcome = Err(DomainError::SessionUnavailable);
        self.state.send_if_modified(|session| {
            let Some(mutate) = mutate.take() else {
                return false;
            };
            outcome = mutate(session);
            outcome.is_ok()
        });
        outcome
    }
}

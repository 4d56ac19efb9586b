//! Domain error types

use crate::consultation::session::SessionStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("Illegal transition from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Operation requires status {expected}, session is {actual}")]
    UnexpectedStatus {
        expected: SessionStatus,
        actual: SessionStatus,
    },

    #[error("At least one role must be approved")]
    NoRolesApproved,

    #[error("Delegate {0} does not exist")]
    UnknownDelegate(usize),

    #[error("Delegate {index} cannot move from {from} to {to}")]
    InvalidDelegateTransition {
        index: usize,
        from: &'static str,
        to: &'static str,
    },

    #[error("{pending} delegate(s) have not settled yet")]
    BarrierNotSatisfied { pending: usize },

    #[error("Could not parse role proposal: {0}")]
    ProposalParse(String),

    #[error("Session state is unavailable")]
    SessionUnavailable,
}

impl DomainError {
    /// Check if this error is a state-machine guard violation
    pub fn is_state_violation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidTransition { .. } | DomainError::UnexpectedStatus { .. }
        )
    }
}

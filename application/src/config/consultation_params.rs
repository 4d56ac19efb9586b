//! Consultation parameters - orchestration tuning knobs.
//!
//! [`ConsultationParams`] groups the static parameters that control how the
//! [`OrchestratorController`](crate::use_cases::orchestrator_controller::OrchestratorController)
//! proposes, spawns and consults. None of them affect correctness; they
//! bound cost and latency.

use panel_domain::ExpertiseLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestration control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationParams {
    /// Maximum delegate generation calls in flight at once.
    pub max_concurrency: usize,
    /// Upper bound for one delegate's generation call; expiry fails the delegate.
    pub delegate_timeout: Duration,
    /// Maximum roles accepted from a proposal (extra roles are dropped, rank preserved).
    pub max_roles: usize,
    /// Level the role catalog's system prompts are rendered for.
    pub expertise_level: ExpertiseLevel,
    /// Pass the master node's conversation to delegates as context.
    pub include_master_context: bool,
}

impl Default for ConsultationParams {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            delegate_timeout: Duration::from_secs(180),
            max_roles: 6,
            expertise_level: ExpertiseLevel::default(),
            include_master_context: false,
        }
    }
}

impl ConsultationParams {
    // ==================== Builder Methods ====================

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_delegate_timeout(mut self, timeout: Duration) -> Self {
        self.delegate_timeout = timeout;
        self
    }

    pub fn with_max_roles(mut self, max: usize) -> Self {
        self.max_roles = max.max(1);
        self
    }

    pub fn with_expertise_level(mut self, level: ExpertiseLevel) -> Self {
        self.expertise_level = level;
        self
    }

    pub fn with_master_context(mut self, include: bool) -> Self {
        self.include_master_context = include;
        self
    }
}

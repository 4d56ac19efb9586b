//! Role proposal use case
//!
//! Asks the generation service which specialists should answer a question
//! and validates every suggestion against the role catalog.

use crate::ports::generation::{GenerationError, GenerationService};
use crate::ports::role_catalog::RoleCatalog;
use panel_domain::{DomainError, PromptTemplate, ProposedRole, parse_role_proposal};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The AI could not produce a usable panel decision
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    #[error("Role proposal request failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Role proposal was unusable: {0}")]
    Unparseable(#[from] DomainError),
}

/// Validated panel decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProposalResult {
    pub needs_panel: bool,
    pub reason: String,
    /// Catalog-resolved roles in ranked order
    pub roles: Vec<ProposedRole>,
}

impl RoleProposalResult {
    /// `true` when the caller should answer directly instead of consulting
    pub fn is_no_panel(&self) -> bool {
        !self.needs_panel || self.roles.is_empty()
    }
}

/// Proposes a ranked panel of catalog roles for a question
pub struct RoleProposer {
    generation: Arc<dyn GenerationService>,
    catalog: Arc<dyn RoleCatalog>,
    max_roles: usize,
}

impl RoleProposer {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        catalog: Arc<dyn RoleCatalog>,
        max_roles: usize,
    ) -> Self {
        Self {
            generation,
            catalog,
            max_roles,
        }
    }

    pub async fn propose(&self, prompt: &str) -> Result<RoleProposalResult, ProposalError> {
        let available = self.catalog.list();
        let meta_prompt = PromptTemplate::proposal_prompt(prompt, &available, self.max_roles);

        let response = self
            .generation
            .generate(&meta_prompt, Some(PromptTemplate::proposal_system()), &[])
            .await?;
        let proposal = parse_role_proposal(&response)?;
        debug!(
            needs_panel = proposal.needs_panel,
            candidates = proposal.candidates.len(),
            "Parsed role proposal"
        );

        if !proposal.needs_panel {
            info!(reason = %proposal.reason, "No panel needed");
            return Ok(RoleProposalResult {
                needs_panel: false,
                reason: proposal.reason,
                roles: Vec::new(),
            });
        }

        let mut roles = Vec::new();
        for candidate in proposal.candidates {
            let Some(definition) = self.catalog.lookup(&candidate.role_id) else {
                warn!(role_id = %candidate.role_id, "Dropping proposed role missing from catalog");
                continue;
            };
            if roles.len() == self.max_roles {
                debug!(role_id = %candidate.role_id, "Dropping role beyond max_roles");
                continue;
            }
            roles.push(ProposedRole::new(
                definition.id,
                definition.name,
                candidate.justification,
                candidate.question,
            ));
        }

        info!(roles = roles.len(), "Role proposal ready");
        Ok(RoleProposalResult {
            needs_panel: true,
            reason: proposal.reason,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCatalog, ScriptedGeneration, proposal_json};

    fn proposer(generation: ScriptedGeneration, max_roles: usize) -> RoleProposer {
        RoleProposer::new(
            Arc::new(generation),
            Arc::new(MockCatalog::with(&["architect", "security", "finance"])),
            max_roles,
        )
    }

    #[tokio::test]
    async fn test_propose_resolves_catalog_roles_in_rank_order() {
        let generation = ScriptedGeneration::new()
            .reply("Available roles", &proposal_json(&["security", "architect"]));

        let result = proposer(generation, 6).propose("Build or buy?").await.unwrap();

        assert!(!result.is_no_panel());
        let names: Vec<_> = result.roles.iter().map(|r| r.role_name.as_str()).collect();
        assert_eq!(names, vec!["SECURITY", "ARCHITECT"]);
        assert_eq!(result.roles[0].tailored_question, "security question");
        assert!(result.roles.iter().all(|r| r.is_approved));
    }

    #[tokio::test]
    async fn test_unknown_roles_are_dropped() {
        let generation = ScriptedGeneration::new().reply(
            "Available roles",
            &proposal_json(&["astrologer", "finance", "wizard"]),
        );

        let result = proposer(generation, 6).propose("Budget?").await.unwrap();

        assert_eq!(result.roles.len(), 1);
        assert_eq!(result.roles[0].role_id.as_str(), "finance");
    }

    #[tokio::test]
    async fn test_all_unknown_roles_means_no_panel() {
        let generation =
            ScriptedGeneration::new().reply("Available roles", &proposal_json(&["astrologer"]));

        let result = proposer(generation, 6).propose("Horoscope?").await.unwrap();

        assert!(result.needs_panel);
        assert!(result.is_no_panel());
    }

    #[tokio::test]
    async fn test_needs_panel_false_ignores_roles() {
        let response = r#"{"needsPanel": false, "reason": "trivia", "roles": [{"roleId": "finance", "question": "q"}]}"#;
        let generation = ScriptedGeneration::new().reply("Available roles", response);

        let result = proposer(generation, 6).propose("2+2?").await.unwrap();

        assert!(result.is_no_panel());
        assert!(result.roles.is_empty());
        assert_eq!(result.reason, "trivia");
    }

    #[tokio::test]
    async fn test_max_roles_truncates_keeping_rank() {
        let generation = ScriptedGeneration::new().reply(
            "Available roles",
            &proposal_json(&["finance", "architect", "security"]),
        );

        let result = proposer(generation, 2).propose("Big decision").await.unwrap();

        let ids: Vec<_> = result.roles.iter().map(|r| r.role_id.as_str()).collect();
        assert_eq!(ids, vec!["finance", "architect"]);
    }

    #[tokio::test]
    async fn test_generation_failure_is_proposal_error() {
        let generation = ScriptedGeneration::new().fail("Available roles");
        let err = proposer(generation, 6).propose("anything").await.unwrap_err();
        assert!(matches!(err, ProposalError::Generation(_)));
    }

    #[tokio::test]
    async fn test_garbage_response_is_proposal_error() {
        let generation = ScriptedGeneration::new().reply("Available roles", "I refuse.");
        let err = proposer(generation, 6).propose("anything").await.unwrap_err();
        assert!(matches!(err, ProposalError::Unparseable(_)));
    }
}

//! Delegate spawning use case
//!
//! Materializes each approved role as a canvas node linked to the master
//! node. Failures are per role: one graph-store hiccup marks that delegate
//! failed and spawning continues with the rest.

use crate::ports::graph_store::{GraphStore, GraphStoreError, NewNode};
use crate::ports::role_catalog::RoleCatalog;
use panel_domain::{
    ConversationTurn, ExpertiseLevel, NodeId, ProjectId, ProposedRole, RoleId, SpawnedDelegate,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Failure to materialize one delegate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    #[error("Role {0} is not available in the catalog")]
    RoleUnavailable(RoleId),

    #[error("Graph store error: {0}")]
    Graph(#[from] GraphStoreError),
}

/// What a consultation task needs to ask one delegate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateBrief {
    /// Position in the session's delegate list
    pub index: usize,
    pub node_id: NodeId,
    pub role_id: RoleId,
    pub role_name: String,
    pub question: String,
    pub system_prompt: String,
}

/// Outcome of one spawn pass
#[derive(Debug, Default)]
pub struct SpawnResult {
    /// One entry per approved role, in approval order
    pub delegates: Vec<SpawnedDelegate>,
    /// Only the delegates that were created successfully
    pub briefs: Vec<DelegateBrief>,
}

impl SpawnResult {
    pub fn spawned_count(&self) -> usize {
        self.briefs.len()
    }
}

/// Creates delegate nodes and their edges in the graph store
pub struct DelegateSpawner {
    graph: Arc<dyn GraphStore>,
    catalog: Arc<dyn RoleCatalog>,
    level: ExpertiseLevel,
}

impl DelegateSpawner {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        catalog: Arc<dyn RoleCatalog>,
        level: ExpertiseLevel,
    ) -> Self {
        Self {
            graph,
            catalog,
            level,
        }
    }

    /// Spawn every approved role in order.
    ///
    /// Stops early when `cancellation` fires; roles not reached are left
    /// out of the result.
    pub async fn spawn(
        &self,
        project_id: &ProjectId,
        master_id: &NodeId,
        approved: &[ProposedRole],
        cancellation: &CancellationToken,
    ) -> SpawnResult {
        let mut result = SpawnResult::default();

        for role in approved {
            if cancellation.is_cancelled() {
                info!("Spawning interrupted by cancellation");
                break;
            }

            let index = result.delegates.len();
            let mut delegate = SpawnedDelegate {
                role_id: role.role_id.clone(),
                role_name: role.role_name.clone(),
                question: role.tailored_question.clone(),
                node_id: None,
                master_to_delegate_edge: None,
                delegate_to_master_edge: None,
                failure: None,
            };

            match self
                .spawn_one(project_id, master_id, role, &mut delegate)
                .await
            {
                Ok(brief) => {
                    debug!(role_id = %role.role_id, node = %brief.node_id, "Delegate spawned");
                    result.briefs.push(DelegateBrief { index, ..brief });
                }
                Err(e) => {
                    warn!(role_id = %role.role_id, error = %e, "Delegate spawn failed");
                    delegate.failure = Some(e.to_string());
                }
            }
            result.delegates.push(delegate);
        }

        info!(
            spawned = result.spawned_count(),
            attempted = result.delegates.len(),
            "Spawning finished"
        );
        result
    }

    /// Node first, then master->delegate and delegate->master edges.
    ///
    /// Ids created before a failure are kept on `delegate`.
    async fn spawn_one(
        &self,
        project_id: &ProjectId,
        master_id: &NodeId,
        role: &ProposedRole,
        delegate: &mut SpawnedDelegate,
    ) -> Result<DelegateBrief, SpawnError> {
        let definition = self
            .catalog
            .lookup(&role.role_id)
            .ok_or_else(|| SpawnError::RoleUnavailable(role.role_id.clone()))?;
        let system_prompt = definition.system_prompt_for(self.level);

        let node_id = self
            .graph
            .create_node(NewNode {
                project_id: project_id.clone(),
                parent_id: master_id.clone(),
                title: role.role_name.clone(),
                system_prompt: Some(system_prompt.clone()),
                initial_turns: vec![ConversationTurn::user(role.tailored_question.clone())],
            })
            .await?;
        delegate.node_id = Some(node_id.clone());

        delegate.master_to_delegate_edge = Some(self.graph.create_edge(master_id, &node_id).await?);
        delegate.delegate_to_master_edge = Some(self.graph.create_edge(&node_id, master_id).await?);

        Ok(DelegateBrief {
            index: 0,
            node_id,
            role_id: role.role_id.clone(),
            role_name: role.role_name.clone(),
            question: role.tailored_question.clone(),
            system_prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCatalog, MockGraph};
    use panel_domain::TurnRole;

    fn roles(ids: &[&str]) -> Vec<ProposedRole> {
        ids.iter()
            .map(|id| {
                ProposedRole::new(RoleId::new(*id), id.to_uppercase(), "", format!("{id} question"))
            })
            .collect()
    }

    fn spawner(graph: Arc<MockGraph>) -> DelegateSpawner {
        DelegateSpawner::new(
            graph,
            Arc::new(MockCatalog::with(&["architect", "security", "finance"])),
            ExpertiseLevel::Senior,
        )
    }

    #[tokio::test]
    async fn test_spawn_creates_node_and_two_edges_per_role() {
        let graph = Arc::new(MockGraph::new().with_master("master", Vec::new()));
        let master = NodeId::new("master");

        let result = spawner(graph.clone())
            .spawn(
                &ProjectId::new("project"),
                &master,
                &roles(&["architect", "finance"]),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result.spawned_count(), 2);
        assert_eq!(graph.edges().len(), 4);

        let first = &result.delegates[0];
        let node_id = first.node_id.clone().unwrap();
        let edges = graph.edges();
        assert!(edges.iter().any(|(_, s, t)| s == &master && t == &node_id));
        assert!(edges.iter().any(|(_, s, t)| s == &node_id && t == &master));

        let stored = graph.node(&node_id).unwrap();
        assert_eq!(stored.node.parent_id, master);
        assert_eq!(stored.turns.len(), 1);
        assert_eq!(stored.turns[0].role, TurnRole::User);
        assert_eq!(stored.turns[0].content, "architect question");
        assert!(
            stored
                .node
                .system_prompt
                .unwrap()
                .starts_with("You are the architect specialist.")
        );
    }

    #[tokio::test]
    async fn test_briefs_carry_delegate_index_in_order() {
        let graph = Arc::new(MockGraph::new().failing_node("ARCHITECT"));

        let result = spawner(graph)
            .spawn(
                &ProjectId::new("p"),
                &NodeId::new("m"),
                &roles(&["architect", "security", "finance"]),
                &CancellationToken::new(),
            )
            .await;

        let indices: Vec<_> = result.briefs.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(result.briefs[0].role_name, "SECURITY");
    }

    #[tokio::test]
    async fn test_node_failure_marks_only_that_role() {
        let graph = Arc::new(MockGraph::new().failing_node("SECURITY"));

        let result = spawner(graph)
            .spawn(
                &ProjectId::new("p"),
                &NodeId::new("m"),
                &roles(&["architect", "security", "finance"]),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result.delegates.len(), 3);
        assert!(!result.delegates[0].is_failed());
        assert!(result.delegates[1].is_failed());
        assert!(result.delegates[1].node_id.is_none());
        assert!(!result.delegates[2].is_failed());
    }

    #[tokio::test]
    async fn test_edge_failure_keeps_created_node_id() {
        let graph = Arc::new(MockGraph::new().failing_edge_into("FINANCE"));

        let result = spawner(graph)
            .spawn(
                &ProjectId::new("p"),
                &NodeId::new("m"),
                &roles(&["finance"]),
                &CancellationToken::new(),
            )
            .await;

        let delegate = &result.delegates[0];
        assert!(delegate.is_failed());
        assert!(delegate.node_id.is_some());
        assert!(delegate.master_to_delegate_edge.is_none());
        assert_eq!(result.spawned_count(), 0);
    }

    #[tokio::test]
    async fn test_role_missing_from_catalog_fails_that_delegate() {
        let graph = Arc::new(MockGraph::new());

        let result = spawner(graph)
            .spawn(
                &ProjectId::new("p"),
                &NodeId::new("m"),
                &roles(&["retired", "finance"]),
                &CancellationToken::new(),
            )
            .await;

        assert!(
            result.delegates[0]
                .failure
                .as_deref()
                .unwrap()
                .contains("retired")
        );
        assert!(!result.delegates[1].is_failed());
    }

    #[tokio::test]
    async fn test_cancelled_token_spawns_nothing() {
        let graph = Arc::new(MockGraph::new());
        let token = CancellationToken::new();
        token.cancel();

        let result = spawner(graph.clone())
            .spawn(&ProjectId::new("p"), &NodeId::new("m"), &roles(&["finance"]), &token)
            .await;

        assert!(result.delegates.is_empty());
        assert!(graph.edges().is_empty());
    }
}

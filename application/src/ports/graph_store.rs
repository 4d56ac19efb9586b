//! Graph store port
//!
//! The canvas graph is owned elsewhere; the orchestrator only creates
//! delegate nodes, links them to the master node and appends turns.

use async_trait::async_trait;
use panel_domain::{ConversationTurn, EdgeId, NodeId, ProjectId};
use thiserror::Error;

/// Errors raised by the graph store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphStoreError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Everything needed to create a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub project_id: ProjectId,
    pub parent_id: NodeId,
    pub title: String,
    /// Persona the node's conversation runs under
    pub system_prompt: Option<String>,
    /// Seed conversation, oldest first
    pub initial_turns: Vec<ConversationTurn>,
}

/// Port to the canvas graph (nodes with conversations, directed edges)
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn create_node(&self, node: NewNode) -> Result<NodeId, GraphStoreError>;

    /// Create a directed edge `source -> target`
    async fn create_edge(&self, source: &NodeId, target: &NodeId)
    -> Result<EdgeId, GraphStoreError>;

    /// Append a turn to a node's conversation
    async fn append_turn(
        &self,
        node: &NodeId,
        turn: ConversationTurn,
    ) -> Result<(), GraphStoreError>;

    /// A node's conversation so far, oldest first
    async fn conversation(&self, node: &NodeId) -> Result<Vec<ConversationTurn>, GraphStoreError>;
}

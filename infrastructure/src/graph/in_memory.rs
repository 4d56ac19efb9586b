//! In-process canvas graph.
//!
//! Backs the CLI, where there is no persistent canvas: the master node is
//! seeded from the user's prompt and the graph is discarded on exit.

use async_trait::async_trait;
use panel_application::ports::graph_store::{GraphStore, GraphStoreError, NewNode};
use panel_domain::{ConversationTurn, EdgeId, NodeId, ProjectId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// One node of the canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub project_id: ProjectId,
    pub parent_id: Option<NodeId>,
    pub title: String,
    pub system_prompt: Option<String>,
    pub turns: Vec<ConversationTurn>,
}

/// One directed edge of the canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Default)]
struct Graph {
    nodes: HashMap<NodeId, GraphNode>,
    /// Insertion order, for stable listings
    order: Vec<NodeId>,
    edges: Vec<GraphEdge>,
}

/// [`GraphStore`] kept entirely in memory
#[derive(Default)]
pub struct InMemoryGraphStore {
    graph: RwLock<Graph>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node (no parent) holding the given conversation
    pub fn add_root(
        &self,
        project_id: ProjectId,
        title: impl Into<String>,
        turns: Vec<ConversationTurn>,
    ) -> Result<NodeId, GraphStoreError> {
        let node = GraphNode {
            id: NodeId::new(uuid::Uuid::new_v4().to_string()),
            project_id,
            parent_id: None,
            title: title.into(),
            system_prompt: None,
            turns,
        };
        let id = node.id.clone();
        self.write()?.insert(node);
        Ok(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<GraphNode> {
        self.graph.read().ok()?.nodes.get(id).cloned()
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> Vec<GraphNode> {
        let Ok(graph) = self.graph.read() else {
            return Vec::new();
        };
        graph
            .order
            .iter()
            .filter_map(|id| graph.nodes.get(id).cloned())
            .collect()
    }

    pub fn edges(&self) -> Vec<GraphEdge> {
        self.graph
            .read()
            .map(|g| g.edges.clone())
            .unwrap_or_default()
    }

    /// Edges leaving or entering `id`
    pub fn edges_of(&self, id: &NodeId) -> Vec<GraphEdge> {
        self.edges()
            .into_iter()
            .filter(|e| &e.source == id || &e.target == id)
            .collect()
    }

    /// Nodes reached by an edge leaving `id`, in creation order
    pub fn linked_from(&self, id: &NodeId) -> Vec<GraphNode> {
        let targets: HashSet<NodeId> = self
            .edges_of(id)
            .into_iter()
            .filter(|e| &e.source == id)
            .map(|e| e.target)
            .collect();
        self.nodes()
            .into_iter()
            .filter(|n| targets.contains(&n.id))
            .collect()
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Graph>, GraphStoreError> {
        self.graph
            .write()
            .map_err(|_| GraphStoreError::Storage("graph lock poisoned".to_string()))
    }
}

impl Graph {
    fn insert(&mut self, node: GraphNode) {
        self.order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn create_node(&self, node: NewNode) -> Result<NodeId, GraphStoreError> {
        let mut graph = self.write()?;
        if !graph.nodes.contains_key(&node.parent_id) {
            return Err(GraphStoreError::NodeNotFound(node.parent_id));
        }
        let id = NodeId::new(uuid::Uuid::new_v4().to_string());
        graph.insert(GraphNode {
            id: id.clone(),
            project_id: node.project_id,
            parent_id: Some(node.parent_id),
            title: node.title,
            system_prompt: node.system_prompt,
            turns: node.initial_turns,
        });
        Ok(id)
    }

    async fn create_edge(
        &self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<EdgeId, GraphStoreError> {
        let mut graph = self.write()?;
        for id in [source, target] {
            if !graph.nodes.contains_key(id) {
                return Err(GraphStoreError::NodeNotFound(id.clone()));
            }
        }
        let id = EdgeId::new(uuid::Uuid::new_v4().to_string());
        graph.edges.push(GraphEdge {
            id: id.clone(),
            source: source.clone(),
            target: target.clone(),
        });
        Ok(id)
    }

    async fn append_turn(
        &self,
        node: &NodeId,
        turn: ConversationTurn,
    ) -> Result<(), GraphStoreError> {
        let mut graph = self.write()?;
        let stored = graph
            .nodes
            .get_mut(node)
            .ok_or_else(|| GraphStoreError::NodeNotFound(node.clone()))?;
        stored.turns.push(turn);
        Ok(())
    }

    async fn conversation(&self, node: &NodeId) -> Result<Vec<ConversationTurn>, GraphStoreError> {
        self.node(node)
            .map(|n| n.turns)
            .ok_or_else(|| GraphStoreError::NodeNotFound(node.clone()))
    }
}

//! Test doubles shared by the use case tests.

use crate::ports::generation::{GenerationError, GenerationService};
use crate::ports::graph_store::{GraphStore, GraphStoreError, NewNode};
use crate::ports::progress::ConsultationProgressNotifier;
use crate::ports::role_catalog::RoleCatalog;
use async_trait::async_trait;
use panel_domain::{
    ConversationTurn, DelegateStatus, EdgeId, NodeId, ProjectId, Question, RoleDefinition,
    RoleId, SessionStatus,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ==================== Generation ====================

#[derive(Clone)]
pub enum Behavior {
    Reply(String),
    Fail(GenerationError),
    /// Never completes
    Hang,
    /// Replies once the notify fires
    Gated(Arc<Notify>, String),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub context: Vec<ConversationTurn>,
}

/// Generation service whose behavior is chosen by prompt substring
pub struct ScriptedGeneration {
    rules: Mutex<Vec<(String, Behavior)>>,
    fallback: Behavior,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGeneration {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            fallback: Behavior::Reply("generic answer".to_string()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn on(self, needle: &str, behavior: Behavior) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), behavior));
        self
    }

    pub fn reply(self, needle: &str, text: &str) -> Self {
        self.on(needle, Behavior::Reply(text.to_string()))
    }

    pub fn fail(self, needle: &str) -> Self {
        self.on(
            needle,
            Behavior::Fail(GenerationError::RequestFailed(format!("scripted failure for {needle}"))),
        )
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.prompt.contains(needle))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn behavior_for(&self, prompt: &str) -> Behavior {
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, b)| b.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GenerationService for ScriptedGeneration {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        context: &[ConversationTurn],
    ) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            system_prompt: system_prompt.map(str::to_string),
            context: context.to_vec(),
        });
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        // Let sibling tasks start so concurrency is observable
        tokio::task::yield_now().await;

        match self.behavior_for(prompt) {
            Behavior::Reply(text) => Ok(text),
            Behavior::Fail(e) => Err(e),
            Behavior::Hang => std::future::pending().await,
            Behavior::Gated(gate, text) => {
                gate.notified().await;
                Ok(text)
            }
        }
    }
}

/// JSON proposal naming the given roles, each with question `"<id> question"`
pub fn proposal_json(role_ids: &[&str]) -> String {
    let roles: Vec<serde_json::Value> = role_ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "roleId": id,
                "justification": format!("{id} perspective"),
                "question": format!("{id} question"),
            })
        })
        .collect();
    serde_json::json!({
        "needsPanel": !roles.is_empty(),
        "reason": "multi-disciplinary question",
        "roles": roles,
    })
    .to_string()
}

// ==================== Graph store ====================

#[derive(Debug, Clone)]
pub struct StoredNode {
    pub node: NewNode,
    pub turns: Vec<ConversationTurn>,
}

/// In-memory graph store with failure injection by node title
#[derive(Default)]
pub struct MockGraph {
    nodes: Mutex<HashMap<NodeId, StoredNode>>,
    edges: Mutex<Vec<(EdgeId, NodeId, NodeId)>>,
    fail_node_titles: Mutex<HashSet<String>>,
    fail_edges_to: Mutex<HashSet<String>>,
    gated_titles: Mutex<HashMap<String, Arc<Notify>>>,
    gate_reached: Notify,
    counter: AtomicUsize,
}

impl MockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_master(self, id: &str, turns: Vec<ConversationTurn>) -> Self {
        self.nodes.lock().unwrap().insert(
            NodeId::new(id),
            StoredNode {
                node: NewNode {
                    project_id: ProjectId::new("project"),
                    parent_id: NodeId::new(id),
                    title: "master".to_string(),
                    system_prompt: None,
                    initial_turns: Vec::new(),
                },
                turns,
            },
        );
        self
    }

    pub fn failing_node(self, title: &str) -> Self {
        self.fail_node_titles
            .lock()
            .unwrap()
            .insert(title.to_string());
        self
    }

    pub fn failing_edge_into(self, title: &str) -> Self {
        self.fail_edges_to.lock().unwrap().insert(title.to_string());
        self
    }

    /// Hold creation of the node titled `title` until `release` fires
    pub fn gated_node(self, title: &str, release: Arc<Notify>) -> Self {
        self.gated_titles
            .lock()
            .unwrap()
            .insert(title.to_string(), release);
        self
    }

    /// Fires once a gated node creation is waiting
    pub fn gate_reached(&self) -> &Notify {
        &self.gate_reached
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.nodes
            .lock()
            .unwrap()
            .values()
            .any(|n| n.node.title == title)
    }

    pub fn node(&self, id: &NodeId) -> Option<StoredNode> {
        self.nodes.lock().unwrap().get(id).cloned()
    }

    pub fn edges(&self) -> Vec<(EdgeId, NodeId, NodeId)> {
        self.edges.lock().unwrap().clone()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl GraphStore for MockGraph {
    async fn create_node(&self, node: NewNode) -> Result<NodeId, GraphStoreError> {
        if self.fail_node_titles.lock().unwrap().contains(&node.title) {
            return Err(GraphStoreError::Storage(format!("cannot create {}", node.title)));
        }
        let gate = self.gated_titles.lock().unwrap().get(&node.title).cloned();
        if let Some(release) = gate {
            self.gate_reached.notify_one();
            release.notified().await;
        }
        let id = NodeId::new(self.next_id("node"));
        let turns = node.initial_turns.clone();
        self.nodes
            .lock()
            .unwrap()
            .insert(id.clone(), StoredNode { node, turns });
        Ok(id)
    }

    async fn create_edge(
        &self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<EdgeId, GraphStoreError> {
        let target_title = self.node(target).map(|n| n.node.title).unwrap_or_default();
        if self.fail_edges_to.lock().unwrap().contains(&target_title) {
            return Err(GraphStoreError::Storage("edge rejected".to_string()));
        }
        let id = EdgeId::new(self.next_id("edge"));
        self.edges
            .lock()
            .unwrap()
            .push((id.clone(), source.clone(), target.clone()));
        Ok(id)
    }

    async fn append_turn(
        &self,
        node: &NodeId,
        turn: ConversationTurn,
    ) -> Result<(), GraphStoreError> {
        let mut nodes = self.nodes.lock().unwrap();
        let stored = nodes
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

// ==================== Role catalog ====================

pub struct MockCatalog {
    roles: Vec<RoleDefinition>,
}

impl MockCatalog {
    /// Catalog with one role per id, named by upper-casing the id
    pub fn with(ids: &[&str]) -> Self {
        Self {
            roles: ids
                .iter()
                .map(|id| {
                    RoleDefinition::new(
                        *id,
                        id.to_uppercase(),
                        format!("{id} description"),
                        format!("You are the {id} specialist."),
                    )
                })
                .collect(),
        }
    }
}

impl RoleCatalog for MockCatalog {
    fn lookup(&self, role_id: &RoleId) -> Option<RoleDefinition> {
        self.roles.iter().find(|r| &r.id == role_id).cloned()
    }

    fn list(&self) -> Vec<RoleDefinition> {
        self.roles.clone()
    }
}

// ==================== Progress ====================

#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl ConsultationProgressNotifier for RecordingProgress {
    fn on_stage_change(&self, status: SessionStatus) {
        self.events.lock().unwrap().push(format!("stage:{status}"));
    }

    fn on_delegate_update(&self, index: usize, delegate: &DelegateStatus, _total: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("delegate:{index}:{}", delegate.state.as_str()));
    }

    fn on_synthesis_start(&self, contributors: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("synthesis:{contributors}"));
    }
}

pub fn question(text: &str) -> Question {
    Question::new(text).unwrap()
}

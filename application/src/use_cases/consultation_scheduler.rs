//! Consultation scheduler
//!
//! Fans out one generation task per spawned delegate and joins them all
//! before returning. Each task reports into the shared session as it
//! settles, so observers see progress incrementally.

use crate::ports::generation::{GenerationError, GenerationService};
use crate::ports::graph_store::GraphStore;
use crate::ports::progress::ConsultationProgressNotifier;
use crate::ports::session_logger::{SessionEvent, SessionLogger};
use crate::use_cases::session_handle::SessionHandle;
use crate::use_cases::spawn_delegates::DelegateBrief;
use panel_domain::{ConversationTurn, DelegateState, PREVIEW_CHARS};
use panel_domain::core::string::take_chars;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// One delegate's consultation call failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegateGenerationError {
    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("no response within {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Everything the scheduler collected once all tasks settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationReport {
    /// Full response text per delegate index; `None` for failed delegates
    pub responses: Vec<Option<String>>,
    /// The join was cut short by the session's cancellation signal
    pub cancelled: bool,
}

/// Runs the delegate fan-out with a concurrency cap and per-task timeout
pub struct ConsultationScheduler {
    generation: Arc<dyn GenerationService>,
    graph: Arc<dyn GraphStore>,
    progress: Arc<dyn ConsultationProgressNotifier>,
    logger: Arc<dyn SessionLogger>,
    max_concurrency: usize,
    delegate_timeout: Duration,
}

/// State shared by every delegate task of one run
struct TaskContext {
    generation: Arc<dyn GenerationService>,
    graph: Arc<dyn GraphStore>,
    progress: Arc<dyn ConsultationProgressNotifier>,
    logger: Arc<dyn SessionLogger>,
    handle: SessionHandle,
    permits: Semaphore,
    delegate_timeout: Duration,
    context: Vec<ConversationTurn>,
}

impl ConsultationScheduler {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        graph: Arc<dyn GraphStore>,
        progress: Arc<dyn ConsultationProgressNotifier>,
        logger: Arc<dyn SessionLogger>,
    ) -> Self {
        Self {
            generation,
            graph,
            progress,
            logger,
            max_concurrency: 8,
            delegate_timeout: Duration::from_secs(180),
        }
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_delegate_timeout(mut self, timeout: Duration) -> Self {
        self.delegate_timeout = timeout;
        self
    }

    /// Consult every delegate in `briefs` and wait for all of them.
    ///
    /// Returns early only when the session's cancellation token fires;
    /// outstanding tasks are aborted before returning.
    pub async fn run(
        &self,
        handle: &SessionHandle,
        briefs: Vec<DelegateBrief>,
        context: Vec<ConversationTurn>,
    ) -> ConsultationReport {
        let total = handle.snapshot().total_delegates();
        let mut responses = vec![None; total];

        let shared = Arc::new(TaskContext {
            generation: Arc::clone(&self.generation),
            graph: Arc::clone(&self.graph),
            progress: Arc::clone(&self.progress),
            logger: Arc::clone(&self.logger),
            handle: handle.clone(),
            permits: Semaphore::new(self.max_concurrency),
            delegate_timeout: self.delegate_timeout,
            context,
        });

        info!(
            delegates = briefs.len(),
            max_concurrency = self.max_concurrency,
            "Consulting delegates"
        );

        let mut join_set = JoinSet::new();
        let mut task_index = HashMap::new();
        for brief in briefs {
            let index = brief.index;
            let shared = Arc::clone(&shared);
            let abort = join_set.spawn(async move { consult_delegate(shared, brief).await });
            task_index.insert(abort.id(), index);
        }

        let token = handle.cancellation_token().clone();
        let mut cancelled = false;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!(outstanding = join_set.len(), "Cancelling outstanding delegates");
                    join_set.abort_all();
                    while join_set.join_next().await.is_some() {}
                    cancelled = true;
                    break;
                }
                next = join_set.join_next_with_id() => match next {
                    None => break,
                    Some(Ok((_, (index, text)))) => {
                        if let Some(slot) = responses.get_mut(index) {
                            *slot = text;
                        }
                    }
                    Some(Err(e)) => {
                        let Some(&index) = task_index.get(&e.id()) else {
                            warn!("Task join error: {}", e);
                            continue;
                        };
                        warn!(delegate = index, "Delegate task did not finish: {}", e);
                        settle(&shared, index, DelegateState::Failed {
                            reason: "consultation task crashed".to_string(),
                        });
                    }
                }
            }
        }

        debug!(
            responded = responses.iter().filter(|r| r.is_some()).count(),
            cancelled, "Consultation join finished"
        );
        ConsultationReport {
            responses,
            cancelled,
        }
    }
}

/// Body of one delegate task. Returns the delegate index and the full
/// response when it responded.
async fn consult_delegate(shared: Arc<TaskContext>, brief: DelegateBrief) -> (usize, Option<String>) {
    let index = brief.index;

    let Ok(_permit) = shared.permits.acquire().await else {
        return (index, None);
    };
    if !settle(&shared, index, DelegateState::Thinking) {
        return (index, None);
    }

    let call = shared.generation.generate(
        &brief.question,
        Some(&brief.system_prompt),
        &shared.context,
    );
    let outcome = match tokio::time::timeout(shared.delegate_timeout, call).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DelegateGenerationError::from(e)),
        Err(_) => Err(DelegateGenerationError::TimedOut(shared.delegate_timeout)),
    };

    match outcome {
        Ok(text) => {
            if let Err(e) = shared
                .graph
                .append_turn(&brief.node_id, ConversationTurn::assistant(text.clone()))
                .await
            {
                warn!(delegate = index, error = %e, "Could not write response to delegate node");
            }
            let preview = take_chars(&text, PREVIEW_CHARS);
            if settle(&shared, index, DelegateState::Responded { preview }) {
                info!(delegate = index, role = %brief.role_name, "Delegate responded");
                (index, Some(text))
            } else {
                (index, None)
            }
        }
        Err(e) => {
            warn!(delegate = index, role = %brief.role_name, error = %e, "Delegate failed");
            settle(
                &shared,
                index,
                DelegateState::Failed {
                    reason: e.to_string(),
                },
            );
            (index, None)
        }
    }
}

/// Write one delegate transition and notify observers.
///
/// Returns `false` when the session no longer accepts the transition,
/// e.g. after it was cancelled.
fn settle(shared: &TaskContext, index: usize, state: DelegateState) -> bool {
    let result = shared.handle.try_mutate(|session| {
        session.update_delegate_status(index, state)?;
        let row = session.delegate_statuses()[index].clone();
        Ok((row, session.total_delegates(), session.id().clone()))
    });

    match result {
        Ok((row, total, session_id)) => {
            shared.progress.on_delegate_update(index, &row, total);
            if row.state.is_settled() {
                shared.logger.log(SessionEvent::new(
                    "delegate_settled",
                    json!({
                        "session_id": session_id,
                        "delegate": index,
                        "role_id": row.role_id,
                        "state": row.state,
                    }),
                ));
            }
            true
        }
        Err(e) => {
            debug!(delegate = index, error = %e, "Delegate update rejected");
            false
        }
    }
}

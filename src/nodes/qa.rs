use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{AppResult, QaError};
use crate::graph::Node;
use crate::messages;
use crate::qa::AnswerEngine;
use crate::search::{Corpus, SimilarityIndex};
use crate::state::{Mode, WorkflowState};

/// Answers the question through the extractive QA collaborator.
///
/// When the state carries no context yet, the node first retrieves a
/// best-effort passage: the single closest case document, or nothing when no
/// document overlaps the question. A timed-out QA call resolves to a fixed
/// answer; any other QA failure propagates to the invocation boundary.
pub struct AnswerQuestionNode {
    engine: Arc<dyn AnswerEngine>,
    index: Arc<dyn SimilarityIndex>,
    timeout: Duration,
}

impl AnswerQuestionNode {
    /// Create an answer node over `engine`, with `index` for context lookup.
    pub fn new(
        engine: Arc<dyn AnswerEngine>,
        index: Arc<dyn SimilarityIndex>,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            index,
            timeout,
        }
    }

    async fn best_effort_context(&self, question: &str) -> String {
        match timeout(self.timeout, self.index.search(question, Corpus::Case, 1)).await {
            Ok(Ok(hits)) => hits
                .into_iter()
                .next()
                .map(|hit| hit.content)
                .unwrap_or_default(),
            Ok(Err(e)) => {
                warn!(error = %e, "Context retrieval failed; answering without context");
                String::new()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Context retrieval timed out; answering without context"
                );
                String::new()
            }
        }
    }
}

#[async_trait]
impl Node<WorkflowState> for AnswerQuestionNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode != Mode::Chat {
            return Ok(state.with_answer(messages::CHAT_WRONG_MODE));
        }
        // The entry guard may already have answered (e.g. a bare case number)
        if state.answer.is_some() {
            return Ok(state);
        }

        let state = if state.context.trim().is_empty() {
            let context = self.best_effort_context(&state.question).await;
            state.with_context(context)
        } else {
            state
        };

        match timeout(
            self.timeout,
            self.engine.answer(&state.question, &state.context),
        )
        .await
        {
            Ok(Ok(answer)) => {
                let answer = answer.trim().to_string();
                if answer.is_empty() {
                    debug!("QA returned an empty answer");
                    Ok(state)
                } else {
                    Ok(state.with_answer(answer))
                }
            }
            Ok(Err(QaError::Timeout { timeout_ms })) => {
                warn!(timeout_ms, "QA call timed out");
                Ok(state.with_answer(messages::QA_TIMEOUT))
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "QA call timed out"
                );
                Ok(state.with_answer(messages::QA_TIMEOUT))
            }
        }
    }
}

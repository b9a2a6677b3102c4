use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::graph::Node;
use crate::messages;
use crate::search::{Corpus, SimilarityIndex};
use crate::state::{Mode, WorkflowState};

/// Fixed result depth for similarity queries.
pub const TOP_K: usize = 5;

/// Runs the similarity query for one corpus and attaches ranked hits.
///
/// Outside similarity mode the node answers with a fixed message and never
/// touches the index. An empty result set or a timed-out query resolves to
/// the no-results answer and leaves the result list empty.
pub struct SimilaritySearchNode {
    index: Arc<dyn SimilarityIndex>,
    corpus: Corpus,
    timeout: Duration,
}

impl SimilaritySearchNode {
    /// Create a search node bound to one corpus.
    pub fn new(index: Arc<dyn SimilarityIndex>, corpus: Corpus, timeout: Duration) -> Self {
        Self {
            index,
            corpus,
            timeout,
        }
    }

    fn not_found_answer(&self) -> &'static str {
        match self.corpus {
            Corpus::Case => messages::CASE_NOT_FOUND,
            Corpus::Claim => messages::CLAIM_NOT_FOUND,
        }
    }
}

#[async_trait]
impl Node<WorkflowState> for SimilaritySearchNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode != Mode::Similarity {
            return Ok(state.with_answer(messages::SIMILARITY_WRONG_MODE));
        }
        if state.answer.is_some() {
            return Ok(state);
        }

        let query = state.context.trim().to_string();
        if query.is_empty() {
            debug!(corpus = %self.corpus, "No context to search with");
            return Ok(state.with_answer(self.not_found_answer()));
        }

        match timeout(self.timeout, self.index.search(&query, self.corpus, TOP_K)).await {
            Ok(Ok(hits)) => {
                if hits.is_empty() {
                    debug!(corpus = %self.corpus, "Similarity query matched nothing");
                    Ok(state.with_answer(messages::NO_SIMILAR_RECORDS))
                } else {
                    debug!(corpus = %self.corpus, hits = hits.len(), "Similarity query succeeded");
                    Ok(state.with_results(hits))
                }
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                warn!(
                    corpus = %self.corpus,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Similarity query timed out"
                );
                Ok(state.with_answer(messages::NO_SIMILAR_RECORDS))
            }
        }
    }
}

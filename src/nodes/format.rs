use async_trait::async_trait;

use crate::error::AppResult;
use crate::graph::Node;
use crate::messages;
use crate::search::{Corpus, SearchHit, META_CASE_NUMBER, META_CLAIM_NUMBER};
use crate::state::WorkflowState;

use super::ensure_answer;

const SNIPPET_LEN: usize = 80;
const METADATA_MISSING: &str = "N/A";

/// Renders ranked hits as a markdown table for one corpus.
///
/// Pure formatting: rank is the 1-based position in the result order and the
/// input is never reordered. With no results to render, the node leaves any
/// earlier explanation in place instead of emitting a bare header.
pub struct FormatResultsNode {
    corpus: Corpus,
}

impl FormatResultsNode {
    /// Create a formatter for one corpus.
    pub fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }

    fn render(&self, hits: &[SearchHit]) -> String {
        match self.corpus {
            Corpus::Case => {
                let mut table =
                    String::from("| Rank | Similar Case | Score |\n|------|----------------|-------|\n");
                for (i, hit) in hits.iter().enumerate() {
                    table.push_str(&format!(
                        "| {} | {} | {:.4} |\n",
                        i + 1,
                        snippet(&hit.content),
                        hit.score
                    ));
                }
                table
            }
            Corpus::Claim => {
                let mut table = String::from(
                    "| Rank | Case Number | Claim Number | Claim Text | Score |\n|------|-------------|--------------|------------|-------|\n",
                );
                for (i, hit) in hits.iter().enumerate() {
                    let case_number = metadata_or_default(hit, META_CASE_NUMBER);
                    let claim_number = metadata_or_default(hit, META_CLAIM_NUMBER);
                    table.push_str(&format!(
                        "| {} | {} | {} | {} | {:.4} |\n",
                        i + 1,
                        case_number,
                        claim_number,
                        snippet(&hit.content),
                        hit.score
                    ));
                }
                table
            }
        }
    }
}

#[async_trait]
impl Node<WorkflowState> for FormatResultsNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        let hits = state.retrieved_results();
        if hits.is_empty() {
            return Ok(ensure_answer(state, messages::NO_SIMILAR_RECORDS));
        }

        let table = self.render(hits);
        Ok(state.with_answer(table))
    }
}

fn snippet(content: &str) -> String {
    content
        .chars()
        .take(SNIPPET_LEN)
        .collect::<String>()
        .replace('\n', " ")
}

fn metadata_or_default<'a>(hit: &'a SearchHit, key: &str) -> &'a str {
    hit.metadata
        .get(key)
        .map(String::as_str)
        .unwrap_or(METADATA_MISSING)
}

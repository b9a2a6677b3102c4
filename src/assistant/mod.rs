//! Invocation surface: graph wiring and the outer error boundary.
//!
//! [`Assistant::new`] assembles the full workflow topology over injected
//! collaborators, so tests can substitute fakes for the store, the index,
//! the answer engine, and the claim lister. [`Assistant::run_workflow`] is
//! the single entry point per user turn.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};
use uuid::Uuid;

use crate::config::{ClaimSource, Config};
use crate::error::AppResult;
use crate::graph::{GraphBuilder, WorkflowGraph};
use crate::messages;
use crate::nodes::{
    route_by_identifier, route_by_mode, AnswerQuestionNode, ClaimLister, FetchRecordNode,
    FormatResultsNode, QcCheckCompleteNode, QcCreateTaskNode, QcFetchClaimsNode, QcFinalizeNode,
    QcReviewNode, ResolveInputNode, SimilaritySearchNode, StoreClaimLister, SyntheticClaimLister,
    UnsupportedInputNode,
};
use crate::qa::AnswerEngine;
use crate::records::RecordStore;
use crate::search::{Corpus, SimilarityIndex};
use crate::state::{Mode, WorkflowState};

/// Build the claim lister selected by the configuration.
pub fn claim_lister_for(source: ClaimSource, store: Arc<dyn RecordStore>) -> Arc<dyn ClaimLister> {
    match source {
        ClaimSource::Synthetic => Arc::new(SyntheticClaimLister),
        ClaimSource::Records => Arc::new(StoreClaimLister::new(store)),
    }
}

/// The assembled workflow, ready to serve invocations.
pub struct Assistant {
    graph: WorkflowGraph<WorkflowState>,
}

impl Assistant {
    /// Wire the workflow graph over the given collaborators.
    pub fn new(
        store: Arc<dyn RecordStore>,
        index: Arc<dyn SimilarityIndex>,
        engine: Arc<dyn AnswerEngine>,
        claims: Arc<dyn ClaimLister>,
        config: &Config,
    ) -> AppResult<Self> {
        let timeout = Duration::from_millis(config.request.timeout_ms);

        let graph = GraphBuilder::new()
            .add_node("resolve", ResolveInputNode)
            .add_node(
                "qa",
                AnswerQuestionNode::new(engine, Arc::clone(&index), timeout),
            )
            .add_node("fetch", FetchRecordNode::new(store, timeout))
            .add_node(
                "case_similarity",
                SimilaritySearchNode::new(Arc::clone(&index), Corpus::Case, timeout),
            )
            .add_node(
                "claim_similarity",
                SimilaritySearchNode::new(index, Corpus::Claim, timeout),
            )
            .add_node("format_cases", FormatResultsNode::new(Corpus::Case))
            .add_node("format_claims", FormatResultsNode::new(Corpus::Claim))
            .add_node("unsupported", UnsupportedInputNode)
            .add_node("qc_fetch", QcFetchClaimsNode::new(claims, timeout))
            .add_node("qc_create_task", QcCreateTaskNode)
            .add_node("qc_review", QcReviewNode)
            .add_node("qc_check_complete", QcCheckCompleteNode)
            .add_node("qc_finalize", QcFinalizeNode)
            .set_entry_point("resolve")
            .add_conditional_edges(
                "resolve",
                route_by_mode,
                &[("chat", "qa"), ("similarity", "fetch"), ("qc", "qc_fetch")],
            )
            .add_conditional_edges(
                "fetch",
                route_by_identifier,
                &[
                    ("case", "case_similarity"),
                    ("claim", "claim_similarity"),
                    ("unsupported_case", "unsupported"),
                ],
            )
            .add_edge("case_similarity", "format_cases")
            .add_edge("claim_similarity", "format_claims")
            .add_edge("qc_fetch", "qc_create_task")
            .add_edge("qc_create_task", "qc_review")
            .add_edge("qc_review", "qc_check_complete")
            .add_edge("qc_check_complete", "qc_finalize")
            .build()?;

        Ok(Self { graph })
    }

    /// Run one invocation to its finish point and return the final state.
    ///
    /// Expected conditions (not found, wrong mode, no results) come back
    /// inside the state; a collaborator failure is caught here and degrades
    /// to a fixed user-visible answer instead of surfacing an error.
    pub async fn run_workflow(&self, question: &str, mode: Mode) -> WorkflowState {
        let run_id = Uuid::new_v4();
        let start = Instant::now();

        let state = WorkflowState::new(question, mode);
        match self.graph.run(state).await {
            Ok(state) => {
                info!(
                    run_id = %run_id,
                    mode = %mode,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Workflow completed"
                );
                state
            }
            Err(e) => {
                error!(
                    run_id = %run_id,
                    mode = %mode,
                    error = %e,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Workflow failed"
                );
                WorkflowState::new(question, mode).with_answer(messages::WORKFLOW_FAILED)
            }
        }
    }
}

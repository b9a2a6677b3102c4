//! Workflow nodes.
//!
//! Each node implements [`crate::graph::Node`] over [`WorkflowState`] and
//! recovers its expected failure conditions (not found, wrong mode, no
//! results) into the answer field. Only genuine collaborator failures
//! propagate out of a node; the assistant layer catches those at the
//! invocation boundary.
//!
//! Every mode-specific node re-checks the invocation mode in its body. The
//! router already keeps the branches apart, but the nodes stay individually
//! correct regardless of how they are reached.

mod fetch;
mod format;
mod qa;
mod qc;
mod resolve;
mod similarity;

pub use fetch::FetchRecordNode;
pub use format::FormatResultsNode;
pub use qa::AnswerQuestionNode;
pub use qc::{
    ClaimLister, QcCheckCompleteNode, QcCreateTaskNode, QcFetchClaimsNode, QcFinalizeNode,
    QcReviewNode, StoreClaimLister, SyntheticClaimLister,
};
pub use resolve::{route_by_identifier, route_by_mode, ResolveInputNode, UnsupportedInputNode};
pub use similarity::{SimilaritySearchNode, TOP_K};

#[cfg(test)]
pub use qc::MockClaimLister;

use crate::state::WorkflowState;

/// Set `answer` only when no earlier node already set one.
fn ensure_answer(state: WorkflowState, answer: &str) -> WorkflowState {
    if state.answer.is_some() {
        state
    } else {
        state.with_answer(answer)
    }
}

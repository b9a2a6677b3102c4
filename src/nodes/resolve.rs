use async_trait::async_trait;
use tracing::debug;

use crate::error::AppResult;
use crate::graph::Node;
use crate::intent::{self, Intent};
use crate::messages;
use crate::state::{Mode, WorkflowState};

use super::ensure_answer;

/// Entry node: classifies the question and extracts any identifier.
///
/// Chat mode additionally rejects bare case-like numbers before resolution
/// runs, so a misplaced case number never reaches the record fetcher.
pub struct ResolveInputNode;

#[async_trait]
impl Node<WorkflowState> for ResolveInputNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode == Mode::Chat && intent::is_bare_case_number(&state.question) {
            debug!("Rejected bare case number in chat mode");
            return Ok(state
                .with_intent(Intent::Unrecognized)
                .with_answer(messages::CASE_NUMBER_IN_CHAT));
        }

        let resolved = intent::resolve(&state.question);
        debug!(intent = ?resolved, "Resolved input");

        let identifier = resolved.identifier().map(str::to_string);
        let mut state = state.with_intent(resolved);
        if let Some(identifier) = identifier {
            state = state.with_identifier(identifier);
        }
        Ok(state)
    }
}

/// Terminal node for similarity-mode input that matches no recognized shape.
pub struct UnsupportedInputNode;

#[async_trait]
impl Node<WorkflowState> for UnsupportedInputNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        Ok(ensure_answer(state, messages::UNSUPPORTED_INPUT))
    }
}

/// Top-level branch selector: one branch key per mode.
pub fn route_by_mode(state: &WorkflowState) -> String {
    state.mode.to_string()
}

/// Similarity-path branch selector over the resolved intent.
pub fn route_by_identifier(state: &WorkflowState) -> String {
    match &state.intent {
        Some(Intent::CaseId(_)) | Some(Intent::CaseText(_)) => "case".to_string(),
        Some(Intent::ClaimId(_)) | Some(Intent::ClaimText(_)) => "claim".to_string(),
        _ => "unsupported_case".to_string(),
    }
}

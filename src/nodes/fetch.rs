use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::graph::Node;
use crate::intent::Intent;
use crate::messages;
use crate::records::RecordStore;
use crate::state::{Mode, WorkflowState};

/// Looks up the record behind a resolved identifier and seeds the context.
///
/// Text intents carry their own context and skip the store entirely. A lookup
/// that finds nothing, yields an empty record, or times out resolves to the
/// corpus-appropriate not-found answer; only store failures propagate.
pub struct FetchRecordNode {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl FetchRecordNode {
    /// Create a fetch node over `store`.
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

#[async_trait]
impl Node<WorkflowState> for FetchRecordNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode != Mode::Similarity {
            return Ok(state.with_answer(messages::LOOKUP_WRONG_MODE));
        }
        if state.answer.is_some() {
            return Ok(state);
        }

        match state.intent.clone() {
            Some(Intent::CaseText(body)) | Some(Intent::ClaimText(body)) => {
                Ok(state.with_context(body))
            }
            Some(Intent::CaseId(id)) => {
                match timeout(self.timeout, self.store.fetch_case(&id)).await {
                    Ok(Ok(Some(case))) => {
                        let context = case.context_text();
                        if context.trim().is_empty() {
                            debug!(case = %id, "Case record is empty");
                            Ok(state.with_answer(messages::CASE_NOT_FOUND))
                        } else {
                            Ok(state.with_context(context))
                        }
                    }
                    Ok(Ok(None)) => {
                        debug!(case = %id, "Case not found");
                        Ok(state.with_answer(messages::CASE_NOT_FOUND))
                    }
                    Ok(Err(e)) => Err(e.into()),
                    Err(_) => {
                        warn!(
                            case = %id,
                            timeout_ms = self.timeout.as_millis() as u64,
                            "Case lookup timed out"
                        );
                        Ok(state.with_answer(messages::CASE_NOT_FOUND))
                    }
                }
            }
            Some(Intent::ClaimId(id)) => {
                match timeout(self.timeout, self.store.fetch_claim(&id)).await {
                    Ok(Ok(Some(claim))) => {
                        let context = claim.context_text();
                        if context.trim().is_empty() {
                            debug!(claim = %id, "Claim record is empty");
                            Ok(state.with_answer(messages::CLAIM_NOT_FOUND))
                        } else {
                            Ok(state.with_context(context))
                        }
                    }
                    Ok(Ok(None)) => {
                        debug!(claim = %id, "Claim not found");
                        Ok(state.with_answer(messages::CLAIM_NOT_FOUND))
                    }
                    Ok(Err(e)) => Err(e.into()),
                    Err(_) => {
                        warn!(
                            claim = %id,
                            timeout_ms = self.timeout.as_millis() as u64,
                            "Claim lookup timed out"
                        );
                        Ok(state.with_answer(messages::CLAIM_NOT_FOUND))
                    }
                }
            }
            // Unclassified input is routed to the unsupported terminal
            _ => Ok(state),
        }
    }
}

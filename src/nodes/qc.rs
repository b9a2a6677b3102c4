use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{AppResult, StorageResult};
use crate::graph::Node;
use crate::messages;
use crate::records::RecordStore;
use crate::state::{Mode, WorkflowState};

const STATUS_CLAIMS_FETCHED: &str = "Claims fetched";
const STATUS_TASK_CREATED: &str = "QC task created";
const STATUS_CLAIMS_REVIEWED: &str = "Claims reviewed";
const STATUS_COMPLETED: &str = "QC Completed";
const STATUS_INCOMPLETE: &str = "QC Incomplete";
const STATUS_EMAIL_SENT: &str = "Email sent";

const REVIEWED_MARKER: &str = ": Reviewed";

const SYNTHETIC_CLAIMS_PER_CASE: usize = 3;

/// Where the QC fetch step gets the claims for a case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimLister: Send + Sync {
    /// Ordered claim tokens for the given case identifier.
    async fn list_claims(&self, case_id: &str) -> StorageResult<Vec<String>>;
}

/// Deterministic claim tokens derived from the case identifier, for running
/// the pipeline without claim records.
pub struct SyntheticClaimLister;

#[async_trait]
impl ClaimLister for SyntheticClaimLister {
    async fn list_claims(&self, case_id: &str) -> StorageResult<Vec<String>> {
        Ok((1..=SYNTHETIC_CLAIMS_PER_CASE)
            .map(|i| format!("Claim-{}-{}", case_id, i))
            .collect())
    }
}

/// Claim numbers read from the record store.
///
/// Matches on the stored case number exactly; a case identifier with no
/// claim rows yields an empty list and the pipeline runs through with zero
/// claims.
pub struct StoreClaimLister {
    store: Arc<dyn RecordStore>,
}

impl StoreClaimLister {
    /// Create a lister backed by `store`.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClaimLister for StoreClaimLister {
    async fn list_claims(&self, case_id: &str) -> StorageResult<Vec<String>> {
        let claims = self.store.list_claims_for_case(case_id).await?;
        Ok(claims.into_iter().map(|claim| claim.claim_number).collect())
    }
}

/// First QC step: fetch the claims for the case and seed the progress log.
pub struct QcFetchClaimsNode {
    lister: Arc<dyn ClaimLister>,
    timeout: Duration,
}

impl QcFetchClaimsNode {
    /// Create a fetch node over `lister`.
    pub fn new(lister: Arc<dyn ClaimLister>, timeout: Duration) -> Self {
        Self { lister, timeout }
    }
}

#[async_trait]
impl Node<WorkflowState> for QcFetchClaimsNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode != Mode::Qc {
            return Ok(state.with_answer(messages::QC_WRONG_MODE));
        }

        let case_id = state
            .identifier
            .clone()
            .unwrap_or_else(|| state.question.trim().to_string());

        let claims = match timeout(self.timeout, self.lister.list_claims(&case_id)).await {
            Ok(Ok(claims)) => claims,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!(
                    case = %case_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Claim listing timed out"
                );
                Vec::new()
            }
        };

        debug!(case = %case_id, claims = claims.len(), "QC fetch complete");
        let entry = format!("Fetched {} claims for case {}", claims.len(), case_id);
        Ok(state
            .with_qc_claims(claims)
            .with_qc_status(STATUS_CLAIMS_FETCHED)
            .with_progress_entry(entry))
    }
}

/// Second QC step: open the review task over the fetched claims.
///
/// Every fetched claim currently qualifies; the filter slot is kept explicit
/// so a qualification rule can land here without reshaping the pipeline.
pub struct QcCreateTaskNode;

#[async_trait]
impl Node<WorkflowState> for QcCreateTaskNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode != Mode::Qc {
            return Ok(state.with_answer(messages::QC_WRONG_MODE));
        }

        let qualified = state.qc().map(|qc| qc.claims.clone()).unwrap_or_default();
        let entry = format!("Created QC task with {} qualified claims", qualified.len());
        Ok(state
            .with_qualified_claims(qualified)
            .with_qc_status(STATUS_TASK_CREATED)
            .with_progress_entry(entry))
    }
}

/// Third QC step: mark every qualified claim as reviewed.
pub struct QcReviewNode;

#[async_trait]
impl Node<WorkflowState> for QcReviewNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode != Mode::Qc {
            return Ok(state.with_answer(messages::QC_WRONG_MODE));
        }

        let reviewed: Vec<String> = state
            .qc()
            .map(|qc| {
                qc.qualified
                    .iter()
                    .map(|claim| format!("{}{}", claim, REVIEWED_MARKER))
                    .collect()
            })
            .unwrap_or_default();
        let entry = format!("Reviewed {} claims", reviewed.len());
        Ok(state
            .with_reviewed_claims(reviewed)
            .with_qc_status(STATUS_CLAIMS_REVIEWED)
            .with_progress_entry(entry))
    }
}

/// Fourth QC step: verify every qualified claim carries a review marker.
///
/// Review has no failure path today, so the gate passes in practice; it
/// stays a real check for when individual reviews can fail.
pub struct QcCheckCompleteNode;

#[async_trait]
impl Node<WorkflowState> for QcCheckCompleteNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode != Mode::Qc {
            return Ok(state.with_answer(messages::QC_WRONG_MODE));
        }

        let all_reviewed = state
            .qc()
            .map(|qc| {
                qc.reviewed.len() == qc.qualified.len()
                    && qc.reviewed.iter().all(|marker| marker.ends_with(REVIEWED_MARKER))
            })
            .unwrap_or(false);

        let status = if all_reviewed {
            STATUS_COMPLETED
        } else {
            STATUS_INCOMPLETE
        };
        let entry = format!("Completeness check: {}", status);
        Ok(state.with_qc_status(status).with_progress_entry(entry))
    }
}

/// Terminal QC step: append the fixed closing summary and publish the log.
///
/// The closing batch is appended as-is regardless of prior pipeline state.
/// This is also the boundary where an outbound notification would be
/// dispatched.
pub struct QcFinalizeNode;

#[async_trait]
impl Node<WorkflowState> for QcFinalizeNode {
    async fn run(&self, state: WorkflowState) -> AppResult<WorkflowState> {
        if state.mode != Mode::Qc {
            return Ok(state.with_answer(messages::QC_WRONG_MODE));
        }

        let state = state
            .with_progress_entries(messages::QC_CLOSING_SUMMARY)
            .with_qc_status(STATUS_EMAIL_SENT);
        let answer = state
            .qc()
            .map(|qc| qc.progress.join("\n"))
            .unwrap_or_default();
        Ok(state.with_answer(answer))
    }
}

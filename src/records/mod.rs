//! Case and claim reference records.
//!
//! This module defines the two record shapes the assistant looks up, plus the
//! read-only [`RecordStore`] interface the workflow nodes depend on. Normal
//! request handling never writes to the store.

mod sqlite;

pub use sqlite::SqliteRecordStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// A support case record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case identifier, e.g. `MR123456`.
    pub case_number: String,
    /// Short description of the reported problem.
    pub description: String,
    /// Free-form triage comments.
    pub comments: String,
    /// When the record was imported.
    pub created_at: DateTime<Utc>,
}

impl CaseRecord {
    /// Text form used as QA context and as the case-corpus document.
    pub fn context_text(&self) -> String {
        format!("{} {}", self.description, self.comments)
    }
}

/// A claim record referencing a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Claim identifier, e.g. `CL123456`.
    pub claim_number: String,
    /// Referenced case number; not guaranteed to resolve to a case record.
    pub case_number: String,
    /// Base rate in whole currency units.
    pub base_rate: i64,
    /// Number of billed units.
    pub units: i64,
    /// Discount applied, in whole currency units.
    pub discount: i64,
    /// Amount as calculated from rate, units, and discount.
    pub calculated_amount: i64,
    /// Amount the claimant expected.
    pub expected_amount: i64,
    /// When the record was imported.
    pub created_at: DateTime<Utc>,
}

impl ClaimRecord {
    /// Numeric fields joined as the claim-corpus document.
    pub fn context_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.base_rate, self.units, self.discount, self.calculated_amount, self.expected_amount
        )
    }
}

/// Read-only access to the case/claim reference data.
///
/// Implementations must be safe for concurrent reads; the workflow layer
/// shares a single store across invocations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Get a case by its case number.
    async fn fetch_case(&self, case_number: &str) -> StorageResult<Option<CaseRecord>>;
    /// Get a claim by its claim number.
    async fn fetch_claim(&self, claim_number: &str) -> StorageResult<Option<ClaimRecord>>;
    /// All case records, ordered by case number.
    async fn list_cases(&self) -> StorageResult<Vec<CaseRecord>>;
    /// All claim records, ordered by claim number.
    async fn list_claims(&self) -> StorageResult<Vec<ClaimRecord>>;
    /// Claims referencing the given case number, ordered by claim number.
    async fn list_claims_for_case(&self, case_number: &str) -> StorageResult<Vec<ClaimRecord>>;
}

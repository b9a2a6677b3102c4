//! Centralized user-facing message definitions
//!
//! Every fixed string a workflow node can place in the answer field lives
//! here, so wording changes never touch node logic.

/// Fallback answer when no node produced one.
pub const NO_ANSWER: &str = "No answer generated";

/// Shown when chat mode receives a bare case-like number.
pub const CASE_NUMBER_IN_CHAT: &str =
    "⚠️ Case numbers are not allowed in Chat Mode. Please switch to Similarity Mode.";

/// Shown when a record lookup node runs outside similarity mode.
pub const LOOKUP_WRONG_MODE: &str = "⚠️ Case lookup is only available in Similarity Mode.";

/// Shown when a case lookup yields no record, or times out.
pub const CASE_NOT_FOUND: &str = "⚠️ Case not found.";

/// Shown when a claim lookup yields no record, or times out.
pub const CLAIM_NOT_FOUND: &str = "⚠️ Claim not found.";

/// Shown when the similarity stage runs outside similarity mode.
pub const SIMILARITY_WRONG_MODE: &str =
    "⚠️ Similarity search is only available in Similarity Mode.";

/// Shown when the chat answer stage runs outside chat mode.
pub const CHAT_WRONG_MODE: &str = "⚠️ Chat responses are only available in Chat Mode.";

/// Shown when a QC pipeline node runs outside QC mode.
pub const QC_WRONG_MODE: &str = "⚠️ QC review is only available in QC Mode.";

/// Shown when a similarity query matches nothing, or times out.
pub const NO_SIMILAR_RECORDS: &str = "⚠️ No similar records found.";

/// Shown when similarity-mode input is neither an identifier nor a
/// recognized text prefix.
pub const UNSUPPORTED_INPUT: &str =
    "⚠️ Unsupported input for Similarity Mode. Enter a case number, claim number, or a 'case text:' / 'claim text:' query.";

/// Shown when the answer service does not respond in time.
pub const QA_TIMEOUT: &str = "⚠️ The answer service timed out. Please try again.";

/// Shown when an invocation fails for a reason the user cannot act on.
pub const WORKFLOW_FAILED: &str =
    "⚠️ Something went wrong while processing your request. Please try again.";

/// Closing summary appended by the QC finalize step. Fixed and appended as a
/// whole regardless of prior pipeline state.
pub const QC_CLOSING_SUMMARY: [&str; 6] = [
    "QC task closed out.",
    "All qualified claims reviewed.",
    "Review evidence archived.",
    "Completion status recorded.",
    "Summary prepared for distribution.",
    "Notification email queued.",
];

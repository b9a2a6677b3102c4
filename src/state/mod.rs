//! Workflow state threaded through every graph node.
//!
//! Each node receives the prior state by value and returns a new state that
//! structurally extends it. Concurrent invocations never share a state value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::intent::Intent;
use crate::search::SearchHit;

/// Top-level workflow selector, fixed for the lifetime of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Free-text question answering.
    Chat,
    /// Case/claim similarity lookup.
    Similarity,
    /// Quality-control review pipeline.
    Qc,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Chat => write!(f, "chat"),
            Mode::Similarity => write!(f, "similarity"),
            Mode::Qc => write!(f, "qc"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(Mode::Chat),
            "similarity" => Ok(Mode::Similarity),
            "qc" => Ok(Mode::Qc),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Accumulated QC pipeline fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QcState {
    /// Claim tokens fetched for the case, in fetch order.
    pub claims: Vec<String>,
    /// Claims admitted to the QC task (currently all fetched claims).
    pub qualified: Vec<String>,
    /// Review markers, one per qualified claim.
    pub reviewed: Vec<String>,
    /// Short status label; overwritten at each step, last write wins.
    pub status: Option<String>,
    /// Append-only log of completed-step descriptions; never truncated.
    pub progress: Vec<String>,
}

/// Mode-specific portion of the workflow state. Keeping these fields behind a
/// tagged union means a chat invocation cannot carry QC fields and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModePayload {
    /// Chat mode carries no fields beyond the envelope.
    Chat,
    /// Ranked similarity hits; insertion order is rank order.
    Similarity { retrieved_results: Vec<SearchHit> },
    /// QC pipeline accumulator.
    Qc(QcState),
}

impl ModePayload {
    fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Chat => ModePayload::Chat,
            Mode::Similarity => ModePayload::Similarity {
                retrieved_results: Vec::new(),
            },
            Mode::Qc => ModePayload::Qc(QcState::default()),
        }
    }
}

/// The single state record threaded through every workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Original user input, immutable once set.
    pub question: String,
    /// Workflow selector; set at entry, never changed mid-flow.
    pub mode: Mode,
    /// Resolver classification of the question.
    pub intent: Option<Intent>,
    /// Parsed case or claim identifier, when one was extracted.
    pub identifier: Option<String>,
    /// Record text used as QA context or similarity query text.
    pub context: String,
    /// Final user-visible output.
    pub answer: Option<String>,
    payload: ModePayload,
}

impl WorkflowState {
    /// Create a fresh state for one invocation, all non-envelope fields at
    /// their defaults for the given mode.
    pub fn new(question: impl Into<String>, mode: Mode) -> Self {
        Self {
            question: question.into(),
            mode,
            intent: None,
            identifier: None,
            context: String::new(),
            answer: None,
            payload: ModePayload::for_mode(mode),
        }
    }

    /// Set the resolved intent.
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    /// Set the extracted identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the context text.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Set the user-visible answer.
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// Attach ranked similarity results. Rank order is insertion order.
    pub fn with_results(mut self, results: Vec<SearchHit>) -> Self {
        self.payload = ModePayload::Similarity {
            retrieved_results: results,
        };
        self
    }

    /// Replace the fetched QC claim tokens.
    pub fn with_qc_claims(mut self, claims: Vec<String>) -> Self {
        self.qc_mut().claims = claims;
        self
    }

    /// Replace the qualified QC claim tokens.
    pub fn with_qualified_claims(mut self, qualified: Vec<String>) -> Self {
        self.qc_mut().qualified = qualified;
        self
    }

    /// Replace the reviewed-claim markers.
    pub fn with_reviewed_claims(mut self, reviewed: Vec<String>) -> Self {
        self.qc_mut().reviewed = reviewed;
        self
    }

    /// Overwrite the QC status label (last write wins).
    pub fn with_qc_status(mut self, status: impl Into<String>) -> Self {
        self.qc_mut().status = Some(status.into());
        self
    }

    /// Append one entry to the QC progress log.
    pub fn with_progress_entry(mut self, entry: impl Into<String>) -> Self {
        self.qc_mut().progress.push(entry.into());
        self
    }

    /// Append a batch of entries to the QC progress log, preserving order.
    pub fn with_progress_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let qc = self.qc_mut();
        qc.progress.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Ranked similarity results, empty outside similarity mode.
    pub fn retrieved_results(&self) -> &[SearchHit] {
        match &self.payload {
            ModePayload::Similarity { retrieved_results } => retrieved_results,
            _ => &[],
        }
    }

    /// QC accumulator, present only in QC mode.
    pub fn qc(&self) -> Option<&QcState> {
        match &self.payload {
            ModePayload::Qc(qc) => Some(qc),
            _ => None,
        }
    }

    /// The answer, or a fixed placeholder when no node produced one.
    pub fn answer_text(&self) -> &str {
        self.answer.as_deref().unwrap_or(crate::messages::NO_ANSWER)
    }

    fn qc_mut(&mut self) -> &mut QcState {
        if !matches!(self.payload, ModePayload::Qc(_)) {
            self.payload = ModePayload::Qc(QcState::default());
        }
        match &mut self.payload {
            ModePayload::Qc(qc) => qc,
            _ => unreachable!("payload set to Qc above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Chat.to_string(), "chat");
        assert_eq!(Mode::Similarity.to_string(), "similarity");
        assert_eq!(Mode::Qc.to_string(), "qc");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("chat".parse::<Mode>().unwrap(), Mode::Chat);
        assert_eq!("SIMILARITY".parse::<Mode>().unwrap(), Mode::Similarity);
        assert_eq!("qc".parse::<Mode>().unwrap(), Mode::Qc);
        assert!("triage".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&Mode::Similarity).unwrap();
        assert_eq!(json, "\"similarity\"");
        let mode: Mode = serde_json::from_str("\"qc\"").unwrap();
        assert_eq!(mode, Mode::Qc);
    }

    #[test]
    fn test_new_state_defaults() {
        let state = WorkflowState::new("MR123456", Mode::Similarity);
        assert_eq!(state.question, "MR123456");
        assert_eq!(state.mode, Mode::Similarity);
        assert!(state.intent.is_none());
        assert!(state.identifier.is_none());
        assert!(state.context.is_empty());
        assert!(state.answer.is_none());
        assert!(state.retrieved_results().is_empty());
        assert!(state.qc().is_none());
    }

    #[test]
    fn test_qc_mode_starts_with_empty_accumulator() {
        let state = WorkflowState::new("MR999999", Mode::Qc);
        let qc = state.qc().expect("qc payload");
        assert!(qc.claims.is_empty());
        assert!(qc.progress.is_empty());
        assert!(qc.status.is_none());
    }

    #[test]
    fn test_builder_chain_extends_state() {
        let state = WorkflowState::new("case text: export crash", Mode::Similarity)
            .with_identifier("MR123456")
            .with_context("System crash when exporting reports")
            .with_answer("done");

        assert_eq!(state.identifier.as_deref(), Some("MR123456"));
        assert_eq!(state.context, "System crash when exporting reports");
        assert_eq!(state.answer.as_deref(), Some("done"));
        // Envelope untouched by builders
        assert_eq!(state.question, "case text: export crash");
        assert_eq!(state.mode, Mode::Similarity);
    }

    #[test]
    fn test_with_results_preserves_order() {
        let hits = vec![
            SearchHit::new("first", 0.9),
            SearchHit::new("second", 0.5),
            SearchHit::new("third", 0.1),
        ];
        let state = WorkflowState::new("q", Mode::Similarity).with_results(hits);
        let results = state.retrieved_results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "first");
        assert_eq!(results[2].content, "third");
    }

    #[test]
    fn test_progress_log_appends_in_order() {
        let state = WorkflowState::new("MR999999", Mode::Qc)
            .with_progress_entry("step one")
            .with_progress_entry("step two")
            .with_progress_entries(vec!["a", "b", "c"]);

        let progress = &state.qc().unwrap().progress;
        assert_eq!(progress.len(), 5);
        assert_eq!(progress[0], "step one");
        assert_eq!(progress[4], "c");
    }

    #[test]
    fn test_qc_status_last_write_wins() {
        let state = WorkflowState::new("MR999999", Mode::Qc)
            .with_qc_status("Claims fetched")
            .with_qc_status("QC Completed")
            .with_qc_status("Email sent");
        assert_eq!(state.qc().unwrap().status.as_deref(), Some("Email sent"));
    }

    #[test]
    fn test_answer_text_placeholder() {
        let state = WorkflowState::new("q", Mode::Chat);
        assert_eq!(state.answer_text(), "No answer generated");

        let state = state.with_answer("42");
        assert_eq!(state.answer_text(), "42");
    }

    #[test]
    fn test_chat_payload_has_no_similarity_or_qc_fields() {
        let state = WorkflowState::new("q", Mode::Chat);
        assert!(state.retrieved_results().is_empty());
        assert!(state.qc().is_none());
    }

    #[test]
    fn test_state_serde_round_trip() {
        let state = WorkflowState::new("MR123456", Mode::Similarity)
            .with_identifier("MR123456")
            .with_results(vec![SearchHit::new("doc", 0.42)]);

        let json = serde_json::to_string(&state).unwrap();
        let parsed: WorkflowState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}

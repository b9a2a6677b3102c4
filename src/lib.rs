//! # Caseflow Assistant
//!
//! A conversational assistant over case and claim records, driven by a typed
//! workflow graph. Every user turn runs through the same directed graph of
//! nodes over a shared state; the active mode decides which branch does the
//! actual work.
//!
//! ## Features
//!
//! - **Chat Mode**: free-form questions answered by an extractive QA service
//! - **Similarity Mode**: case/claim lookup by identifier or raw text,
//!   ranked by lexical similarity and rendered as markdown tables
//! - **QC Mode**: a five-step claim review pipeline with an auditable
//!   progress log
//! - **Intent Resolution**: prefix-based classification of case numbers,
//!   claim numbers, and free-text queries
//! - **Fail-Fast Graph Validation**: wiring mistakes surface at
//!   construction, not mid-conversation
//!
//! ## Architecture
//!
//! ```text
//! CLI / REPL → Assistant → Workflow Graph → Nodes
//!                                ↓
//!          SQLite (records) · Lexical index · QA endpoint (HTTP)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use caseflow_assistant::{Assistant, Config, Mode};
//! use caseflow_assistant::assistant::claim_lister_for;
//! use caseflow_assistant::qa::HttpQaClient;
//! use caseflow_assistant::records::{RecordStore, SqliteRecordStore};
//! use caseflow_assistant::search::LexicalIndex;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let store: Arc<dyn RecordStore> = Arc::new(SqliteRecordStore::new(&config.database).await?);
//!     let index = Arc::new(LexicalIndex::from_store(store.as_ref()).await?);
//!     let engine = Arc::new(HttpQaClient::new(&config.qa, config.request.clone())?);
//!     let claims = claim_lister_for(config.qc.claim_source, Arc::clone(&store));
//!     let assistant = Assistant::new(store, index, engine, claims, &config)?;
//!
//!     let state = assistant.run_workflow("MR123456", Mode::Similarity).await;
//!     println!("{}", state.answer_text());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Graph wiring and the per-turn invocation boundary.
pub mod assistant;
/// Configuration management loaded from environment variables.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Generic directed workflow graph with validated construction.
pub mod graph;
/// Input intent resolution (case/claim identifiers and text queries).
pub mod intent;
/// Fixed user-visible answer strings.
pub mod messages;
/// Workflow node implementations and routing functions.
pub mod nodes;
/// Extractive QA client and types.
pub mod qa;
/// Case and claim record storage.
pub mod records;
/// Lexical similarity search over the record corpora.
pub mod search;
/// Shared workflow state and mode-tagged payloads.
pub mod state;

pub use assistant::Assistant;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::{Mode, WorkflowState};

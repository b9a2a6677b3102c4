//! Extractive question answering.
//!
//! The chat path depends on the [`AnswerEngine`] trait; [`HttpQaClient`]
//! implements it against an HTTP inference endpoint.

mod client;

pub use client::HttpQaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QaResult;

/// Request body for the answer endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// The user's question.
    pub question: String,
    /// Context passage the answer is extracted from.
    pub context: String,
    /// Model identifier, when the endpoint serves more than one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AnswerRequest {
    /// A request without a model override.
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
            model: None,
        }
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response body from the answer endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Extracted answer span; may be empty when the model finds nothing.
    pub answer: String,
    /// Model confidence, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Extractive QA collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerEngine: Send + Sync {
    /// Answer `question` from `context`.
    async fn answer(&self, question: &str, context: &str) -> QaResult<String>;
}

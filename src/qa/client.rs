use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::{AnswerEngine, AnswerRequest, AnswerResponse};
use crate::config::{QaConfig, RequestConfig};
use crate::error::{QaError, QaResult};

/// HTTP client for an extractive QA inference endpoint
#[derive(Clone)]
pub struct HttpQaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    request_config: RequestConfig,
}

impl HttpQaClient {
    /// Create a new QA client
    pub fn new(config: &QaConfig, request_config: RequestConfig) -> QaResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(QaError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            request_config,
        })
    }

    /// Call the answer endpoint, retrying per the request configuration
    pub async fn call_answer(&self, request: AnswerRequest) -> QaResult<AnswerResponse> {
        let url = format!("{}/v1/answers", self.base_url);

        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = Duration::from_millis(
                    self.request_config.retry_delay_ms * (2_u64.pow(retries - 1)),
                );
                warn!(
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying QA request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute_request(&url, &request).await {
                Ok(response) => {
                    let latency = start.elapsed();
                    info!(latency_ms = latency.as_millis(), "QA call succeeded");
                    return Ok(response);
                }
                Err(e) => {
                    let latency = start.elapsed();
                    error!(
                        error = %e,
                        latency_ms = latency.as_millis(),
                        retry = retries,
                        "QA call failed"
                    );
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        // Timeouts keep their own variant so callers can recover them
        match last_error {
            Some(QaError::Timeout { timeout_ms }) => Err(QaError::Timeout { timeout_ms }),
            Some(e) => Err(QaError::Unavailable {
                message: e.to_string(),
                retries,
            }),
            None => Err(QaError::Unavailable {
                message: "Unknown error".to_string(),
                retries,
            }),
        }
    }

    /// Execute a single request (internal)
    async fn execute_request(&self, url: &str, request: &AnswerRequest) -> QaResult<AnswerResponse> {
        debug!(
            question_len = request.question.len(),
            context_len = request.context.len(),
            "Calling QA endpoint"
        );

        let mut builder = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(request);

        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                QaError::Timeout {
                    timeout_ms: self.request_config.timeout_ms,
                }
            } else {
                QaError::Http(e)
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(QaError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let answer_response: AnswerResponse =
            response.json().await.map_err(|e| QaError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(answer_response)
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AnswerEngine for HttpQaClient {
    async fn answer(&self, question: &str, context: &str) -> QaResult<String> {
        let request = AnswerRequest::new(question, context).with_model(self.model.clone());
        let response = self.call_answer(request).await?;
        Ok(response.answer)
    }
}

//! Ollama Oracle Implementation
//!
//! Talks to a local Ollama instance through its chat API, passing the output
//! JSON schema as the `format` so the model is constrained to structured
//! output.
//!
//! Retries are not handled here. The extraction pipeline wraps every oracle
//! call with its own timeout and backoff policy, so a single attempt per
//! `submit` keeps the two from compounding.
//!
//! # Examples
//!
//! ```no_run
//! use relex_oracle::OllamaOracle;
//!
//! # fn main() -> Result<(), relex_oracle::OracleError> {
//! let oracle = OllamaOracle::new("http://localhost:11434", "qwen2.5:7b")?
//!     .with_temperature(0.0);
//! # Ok(())
//! # }
//! ```

use crate::schemas::json_schema;
use crate::OracleError;
use relex_domain::{Oracle, OutputSchema};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default HTTP timeout for a single request (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama chat oracle
pub struct OllamaOracle {
    endpoint: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    format: serde_json::Value,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaOracle {
    /// Create a new Ollama oracle
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "qwen2.5:7b")
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Other` if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, OracleError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama oracle with an explicit HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        // Each submit drives its own runtime, so pooled connections would
        // outlive the runtime that owns them
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| OracleError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: 0.0,
            client,
        })
    }

    /// Create a new Ollama oracle on the default endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, OracleError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Model name this oracle queries
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a chat request and return the raw JSON content of the reply
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running or the request fails
    /// - The model is not available
    /// - The server rate limits the request
    /// - The response body is not a chat response
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: OutputSchema,
    ) -> Result<String, OracleError> {
        let url = format!("{}/api/chat", self.endpoint);

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream: false,
            format: json_schema(schema),
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        debug!(
            "Ollama chat: model '{}', schema '{}', prompt length {}",
            self.model,
            schema.as_str(),
            user_prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| OracleError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(OracleError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OracleError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OracleError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| OracleError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(chat_response.message.content)
    }
}

impl Oracle for OllamaOracle {
    type Error = OracleError;

    fn submit(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: OutputSchema,
    ) -> Result<String, Self::Error> {
        // Blocking wrapper for the async client. The pipeline calls this from
        // a blocking worker thread, where driving a private runtime is allowed.
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OracleError::Other(format!("Failed to start runtime: {}", e)))?
            .block_on(self.chat(system_prompt, user_prompt, schema))
    }
}

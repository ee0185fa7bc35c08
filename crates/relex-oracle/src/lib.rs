//! Relex Oracle Layer
//!
//! Implementations of the `Oracle` trait from `relex-domain`, plus the JSON
//! output schemas every oracle call is constrained by.
//!
//! # Providers
//!
//! - `MockOracle`: Scripted responses for deterministic testing
//! - `OllamaOracle`: Local Ollama chat API with structured outputs
//!
//! # Examples
//!
//! ```
//! use relex_oracle::MockOracle;
//! use relex_domain::{Oracle, OutputSchema};
//!
//! let oracle = MockOracle::new(r#"{"decisions": []}"#);
//! let result = oracle.submit("system", "user", OutputSchema::Verification).unwrap();
//! assert_eq!(result, r#"{"decisions": []}"#);
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod schemas;

use relex_domain::{Oracle, OutputSchema};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaOracle;
pub use schemas::json_schema;

/// Errors that can occur during oracle operations
#[derive(Error, Debug)]
pub enum OracleError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response could not be read as structured output
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Oracle error: {0}")]
    Other(String),
}

/// One call observed by a [`MockOracle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// System prompt passed to the oracle
    pub system_prompt: String,
    /// User prompt passed to the oracle
    pub user_prompt: String,
    /// Output schema requested
    pub schema: OutputSchema,
}

#[derive(Debug, Default)]
struct MockState {
    scripted: VecDeque<Result<String, String>>,
    per_schema: HashMap<OutputSchema, String>,
    calls: Vec<RecordedCall>,
}

/// Mock oracle for deterministic testing
///
/// Responses are resolved in this order:
/// 1. the next scripted response (FIFO), which may be an error
/// 2. the fixed response registered for the requested schema
/// 3. the default response
///
/// Clones share state, so a test can keep a handle after moving the oracle
/// into a pipeline and inspect the calls it received.
///
/// # Examples
///
/// ```
/// use relex_oracle::MockOracle;
/// use relex_domain::{Oracle, OutputSchema};
///
/// let oracle = MockOracle::default();
/// oracle.push_response(r#"{"entities": []}"#);
/// oracle.push_error("quota exhausted");
///
/// assert!(oracle.submit("s", "u", OutputSchema::EntityOnly).is_ok());
/// assert!(oracle.submit("s", "u", OutputSchema::EntityOnly).is_err());
/// assert_eq!(oracle.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockOracle {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockOracle {
    /// Create a new MockOracle with a fixed response for all calls
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Queue a response for the next unanswered call
    pub fn push_response(&self, response: impl Into<String>) {
        self.state.lock().unwrap().scripted.push_back(Ok(response.into()));
    }

    /// Queue a failure for the next unanswered call
    pub fn push_error(&self, message: impl Into<String>) {
        self.state.lock().unwrap().scripted.push_back(Err(message.into()));
    }

    /// Use a fixed response for every call with the given schema
    pub fn set_schema_response(&self, schema: OutputSchema, response: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .per_schema
            .insert(schema, response.into());
    }

    /// Get the number of times submit was called
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Number of calls made with the given schema
    pub fn calls_for(&self, schema: OutputSchema) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.schema == schema)
            .count()
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl Oracle for MockOracle {
    type Error = OracleError;

    fn submit(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: OutputSchema,
    ) -> Result<String, Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            schema,
        });

        if let Some(scripted) = state.scripted.pop_front() {
            return scripted.map_err(OracleError::Other);
        }

        Ok(state
            .per_schema
            .get(&schema)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

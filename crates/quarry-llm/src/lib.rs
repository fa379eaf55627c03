//! Quarry LLM Provider Layer
//!
//! Implementations of the generation and embedding capability traits from
//! `quarry-domain`.
//!
//! # Providers
//!
//! - `MockGenerator`: deterministic scripted generator for testing
//! - `OllamaGenerator`: zero-temperature generation over the Ollama API
//! - `OllamaEmbedder`: embeddings over the Ollama API
//!
//! # Examples
//!
//! ```
//! use quarry_llm::MockGenerator;
//! use quarry_domain::traits::GenerationProvider;
//!
//! let provider = MockGenerator::new("$50 Million | Jane Doe");
//! let result = provider.generate("any prompt").unwrap();
//! assert_eq!(result, "$50 Million | Jane Doe");
//! ```

#![warn(missing_docs)]

pub mod ollama;

pub use ollama::{OllamaEmbedder, OllamaGenerator};

use quarry_domain::traits::GenerationProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur talking to an LLM backend
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error (retryable)
    #[error("Communication error: {0}")]
    Communication(String),

    /// Backend answered with something unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Requested model is not installed on the backend
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// The request itself was malformed; retrying cannot help
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether a retry with backoff could plausibly succeed
    ///
    /// Timeouts and transport failures are transient; a missing model or a
    /// malformed request will fail identically every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Communication(_))
    }
}

/// Scripted generator for deterministic testing
///
/// Returns pre-configured responses without any network calls, and counts
/// invocations so tests can assert that generation was (or was not) reached.
///
/// # Examples
///
/// ```
/// use quarry_llm::MockGenerator;
/// use quarry_domain::traits::GenerationProvider;
///
/// let mut provider = MockGenerator::default();
/// provider.add_response("prompt1", "response1");
/// assert_eq!(provider.generate("prompt1").unwrap(), "response1");
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockGenerator {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockGenerator {
    /// Create a generator with one fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Script a specific response for a specific prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Script an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), ERROR_MARKER.to_string());
    }

    /// How many times `generate` has been called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call counter
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

const ERROR_MARKER: &str = "\0MOCK_ERROR";

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl GenerationProvider for MockGenerator {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap() += 1;

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(prompt) {
            if response == ERROR_MARKER {
                return Err(LlmError::Other("Mock error".to_string()));
            }
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}

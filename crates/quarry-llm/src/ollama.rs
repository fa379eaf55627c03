//! Ollama backend implementations
//!
//! Generation and embedding over a local Ollama instance's HTTP API.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama API
//! - Generation pinned to temperature 0 (repeatable extraction is a
//!   correctness goal, not a tuning preference)
//! - Bounded retry with exponential backoff; transport failures retry,
//!   missing models and malformed requests fail fast
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use quarry_llm::{OllamaEmbedder, OllamaGenerator};
//!
//! let generator = OllamaGenerator::new("http://localhost:11434", "llama3.2");
//! let embedder = OllamaEmbedder::new("http://localhost:11434", "mxbai-embed-large", 1024);
//! ```

use crate::LlmError;
use quarry_domain::traits::{EmbeddingProvider, GenerationProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for a single HTTP request (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts for retryable failures
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .unwrap()
}

/// Run an Ollama POST with bounded retry and exponential backoff
///
/// `send` issues one attempt; the HTTP status decides whether a failed
/// attempt is worth repeating. 4xx responses fail fast, everything else
/// retries up to `max_retries`.
async fn post_with_retry<T, F, Fut>(
    url: &str,
    model: &str,
    max_retries: u32,
    send: F,
) -> Result<T, LlmError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    T: serde::de::DeserializeOwned,
{
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_retries {
        match send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.json::<T>().await.map_err(|e| {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    });
                } else if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(LlmError::ModelNotAvailable(model.to_string()));
                } else if status.is_client_error() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(LlmError::InvalidRequest(format!("HTTP {}: {}", status, body)));
                } else {
                    let body = response.text().await.unwrap_or_default();
                    last_error =
                        Some(LlmError::Communication(format!("HTTP {}: {}", status, body)));
                }
            }
            Err(e) => {
                last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
            }
        }

        attempts += 1;
        if attempts < max_retries {
            // Exponential backoff: 1s, 2s, 4s, ...
            let delay = Duration::from_secs(2u64.pow(attempts - 1));
            warn!("Retrying {} after failed attempt {} in {:?}", url, attempts, delay);
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}

/// Text generation over the Ollama API
pub struct OllamaGenerator {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl OllamaGenerator {
    /// Create a generator for the given endpoint and model
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client: build_client(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a generator against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Generate a completion for `prompt`
    ///
    /// # Errors
    ///
    /// Returns an error if Ollama is unreachable after retries, the model is
    /// not installed, or the response body cannot be parsed.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            // Zero temperature: the same prompt must extract the same values
            options: GenerateOptions { temperature: 0.0 },
        };

        debug!("Generating against {} ({} prompt chars)", self.model, prompt.len());
        let response: GenerateResponse =
            post_with_retry(&url, &self.model, self.max_retries, || {
                self.client.post(&url).json(&body).send()
            })
            .await?;

        Ok(response.response)
    }
}

impl GenerationProvider for OllamaGenerator {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        // Blocking wrapper for async function
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(async { self.generate(prompt).await })
    }
}

/// Text embedding over the Ollama API
///
/// The dimension is declared by the caller (it depends on the embedding
/// model) and verified against every response, since the index pins its
/// dimension for life.
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    dimension: usize,
    client: reqwest::Client,
    max_retries: u32,
}

impl OllamaEmbedder {
    /// Create an embedder for the given endpoint, model and dimension
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            dimension,
            client: build_client(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create an embedder against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>, dimension: usize) -> Self {
        Self::new(DEFAULT_ENDPOINT, model, dimension)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Embed `text` into a vector of the declared dimension
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let body = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response: EmbeddingResponse =
            post_with_retry(&url, &self.model, self.max_retries, || {
                self.client.post(&url).json(&body).send()
            })
            .await?;

        if response.embedding.len() != self.dimension {
            return Err(LlmError::InvalidResponse(format!(
                "Model {} returned {} dimensions, expected {}",
                self.model,
                response.embedding.len(),
                self.dimension
            )));
        }

        Ok(response.embedding)
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        // Blocking wrapper for async function
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(async { self.embed(text).await })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

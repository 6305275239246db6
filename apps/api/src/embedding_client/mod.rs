//! Embedding Client: HTTP encoder for a remote sentence-embedding service.
//!
//! Speaks the text-embeddings-inference `/embed` contract: POST
//! `{"inputs": [...]}` and receive one vector per input. A bare array of
//! vectors and `{"embeddings": [...]}` are both accepted.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matching::encoder::{Embedding, TextEncoder};

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding service returned no vectors")]
    EmptyEmbedding,

    #[error("Expected a {expected}-dimensional embedding, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Encoding timed out after {0:?}")]
    Timeout(Duration),

    #[error("Local encoder failed: {0}")]
    Local(String),
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: Vec<&'a str>,
    truncate: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbedResponse {
    Vectors(Vec<Vec<f32>>),
    Wrapped { embeddings: Vec<Vec<f32>> },
}

impl EmbedResponse {
    fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            EmbedResponse::Vectors(v) => v,
            EmbedResponse::Wrapped { embeddings } => embeddings,
        }
    }
}

/// Remote encoder. One instance per process; `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct HttpEncoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    initial_backoff: Duration,
}

impl HttpEncoder {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        dimension: usize,
        timeout_secs: u64,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            dimension,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    #[cfg(test)]
    fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!("{}/embed", self.base_url)
    }

    /// Sends one embed request, retrying 429 and 5xx with exponential backoff.
    async fn call(&self, text: &str) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request_body = EmbedRequest {
            inputs: vec![text],
            truncate: true,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(self.initial_backoff, attempt);
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(self.endpoint()).json(&request_body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding service returned {}: {}", status, body);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: EmbedResponse = response.json().await?;
            return Ok(parsed.into_vectors());
        }

        Err(last_error.unwrap_or(EmbeddingError::EmptyEmbedding))
    }
}

#[async_trait]
impl TextEncoder for HttpEncoder {
    fn name(&self) -> &'static str {
        "http"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let vectors = self.call(text).await?;
        let vector = first_vector(vectors, self.dimension)?;
        debug!(model = %self.model, dimension = vector.len(), "Encoded text");
        Ok(Embedding { vector })
    }
}

/// Wait before retry `attempt` (1-based): 1s, 2s, 4s, ... with the default base.
fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    initial * 2u32.pow(attempt.saturating_sub(1))
}

/// Takes the single returned vector and checks its length.
pub(crate) fn first_vector(vectors: Vec<Vec<f32>>, expected: usize) -> Result<Vec<f32>, EmbeddingError> {
    let vector = vectors
        .into_iter()
        .next()
        .filter(|v| !v.is_empty())
        .ok_or(EmbeddingError::EmptyEmbedding)?;

    if vector.len() != expected {
        return Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(vector)
}

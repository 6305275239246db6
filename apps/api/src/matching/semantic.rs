//! Semantic (soft) matching: cosine similarity of resume and JD embeddings.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::embedding_client::EmbeddingError;
use crate::errors::AppError;
use crate::matching::encoder::{cosine_similarity, Embedding, TextEncoder};
use crate::matching::round2;

/// Wraps the shared encoder with a per-call timeout. Cheap to clone.
#[derive(Clone)]
pub struct SemanticMatcher {
    encoder: Arc<dyn TextEncoder>,
    timeout: Duration,
}

impl SemanticMatcher {
    pub fn new(encoder: Arc<dyn TextEncoder>, timeout: Duration) -> Self {
        Self { encoder, timeout }
    }

    pub fn encoder_name(&self) -> &'static str {
        self.encoder.name()
    }

    pub fn encoder_is_lexical(&self) -> bool {
        self.encoder.is_lexical()
    }

    /// Encodes one text, failing with `ScoringUnavailable` on encoder error or timeout.
    pub async fn embed(&self, text: &str) -> Result<Embedding, AppError> {
        match tokio::time::timeout(self.timeout, self.encoder.encode(text)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(EmbeddingError::Timeout(self.timeout).into()),
        }
    }

    /// Similarity of resume and JD as a percentage in [0, 100].
    pub async fn similarity(&self, resume_text: &str, jd_text: &str) -> Result<f64, AppError> {
        let jd_embedding = self.embed(jd_text).await?;
        self.similarity_to(resume_text, &jd_embedding).await
    }

    /// Same as `similarity`, reusing an already computed JD embedding.
    pub async fn similarity_to(
        &self,
        resume_text: &str,
        jd_embedding: &Embedding,
    ) -> Result<f64, AppError> {
        let resume_embedding = self.embed(resume_text).await?;
        let score = similarity_percent(&resume_embedding, jd_embedding);
        debug!(encoder = self.encoder.name(), score, "Semantic similarity");
        Ok(score)
    }
}

/// `round(cosine * 100, 2)`, negative similarity floored at 0.
pub fn similarity_percent(a: &Embedding, b: &Embedding) -> f64 {
    round2(cosine_similarity(&a.vector, &b.vector) * 100.0).clamp(0.0, 100.0)
}

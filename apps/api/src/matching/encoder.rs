//! Text encoders, the black box behind semantic scoring.
//!
//! `AppState` carries one `Arc<dyn TextEncoder>` built in `main`; nothing
//! constructs an encoder per request.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use siphasher::sip::SipHasher13;
use tracing::{info, warn};

use crate::config::{Config, EmbeddingBackend};
use crate::embedding_client::{EmbeddingError, HttpEncoder};

/// Fixed seed so hashed embeddings are stable across runs and Rust versions.
/// Changing these changes every vector.
const HASH_SEED_K0: u64 = 0x5eed_0f7e_470b_1e2d;
const HASH_SEED_K1: u64 = 0x0dd5_a11e_c0de_d00d;
const BIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Deterministic text to fixed-length vector. Implementations must be safe to
/// share across concurrent requests.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// "http" | "bert" | "hash"
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    /// True when vectors only reflect shared words rather than meaning.
    fn is_lexical(&self) -> bool {
        false
    }

    async fn encode(&self, text: &str) -> Result<Embedding, EmbeddingError>;
}

/// Builds the process-wide encoder selected by `EMBEDDING_BACKEND`.
pub async fn load_encoder(config: &Config) -> Result<Arc<dyn TextEncoder>> {
    let encoder: Arc<dyn TextEncoder> = match config.embedding_backend {
        EmbeddingBackend::Http => {
            let encoder = HttpEncoder::new(
                config.embedding_service_url.clone(),
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
                config.embedding_dimension,
                config.embedding_timeout_secs,
            )
            .context("Failed to build embedding HTTP client")?;
            info!(
                "Using embedding service at {} (model: {})",
                encoder.endpoint(),
                encoder.model()
            );
            Arc::new(encoder)
        }
        EmbeddingBackend::Bert => load_bert_encoder(config).await?,
        EmbeddingBackend::Hash => {
            warn!("EMBEDDING_BACKEND=hash: soft scores measure word overlap only, not meaning");
            Arc::new(HashEncoder::new(config.embedding_dimension))
        }
    };

    info!(
        "Text encoder loaded (backend: {}, dimension: {})",
        encoder.name(),
        encoder.dimension()
    );
    Ok(encoder)
}

#[cfg(feature = "bert")]
async fn load_bert_encoder(config: &Config) -> Result<Arc<dyn TextEncoder>> {
    let encoder =
        crate::matching::bert::BertEncoder::spawn(&config.embedding_model, config.embedding_dimension)
            .await?;
    Ok(Arc::new(encoder))
}

#[cfg(not(feature = "bert"))]
async fn load_bert_encoder(_config: &Config) -> Result<Arc<dyn TextEncoder>> {
    anyhow::bail!("EMBEDDING_BACKEND=bert requires a build with `--features bert`")
}

/// Feature-hashing encoder over lower-cased unigrams and bigrams.
///
/// No model files, no network. Texts sharing vocabulary land close together,
/// but paraphrases with no words in common score zero. Opt-in only
/// (`EMBEDDING_BACKEND=hash`), for tests and offline runs.
pub struct HashEncoder {
    dimension: usize,
}

impl HashEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_token(token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let h = Self::hash_token(feature);
        let idx = (h % self.dimension as u64) as usize;
        // top bit picks the sign so collisions tend to cancel instead of pile up
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    pub fn embed(&self, text: &str) -> Embedding {
        let tokens = tokenize(text);
        let mut vector = vec![0.0f32; self.dimension];

        for token in &tokens {
            self.add_feature(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Embedding { vector }
    }
}

#[async_trait]
impl TextEncoder for HashEncoder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_lexical(&self) -> bool {
        true
    }

    async fn encode(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(self.embed(text))
    }
}

/// Lower-cases and splits on anything that is not alphanumeric or one of
/// `+ # .`, so "C++", "C#" and "Node.js" survive as single tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Raw cosine similarity in [-1, 1]. Zero vectors and mismatched lengths give 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_tech_punctuation() {
        assert_eq!(
            tokenize("Built APIs in C++, C# and Node.js."),
            vec!["built", "apis", "in", "c++", "c#", "and", "node.js"]
        );
    }

    #[test]
    fn test_hash_encoder_is_deterministic() {
        let encoder = HashEncoder::new(128);
        assert_eq!(encoder.embed("python sql"), encoder.embed("python sql"));
    }

    #[test]
    fn test_hash_encoder_produces_unit_vectors() {
        let emb = HashEncoder::new(256).embed("Senior data engineer with Spark and Airflow");
        let norm: f32 = emb.vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "L2 norm should be 1.0, got {norm}");
        assert_eq!(emb.dimension(), 256);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let emb = HashEncoder::new(16).embed("   ");
        assert!(emb.vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_related_texts_score_higher_than_unrelated() {
        let encoder = HashEncoder::new(384);
        let jd = encoder.embed("Data analyst with Python, SQL and Tableau dashboards");
        let close = encoder.embed("Analyst building Tableau dashboards with SQL and Python");
        let far = encoder.embed("Pastry chef specialised in French desserts and bread");

        let close_sim = cosine_similarity(&jd.vector, &close.vector);
        let far_sim = cosine_similarity(&jd.vector, &far.vector);
        assert!(close_sim > far_sim, "{close_sim} <= {far_sim}");
    }

    #[test]
    fn test_zero_dimension_clamped_to_one() {
        assert_eq!(HashEncoder::new(0).dimension(), 1);
    }

    #[test]
    fn test_cosine_identical_vectors() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_returns_zero_on_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_hash_encoder_trait_object() {
        let encoder: Arc<dyn TextEncoder> = Arc::new(HashEncoder::new(32));
        let emb = encoder.encode("rust").await.unwrap();
        assert_eq!(encoder.name(), "hash");
        assert!(encoder.is_lexical());
        assert_eq!(emb.dimension(), 32);
    }

    fn config(backend: EmbeddingBackend) -> Config {
        Config {
            database_url: "postgres://localhost/relevance".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            embedding_backend: backend,
            embedding_service_url: "http://127.0.0.1:8081/".to_string(),
            embedding_api_key: None,
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            embedding_dimension: 384,
            embedding_timeout_secs: 5,
            skill_vocabulary_path: None,
            max_upload_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn test_default_backend_loads_sentence_embedding_encoder() {
        let encoder = load_encoder(&config(EmbeddingBackend::default())).await.unwrap();
        assert_eq!(encoder.name(), "http");
        assert!(!encoder.is_lexical());
        assert_eq!(encoder.dimension(), 384);
    }

    #[tokio::test]
    async fn test_hash_backend_is_explicit_opt_in() {
        let encoder = load_encoder(&config(EmbeddingBackend::Hash)).await.unwrap();
        assert_eq!(encoder.name(), "hash");
        assert!(encoder.is_lexical());
    }

    #[cfg(not(feature = "bert"))]
    #[tokio::test]
    async fn test_bert_backend_needs_feature() {
        let err = load_encoder(&config(EmbeddingBackend::Bert)).await.err().unwrap();
        assert!(err.to_string().contains("--features bert"));
    }
}

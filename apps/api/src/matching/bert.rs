//! In-process sentence embeddings via rust-bert (`--features bert`).
//!
//! The model is not `Sync`, so a dedicated thread owns it and serves encode
//! requests over a channel. Weights are downloaded to the rust-bert cache on
//! first start.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rust_bert::pipelines::sentence_embeddings::{
    SentenceEmbeddingsBuilder, SentenceEmbeddingsModelType,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::embedding_client::{first_vector, EmbeddingError};
use crate::matching::encoder::{Embedding, TextEncoder};

const QUEUE_DEPTH: usize = 64;

struct Job {
    text: String,
    reply: oneshot::Sender<Result<Vec<Vec<f32>>, EmbeddingError>>,
}

pub struct BertEncoder {
    jobs: mpsc::Sender<Job>,
    dimension: usize,
}

/// Maps `EMBEDDING_MODEL` to a rust-bert model, with or without the
/// `sentence-transformers/` prefix.
fn model_type(model: &str) -> Option<SentenceEmbeddingsModelType> {
    let name = model.strip_prefix("sentence-transformers/").unwrap_or(model);
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" => Some(SentenceEmbeddingsModelType::AllMiniLmL6V2),
        "all-minilm-l12-v2" => Some(SentenceEmbeddingsModelType::AllMiniLmL12V2),
        "all-distilroberta-v1" => Some(SentenceEmbeddingsModelType::AllDistilrobertaV1),
        _ => None,
    }
}

impl BertEncoder {
    /// Starts the model thread and waits until the weights are loaded.
    pub async fn spawn(model: &str, dimension: usize) -> Result<Self> {
        let model_type =
            model_type(model).ok_or_else(|| anyhow!("Unsupported local embedding model: {model}"))?;
        let (jobs, mut queue) = mpsc::channel::<Job>(QUEUE_DEPTH);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), String>>();

        let model_name = model.to_string();
        std::thread::Builder::new()
            .name("bert-encoder".to_string())
            .spawn(move || {
                let model = match SentenceEmbeddingsBuilder::remote(model_type).create_model() {
                    Ok(model) => {
                        let _ = ready_tx.send(Ok(()));
                        model
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

                while let Some(job) = queue.blocking_recv() {
                    let result = model
                        .encode(&[job.text.as_str()])
                        .map_err(|e| EmbeddingError::Local(e.to_string()));
                    let _ = job.reply.send(result);
                }
                info!("Encoder thread for {model_name} stopped");
            })
            .context("Failed to start encoder thread")?;

        ready_rx
            .await
            .context("Encoder thread exited during startup")?
            .map_err(|e| anyhow!("Failed to load {model}: {e}"))?;

        info!("Loaded local sentence-embedding model {model}");
        Ok(Self { jobs, dimension })
    }
}

#[async_trait]
impl TextEncoder for BertEncoder {
    fn name(&self) -> &'static str {
        "bert"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let (reply, response) = oneshot::channel();
        self.jobs
            .send(Job {
                text: text.to_string(),
                reply,
            })
            .await
            .map_err(|_| EmbeddingError::Local("encoder thread is not running".to_string()))?;

        let vectors = response.await.map_err(|_| {
            error!("Encoder thread dropped a request");
            EmbeddingError::Local("encoder thread dropped the request".to_string())
        })??;

        Ok(Embedding {
            vector: first_vector(vectors, self.dimension)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_accepts_hub_names() {
        assert!(matches!(
            model_type("sentence-transformers/all-MiniLM-L6-v2"),
            Some(SentenceEmbeddingsModelType::AllMiniLmL6V2)
        ));
        assert!(matches!(
            model_type("all-MiniLM-L12-v2"),
            Some(SentenceEmbeddingsModelType::AllMiniLmL12V2)
        ));
        assert!(matches!(
            model_type("all-distilroberta-v1"),
            Some(SentenceEmbeddingsModelType::AllDistilrobertaV1)
        ));
    }

    #[test]
    fn test_model_type_rejects_unknown_models() {
        assert!(model_type("BAAI/bge-small-en-v1.5").is_none());
    }

    #[tokio::test]
    async fn test_spawn_rejects_unknown_model_before_loading() {
        let err = BertEncoder::spawn("text-embedding-3-small", 384).await.err().unwrap();
        assert!(err.to_string().contains("Unsupported local embedding model"));
    }
}

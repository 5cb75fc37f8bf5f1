//! Text embedding backends.
//!
//! The vector index only needs "text in, vector out"; which model and service
//! produce the vectors is chosen from configuration.

pub mod cache;
pub mod ollama;
pub mod openai;

pub use cache::EmbeddingCache;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{EmbeddingProvider, EmbeddingsConfig};
use crate::error::{MechanicError, Result};

/// Converts text into embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, returning one vector per input in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Model identifier recorded alongside a built index.
    fn model_name(&self) -> &str;
}

/// Build the embedder selected by `[embeddings]`.
pub fn build_embedder(config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::OpenAi => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                MechanicError::Config(format!(
                    "Environment variable {} not set",
                    config.api_key_env
                ))
            })?;
            Ok(Arc::new(OpenAIEmbedder::new(
                api_key,
                config.model.clone(),
                config.endpoint().to_string(),
                config.batch_size,
            )?))
        }
        EmbeddingProvider::Ollama => Ok(Arc::new(OllamaEmbedder::new(
            config.model.clone(),
            config.endpoint().to_string(),
        )?)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic offline embedder for tests.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub const DIMENSIONS: usize = 64;

    /// Bag-of-words hashing embedder: texts sharing words get similar vectors.
    #[derive(Default)]
    pub struct BagOfWordsEmbedder {
        pub calls: AtomicUsize,
    }

    impl BagOfWordsEmbedder {
        pub fn vector(text: &str) -> Vec<f32> {
            let mut v = vec![0.0f32; DIMENSIONS];
            for word in text
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
            {
                let slot = word
                    .bytes()
                    .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
                    % DIMENSIONS;
                v[slot] += 1.0;
            }
            v
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Embedder for BagOfWordsEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| Self::vector(t)).collect())
        }

        fn model_name(&self) -> &str {
            "bag-of-words-test"
        }
    }
}

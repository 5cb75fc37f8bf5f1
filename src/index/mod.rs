//! Persisted manual chunks and nearest-neighbour lookup over their embeddings.

pub mod sqlite;
pub mod store;
pub mod vector;

pub use sqlite::SqliteIndex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A retrievable piece of manual text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Stable identifier, e.g. `doc_12_0` (page 12, first chunk on the page).
    pub chunk_id: String,
    /// Manual file the chunk came from.
    pub source: String,
    /// 0-based page number.
    pub page: usize,
    /// Chunk position within its page.
    pub position: usize,
    pub text: String,
}

/// Text-to-top-k-chunks lookup consumed by the hybrid retriever.
#[async_trait]
pub trait EmbeddingIndex: Send + Sync {
    /// Return at most `k` chunk texts, most similar first. An empty index
    /// yields an empty vector.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<String>>;

    /// Number of chunks held by the index.
    async fn count(&self) -> Result<usize>;
}

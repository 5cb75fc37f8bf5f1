//! SQLite-backed embedding index.
//!
//! All chunk vectors are loaded into memory once at open; queries score the
//! query embedding against that snapshot and never write, so one index can be
//! shared read-only across concurrent callers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::{table_exists, Db};
use crate::embeddings::{Embedder, EmbeddingCache};
use crate::error::{MechanicError, Result};
use crate::index::store::{self, EmbeddedChunk, META_EMBEDDING_MODEL};
use crate::index::vector::{cosine_similarity, rank_top_k};
use crate::index::EmbeddingIndex;

pub struct SqliteIndex {
    db: Db,
    embedder: Arc<dyn Embedder>,
    chunks: Vec<EmbeddedChunk>,
    query_cache: Option<Arc<EmbeddingCache>>,
}

impl SqliteIndex {
    /// Open a previously built index.
    ///
    /// Fails with [`MechanicError::IndexNotBuilt`] when the database file or its
    /// `chunks` table does not exist, or when the last build did not finish.
    pub async fn open(db: Db, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if !db.exists() {
            return Err(MechanicError::IndexNotBuilt(format!(
                "vector index {} not found",
                db.path().display()
            )));
        }

        let (has_chunks, has_meta) = db
            .with_connection(|conn| {
                Ok((table_exists(conn, "chunks")?, table_exists(conn, "index_meta")?))
            })
            .await?;
        if !has_chunks || !has_meta {
            return Err(MechanicError::IndexNotBuilt(format!(
                "vector index {} has no schema",
                db.path().display()
            )));
        }

        if !store::is_build_complete(&db).await? {
            return Err(MechanicError::IndexNotBuilt(format!(
                "vector index {} is incomplete (an earlier build did not finish)",
                db.path().display()
            )));
        }

        if let Some(built_with) = store::get_meta(&db, META_EMBEDDING_MODEL).await? {
            if built_with != embedder.model_name() {
                log::warn!(
                    "Index was built with embedding model '{}' but '{}' is configured; results may be poor",
                    built_with,
                    embedder.model_name()
                );
            }
        }

        let chunks = store::load_embedded_chunks(&db).await?;
        log::info!(
            "Vector index loaded: {} chunks from {}",
            chunks.len(),
            db.path().display()
        );

        Ok(Self {
            db,
            embedder,
            chunks,
            query_cache: None,
        })
    }

    /// Cache query embeddings so repeated queries skip the embedder.
    pub fn with_query_cache(mut self, cache: Arc<EmbeddingCache>) -> Self {
        self.query_cache = Some(cache);
        self
    }

    /// Number of chunks held in memory
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cache) = &self.query_cache {
            if let Some(cached) = cache.get(text) {
                log::debug!("Query embedding cache hit");
                return Ok(cached);
            }
        }

        let start = std::time::Instant::now();
        let embedding = self.embedder.embed(text).await?;
        log::debug!("Vector search: query embedding took {:?}", start.elapsed());

        if let Some(cache) = &self.query_cache {
            cache.put(text.to_string(), embedding.clone());
        }
        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingIndex for SqliteIndex {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<String>> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self.embed_query(text).await?;

        let scored: Vec<(f32, &str)> = self
            .chunks
            .iter()
            .filter(|c| c.embedding.len() == query_vec.len())
            .map(|c| (cosine_similarity(&query_vec, &c.embedding), c.chunk_id.as_str()))
            .collect();
        if scored.len() < self.chunks.len() {
            log::warn!(
                "{} chunks skipped: embedding dimension differs from query ({})",
                self.chunks.len() - scored.len(),
                query_vec.len()
            );
        }

        let top = rank_top_k(scored, k);
        let texts = top
            .into_iter()
            .filter_map(|(_, id)| {
                self.chunks
                    .iter()
                    .find(|c| c.chunk_id == id)
                    .map(|c| c.text.clone())
            })
            .collect();
        Ok(texts)
    }

    async fn count(&self) -> Result<usize> {
        store::count_chunks(&self.db).await
    }
}

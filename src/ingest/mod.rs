//! Index construction: manual text into the vector store, relationship list
//! into the persisted graph.

pub mod chunker;
pub mod manual;

pub use chunker::{chunk_text, estimate_tokens};
pub use manual::{chunk_manual, load_manual, split_pages, PAGE_BREAK};

use std::path::Path;

use crate::config::{Config, IngestConfig};
use crate::db::Db;
use crate::embeddings::Embedder;
use crate::error::{MechanicError, Result};
use crate::graph::{self, RelationshipGraph};
use crate::index::store;

/// Outcome of a vector index build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorBuild {
    /// Chunks were (re)written; holds the number stored.
    Built(usize),
    /// The index already held this many chunks and no reset was requested.
    Skipped(usize),
}

impl VectorBuild {
    /// Chunks present in the index after the build.
    pub fn chunk_count(&self) -> usize {
        match *self {
            VectorBuild::Built(n) | VectorBuild::Skipped(n) => n,
        }
    }
}

/// Chunk, embed and store the owner's manual.
///
/// A completely built index is left untouched unless `reset` is set. An index
/// whose previous build stopped part way is always rebuilt. The manual is read
/// before anything is cleared, and the completion marker is written only after
/// the last batch, so a failed build is never mistaken for a finished one.
pub async fn build_vector_index(
    db: &Db,
    embedder: &dyn Embedder,
    manual_path: &Path,
    chunking: &IngestConfig,
    batch_size: usize,
    reset: bool,
) -> Result<VectorBuild> {
    if batch_size == 0 {
        return Err(MechanicError::InvalidInput(
            "embedding batch size must be greater than 0".to_string(),
        ));
    }

    db.initialize().await?;

    let existing = store::count_chunks(db).await?;
    let complete = store::is_build_complete(db).await?;
    if complete && !reset {
        log::info!(
            "Vector index already holds {} chunks; skipping (use --reset to rebuild)",
            existing
        );
        return Ok(VectorBuild::Skipped(existing));
    }

    let chunks = manual::load_manual(manual_path, chunking)?;

    if existing > 0 || complete {
        if !complete {
            log::warn!(
                "Vector index holds {} chunks from an unfinished build; rebuilding",
                existing
            );
        }
        let removed = store::clear_chunks(db).await?;
        log::info!("Reset: removed {} existing chunks", removed);
    }

    if chunks.is_empty() {
        log::warn!("Manual {} produced no chunks", manual_path.display());
        store::mark_build_complete(db).await?;
        return Ok(VectorBuild::Built(0));
    }

    let total = chunks.len();
    let mut stored = 0;
    let mut dimensions = None;

    for batch in chunks.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(MechanicError::Embedding(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                embeddings.len()
            )));
        }
        if dimensions.is_none() {
            dimensions = embeddings.first().map(Vec::len);
        }

        let rows = batch.iter().cloned().zip(embeddings).collect();
        stored += store::insert_chunks(db, rows).await?;

        log::info!(
            "Embedding progress: {}/{} chunks ({:.1}%)",
            stored,
            total,
            stored as f64 / total as f64 * 100.0
        );
    }

    store::set_meta(db, store::META_EMBEDDING_MODEL, embedder.model_name()).await?;
    if let Some(dimensions) = dimensions {
        store::set_meta(db, store::META_DIMENSIONS, &dimensions.to_string()).await?;
    }
    store::mark_build_complete(db).await?;

    log::info!(
        "Vector index built: {} chunks with {}",
        stored,
        embedder.model_name()
    );
    Ok(VectorBuild::Built(stored))
}

/// Build the relationship graph from its JSON list and persist it.
pub fn build_graph_index(relationships_path: &Path, graph_path: &Path) -> Result<RelationshipGraph> {
    let graph = graph::load_relationships(relationships_path)?;
    graph::save_graph(&graph, graph_path)?;
    log::info!(
        "Graph index built: {} nodes, {} edges -> {}",
        graph.node_count(),
        graph.edge_count(),
        graph_path.display()
    );
    Ok(graph)
}

/// Build both persisted indices from the configured inputs.
pub async fn build_indices(config: &Config, embedder: &dyn Embedder, reset: bool) -> Result<()> {
    build_vector_index(
        &Db::new(config.db_path()),
        embedder,
        &config.index.manual_path,
        &config.ingest,
        config.embeddings.batch_size,
        reset,
    )
    .await?;
    build_graph_index(&config.index.relationships_path, config.graph_path())?;
    Ok(())
}

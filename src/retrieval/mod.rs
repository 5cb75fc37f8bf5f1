//! Hybrid retrieval: vector search over the manual fused with knowledge-graph
//! expansion into one deterministic context block.

mod context;

pub use context::{ContextBundle, DOCUMENTATION_HEADER, NO_RELATIONSHIPS, RELATIONSHIPS_HEADER};

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::db::Db;
use crate::embeddings::{Embedder, EmbeddingCache};
use crate::error::{MechanicError, Result};
use crate::graph::{self, EntityMatcher, RelationshipGraph};
use crate::index::{EmbeddingIndex, SqliteIndex};

/// Owns the loaded index and graph for a retrieval session; both are
/// read-only after construction.
pub struct HybridRetriever {
    index: Box<dyn EmbeddingIndex>,
    graph: RelationshipGraph,
    matcher: EntityMatcher,
    top_k: usize,
    depth: usize,
}

impl HybridRetriever {
    pub fn new(
        index: Box<dyn EmbeddingIndex>,
        graph: RelationshipGraph,
        top_k: usize,
        depth: usize,
    ) -> Result<Self> {
        if top_k == 0 {
            return Err(MechanicError::InvalidInput(
                "top_k must be greater than 0".to_string(),
            ));
        }
        let matcher = EntityMatcher::for_graph(&graph)?;
        log::debug!(
            "Entity matcher built: {} patterns over {} nodes",
            matcher.pattern_count(),
            graph.node_count()
        );
        Ok(Self {
            index,
            graph,
            matcher,
            top_k,
            depth,
        })
    }

    /// Load the persisted vector index and graph named by `config`.
    ///
    /// Either one missing is [`MechanicError::IndexNotBuilt`]; nothing is
    /// rebuilt here.
    pub async fn open(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let graph = graph::load_graph(config.graph_path())?;

        let mut index = SqliteIndex::open(Db::new(config.db_path()), embedder).await?;
        if config.embeddings.cache_capacity > 0 {
            index = index.with_query_cache(Arc::new(EmbeddingCache::new(
                config.embeddings.cache_capacity,
            )));
        }

        log::info!(
            "Retriever ready: {} chunks, {} graph nodes, {} edges",
            index.len(),
            graph.node_count(),
            graph.edge_count()
        );

        Self::new(
            Box::new(index),
            graph,
            config.retrieval.top_k,
            config.retrieval.graph_depth,
        )
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    /// Gather vector and graph evidence for `query`.
    pub async fn retrieve_bundle(&self, query: &str) -> Result<ContextBundle> {
        let start = Instant::now();
        let documents = self.index.query(query, self.top_k).await?;
        log::debug!(
            "Vector search returned {} documents in {:?}",
            documents.len(),
            start.elapsed()
        );

        let mut combined = String::with_capacity(
            query.len() + documents.iter().map(|d| d.len() + 1).sum::<usize>(),
        );
        combined.push_str(query);
        combined.push(' ');
        combined.push_str(&documents.join(" "));

        let seeds = self.matcher.find(&combined);
        let expanded = graph::expand(&self.graph, &seeds, self.depth);
        let edges = self.graph.induced_edges(&expanded);
        log::debug!(
            "Graph search: {} seeds, {} expanded nodes, {} edges",
            seeds.len(),
            expanded.len(),
            edges.len()
        );

        Ok(ContextBundle {
            documents,
            seeds,
            expanded,
            edges,
        })
    }

    /// Render the context block handed to the generation step.
    pub async fn retrieve(&self, query: &str) -> Result<String> {
        Ok(self.retrieve_bundle(query).await?.to_string())
    }
}

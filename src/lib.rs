pub mod config;
pub mod error;
pub mod db;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod graph;
pub mod retrieval;
pub mod generation;

pub use config::Config;
pub use error::{MechanicError, Result};
pub use graph::{EntityMatcher, RelationshipGraph};
pub use index::{DocumentChunk, EmbeddingIndex};
pub use retrieval::{ContextBundle, HybridRetriever};

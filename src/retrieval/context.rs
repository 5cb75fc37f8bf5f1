use std::collections::BTreeSet;
use std::fmt;

use crate::graph::Edge;

pub const DOCUMENTATION_HEADER: &str = "--- Retrieved Documentation ---";
pub const RELATIONSHIPS_HEADER: &str = "--- Knowledge Graph Relationships ---";
/// Rendered in place of edges when the graph contributed nothing.
pub const NO_RELATIONSHIPS: &str = "No specific graph relationships found.";

/// Evidence gathered for one query, before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBundle {
    /// Chunk texts in index order, most similar first.
    pub documents: Vec<String>,
    /// Graph nodes mentioned in the query or the retrieved documents.
    pub seeds: Vec<String>,
    /// Seeds plus their successors within the configured depth.
    pub expanded: BTreeSet<String>,
    /// Induced-subgraph edges over `expanded`, sorted.
    pub edges: Vec<Edge>,
}

impl fmt::Display for ContextBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", DOCUMENTATION_HEADER)?;
        for (i, doc) in self.documents.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, doc)?;
        }

        writeln!(f, "{}", RELATIONSHIPS_HEADER)?;
        if self.edges.is_empty() {
            writeln!(f, "{}", NO_RELATIONSHIPS)?;
        }
        for edge in &self.edges {
            writeln!(f, "{}", edge)?;
        }
        Ok(())
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{RelationshipGraph, RelationshipRecord};
use crate::error::{MechanicError, Result};

/// Format tag written into every persisted graph file.
pub const GRAPH_FORMAT: &str = "mechanic-graph";
pub const GRAPH_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedGraph {
    format: String,
    version: u32,
    nodes: Vec<String>,
    edges: Vec<RelationshipRecord>,
}

/// Relationship list consumed at build time.
#[derive(Debug, Deserialize)]
struct RelationshipFile {
    relationships: Vec<RelationshipRecord>,
    /// Optional isolated nodes (no edges) that should still be matchable.
    #[serde(default)]
    nodes: Vec<String>,
}

/// Write the graph as JSON, creating parent directories as needed.
pub fn save_graph(graph: &RelationshipGraph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let persisted = PersistedGraph {
        format: GRAPH_FORMAT.to_string(),
        version: GRAPH_FORMAT_VERSION,
        nodes: graph.nodes().map(str::to_string).collect(),
        edges: graph
            .edges()
            .map(|edge| RelationshipRecord {
                source: edge.source,
                target: edge.target,
                relation: edge.relation,
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&persisted)?;
    std::fs::write(path, json)?;
    log::debug!(
        "Saved graph ({} nodes, {} edges) to {}",
        graph.node_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(())
}

/// Load a graph written by [`save_graph`].
///
/// A missing file is `IndexNotBuilt`; a file that exists but is not a graph of
/// the supported format is `GraphFormat`.
pub fn load_graph(path: &Path) -> Result<RelationshipGraph> {
    if !path.exists() {
        return Err(MechanicError::IndexNotBuilt(format!(
            "graph file {} not found",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let persisted: PersistedGraph = serde_json::from_str(&content).map_err(|e| {
        MechanicError::GraphFormat(format!("{}: {}", path.display(), e))
    })?;

    if persisted.format != GRAPH_FORMAT {
        return Err(MechanicError::GraphFormat(format!(
            "{}: unexpected format '{}'",
            path.display(),
            persisted.format
        )));
    }
    if persisted.version != GRAPH_FORMAT_VERSION {
        return Err(MechanicError::GraphFormat(format!(
            "{}: unsupported version {} (expected {})",
            path.display(),
            persisted.version,
            GRAPH_FORMAT_VERSION
        )));
    }

    let mut graph = RelationshipGraph::new();
    for node in &persisted.nodes {
        graph.add_node(node);
    }
    for edge in &persisted.edges {
        graph.add_edge(&edge.source, &edge.target, edge.relation.as_deref());
    }
    Ok(graph)
}

/// Build a graph from a `{"relationships": [...]}` file.
pub fn load_relationships(path: &Path) -> Result<RelationshipGraph> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MechanicError::InvalidInput(format!(
            "cannot read relationships {}: {}",
            path.display(),
            e
        ))
    })?;
    let file: RelationshipFile = serde_json::from_str(&content).map_err(|e| {
        MechanicError::InvalidInput(format!("{}: {}", path.display(), e))
    })?;

    let mut graph = RelationshipGraph::from_records(&file.relationships);
    for node in &file.nodes {
        graph.add_node(node);
    }
    log::info!(
        "Loaded {} relationships from {} ({} nodes, {} edges)",
        file.relationships.len(),
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

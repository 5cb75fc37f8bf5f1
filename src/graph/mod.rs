//! Vehicle knowledge graph: components, symptoms and causes linked by
//! directed, labelled relations.
//!
//! The graph is built once from a flat relationship list, persisted, and
//! loaded read-only at query time. Storage is a plain adjacency list; the only
//! operations retrieval needs are successor expansion and induced-subgraph
//! edge listing.

mod expand;
mod matcher;
mod persist;

pub use expand::{expand, DEFAULT_DEPTH};
pub use matcher::EntityMatcher;
pub use persist::{load_graph, load_relationships, save_graph, GRAPH_FORMAT, GRAPH_FORMAT_VERSION};

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label rendered for edges whose record carried no relation.
pub const DEFAULT_RELATION: &str = "related_to";

/// One build-time relationship record (`source --relation--> target`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

impl RelationshipRecord {
    pub fn new(source: &str, target: &str, relation: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            relation: Some(relation.to_string()),
        }
    }
}

/// A directed edge as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: Option<String>,
}

impl Edge {
    /// Relation label, falling back to [`DEFAULT_RELATION`].
    pub fn label(&self) -> &str {
        self.relation.as_deref().unwrap_or(DEFAULT_RELATION)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --[{}]--> {}", self.source, self.label(), self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Adjacent {
    target: usize,
    relation: Option<String>,
}

/// Directed labelled graph stored as an adjacency list.
///
/// Nodes keep their original spelling and first-seen order. Every edge
/// endpoint is a node.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<Adjacent>>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from relationship records, creating endpoints as needed.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RelationshipRecord>,
    {
        let mut graph = Self::new();
        for record in records {
            graph.add_edge(&record.source, &record.target, record.relation.as_deref());
        }
        graph
    }

    /// Add a node if absent; returns its slot.
    pub fn add_node(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Add a directed edge. Returns false when an edge with the same endpoints
    /// and rendered label already exists; an explicit [`DEFAULT_RELATION`] is
    /// stored as no label.
    pub fn add_edge(&mut self, source: &str, target: &str, relation: Option<&str>) -> bool {
        let from = self.add_node(source);
        let to = self.add_node(target);
        let adjacent = Adjacent {
            target: to,
            relation: relation
                .filter(|r| *r != DEFAULT_RELATION)
                .map(str::to_string),
        };
        if self.adjacency[from].contains(&adjacent) {
            return false;
        }
        self.adjacency[from].push(adjacent);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Node identifiers in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct successors of `name` (outgoing edges only), in insertion order.
    pub fn successors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.index
            .get(name)
            .map(|&id| self.adjacency[id].as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |adj| self.nodes[adj.target].as_str())
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(from, list)| {
            list.iter().map(move |adj| Edge {
                source: self.nodes[from].clone(),
                target: self.nodes[adj.target].clone(),
                relation: adj.relation.clone(),
            })
        })
    }

    /// Edges whose both endpoints lie in `nodes`, sorted by
    /// (source, target, rendered relation).
    pub fn induced_edges(&self, nodes: &BTreeSet<String>) -> Vec<Edge> {
        let mut edges = Vec::new();
        for name in nodes {
            let Some(&id) = self.index.get(name.as_str()) else {
                continue;
            };
            for adj in &self.adjacency[id] {
                let target = &self.nodes[adj.target];
                if nodes.contains(target) {
                    edges.push(Edge {
                        source: name.clone(),
                        target: target.clone(),
                        relation: adj.relation.clone(),
                    });
                }
            }
        }
        edges.sort_by(|a, b| {
            (a.source.as_str(), a.target.as_str(), a.label())
                .cmp(&(b.source.as_str(), b.target.as_str(), b.label()))
        });
        edges
    }
}

#[cfg(test)]
pub(crate) fn sample_graph() -> RelationshipGraph {
    RelationshipGraph::from_records(&[
        RelationshipRecord::new("ABS Fuse", "ABS Light", "triggers"),
        RelationshipRecord::new("ABS Light", "Service Center", "recommends"),
        RelationshipRecord::new("Wheel Speed Sensor", "ABS Light", "triggers"),
        RelationshipRecord::new("Low Tire Pressure", "Tire Pressure Warning", "triggers"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_endpoints_become_nodes() {
        let graph = sample_graph();
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.contains("Service Center"));
        assert!(!graph.contains("abs fuse"));
        let first: Vec<&str> = graph.nodes().take(3).collect();
        assert_eq!(first, vec!["ABS Fuse", "ABS Light", "Service Center"]);
    }

    #[test]
    fn test_successors_are_outgoing_only() {
        let graph = sample_graph();
        let succ: Vec<&str> = graph.successors("ABS Light").collect();
        assert_eq!(succ, vec!["Service Center"]);
        assert_eq!(graph.successors("Service Center").count(), 0);
        assert_eq!(graph.successors("Unknown").count(), 0);
    }

    #[test]
    fn test_parallel_edges_kept_duplicates_dropped() {
        let mut graph = RelationshipGraph::new();
        assert!(graph.add_edge("Battery", "Starter", Some("powers")));
        assert!(graph.add_edge("Battery", "Starter", Some("protects")));
        assert!(!graph.add_edge("Battery", "Starter", Some("powers")));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_explicit_default_relation_same_as_unlabelled() {
        let graph = RelationshipGraph::from_records(&[
            RelationshipRecord {
                source: "Fuse 12".to_string(),
                target: "Horn".to_string(),
                relation: None,
            },
            RelationshipRecord::new("Fuse 12", "Horn", "related_to"),
        ]);
        assert_eq!(graph.edge_count(), 1);

        let rendered: Vec<String> = graph
            .induced_edges(&set(&["Fuse 12", "Horn"]))
            .iter()
            .map(Edge::to_string)
            .collect();
        assert_eq!(rendered, vec!["Fuse 12 --[related_to]--> Horn"]);
    }

    #[test]
    fn test_edge_display_and_default_label() {
        let labelled = Edge {
            source: "ABS Fuse".to_string(),
            target: "ABS Light".to_string(),
            relation: Some("triggers".to_string()),
        };
        assert_eq!(labelled.to_string(), "ABS Fuse --[triggers]--> ABS Light");

        let unlabelled = Edge {
            relation: None,
            ..labelled
        };
        assert_eq!(unlabelled.label(), "related_to");
        assert_eq!(unlabelled.to_string(), "ABS Fuse --[related_to]--> ABS Light");
    }

    #[test]
    fn test_induced_edges_require_both_endpoints() {
        let graph = sample_graph();
        let edges = graph.induced_edges(&set(&["ABS Fuse", "ABS Light"]));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to_string(), "ABS Fuse --[triggers]--> ABS Light");
    }

    #[test]
    fn test_induced_edges_sorted() {
        let mut graph = RelationshipGraph::new();
        graph.add_edge("b", "c", Some("z"));
        graph.add_edge("a", "c", Some("y"));
        graph.add_edge("a", "b", Some("y"));
        graph.add_edge("a", "b", Some("x"));
        graph.add_edge("a", "b", None);
        let edges = graph.induced_edges(&set(&["a", "b", "c"]));
        let rendered: Vec<String> = edges.iter().map(Edge::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "a --[related_to]--> b",
                "a --[x]--> b",
                "a --[y]--> b",
                "a --[y]--> c",
                "b --[z]--> c",
            ]
        );
    }

    #[test]
    fn test_induced_edges_includes_self_loops_and_ignores_unknown() {
        let mut graph = RelationshipGraph::new();
        graph.add_edge("Alternator", "Alternator", Some("self_test"));
        let edges = graph.induced_edges(&set(&["Alternator", "Ghost"]));
        assert_eq!(edges.len(), 1);
        assert!(graph.induced_edges(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_record_without_relation_deserializes() {
        let record: RelationshipRecord =
            serde_json::from_str(r#"{"source": "Fuse 12", "target": "Horn"}"#).unwrap();
        assert!(record.relation.is_none());
        let graph = RelationshipGraph::from_records(&[record]);
        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.to_string(), "Fuse 12 --[related_to]--> Horn");
    }

    #[test]
    fn test_record_missing_target_rejected() {
        let result: Result<RelationshipRecord, _> =
            serde_json::from_str(r#"{"source": "Fuse 12", "relation": "powers"}"#);
        assert!(result.is_err());
    }
}

//! Case-insensitive substring matching of graph node names against free text.
//!
//! Semantics are exactly "lower-cased node name is a substring of the
//! lower-cased text", with no word-boundary check: a node named "ABS" also
//! matches inside "absolute". One Aho–Corasick automaton over all names
//! replaces a per-node scan of the text.

use aho_corasick::AhoCorasick;

use super::RelationshipGraph;
use crate::error::{MechanicError, Result};

pub struct EntityMatcher {
    automaton: Option<AhoCorasick>,
    /// Original node names for each automaton pattern (names that fold to the
    /// same lower-case string share a pattern).
    owners: Vec<Vec<String>>,
    /// Nodes whose name is empty; the empty string occurs in every text.
    always: Vec<String>,
}

impl EntityMatcher {
    /// Build a matcher over the graph's whole node vocabulary.
    pub fn for_graph(graph: &RelationshipGraph) -> Result<Self> {
        Self::new(graph.nodes())
    }

    pub fn new<'a, I>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut patterns: Vec<String> = Vec::new();
        let mut owners: Vec<Vec<String>> = Vec::new();
        let mut always = Vec::new();
        let mut slot_of = std::collections::HashMap::new();

        for name in names {
            let folded = name.to_lowercase();
            if folded.is_empty() {
                always.push(name.to_string());
                continue;
            }
            let slot = *slot_of.entry(folded.clone()).or_insert_with(|| {
                patterns.push(folded);
                owners.push(Vec::new());
                patterns.len() - 1
            });
            owners[slot].push(name.to_string());
        }

        let automaton = if patterns.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&patterns).map_err(|e| {
                MechanicError::GraphFormat(format!("cannot build entity matcher: {}", e))
            })?)
        };

        Ok(Self {
            automaton,
            owners,
            always,
        })
    }

    /// Number of distinct (case-folded) names the matcher looks for.
    pub fn pattern_count(&self) -> usize {
        self.owners.len() + usize::from(!self.always.is_empty())
    }

    /// Nodes whose name occurs in `text`, case-insensitively, sorted and
    /// de-duplicated.
    pub fn find(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = self.always.clone();

        if let Some(automaton) = &self.automaton {
            let haystack = text.to_lowercase();
            let mut hit = vec![false; self.owners.len()];
            for m in automaton.find_overlapping_iter(&haystack) {
                hit[m.pattern().as_usize()] = true;
            }
            found.extend(
                hit.iter()
                    .zip(&self.owners)
                    .filter(|(hit, _)| **hit)
                    .flat_map(|(_, names)| names.iter().cloned()),
            );
        }

        found.sort();
        found.dedup();
        found
    }
}

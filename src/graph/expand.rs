//! Bounded outgoing-edge expansion (BFS) from a seed node set.

use std::collections::{BTreeSet, VecDeque};

use super::RelationshipGraph;

/// Hops followed from matched nodes when no depth is configured.
pub const DEFAULT_DEPTH: usize = 1;

/// Return the seeds plus every node reachable from them within `depth`
/// outgoing hops.
///
/// Only source→target edges are followed: a node that merely points at a seed
/// is not pulled in. Each node is enqueued at most once, so cycles cost
/// nothing extra.
pub fn expand<S: AsRef<str>>(
    graph: &RelationshipGraph,
    seeds: &[S],
    depth: usize,
) -> BTreeSet<String> {
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut queue = VecDeque::new();

    for seed in seeds {
        let seed = seed.as_ref();
        if visited.insert(seed.to_string()) {
            queue.push_back((seed.to_string(), 0));
        }
    }

    while let Some((node, hops)) = queue.pop_front() {
        if hops >= depth {
            continue;
        }
        for next in graph.successors(&node) {
            if !visited.contains(next) {
                visited.insert(next.to_string());
                queue.push_back((next.to_string(), hops + 1));
            }
        }
    }

    visited
}

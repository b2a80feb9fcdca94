//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::graph::Graph;
use crate::id::{EdgeId, NodeId};
use crate::sort::SortResult;
use crate::validation::{validate_linkage, validate_order};

// ===========================================================================
// Graph builders
// ===========================================================================

/// A graph whose nodes carry `0..count`, plus their ids in order.
pub fn graph_with_nodes(count: usize) -> (Graph<usize>, Vec<NodeId>) {
    let graph = Graph::with_nodes(0..count);
    let nodes = graph.nodes().collect();
    (graph, nodes)
}

/// A graph of `count` nodes with an edge for every `(source, target)` index
/// pair, in the order given.
pub fn graph_from_pairs(
    count: usize,
    pairs: &[(usize, usize)],
) -> (Graph<usize>, Vec<NodeId>, Vec<EdgeId>) {
    let (mut graph, nodes) = graph_with_nodes(count);
    let edges = pairs
        .iter()
        .map(|&(s, t)| {
            graph
                .connect(nodes[s], nodes[t])
                .expect("pair indices must be below count")
        })
        .collect();
    (graph, nodes, edges)
}

/// `0 -> 1 -> ... -> len-1`.
pub fn chain(len: usize) -> Graph<usize> {
    let pairs: Vec<(usize, usize)> = (1..len).map(|i| (i - 1, i)).collect();
    graph_from_pairs(len, &pairs).0
}

/// `0 -> 1 -> ... -> len-1 -> 0`.
pub fn ring(len: usize) -> Graph<usize> {
    let mut pairs: Vec<(usize, usize)> = (1..len).map(|i| (i - 1, i)).collect();
    if len > 0 {
        pairs.push((len - 1, 0));
    }
    graph_from_pairs(len, &pairs).0
}

/// `layers` layers of `width` nodes, every node connected to every node of
/// the next layer. Node values count up layer by layer.
pub fn layered_dag(layers: usize, width: usize) -> Graph<usize> {
    let mut pairs = Vec::with_capacity(layers.saturating_sub(1) * width * width);
    for layer in 1..layers {
        for a in 0..width {
            for b in 0..width {
                pairs.push(((layer - 1) * width + a, layer * width + b));
            }
        }
    }
    graph_from_pairs(layers * width, &pairs).0
}

// ===========================================================================
// Result helpers
// ===========================================================================

/// Values of the sorted nodes of a `usize`-valued graph.
pub fn sorted_values_of<E>(result: &SortResult, graph: &Graph<usize, E>) -> Vec<usize> {
    result.sorted_values(graph).into_iter().copied().collect()
}

/// Values of the loop nodes of a `usize`-valued graph.
pub fn loop_values_of<E>(result: &SortResult, graph: &Graph<usize, E>) -> Vec<usize> {
    result.loop_values(graph).into_iter().copied().collect()
}

/// Panic with the full violation list if the graph linkage or the result is
/// inconsistent.
pub fn assert_valid_sort<N, E>(graph: &Graph<N, E>, result: &SortResult) {
    let linkage = validate_linkage(graph);
    assert!(linkage.is_empty(), "linkage violations: {linkage:?}");
    let order = validate_order(graph, result);
    assert!(order.is_empty(), "order violations: {order:?}");
}

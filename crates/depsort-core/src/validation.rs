//! Consistency checks for graphs and sort results.
//!
//! [`validate_linkage`] walks every node's edge lists and cross-checks them
//! against the edge arena. [`validate_order`] checks that a [`SortResult`]
//! is a valid outcome for the graph it was produced from. Both return every
//! violation found rather than stopping at the first one.

use crate::graph::Graph;
use crate::id::{EdgeId, NodeId};
use crate::sort::SortResult;
use slotmap::SecondaryMap;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Violation types
// ---------------------------------------------------------------------------

/// A broken linkage invariant between nodes and edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkageViolation {
    /// A node's list holds an edge that does not reference the node, or an
    /// edge that is not in the arena.
    ForeignEdge {
        node: NodeId,
        edge: EdgeId,
        incoming: bool,
    },
    /// A node's list holds a detached edge.
    DetachedEdgeListed {
        node: NodeId,
        edge: EdgeId,
        incoming: bool,
    },
    /// An attached edge is absent from one of its endpoint lists.
    MissingFromList {
        node: NodeId,
        edge: EdgeId,
        incoming: bool,
    },
    /// A node's recorded list length differs from the number of listed edges.
    CountMismatch {
        node: NodeId,
        incoming: bool,
        recorded: usize,
        listed: usize,
    },
    /// The graph's attached-edge counter differs from the arena contents.
    AttachedCountMismatch { recorded: usize, actual: usize },
}

/// A way in which a sort result fails to describe its graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderViolation {
    /// A graph node appears in neither the sorted nor the loop list.
    Missing(NodeId),
    /// A node appears more than once across both lists.
    Duplicate(NodeId),
    /// The result names a node the graph does not have.
    Unknown(NodeId),
    /// An edge that was not broken leads into a sorted node from a node that
    /// is not sorted before it.
    Unsatisfied {
        edge: EdgeId,
        source: NodeId,
        target: NodeId,
    },
    /// An edge reported as broken is still attached.
    BrokenButAttached(EdgeId),
}

// ---------------------------------------------------------------------------
// Linkage
// ---------------------------------------------------------------------------

/// Cross-check every node's incoming and outgoing lists against the edges.
pub fn validate_linkage<N, E>(graph: &Graph<N, E>) -> Vec<LinkageViolation> {
    let mut violations = Vec::new();
    // Bounds each list walk so a corrupted cycle in the links cannot hang.
    let limit = graph.total_edge_count() + 1;
    let mut listed_in: SecondaryMap<EdgeId, ()> = SecondaryMap::new();
    let mut listed_out: SecondaryMap<EdgeId, ()> = SecondaryMap::new();

    for node in graph.nodes() {
        let Some(data) = graph.node(node) else {
            continue;
        };

        let lists = [(true, data.incoming_count()), (false, data.outgoing_count())];
        for (incoming, recorded) in lists {
            let edges: Vec<EdgeId> = if incoming {
                graph.incoming_edges(node).take(limit).collect()
            } else {
                graph.outgoing_edges(node).take(limit).collect()
            };

            if edges.len() != recorded {
                violations.push(LinkageViolation::CountMismatch {
                    node,
                    incoming,
                    recorded,
                    listed: edges.len(),
                });
            }

            for edge in edges {
                let Some(edge_data) = graph.edge(edge) else {
                    violations.push(LinkageViolation::ForeignEdge {
                        node,
                        edge,
                        incoming,
                    });
                    continue;
                };
                let endpoint = if incoming {
                    edge_data.target()
                } else {
                    edge_data.source()
                };
                if endpoint != node {
                    violations.push(LinkageViolation::ForeignEdge {
                        node,
                        edge,
                        incoming,
                    });
                } else if !edge_data.is_attached() {
                    violations.push(LinkageViolation::DetachedEdgeListed {
                        node,
                        edge,
                        incoming,
                    });
                }

                if incoming {
                    listed_in.insert(edge, ());
                } else {
                    listed_out.insert(edge, ());
                }
            }
        }
    }

    let mut attached = 0;
    for (edge, data) in graph.all_edges() {
        if !data.is_attached() {
            continue;
        }
        attached += 1;
        if !listed_out.contains_key(edge) {
            violations.push(LinkageViolation::MissingFromList {
                node: data.source(),
                edge,
                incoming: false,
            });
        }
        if !listed_in.contains_key(edge) {
            violations.push(LinkageViolation::MissingFromList {
                node: data.target(),
                edge,
                incoming: true,
            });
        }
    }

    if attached != graph.edge_count() {
        violations.push(LinkageViolation::AttachedCountMismatch {
            recorded: graph.edge_count(),
            actual: attached,
        });
    }

    violations
}

// ---------------------------------------------------------------------------
// Sort results
// ---------------------------------------------------------------------------

/// Check that `result` is a valid sort of `graph`.
///
/// Every node must appear exactly once across `sorted_nodes` and
/// `loop_nodes`. Every edge that was not broken and that targets a sorted
/// node must come from a node sorted earlier. Broken edges must be detached.
/// Edges are judged by their endpoints, so pass the graph the result was
/// produced from, after the sort.
pub fn validate_order<N, E>(graph: &Graph<N, E>, result: &SortResult) -> Vec<OrderViolation> {
    let mut violations = Vec::new();
    let mut position: SecondaryMap<NodeId, usize> = SecondaryMap::new();
    let mut seen: SecondaryMap<NodeId, ()> = SecondaryMap::new();

    let listed = result
        .sorted_nodes
        .iter()
        .enumerate()
        .map(|(i, &n)| (n, Some(i)))
        .chain(result.loop_nodes.iter().map(|&n| (n, None)));
    for (node, sorted_at) in listed {
        if !graph.contains_node(node) {
            violations.push(OrderViolation::Unknown(node));
            continue;
        }
        if seen.insert(node, ()).is_some() {
            violations.push(OrderViolation::Duplicate(node));
            continue;
        }
        if let Some(i) = sorted_at {
            position.insert(node, i);
        }
    }

    for node in graph.nodes() {
        if !seen.contains_key(node) {
            violations.push(OrderViolation::Missing(node));
        }
    }

    let broken: HashSet<EdgeId> = result.broken_edges.iter().copied().collect();
    for &edge in &result.broken_edges {
        if graph.edge(edge).is_some_and(|e| e.is_attached()) {
            violations.push(OrderViolation::BrokenButAttached(edge));
        }
    }

    for (edge, data) in graph.all_edges() {
        if broken.contains(&edge) {
            continue;
        }
        let Some(&target_at) = position.get(data.target()) else {
            continue;
        };
        let satisfied = position
            .get(data.source())
            .is_some_and(|&source_at| source_at < target_at);
        if !satisfied {
            violations.push(OrderViolation::Unsatisfied {
                edge,
                source: data.source(),
                target: data.target(),
            });
        }
    }

    violations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

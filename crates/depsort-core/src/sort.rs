//! Topological sorting with cycle breaking.
//!
//! The sort is Kahn's algorithm run destructively over a [`Graph`]: every
//! node that has no incoming edges is emitted, and its outgoing edges are
//! detached, which may free further nodes. When progress stops while nodes
//! remain, the attached edges are offered one by one (in the order
//! [`Graph::edges`] produced them when the sort started) to an
//! [`EdgeBreaker`]. An accepted edge is detached and recorded as broken; as
//! soon as that frees a node the sorting phase resumes, so a single break
//! can release a whole dependent chain before anything else is sacrificed.
//! Nodes still blocked when no edges are left to offer are reported as loop
//! nodes.
//!
//! The graph is consumed in the process: edges detached by the sort stay
//! detached. Sort a private graph, or clone it first.

use crate::graph::{EdgeData, Graph};
use crate::id::{EdgeId, NodeId};
use crate::ordered_set::OrderedSet;
use crate::policy::EdgeBreaker;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::convert::Infallible;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Error returned by [`SortResult::into_order`] when cycles remain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    #[error("unresolved dependency cycle through {} node(s)", .loop_nodes.len())]
    Cycle { loop_nodes: Vec<NodeId> },
}

/// Outcome of a sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortResult {
    /// Nodes in dependency order.
    pub sorted_nodes: Vec<NodeId>,
    /// Edges the breaker sacrificed, in the order they were broken.
    pub broken_edges: Vec<EdgeId>,
    /// Nodes left inside cycles nobody was allowed to break, in insertion
    /// order.
    pub loop_nodes: Vec<NodeId>,
}

impl SortResult {
    pub fn has_loops(&self) -> bool {
        !self.loop_nodes.is_empty()
    }

    /// The sorted order, or [`SortError::Cycle`] if any node is left in a
    /// loop.
    pub fn into_order(self) -> Result<Vec<NodeId>, SortError> {
        if self.has_loops() {
            return Err(SortError::Cycle {
                loop_nodes: self.loop_nodes,
            });
        }
        Ok(self.sorted_nodes)
    }

    /// Values of the sorted nodes, in order.
    pub fn sorted_values<'g, N, E>(&self, graph: &'g Graph<N, E>) -> Vec<&'g N> {
        self.sorted_nodes
            .iter()
            .filter_map(|&n| graph.value(n))
            .collect()
    }

    /// Values of the loop nodes.
    pub fn loop_values<'g, N, E>(&self, graph: &'g Graph<N, E>) -> Vec<&'g N> {
        self.loop_nodes
            .iter()
            .filter_map(|&n| graph.value(n))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

type BreakFn<'b, E, Err> = dyn FnMut(EdgeId, &EdgeData<E>) -> Result<bool, Err> + 'b;

/// Sort without breaking anything. Cycles end up in
/// [`SortResult::loop_nodes`] and their edges stay attached.
///
/// # Examples
///
/// ```
/// use depsort_core::graph::Graph;
/// use depsort_core::sort::sort;
///
/// let mut graph: Graph<&str> = Graph::with_nodes(["orders", "users"]);
/// let nodes: Vec<_> = graph.nodes().collect();
/// graph.connect(nodes[1], nodes[0]).unwrap(); // users before orders
///
/// let result = sort(&mut graph);
/// assert_eq!(result.sorted_values(&graph), [&"users", &"orders"]);
/// assert!(!result.has_loops());
/// ```
pub fn sort<N, E>(graph: &mut Graph<N, E>) -> SortResult {
    into_ok(run::<N, E, Infallible>(graph, None))
}

/// Sort, letting `breaker` sacrifice edges when a cycle blocks progress.
pub fn sort_with<N, E, B>(graph: &mut Graph<N, E>, mut breaker: B) -> SortResult
where
    B: EdgeBreaker<E>,
{
    let mut decide =
        |id: EdgeId, edge: &EdgeData<E>| Ok::<bool, Infallible>(breaker.should_break(id, edge));
    let decide: &mut BreakFn<'_, E, Infallible> = &mut decide;
    into_ok(run(graph, Some(decide)))
}

/// Sort with a breaker that can fail.
///
/// The first error aborts the sort and is returned as is. Edges detached
/// before the failure (sorted-over or broken) stay detached, so the graph
/// is left partially consumed.
pub fn try_sort_with<N, E, F, Err>(
    graph: &mut Graph<N, E>,
    mut breaker: F,
) -> Result<SortResult, Err>
where
    F: FnMut(EdgeId, &EdgeData<E>) -> Result<bool, Err>,
{
    let decide: &mut BreakFn<'_, E, Err> = &mut breaker;
    run(graph, Some(decide))
}

fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

fn run<N, E, Err>(
    graph: &mut Graph<N, E>,
    mut breaker: Option<&mut BreakFn<'_, E, Err>>,
) -> Result<SortResult, Err> {
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        breaking = breaker.is_some(),
        "topological sort started"
    );

    let mut unsorted: OrderedSet<NodeId> = graph.nodes().collect();
    // Without a breaker nothing is ever offered, so the set stays empty.
    let mut breakable: OrderedSet<EdgeId> = if breaker.is_some() {
        graph.edges().collect()
    } else {
        OrderedSet::new()
    };
    let mut ready: VecDeque<NodeId> = graph
        .nodes()
        .filter(|&n| !graph.has_incoming_edges(n))
        .collect();
    let mut result = SortResult::default();

    loop {
        // Sorting phase.
        while let Some(node) = ready.pop_front() {
            unsorted.remove(node);
            result.sorted_nodes.push(node);
            tracing::trace!(?node, "node sorted");

            let outgoing: Vec<EdgeId> = graph.outgoing_edges(node).collect();
            for edge in outgoing {
                breakable.remove(edge);
                if let Some(target) = graph.take_edge(edge)
                    && !graph.has_incoming_edges(target)
                {
                    ready.push_back(target);
                }
            }
        }

        if unsorted.is_empty() {
            break;
        }
        let Some(decide) = breaker.as_deref_mut() else {
            break;
        };

        // Breaking phase: stop at the first break that frees a node.
        let mut unblocked = false;
        while let Some(edge) = breakable.pop_front() {
            let Some(data) = graph.edge(edge) else {
                continue;
            };
            if !decide(edge, data)? {
                tracing::trace!(?edge, "edge kept");
                continue;
            }

            let source = data.source();
            let Some(target) = graph.take_edge(edge) else {
                continue;
            };
            result.broken_edges.push(edge);
            tracing::debug!(?edge, ?source, ?target, "dependency edge broken");

            if !graph.has_incoming_edges(target) {
                ready.push_back(target);
                unblocked = true;
                break;
            }
        }
        if !unblocked {
            break;
        }
    }

    result.loop_nodes.extend(unsorted.iter());
    tracing::debug!(
        sorted = result.sorted_nodes.len(),
        broken = result.broken_edges.len(),
        looping = result.loop_nodes.len(),
        "topological sort finished"
    );
    Ok(result)
}

// ---------------------------------------------------------------------------
// Sorting plain items
// ---------------------------------------------------------------------------

/// Outcome of [`sort_items`] / [`sort_items_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSortResult<T> {
    /// Items in dependency order.
    pub sorted: Vec<T>,
    /// Items left in unbroken cycles, in input order.
    pub loops: Vec<T>,
    /// `(source_index, target_index)` of every broken connection, indices
    /// into the input sequence.
    pub broken: Vec<(usize, usize)>,
}

impl<T> ItemSortResult<T> {
    pub fn has_loops(&self) -> bool {
        !self.loops.is_empty()
    }
}

/// Sort items whose dependencies are given by a connector.
///
/// `connector(a, b)` returning true means `a` must come before `b`. Every
/// ordered pair is tested, including an item with itself, so a connector
/// that is true for `(a, a)` creates a self-loop. Nothing is broken.
pub fn sort_items<T, C>(items: impl IntoIterator<Item = T>, connector: C) -> ItemSortResult<T>
where
    C: FnMut(&T, &T) -> bool,
{
    sort_items_with(items, connector, |_: &T, _: &T| false)
}

/// Like [`sort_items`], with `breaker(source, target)` deciding which
/// connections may be broken to resolve cycles.
///
/// # Examples
///
/// ```
/// use depsort_core::sort::sort_items;
///
/// // Lower numbers first.
/// let result = sort_items([3, 1, 2], |a, b| a < b);
/// assert_eq!(result.sorted, [1, 2, 3]);
/// ```
pub fn sort_items_with<T, C, B>(
    items: impl IntoIterator<Item = T>,
    mut connector: C,
    mut breaker: B,
) -> ItemSortResult<T>
where
    C: FnMut(&T, &T) -> bool,
    B: FnMut(&T, &T) -> bool,
{
    let items: Vec<T> = items.into_iter().collect();
    let mut graph: Graph<usize, (usize, usize)> = Graph::with_nodes(0..items.len());
    let nodes: Vec<NodeId> = graph.nodes().collect();

    for (i, &source) in nodes.iter().enumerate() {
        for (j, &target) in nodes.iter().enumerate() {
            if connector(&items[i], &items[j])
                && let Err(err) = graph.add_edge(source, target, (i, j))
            {
                tracing::warn!(%err, source = i, target = j, "connection skipped");
            }
        }
    }

    let result = sort_with(&mut graph, |edge: &EdgeData<(usize, usize)>| {
        let (i, j) = *edge.value();
        breaker(&items[i], &items[j])
    });

    let broken = result
        .broken_edges
        .iter()
        .filter_map(|&e| graph.edge(e).map(|data| *data.value()))
        .collect();
    let sorted_indices: Vec<usize> = result.sorted_values(&graph).into_iter().copied().collect();
    let loop_indices: Vec<usize> = result.loop_values(&graph).into_iter().copied().collect();

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let sorted = sorted_indices
        .iter()
        .filter_map(|&i| slots[i].take())
        .collect();
    let loops = loop_indices
        .iter()
        .filter_map(|&i| slots[i].take())
        .collect();

    ItemSortResult {
        sorted,
        loops,
        broken,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{BreakAll, BreakSelfLoops, NeverBreak};
    use crate::test_utils::*;

    #[test]
    fn empty_graph() {
        let mut graph: Graph<u32> = Graph::new();
        let result = sort(&mut graph);
        assert_eq!(result, SortResult::default());
        assert!(!result.has_loops());
    }

    #[test]
    fn edgeless_graph_keeps_input_order() {
        let (mut graph, nodes) = graph_with_nodes(4);
        let result = sort(&mut graph);
        assert_eq!(result.sorted_nodes, nodes);
        assert!(result.broken_edges.is_empty());
        assert!(result.loop_nodes.is_empty());

        let (mut graph, nodes) = graph_with_nodes(4);
        let result = sort_with(&mut graph, BreakAll);
        assert_eq!(result.sorted_nodes, nodes);
        assert!(result.broken_edges.is_empty());
    }

    #[test]
    fn linear_chain() {
        let (mut graph, nodes) = graph_with_nodes(3);
        let [a, b, c] = [nodes[0], nodes[1], nodes[2]];
        // Built back to front so input order differs from dependency order.
        graph.connect(c, b).unwrap();
        graph.connect(b, a).unwrap();

        let result = sort(&mut graph);
        assert_eq!(result.sorted_nodes, vec![c, b, a]);
        assert_eq!(graph.edge_count(), 0, "every edge visited");
    }

    #[test]
    fn diamond() {
        let (mut graph, nodes) = graph_with_nodes(4);
        let [a, b, c, d] = [nodes[0], nodes[1], nodes[2], nodes[3]];
        graph.connect(a, b).unwrap();
        graph.connect(a, c).unwrap();
        graph.connect(b, d).unwrap();
        graph.connect(c, d).unwrap();

        let result = sort(&mut graph);
        assert_eq!(result.sorted_nodes, vec![a, b, c, d]);
    }

    #[test]
    fn ready_nodes_are_fifo() {
        let (mut graph, nodes) = graph_with_nodes(4);
        let [a, b, c, d] = [nodes[0], nodes[1], nodes[2], nodes[3]];
        // a and c are roots; d depends on a, b depends on c.
        graph.connect(a, d).unwrap();
        graph.connect(c, b).unwrap();

        let result = sort(&mut graph);
        assert_eq!(result.sorted_nodes, vec![a, c, d, b]);
    }

    #[test]
    fn self_loop_is_broken() {
        let (mut graph, nodes) = graph_with_nodes(1);
        let a = nodes[0];
        let e = graph.connect(a, a).unwrap();

        let result = sort_with(&mut graph, BreakSelfLoops);
        assert_eq!(result.sorted_nodes, vec![a]);
        assert_eq!(result.broken_edges, vec![e]);
        assert!(result.loop_nodes.is_empty());

        let node = graph.node(a).unwrap();
        assert_eq!(node.incoming_count() + node.outgoing_count(), 0);
    }

    #[test]
    fn two_cycle_without_breaker() {
        let (mut graph, nodes) = graph_with_nodes(2);
        let [a, b] = [nodes[0], nodes[1]];
        graph.connect(a, b).unwrap();
        graph.connect(b, a).unwrap();

        let result = sort(&mut graph);
        assert!(result.sorted_nodes.is_empty());
        assert!(result.broken_edges.is_empty());
        assert_eq!(result.loop_nodes, vec![a, b]);
        assert!(result.has_loops());
        assert_eq!(graph.edge_count(), 2, "detection only, nothing detached");
    }

    #[test]
    fn two_cycle_with_refusing_breaker() {
        let (mut graph, nodes) = graph_with_nodes(2);
        let [a, b] = [nodes[0], nodes[1]];
        graph.connect(a, b).unwrap();
        graph.connect(b, a).unwrap();

        let result = sort_with(&mut graph, NeverBreak);
        assert!(result.sorted_nodes.is_empty());
        assert!(result.broken_edges.is_empty());
        assert_eq!(result.loop_nodes, vec![a, b]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn two_cycle_break_all_breaks_once() {
        let (mut graph, nodes) = graph_with_nodes(2);
        let [a, b] = [nodes[0], nodes[1]];
        let ab = graph.connect(a, b).unwrap();
        graph.connect(b, a).unwrap();

        let result = sort_with(&mut graph, BreakAll);
        assert_eq!(result.broken_edges, vec![ab]);
        // Breaking a->b frees b first.
        assert_eq!(result.sorted_nodes, vec![b, a]);
        assert!(result.loop_nodes.is_empty());
    }

    /// Nodes {1, 2}, edges 1->2 (1), 1->2 (2), 2->1 (3).
    fn parallel_cycle() -> (Graph<u32, u32>, [NodeId; 2], [EdgeId; 3]) {
        let mut graph = Graph::with_nodes([1, 2]);
        let nodes: Vec<NodeId> = graph.nodes().collect();
        let e1 = graph.add_edge(nodes[0], nodes[1], 1).unwrap();
        let e2 = graph.add_edge(nodes[0], nodes[1], 2).unwrap();
        let e3 = graph.add_edge(nodes[1], nodes[0], 3).unwrap();
        (graph, [nodes[0], nodes[1]], [e1, e2, e3])
    }

    #[test]
    fn breaking_only_back_edge() {
        let (mut graph, [n1, n2], [_, _, e3]) = parallel_cycle();
        let result = sort_with(&mut graph, |e: &EdgeData<u32>| *e.value() == 3);
        assert_eq!(result.broken_edges, vec![e3]);
        assert_eq!(result.sorted_nodes, vec![n1, n2]);
        assert!(result.loop_nodes.is_empty());
    }

    #[test]
    fn breaking_everything_but_back_edge() {
        let (mut graph, [n1, n2], [e1, e2, e3]) = parallel_cycle();
        let result = sort_with(&mut graph, |e: &EdgeData<u32>| *e.value() != 3);
        assert_eq!(result.broken_edges, vec![e1, e2]);
        assert_eq!(result.sorted_nodes, vec![n2, n1]);
        assert!(result.loop_nodes.is_empty());
        assert!(!graph.edge(e3).unwrap().is_attached());
    }

    #[test]
    fn rejected_edges_are_not_offered_again() {
        let (mut graph, _, _) = parallel_cycle();
        let mut offered = Vec::new();
        let result = sort_with(&mut graph, |e: &EdgeData<u32>| {
            offered.push(*e.value());
            *e.value() == 3
        });
        assert_eq!(offered, vec![1, 2, 3]);
        assert!(!result.has_loops());
    }

    #[test]
    fn sorted_edges_are_never_offered() {
        // a -> b, b <-> c: a->b is visited normally before breaking starts.
        let (mut graph, nodes) = graph_with_nodes(3);
        let [a, b, c] = [nodes[0], nodes[1], nodes[2]];
        let ab = graph.connect(a, b).unwrap();
        let bc = graph.connect(b, c).unwrap();
        graph.connect(c, b).unwrap();

        let mut offered = Vec::new();
        let result = try_sort_with(&mut graph, |id: EdgeId, _: &EdgeData<()>| {
            offered.push(id);
            Ok::<bool, Infallible>(true)
        })
        .unwrap();
        assert!(!offered.contains(&ab));
        assert_eq!(offered, vec![bc]);
        assert_eq!(result.sorted_nodes, vec![a, c, b]);
    }

    #[test]
    fn restart_after_first_unblocking_break() {
        // Two independent 2-cycles; each one needs exactly one break.
        let (mut graph, nodes) = graph_with_nodes(4);
        let [a, b, c, d] = [nodes[0], nodes[1], nodes[2], nodes[3]];
        let ab = graph.connect(a, b).unwrap();
        graph.connect(b, a).unwrap();
        let cd = graph.connect(c, d).unwrap();
        graph.connect(d, c).unwrap();

        let result = sort_with(&mut graph, BreakAll);
        assert_eq!(result.broken_edges, vec![ab, cd]);
        assert_eq!(result.sorted_nodes, vec![b, a, d, c]);
    }

    #[test]
    fn one_break_releases_a_chain() {
        // a -> b -> c -> d -> a, plus d -> e.
        let (mut graph, nodes) = graph_with_nodes(5);
        let [a, b, c, d, e] = [nodes[0], nodes[1], nodes[2], nodes[3], nodes[4]];
        graph.connect(a, b).unwrap();
        graph.connect(b, c).unwrap();
        graph.connect(c, d).unwrap();
        let da = graph.connect(d, a).unwrap();
        graph.connect(d, e).unwrap();

        let result = sort_with(&mut graph, BreakAll);
        assert_eq!(result.broken_edges.len(), 1);
        assert_ne!(result.broken_edges[0], da);
        assert_eq!(result.sorted_nodes.len(), 5);
        assert_eq!(
            sorted_values_of(&result, &graph),
            vec![1, 2, 3, 0, 4],
            "breaking a->b frees b, then the chain runs to a and e"
        );
    }

    #[test]
    fn cycle_with_acyclic_tail() {
        // a <-> b, a -> c. Without breaking, c is starved too.
        let (mut graph, nodes) = graph_with_nodes(4);
        let [a, b, c, d] = [nodes[0], nodes[1], nodes[2], nodes[3]];
        graph.connect(a, b).unwrap();
        graph.connect(b, a).unwrap();
        graph.connect(a, c).unwrap();

        let result = sort(&mut graph);
        assert_eq!(result.sorted_nodes, vec![d]);
        assert_eq!(result.loop_nodes, vec![a, b, c]);
    }

    #[test]
    fn edge_accounting() {
        let (mut graph, nodes) = graph_with_nodes(5);
        let [a, b, c, d, e] = [nodes[0], nodes[1], nodes[2], nodes[3], nodes[4]];
        graph.connect(a, b).unwrap();
        graph.connect(b, c).unwrap();
        graph.connect(c, b).unwrap();
        graph.connect(d, d).unwrap();
        graph.connect(d, e).unwrap();
        graph.connect(e, e).unwrap();
        let original = graph.edge_count();

        let result = sort_with(&mut graph, BreakSelfLoops);
        let visited = graph
            .all_edges()
            .filter(|(id, data)| !data.is_attached() && !result.broken_edges.contains(id))
            .count();
        assert_eq!(visited + result.broken_edges.len() + graph.edge_count(), original);
        assert_eq!(result.broken_edges.len(), 2);
        assert_eq!(result.loop_nodes, vec![b, c]);
        assert_eq!(graph.edge_count(), 2, "b <-> c stays attached");
    }

    #[test]
    fn into_order_reports_cycles() {
        let (mut graph, nodes) = graph_with_nodes(3);
        graph.connect(nodes[1], nodes[2]).unwrap();
        graph.connect(nodes[2], nodes[1]).unwrap();

        let err = sort(&mut graph).into_order().unwrap_err();
        assert_eq!(
            err,
            SortError::Cycle {
                loop_nodes: vec![nodes[1], nodes[2]]
            }
        );
        assert_eq!(err.to_string(), "unresolved dependency cycle through 2 node(s)");

        let (mut graph, nodes) = graph_with_nodes(2);
        assert_eq!(sort(&mut graph).into_order(), Ok(nodes));
    }

    #[test]
    fn failing_breaker_aborts_and_keeps_detaches() {
        // a -> b (visited), b <-> c, c <-> d.
        let (mut graph, nodes) = graph_with_nodes(4);
        let [a, b, c, d] = [nodes[0], nodes[1], nodes[2], nodes[3]];
        let ab = graph.connect(a, b).unwrap();
        let bc = graph.connect(b, c).unwrap();
        let cb = graph.connect(c, b).unwrap();
        graph.connect(c, d).unwrap();
        graph.connect(d, c).unwrap();

        let outcome = try_sort_with(&mut graph, |id: EdgeId, _: &EdgeData<()>| {
            if id == bc {
                Ok(true)
            } else if id == cb {
                Err("policy lookup failed")
            } else {
                Ok(false)
            }
        });
        assert_eq!(outcome, Err("policy lookup failed"));
        assert!(!graph.edge(ab).unwrap().is_attached());
        assert!(!graph.edge(bc).unwrap().is_attached());
        assert!(graph.edge(cb).unwrap().is_attached());
    }

    #[test]
    fn visited_edges_are_never_offered() {
        let (mut graph, _, edges) = graph_from_pairs(3, &[(0, 1), (1, 2), (2, 1)]);
        let mut offered = Vec::new();
        let result = try_sort_with(&mut graph, |id: EdgeId, _: &EdgeData<()>| {
            offered.push(id);
            Ok::<bool, Infallible>(false)
        })
        .unwrap();

        assert_eq!(offered, vec![edges[1], edges[2]]);
        assert_eq!(result.loop_nodes.len(), 2);
    }

    #[test]
    #[should_panic(expected = "breaker gave up")]
    fn panicking_breaker_propagates() {
        let (mut graph, _, _) = graph_from_pairs(2, &[(0, 1), (1, 0)]);
        sort_with(&mut graph, |_: &EdgeData<()>| -> bool { panic!("breaker gave up") });
    }

    #[test]
    fn panicking_breaker_keeps_detaches() {
        // a -> b is visited before b <-> c stalls the sort.
        let (mut graph, _, edges) = graph_from_pairs(3, &[(0, 1), (1, 2), (2, 1)]);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sort_with(&mut graph, |_: &EdgeData<()>| -> bool { panic!("breaker gave up") })
        }));

        assert!(outcome.is_err());
        assert!(!graph.edge(edges[0]).unwrap().is_attached());
        assert!(graph.edge(edges[1]).unwrap().is_attached());
        assert!(graph.edge(edges[2]).unwrap().is_attached());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn fallible_breaker_success() {
        let (mut graph, nodes) = graph_with_nodes(2);
        graph.connect(nodes[0], nodes[1]).unwrap();
        let back = graph.connect(nodes[1], nodes[0]).unwrap();
        let result = try_sort_with(&mut graph, |id: EdgeId, _: &EdgeData<()>| {
            Ok::<_, std::fmt::Error>(id == back)
        })
        .unwrap();
        assert_eq!(result.broken_edges, vec![back]);
        assert_eq!(result.sorted_nodes, nodes);
    }

    #[test]
    fn deterministic_across_identical_builds() {
        let build = || {
            let (mut graph, nodes) = graph_with_nodes(6);
            for (s, t) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 3), (5, 5), (2, 5)] {
                graph.connect(nodes[s], nodes[t]).unwrap();
            }
            graph
        };
        let mut first = build();
        let mut second = build();
        let r1 = sort_with(&mut first, BreakAll);
        let r2 = sort_with(&mut second, BreakAll);
        assert_eq!(r1, r2);
        assert!(!r1.has_loops());
    }

    #[test]
    fn loop_values_map_back_to_nodes() {
        let mut graph: Graph<&str> = Graph::with_nodes(["a", "b", "c"]);
        let nodes: Vec<_> = graph.nodes().collect();
        graph.connect(nodes[1], nodes[1]).unwrap();
        let result = sort(&mut graph);
        assert_eq!(result.sorted_values(&graph), vec![&"a", &"c"]);
        assert_eq!(result.loop_values(&graph), vec![&"b"]);
    }

    #[test]
    fn result_serializes() {
        let (mut graph, nodes) = graph_with_nodes(2);
        graph.connect(nodes[0], nodes[0]).unwrap();
        let result = sort_with(&mut graph, BreakSelfLoops);
        let json = serde_json::to_string(&result).unwrap();
        let back: SortResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    // -----------------------------------------------------------------------
    // Item sorting
    // -----------------------------------------------------------------------

    #[test]
    fn items_isolated_node_among_cycles() {
        // 4, 2 and 1 all depend on each other (and themselves); 3 is free.
        let result = sort_items_with(
            [4, 3, 2, 1],
            |a, b| !(*a == 3 || *b == 3),
            |a, b| a == b,
        );
        assert_eq!(result.sorted, vec![3]);
        assert_eq!(result.loops, vec![4, 2, 1]);
        assert_eq!(result.broken, vec![(0, 0), (2, 2), (3, 3)]);
    }

    #[test]
    fn items_self_loops_unblock_chain() {
        let result = sort_items_with([3, 2, 1], |a, b| a >= b, |a, b| a == b);
        assert_eq!(result.sorted, vec![3, 2, 1]);
        assert!(!result.has_loops());
        assert_eq!(result.broken, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn items_without_breaker_report_loops() {
        let result = sort_items(["x", "y"], |_, _| true);
        assert!(result.sorted.is_empty());
        assert_eq!(result.loops, vec!["x", "y"]);
        assert!(result.broken.is_empty());
    }

    #[test]
    fn items_acyclic_connector() {
        let result = sort_items(vec![5, 1, 4, 2, 3], |a, b| a < b);
        assert_eq!(result.sorted, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn items_are_moved_not_cloned() {
        #[derive(Debug, PartialEq)]
        struct Step(&'static str);

        let steps = vec![Step("create"), Step("alter"), Step("drop")];
        let result = sort_items(steps, |a, b| a.0 == "drop" && b.0 == "create");
        assert_eq!(result.sorted, vec![Step("alter"), Step("drop"), Step("create")]);
    }
}

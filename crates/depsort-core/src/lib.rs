//! depsort core -- dependency ordering with cycle breaking.
//!
//! This crate provides a mutable dependency graph and a topological sorter
//! that can break cycles under a caller-supplied policy. It is meant for
//! ordering things that depend on each other (upgrade actions, schema
//! objects, build steps) where an occasional cycle is expected and some
//! dependencies are known to be safe to drop.
//!
//! # Sorting Pipeline
//!
//! Each call to [`sort::sort_with`] consumes the graph it is given:
//!
//! 1. **Seed** -- Every node without incoming edges is queued, in insertion
//!    order.
//! 2. **Sort** -- Queued nodes are emitted and their outgoing edges
//!    detached; targets left without incoming edges are queued in turn.
//! 3. **Break** -- When the queue drains with nodes left, attached edges are
//!    offered to the [`policy::EdgeBreaker`] in enumeration order. The first
//!    accepted edge that frees a node sends the sort back to step 2.
//! 4. **Report** -- Nodes still blocked become loop nodes.
//!
//! ```rust
//! use depsort_core::graph::Graph;
//! use depsort_core::policy::BreakSelfLoops;
//! use depsort_core::sort::sort_with;
//!
//! let mut graph: Graph<&str> = Graph::with_nodes(["employees", "departments"]);
//! let nodes: Vec<_> = graph.nodes().collect();
//! let (employees, departments) = (nodes[0], nodes[1]);
//! graph.connect(departments, employees).unwrap();
//! graph.connect(employees, employees).unwrap(); // manager reference
//!
//! let result = sort_with(&mut graph, BreakSelfLoops);
//! assert_eq!(result.sorted_values(&graph), [&"departments", &"employees"]);
//! assert_eq!(result.broken_edges.len(), 1);
//! ```
//!
//! # Key Types
//!
//! - [`graph::Graph`] -- Arena of nodes and edges with O(1) edge detach.
//! - [`sort::SortResult`] -- Sorted nodes, broken edges and loop nodes.
//! - [`policy::EdgeBreaker`] -- Decides which edges may be sacrificed.
//! - [`ordered_set::OrderedSet`] -- Insertion-ordered key set used by the
//!   sorter.
//! - [`validation`] -- Linkage and ordering checks.

pub mod graph;
pub mod id;
pub mod ordered_set;
pub mod policy;
pub mod sort;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

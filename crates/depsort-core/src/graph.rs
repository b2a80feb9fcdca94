use crate::id::*;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeId),
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Which of a node's two edge lists an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Edges whose target is the node.
    Incoming,
    /// Edges whose source is the node.
    Outgoing,
}

/// Head, tail and length of one intrusive edge list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct EdgeList {
    head: Option<EdgeId>,
    tail: Option<EdgeId>,
    len: usize,
}

/// Position of an edge inside one node's edge list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct ListLinks {
    prev: Option<EdgeId>,
    next: Option<EdgeId>,
}

/// Per-node data: the caller's value plus the heads of the node's incoming
/// and outgoing edge lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData<N> {
    value: N,
    incoming: EdgeList,
    outgoing: EdgeList,
}

impl<N> NodeData<N> {
    fn new(value: N) -> Self {
        Self {
            value,
            incoming: EdgeList::default(),
            outgoing: EdgeList::default(),
        }
    }

    fn list(&self, direction: Direction) -> &EdgeList {
        match direction {
            Direction::Incoming => &self.incoming,
            Direction::Outgoing => &self.outgoing,
        }
    }

    fn list_mut(&mut self, direction: Direction) -> &mut EdgeList {
        match direction {
            Direction::Incoming => &mut self.incoming,
            Direction::Outgoing => &mut self.outgoing,
        }
    }

    pub fn value(&self) -> &N {
        &self.value
    }

    /// Number of attached edges targeting this node.
    pub fn incoming_count(&self) -> usize {
        self.incoming.len
    }

    /// Number of attached edges leaving this node.
    pub fn outgoing_count(&self) -> usize {
        self.outgoing.len
    }

    pub fn has_incoming_edges(&self) -> bool {
        self.incoming.len > 0
    }

    pub fn has_outgoing_edges(&self) -> bool {
        self.outgoing.len > 0
    }
}

/// Per-edge data. The edge means "`source` must come before `target`".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData<E> {
    source: NodeId,
    target: NodeId,
    value: E,
    attached: bool,
    /// Links within `source`'s outgoing list.
    out_links: ListLinks,
    /// Links within `target`'s incoming list.
    in_links: ListLinks,
}

impl<E> EdgeData<E> {
    fn links_mut(&mut self, direction: Direction) -> &mut ListLinks {
        match direction {
            Direction::Incoming => &mut self.in_links,
            Direction::Outgoing => &mut self.out_links,
        }
    }

    fn links(&self, direction: Direction) -> &ListLinks {
        match direction {
            Direction::Incoming => &self.in_links,
            Direction::Outgoing => &self.out_links,
        }
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn value(&self) -> &E {
        &self.value
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A mutable dependency graph.
///
/// Nodes and edges live in `SlotMap` arenas. Each node heads two intrusive
/// doubly linked lists (incoming and outgoing edges) threaded through the
/// edges themselves, so detaching an edge is O(1) and both lists keep their
/// insertion order. Detached edges stay in the arena and can be inspected or
/// re-attached later.
///
/// Nodes are never removed; membership is fixed once a node is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph<N, E = ()> {
    nodes: SlotMap<NodeId, NodeData<N>>,
    edges: SlotMap<EdgeId, EdgeData<E>>,
    /// Node insertion order. Drives every enumeration the sorter relies on.
    order: Vec<NodeId>,
    /// Number of currently attached edges.
    attached: usize,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    /// Create a new, empty graph.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            order: Vec::new(),
            attached: 0,
        }
    }

    /// Build a graph with one node per value, in sequence order.
    ///
    /// # Examples
    ///
    /// ```
    /// use depsort_core::graph::Graph;
    ///
    /// let graph: Graph<&str> = Graph::with_nodes(["users", "orders"]);
    /// let values: Vec<_> = graph.nodes().map(|n| *graph.value(n).unwrap()).collect();
    /// assert_eq!(values, ["users", "orders"]);
    /// ```
    pub fn with_nodes<I: IntoIterator<Item = N>>(values: I) -> Self {
        let mut graph = Self::new();
        for value in values {
            graph.add_node(value);
        }
        graph
    }

    /// Add a node carrying `value`. It starts with no edges.
    pub fn add_node(&mut self, value: N) -> NodeId {
        let id = self.nodes.insert(NodeData::new(value));
        self.order.push(id);
        id
    }

    /// Add an edge `source -> target` and attach it immediately.
    ///
    /// Both endpoints must already belong to this graph. Self-loops are
    /// allowed.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        value: E,
    ) -> Result<EdgeId, GraphError> {
        if !self.nodes.contains_key(source) {
            return Err(GraphError::NodeNotFound(source));
        }
        if !self.nodes.contains_key(target) {
            return Err(GraphError::NodeNotFound(target));
        }

        let edge = self.edges.insert(EdgeData {
            source,
            target,
            value,
            attached: false,
            out_links: ListLinks::default(),
            in_links: ListLinks::default(),
        });
        self.link(edge, source, target);
        Ok(edge)
    }

    /// Add an edge carrying `E::default()`.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, GraphError>
    where
        E: Default,
    {
        self.add_edge(source, target, E::default())
    }

    /// Re-attach a detached edge at the back of both endpoint lists.
    /// Returns `Ok(false)` if the edge was already attached.
    pub fn attach(&mut self, edge: EdgeId) -> Result<bool, GraphError> {
        let data = self.edges.get(edge).ok_or(GraphError::EdgeNotFound(edge))?;
        if data.attached {
            return Ok(false);
        }
        let (source, target) = (data.source, data.target);
        self.link(edge, source, target);
        Ok(true)
    }

    /// Detach an edge from both endpoint lists. The edge stays in the arena.
    /// Returns `Ok(false)` if the edge was already detached.
    pub fn detach(&mut self, edge: EdgeId) -> Result<bool, GraphError> {
        let data = self.edges.get(edge).ok_or(GraphError::EdgeNotFound(edge))?;
        if !data.attached {
            return Ok(false);
        }
        let (source, target) = (data.source, data.target);
        self.unlink(edge, source, Direction::Outgoing);
        self.unlink(edge, target, Direction::Incoming);
        if let Some(data) = self.edges.get_mut(edge) {
            data.attached = false;
        }
        self.attached -= 1;
        Ok(true)
    }

    /// Detach `edge` and return its target, or `None` if the edge is
    /// unknown or was already detached.
    pub(crate) fn take_edge(&mut self, edge: EdgeId) -> Option<NodeId> {
        let target = self.edges.get(edge)?.target;
        self.detach(edge).ok()?.then_some(target)
    }

    fn link(&mut self, edge: EdgeId, source: NodeId, target: NodeId) {
        self.push_back(edge, source, Direction::Outgoing);
        self.push_back(edge, target, Direction::Incoming);
        if let Some(data) = self.edges.get_mut(edge) {
            data.attached = true;
        }
        self.attached += 1;
    }

    fn push_back(&mut self, edge: EdgeId, node: NodeId, direction: Direction) {
        let Some(node_data) = self.nodes.get_mut(node) else {
            return;
        };
        let list = node_data.list_mut(direction);
        let prev = list.tail;
        list.tail = Some(edge);
        if list.head.is_none() {
            list.head = Some(edge);
        }
        list.len += 1;

        if let Some(prev) = prev
            && let Some(prev_data) = self.edges.get_mut(prev)
        {
            prev_data.links_mut(direction).next = Some(edge);
        }
        if let Some(data) = self.edges.get_mut(edge) {
            *data.links_mut(direction) = ListLinks { prev, next: None };
        }
    }

    fn unlink(&mut self, edge: EdgeId, node: NodeId, direction: Direction) {
        let Some(links) = self
            .edges
            .get_mut(edge)
            .map(|data| std::mem::take(data.links_mut(direction)))
        else {
            return;
        };

        match links.prev {
            Some(prev) => {
                if let Some(prev_data) = self.edges.get_mut(prev) {
                    prev_data.links_mut(direction).next = links.next;
                }
            }
            None => {
                if let Some(node_data) = self.nodes.get_mut(node) {
                    node_data.list_mut(direction).head = links.next;
                }
            }
        }
        match links.next {
            Some(next) => {
                if let Some(next_data) = self.edges.get_mut(next) {
                    next_data.links_mut(direction).prev = links.prev;
                }
            }
            None => {
                if let Some(node_data) = self.nodes.get_mut(node) {
                    node_data.list_mut(direction).tail = links.prev;
                }
            }
        }
        if let Some(node_data) = self.nodes.get_mut(node) {
            node_data.list_mut(direction).len -= 1;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Get the node data for a given node ID.
    pub fn node(&self, node: NodeId) -> Option<&NodeData<N>> {
        self.nodes.get(node)
    }

    /// Get the value carried by a node.
    pub fn value(&self, node: NodeId) -> Option<&N> {
        self.nodes.get(node).map(|n| &n.value)
    }

    /// Mutable access to a node's value. Edge linkage is not reachable
    /// through this.
    pub fn value_mut(&mut self, node: NodeId) -> Option<&mut N> {
        self.nodes.get_mut(node).map(|n| &mut n.value)
    }

    /// Get the edge data for a given edge ID, attached or not.
    pub fn edge(&self, edge: EdgeId) -> Option<&EdgeData<E>> {
        self.edges.get(edge)
    }

    /// Mutable access to an edge's value.
    pub fn edge_value_mut(&mut self, edge: EdgeId) -> Option<&mut E> {
        self.edges.get_mut(edge).map(|e| &mut e.value)
    }

    /// Attached edges targeting `node`, oldest first.
    pub fn incoming_edges(&self, node: NodeId) -> EdgeIter<'_, E> {
        self.edge_iter(node, Direction::Incoming)
    }

    /// Attached edges leaving `node`, oldest first.
    pub fn outgoing_edges(&self, node: NodeId) -> EdgeIter<'_, E> {
        self.edge_iter(node, Direction::Outgoing)
    }

    fn edge_iter(&self, node: NodeId, direction: Direction) -> EdgeIter<'_, E> {
        EdgeIter {
            edges: &self.edges,
            cursor: self.nodes.get(node).and_then(|n| n.list(direction).head),
            direction,
        }
    }

    /// Returns true if `node` has at least one attached incoming edge.
    pub fn has_incoming_edges(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(NodeData::has_incoming_edges)
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of currently attached edges.
    pub fn edge_count(&self) -> usize {
        self.attached
    }

    /// Number of edges ever added, attached or detached.
    pub fn total_edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the node exists in the graph.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Returns true if the edge exists in the graph (attached or not).
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains_key(edge)
    }

    /// Node IDs in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Every attached edge: each node's outgoing list, in node order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.order.iter().flat_map(move |&n| self.outgoing_edges(n))
    }

    /// Every edge ever added, attached or not, in creation order.
    pub fn all_edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData<E>)> {
        self.edges.iter()
    }
}

/// Iterator over one node's incoming or outgoing edge list.
pub struct EdgeIter<'a, E> {
    edges: &'a SlotMap<EdgeId, EdgeData<E>>,
    cursor: Option<EdgeId>,
    direction: Direction,
}

impl<E> Iterator for EdgeIter<'_, E> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let current = self.cursor?;
        self.cursor = self
            .edges
            .get(current)
            .and_then(|e| e.links(self.direction).next);
        Some(current)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use slotmap::new_key_type;

new_key_type! {
    /// Identifies a node in a dependency graph.
    pub struct NodeId;

    /// Identifies an edge in a dependency graph. Stays valid after the edge
    /// is detached.
    pub struct EdgeId;
}

//! Serde data file structs for dependency graph definitions.
//!
//! These structs define the on-disk format for a graph: named nodes, edges
//! between them, and the policy deciding which edges may be broken. They are
//! deserialized from RON, JSON, or TOML data files and then resolved into a
//! core [`Graph`](depsort_core::graph::Graph) by the loader.

use depsort_core::graph::EdgeData;
use depsort_core::id::EdgeId;
use depsort_core::policy::EdgeBreaker;
use serde::{Deserialize, Serialize};

// ===========================================================================
// Graph file
// ===========================================================================

/// A whole graph definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
    #[serde(default)]
    pub policy: BreakPolicy,
}

/// A node entry, either just its name or a table with a `name` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeDef {
    /// Short form: `"users"`.
    Short(String),
    /// Full form: `{ name: "users" }`.
    Full { name: String },
}

impl NodeDef {
    pub fn name(&self) -> &str {
        match self {
            NodeDef::Short(name) | NodeDef::Full { name } => name,
        }
    }
}

/// An edge entry. The edge means `from` must come before `to`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EdgeDef {
    /// Short form: `("users", "orders")`, unlabelled and not breakable.
    Short(String, String),
    /// Full form with an optional label and a `breakable` flag.
    Full {
        from: String,
        to: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        breakable: bool,
    },
}

impl EdgeDef {
    pub fn from(&self) -> &str {
        match self {
            EdgeDef::Short(from, _) | EdgeDef::Full { from, .. } => from,
        }
    }

    pub fn to(&self) -> &str {
        match self {
            EdgeDef::Short(_, to) | EdgeDef::Full { to, .. } => to,
        }
    }

    /// The value carried by the resolved graph edge.
    pub fn spec(&self) -> EdgeSpec {
        match self {
            EdgeDef::Short(..) => EdgeSpec::default(),
            EdgeDef::Full {
                label, breakable, ..
            } => EdgeSpec {
                label: label.clone(),
                breakable: *breakable,
            },
        }
    }
}

// ===========================================================================
// Resolved edge values
// ===========================================================================

/// Edge payload in a loaded graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub label: Option<String>,
    pub breakable: bool,
}

// ===========================================================================
// Break policy
// ===========================================================================

/// Which edges a loaded graph may break to resolve cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakPolicy {
    /// Break nothing; cycles are reported.
    #[default]
    Never,
    /// Break any edge.
    All,
    /// Break only edges from a node to itself.
    SelfLoops,
    /// Break only edges declared with `breakable: true`.
    Marked,
    /// Break only edges whose label is listed.
    Labels(Vec<String>),
}

impl EdgeBreaker<EdgeSpec> for BreakPolicy {
    fn should_break(&mut self, _id: EdgeId, edge: &EdgeData<EdgeSpec>) -> bool {
        match self {
            BreakPolicy::Never => false,
            BreakPolicy::All => true,
            BreakPolicy::SelfLoops => edge.is_self_loop(),
            BreakPolicy::Marked => edge.value().breakable,
            BreakPolicy::Labels(labels) => edge
                .value()
                .label
                .as_ref()
                .is_some_and(|label| labels.contains(label)),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

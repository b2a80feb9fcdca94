//! Resolution pipeline: reads a graph file, resolves node names, builds the
//! core graph.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_graph_file`] / [`load_graph_dir`]
//! which turn a [`GraphFile`] into a sortable [`LoadedGraph`].

use crate::schema::{BreakPolicy, EdgeSpec, GraphFile};
use depsort_core::graph::{Graph, GraphError};
use depsort_core::id::NodeId;
use depsort_core::sort::{SortResult, sort_with};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The directory holds no graph file.
    #[error("no graph.ron, graph.toml or graph.json in {dir}")]
    MissingRequired { dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An edge names a node the file does not declare.
    #[error("unresolved node reference '{name}' in {file}")]
    UnresolvedRef { file: PathBuf, name: String },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// Building the graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `graph.ron`, `graph.toml` or `graph.json` in `dir`.
///
/// Returns `Ok(None)` if none exists, or `Err(ConflictingFormats)` if more
/// than one does.
fn find_graph_file(dir: &Path) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("graph.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in the given format. `file` is only used for error
/// reporting.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format, path)
}

// ===========================================================================
// Name resolution
// ===========================================================================

fn resolve_node(
    names: &HashMap<String, NodeId>,
    name: &str,
    file: &Path,
) -> Result<NodeId, DataLoadError> {
    names
        .get(name)
        .copied()
        .ok_or_else(|| DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
}

// ===========================================================================
// Loaded graphs
// ===========================================================================

/// A graph resolved from a data file, ready to sort.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    /// Nodes carry their names; edges carry their label and breakable flag.
    pub graph: Graph<String, EdgeSpec>,
    /// Node name to node ID.
    pub names: HashMap<String, NodeId>,
    /// Policy declared in the file.
    pub policy: BreakPolicy,
}

impl LoadedGraph {
    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// The name of a node.
    pub fn name_of(&self, node: NodeId) -> Option<&str> {
        self.graph.value(node).map(String::as_str)
    }

    /// Sort the graph with the file's policy. Consumes the graph's edges like
    /// any other sort.
    pub fn sort(&mut self) -> SortResult {
        sort_with(&mut self.graph, self.policy.clone())
    }

    /// Names of the sorted nodes, in order.
    pub fn sorted_names(&self, result: &SortResult) -> Vec<&str> {
        result
            .sorted_nodes
            .iter()
            .filter_map(|&n| self.name_of(n))
            .collect()
    }

    /// Names of the loop nodes.
    pub fn loop_names(&self, result: &SortResult) -> Vec<&str> {
        result
            .loop_nodes
            .iter()
            .filter_map(|&n| self.name_of(n))
            .collect()
    }
}

/// Resolve a parsed graph file. `file` is only used for error reporting.
///
/// Node names must be unique; every edge endpoint must name a declared node.
/// Nodes and edges keep their file order, which fixes the sort order of
/// independent nodes and the order edges are offered for breaking.
pub fn resolve_graph(data: GraphFile, file: &Path) -> Result<LoadedGraph, DataLoadError> {
    let mut graph: Graph<String, EdgeSpec> = Graph::new();
    let mut names: HashMap<String, NodeId> = HashMap::with_capacity(data.nodes.len());

    for def in &data.nodes {
        let name = def.name();
        if names.contains_key(name) {
            return Err(DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: name.to_string(),
            });
        }
        let id = graph.add_node(name.to_string());
        names.insert(name.to_string(), id);
    }

    for def in &data.edges {
        let from = resolve_node(&names, def.from(), file)?;
        let to = resolve_node(&names, def.to(), file)?;
        graph.add_edge(from, to, def.spec())?;
    }

    tracing::debug!(
        file = %file.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        policy = ?data.policy,
        "graph resolved"
    );

    Ok(LoadedGraph {
        graph,
        names,
        policy: data.policy,
    })
}

/// Load and resolve a single graph file.
pub fn load_graph_file(path: &Path) -> Result<LoadedGraph, DataLoadError> {
    let data: GraphFile = deserialize_file(path)?;
    resolve_graph(data, path)
}

/// Load `graph.ron`, `graph.toml` or `graph.json` from a directory.
pub fn load_graph_dir(dir: &Path) -> Result<LoadedGraph, DataLoadError> {
    let path = find_graph_file(dir)?.ok_or_else(|| DataLoadError::MissingRequired {
        dir: dir.to_path_buf(),
    })?;
    load_graph_file(&path)
}

// ===========================================================================
// Tests
// ===========================================================================

//! Data-driven graph definitions for depsort.
//!
//! A graph file names its nodes, lists the edges between them and picks a
//! [`schema::BreakPolicy`]. [`loader::load_graph_file`] and
//! [`loader::load_graph_dir`] read RON, TOML or JSON and resolve names into a
//! [`depsort_core::graph::Graph`] ready to sort.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, LoadedGraph, load_graph_dir, load_graph_file};
pub use schema::{BreakPolicy, EdgeSpec, GraphFile};

//! Scene graph module
//!
//! A retained hierarchy of transform nodes with lazily cached world
//! transforms and aggregate bounding spheres. Each frame the owning code
//! calls [`Graph::update`] to settle derived state and [`Graph::enqueue`]
//! to collect visible draw operations and lights into a
//! [`Scene`](crate::render::Scene).

pub mod graph;
pub mod node;

pub use graph::{ConfigError, Graph, GraphConfig, SceneGraphError};
pub use node::{DirtyFlags, NodeKey, NodeKind};

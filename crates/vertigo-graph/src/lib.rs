//! vertigo-graph: store collaborators for the mapping layer.
//!
//! Defines the [`GraphStore`] contract the model crate persists and traverses
//! through, plus two implementations: [`MemoryStore`], an adjacency-list
//! store for tests and embedding, and [`GraphClient`], a Neo4j store speaking
//! parameterized Cypher.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryStore;
pub use store::{ElementRecord, GraphStore, TraversalHit, TraverseRequest, WriteRequest};

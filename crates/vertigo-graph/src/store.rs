//! The store contract consumed by the model layer.
//!
//! All properties crossing this boundary are keyed by physical (store-facing)
//! field names and hold store-form values.

use std::collections::BTreeSet;

use vertigo_core::{Direction, ElementId, ElementKind, Endpoints, Predicate, Properties};

use crate::client::GraphError;

/// A persisted vertex or edge as the store returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRecord {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Vertex element type, or edge label.
    pub element_type: String,
    pub properties: Properties,
    /// Present for edges only.
    pub endpoints: Option<Endpoints>,
}

/// Create (`id == None`) or update an element.
///
/// Updates merge `properties` into the stored set; fields not named are left
/// untouched. `endpoints` is required on edge creation and ignored otherwise.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub kind: ElementKind,
    pub element_type: String,
    pub id: Option<ElementId>,
    pub properties: Properties,
    pub endpoints: Option<Endpoints>,
}

/// One-hop traversal from a source vertex.
#[derive(Debug, Clone)]
pub struct TraverseRequest {
    pub source: ElementId,
    pub direction: Direction,
    /// Edge labels to follow; empty follows every label.
    pub labels: BTreeSet<String>,
    /// Conjunctive constraints on edge properties.
    pub predicates: Vec<Predicate>,
    pub limit: Option<usize>,
}

/// A matching edge and the vertex at its far end, both as returned by the
/// single traversal call.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalHit {
    pub edge: ElementRecord,
    pub endpoint: ElementRecord,
}

/// Persistence and traversal backend.
///
/// Implementations perform no retries; errors are returned to the caller as-is.
#[allow(async_fn_in_trait)]
pub trait GraphStore {
    /// Create or update an element, returning its identifier.
    async fn write(&self, request: WriteRequest) -> Result<ElementId, GraphError>;

    /// Fetch the stored state of an element. Missing elements are `NotFound`.
    async fn read(&self, kind: ElementKind, id: ElementId) -> Result<ElementRecord, GraphError>;

    /// Delete an element. Deleting a vertex also deletes its incident edges.
    async fn delete(&self, kind: ElementKind, id: ElementId) -> Result<(), GraphError>;

    /// Follow the edges of `request.source` that satisfy the request, in store order.
    async fn traverse(&self, request: &TraverseRequest) -> Result<Vec<TraversalHit>, GraphError>;

    /// Create a key index on a vertex property.
    async fn create_key_index(&self, field: &str) -> Result<(), GraphError>;
}

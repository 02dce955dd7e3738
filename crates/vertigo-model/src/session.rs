//! A store paired with the schemas used to decode what it returns.

use std::sync::Arc;

use vertigo_core::{ElementId, ElementKind};
use vertigo_graph::{ElementRecord, GraphStore};

use crate::edge::Edge;
use crate::error::Result;
use crate::schema::SchemaRegistry;
use crate::vertex::Vertex;

pub struct Session<S> {
    store: S,
    registry: Arc<SchemaRegistry>,
}

impl<S: GraphStore> Session<S> {
    pub fn new(store: S, registry: impl Into<Arc<SchemaRegistry>>) -> Self {
        Self {
            store,
            registry: registry.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Load a vertex of whichever registered type it was saved as.
    pub async fn load_vertex(&self, id: ElementId) -> Result<Vertex> {
        let record = self.store.read(ElementKind::Vertex, id).await?;
        self.decode_vertex(&record)
    }

    /// Load an edge of whichever registered label it was saved as.
    pub async fn load_edge(&self, id: ElementId) -> Result<Edge> {
        let record = self.store.read(ElementKind::Edge, id).await?;
        self.decode_edge(&record)
    }

    pub(crate) fn decode_vertex(&self, record: &ElementRecord) -> Result<Vertex> {
        let vertex_type = self.registry.require_vertex_type(&record.element_type)?;
        Vertex::from_record(vertex_type, record)
    }

    pub(crate) fn decode_edge(&self, record: &ElementRecord) -> Result<Edge> {
        let edge_type = self.registry.require_edge_type(&record.element_type)?;
        Edge::from_record(edge_type, record)
    }
}

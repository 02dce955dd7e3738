//! Typed vertices.

use vertigo_core::{Direction, ElementId, ElementKind, Value};
use vertigo_graph::{ElementRecord, GraphStore};

use crate::edge::Edge;
use crate::element::{self, Element, ElementState};
use crate::error::{ModelError, Result};
use crate::filter::EdgeFilter;
use crate::query::TraversalQuery;
use crate::schema::{EdgeType, VertexType};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    state: ElementState,
}

impl Vertex {
    /// A new, unsaved vertex with every field at its default.
    pub fn new(vertex_type: &VertexType) -> Self {
        Self {
            state: ElementState::new(vertex_type.shared()),
        }
    }

    /// Build, populate and save a vertex in one step.
    pub async fn create<S, K, I>(session: &Session<S>, vertex_type: &VertexType, fields: I) -> Result<Self>
    where
        S: GraphStore,
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut vertex = Self::new(vertex_type);
        let prepared = vertex.state.prepare(fields)?;
        vertex.state.apply(prepared);
        vertex.save(session).await?;
        Ok(vertex)
    }

    /// Load a saved vertex, which must be of `vertex_type`.
    pub async fn load<S: GraphStore>(
        session: &Session<S>,
        vertex_type: &VertexType,
        id: ElementId,
    ) -> Result<Self> {
        let record = session.store().read(ElementKind::Vertex, id).await?;
        if record.element_type != vertex_type.element_type() {
            return Err(ModelError::NotFound {
                kind: ElementKind::Vertex,
                id,
            });
        }
        Self::from_record(vertex_type, &record)
    }

    /// Load several vertices of `vertex_type`, in the order given.
    pub async fn load_all<S: GraphStore>(
        session: &Session<S>,
        vertex_type: &VertexType,
        ids: &[ElementId],
    ) -> Result<Vec<Self>> {
        let mut vertices = Vec::with_capacity(ids.len());
        for &id in ids {
            vertices.push(Self::load(session, vertex_type, id).await?);
        }
        Ok(vertices)
    }

    pub(crate) fn from_record(vertex_type: &VertexType, record: &ElementRecord) -> Result<Self> {
        Ok(Self {
            state: ElementState::from_record(vertex_type.shared(), record)?,
        })
    }

    /// Persist the vertex: every field on first save, changed fields after.
    pub async fn save<S: GraphStore>(&mut self, session: &Session<S>) -> Result<()> {
        element::save_state(&mut self.state, None, session.store()).await
    }

    /// Discard local changes and re-read stored values.
    pub async fn reload<S: GraphStore>(&mut self, session: &Session<S>) -> Result<()> {
        element::reload_state(&mut self.state, session.store()).await
    }

    /// Assign several fields and save. No field changes if any is unknown
    /// or invalid.
    pub async fn update<S, K, I>(&mut self, session: &Session<S>, fields: I) -> Result<()>
    where
        S: GraphStore,
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        element::update_state(&mut self.state, fields, None, session.store()).await
    }

    /// Delete the vertex and its incident edges.
    pub async fn delete<S: GraphStore>(&mut self, session: &Session<S>) -> Result<()> {
        element::delete_state(&mut self.state, session.store()).await
    }

    /// Start a traversal from this vertex. It must be saved.
    pub fn query(&self) -> Result<TraversalQuery> {
        Ok(TraversalQuery::new(self.state.saved_id()?))
    }

    fn traversal(&self, direction: Direction, filters: &[EdgeFilter<'_>]) -> Result<TraversalQuery> {
        self.query()?.direction(direction).labels(filters)
    }

    /// Vertices at the head of outgoing edges, optionally restricted to
    /// edge labels and vertex types.
    pub async fn out_v<S: GraphStore>(
        &self,
        session: &Session<S>,
        filters: &[EdgeFilter<'_>],
        types: &[&VertexType],
    ) -> Result<Vec<Vertex>> {
        self.traversal(Direction::Out, filters)?
            .vertex_types(types)
            .vertices(session)
            .await
    }

    pub async fn in_v<S: GraphStore>(
        &self,
        session: &Session<S>,
        filters: &[EdgeFilter<'_>],
        types: &[&VertexType],
    ) -> Result<Vec<Vertex>> {
        self.traversal(Direction::In, filters)?
            .vertex_types(types)
            .vertices(session)
            .await
    }

    pub async fn both_v<S: GraphStore>(
        &self,
        session: &Session<S>,
        filters: &[EdgeFilter<'_>],
        types: &[&VertexType],
    ) -> Result<Vec<Vertex>> {
        self.traversal(Direction::Both, filters)?
            .vertex_types(types)
            .vertices(session)
            .await
    }

    /// Outgoing edges, optionally restricted to labels and edge types.
    pub async fn out_e<S: GraphStore>(
        &self,
        session: &Session<S>,
        filters: &[EdgeFilter<'_>],
        types: &[&EdgeType],
    ) -> Result<Vec<Edge>> {
        self.traversal(Direction::Out, filters)?
            .edge_types(types)
            .edges(session)
            .await
    }

    pub async fn in_e<S: GraphStore>(
        &self,
        session: &Session<S>,
        filters: &[EdgeFilter<'_>],
        types: &[&EdgeType],
    ) -> Result<Vec<Edge>> {
        self.traversal(Direction::In, filters)?
            .edge_types(types)
            .edges(session)
            .await
    }

    pub async fn both_e<S: GraphStore>(
        &self,
        session: &Session<S>,
        filters: &[EdgeFilter<'_>],
        types: &[&EdgeType],
    ) -> Result<Vec<Edge>> {
        self.traversal(Direction::Both, filters)?
            .edge_types(types)
            .edges(session)
            .await
    }
}

impl Element for Vertex {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }
}

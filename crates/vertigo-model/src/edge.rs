//! Typed edges between saved vertices.

use vertigo_core::{ElementId, ElementKind, Endpoints, Value};
use vertigo_graph::{ElementRecord, GraphError, GraphStore};

use crate::element::{self, Element, ElementState};
use crate::error::{ModelError, Result};
use crate::schema::EdgeType;
use crate::session::Session;
use crate::vertex::Vertex;

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    state: ElementState,
    endpoints: Endpoints,
}

impl Edge {
    /// A new, unsaved edge `out_v -> in_v`. Both vertices must be saved.
    pub fn new(edge_type: &EdgeType, out_v: &Vertex, in_v: &Vertex) -> Result<Self> {
        let endpoints = Endpoints {
            out_v: out_v.state().saved_id()?,
            in_v: in_v.state().saved_id()?,
        };
        Ok(Self {
            state: ElementState::new(edge_type.shared()),
            endpoints,
        })
    }

    /// Build, populate and save an edge in one step.
    pub async fn create<S, K, I>(
        session: &Session<S>,
        edge_type: &EdgeType,
        out_v: &Vertex,
        in_v: &Vertex,
        fields: I,
    ) -> Result<Self>
    where
        S: GraphStore,
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut edge = Self::new(edge_type, out_v, in_v)?;
        let prepared = edge.state.prepare(fields)?;
        edge.state.apply(prepared);
        edge.save(session).await?;
        Ok(edge)
    }

    /// Load a saved edge, which must carry `edge_type`'s label.
    pub async fn load<S: GraphStore>(
        session: &Session<S>,
        edge_type: &EdgeType,
        id: ElementId,
    ) -> Result<Self> {
        let record = session.store().read(ElementKind::Edge, id).await?;
        if record.element_type != edge_type.label() {
            return Err(ModelError::NotFound {
                kind: ElementKind::Edge,
                id,
            });
        }
        Self::from_record(edge_type, &record)
    }

    pub async fn load_all<S: GraphStore>(
        session: &Session<S>,
        edge_type: &EdgeType,
        ids: &[ElementId],
    ) -> Result<Vec<Self>> {
        let mut edges = Vec::with_capacity(ids.len());
        for &id in ids {
            edges.push(Self::load(session, edge_type, id).await?);
        }
        Ok(edges)
    }

    pub(crate) fn from_record(edge_type: &EdgeType, record: &ElementRecord) -> Result<Self> {
        let endpoints = record.endpoints.ok_or_else(|| {
            GraphError::InvalidRequest(format!("edge {} returned without endpoints", record.id))
        })?;
        Ok(Self {
            state: ElementState::from_record(edge_type.shared(), record)?,
            endpoints,
        })
    }

    pub fn label(&self) -> &str {
        self.element_type()
    }

    pub fn endpoints(&self) -> Endpoints {
        self.endpoints
    }

    /// Id of the tail vertex.
    pub fn out_id(&self) -> ElementId {
        self.endpoints.out_v
    }

    /// Id of the head vertex.
    pub fn in_id(&self) -> ElementId {
        self.endpoints.in_v
    }

    pub async fn out_vertex<S: GraphStore>(&self, session: &Session<S>) -> Result<Vertex> {
        session.load_vertex(self.endpoints.out_v).await
    }

    pub async fn in_vertex<S: GraphStore>(&self, session: &Session<S>) -> Result<Vertex> {
        session.load_vertex(self.endpoints.in_v).await
    }

    pub async fn save<S: GraphStore>(&mut self, session: &Session<S>) -> Result<()> {
        element::save_state(&mut self.state, Some(self.endpoints), session.store()).await
    }

    pub async fn reload<S: GraphStore>(&mut self, session: &Session<S>) -> Result<()> {
        element::reload_state(&mut self.state, session.store()).await
    }

    pub async fn update<S, K, I>(&mut self, session: &Session<S>, fields: I) -> Result<()>
    where
        S: GraphStore,
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        element::update_state(&mut self.state, fields, Some(self.endpoints), session.store()).await
    }

    pub async fn delete<S: GraphStore>(&mut self, session: &Session<S>) -> Result<()> {
        element::delete_state(&mut self.state, session.store()).await
    }
}

impl Element for Edge {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }
}

//! One-hop traversals from a saved vertex.

use std::collections::{BTreeSet, HashSet};

use vertigo_core::{Comparator, Direction, ElementId, Predicate, Value};
use vertigo_graph::{GraphStore, TraversalHit, TraverseRequest};

use crate::edge::Edge;
use crate::error::Result;
use crate::filter::{resolve_labels, EdgeFilter};
use crate::schema::{EdgeType, VertexType};
use crate::session::Session;
use crate::vertex::Vertex;

/// Builder for a traversal. Nothing reaches the store until one of
/// [`vertices`](Self::vertices), [`edges`](Self::edges) or
/// [`count`](Self::count) consumes it.
///
/// Predicates name edge properties by their stored name and are combined
/// with AND.
#[derive(Debug, Clone)]
pub struct TraversalQuery {
    source: ElementId,
    direction: Direction,
    labels: BTreeSet<String>,
    predicates: Vec<Predicate>,
    limit: Option<usize>,
    vertex_types: BTreeSet<String>,
    edge_types: BTreeSet<String>,
}

impl TraversalQuery {
    pub fn new(source: ElementId) -> Self {
        Self {
            source,
            direction: Direction::default(),
            labels: BTreeSet::new(),
            predicates: Vec::new(),
            limit: None,
            vertex_types: BTreeSet::new(),
            edge_types: BTreeSet::new(),
        }
    }

    pub fn source(&self) -> ElementId {
        self.source
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Follow only the given labels. Repeated calls add to the set.
    pub fn labels(mut self, filters: &[EdgeFilter<'_>]) -> Result<Self> {
        self.labels.extend(resolve_labels(filters)?);
        Ok(self)
    }

    pub fn has(mut self, field: impl Into<String>, value: impl Into<Value>, comparator: Comparator) -> Self {
        self.predicates.push(Predicate::compare(field, value, comparator));
        self
    }

    /// Keep edges with `lower <= field < upper`. Bounds given in
    /// descending order are swapped.
    pub fn interval(mut self, field: impl Into<String>, a: impl Into<Value>, b: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::interval(field, a, b));
        self
    }

    /// Cap the number of matching edges. Applied after the type restrictions.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Keep only endpoint vertices of these types.
    pub fn vertex_types(mut self, types: &[&VertexType]) -> Self {
        self.vertex_types
            .extend(types.iter().map(|t| t.element_type().to_string()));
        self
    }

    /// Keep only edges of these registered types.
    pub fn edge_types(mut self, types: &[&EdgeType]) -> Self {
        self.edge_types
            .extend(types.iter().map(|t| t.label().to_string()));
        self
    }

    /// Labels the store should follow: the label filters narrowed by the
    /// edge type restriction. `None` when the two exclude each other.
    fn store_labels(&self) -> Option<BTreeSet<String>> {
        let labels = match (self.labels.is_empty(), self.edge_types.is_empty()) {
            (_, true) => self.labels.clone(),
            (true, false) => self.edge_types.clone(),
            (false, false) => self.labels.intersection(&self.edge_types).cloned().collect(),
        };
        if labels.is_empty() && !(self.labels.is_empty() && self.edge_types.is_empty()) {
            return None;
        }
        Some(labels)
    }

    /// The store request this query materializes into, or `None` when the
    /// restrictions cannot match any edge.
    ///
    /// The limit is only forwarded when every edge the store returns is
    /// kept: no vertex type restriction, and no BOTH traversal, which can
    /// report a self-loop twice.
    pub fn request(&self) -> Option<TraverseRequest> {
        let forward_limit = self.vertex_types.is_empty() && self.direction != Direction::Both;
        Some(TraverseRequest {
            source: self.source,
            direction: self.direction,
            labels: self.store_labels()?,
            predicates: self.predicates.clone(),
            limit: self.limit.filter(|_| forward_limit),
        })
    }

    async fn hits<S: GraphStore>(&self, session: &Session<S>) -> Result<Vec<TraversalHit>> {
        let Some(request) = self.request() else {
            tracing::debug!(source = %self.source, "Label and edge type restrictions exclude each other");
            return Ok(Vec::new());
        };
        let raw = session.store().traverse(&request).await?;
        let total = raw.len();

        let mut seen = HashSet::new();
        let mut hits: Vec<TraversalHit> = raw
            .into_iter()
            .filter(|hit| {
                self.vertex_types.is_empty() || self.vertex_types.contains(&hit.endpoint.element_type)
            })
            .filter(|hit| seen.insert(hit.edge.id))
            .collect();
        if let Some(limit) = self.limit {
            hits.truncate(limit);
        }

        tracing::debug!(
            source = %self.source,
            direction = ?self.direction,
            labels = ?request.labels,
            predicates = self.predicates.len(),
            returned = total,
            kept = hits.len(),
            "Traversed edges"
        );
        Ok(hits)
    }

    /// Matching edges, each at most once.
    pub async fn edges<S: GraphStore>(self, session: &Session<S>) -> Result<Vec<Edge>> {
        self.hits(session)
            .await?
            .iter()
            .map(|hit| session.decode_edge(&hit.edge))
            .collect()
    }

    /// Distinct vertices at the far end of matching edges, in first-seen
    /// order. Decoded from the traversal result without further reads.
    pub async fn vertices<S: GraphStore>(self, session: &Session<S>) -> Result<Vec<Vertex>> {
        let hits = self.hits(session).await?;
        let mut seen = HashSet::new();
        hits.iter()
            .filter(|hit| seen.insert(hit.endpoint.id))
            .map(|hit| session.decode_vertex(&hit.endpoint))
            .collect()
    }

    /// Number of distinct far-end vertices. Always equal to the length of
    /// [`vertices`](Self::vertices), and fails where it would.
    pub async fn count<S: GraphStore>(self, session: &Session<S>) -> Result<usize> {
        Ok(self.vertices(session).await?.len())
    }
}

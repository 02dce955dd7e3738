//! In-process graph store.
//!
//! Keeps elements in a map plus per-vertex adjacency lists of edge ids, so
//! traversals return edges in creation order. Used by the test suites and by
//! callers that want the mapping layer without a database.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use vertigo_core::{Direction, ElementId, ElementKind};

use crate::client::GraphError;
use crate::store::{ElementRecord, GraphStore, TraversalHit, TraverseRequest, WriteRequest};

#[derive(Default)]
struct MemoryGraph {
    elements: HashMap<ElementId, ElementRecord>,
    /// Vertex id → outgoing edge ids, in creation order.
    outgoing: HashMap<ElementId, Vec<ElementId>>,
    /// Vertex id → incoming edge ids, in creation order.
    incoming: HashMap<ElementId, Vec<ElementId>>,
    key_indexes: Vec<String>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryGraph {
    fn get(&self, kind: ElementKind, id: ElementId) -> Result<&ElementRecord, GraphError> {
        self.elements
            .get(&id)
            .filter(|record| record.kind == kind)
            .ok_or(GraphError::NotFound { kind, id })
    }

    fn unlink_edge(&mut self, edge_id: ElementId) {
        let Some(edge) = self.elements.remove(&edge_id) else {
            return;
        };
        if let Some(endpoints) = edge.endpoints {
            if let Some(edges) = self.outgoing.get_mut(&endpoints.out_v) {
                edges.retain(|id| *id != edge_id);
            }
            if let Some(edges) = self.incoming.get_mut(&endpoints.in_v) {
                edges.retain(|id| *id != edge_id);
            }
        }
    }
}

/// Thread-safe in-memory [`GraphStore`].
///
/// Clone is cheap (inner Arc); clones share the same graph.
#[derive(Clone, Default)]
pub struct MemoryStore {
    graph: Arc<RwLock<MemoryGraph>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write calls that reached the store, including rejected ones.
    pub fn write_count(&self) -> usize {
        self.graph.read().writes
    }

    /// Make every subsequent write and index creation fail until switched
    /// off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.graph.write().fail_writes = fail;
    }

    /// Physical field names passed to `create_key_index`, in call order.
    pub fn key_indexes(&self) -> Vec<String> {
        self.graph.read().key_indexes.clone()
    }

    /// Number of stored elements of a kind.
    pub fn count(&self, kind: ElementKind) -> usize {
        self.graph
            .read()
            .elements
            .values()
            .filter(|record| record.kind == kind)
            .count()
    }
}

impl GraphStore for MemoryStore {
    async fn write(&self, request: WriteRequest) -> Result<ElementId, GraphError> {
        let mut graph = self.graph.write();
        graph.writes += 1;

        if graph.fail_writes {
            return Err(GraphError::Backend {
                store: "memory".to_string(),
                source: anyhow::anyhow!("write rejected for {}", request.element_type),
            });
        }

        if let Some(id) = request.id {
            let kind = request.kind;
            let record = graph
                .elements
                .get_mut(&id)
                .filter(|record| record.kind == kind)
                .ok_or(GraphError::NotFound { kind, id })?;
            record.properties.extend(request.properties);
            return Ok(id);
        }

        let id = ElementId::new();
        let endpoints = match request.kind {
            ElementKind::Vertex => None,
            ElementKind::Edge => {
                let endpoints = request.endpoints.ok_or_else(|| {
                    GraphError::InvalidRequest(format!(
                        "edge {} created without endpoints",
                        request.element_type
                    ))
                })?;
                graph.get(ElementKind::Vertex, endpoints.out_v)?;
                graph.get(ElementKind::Vertex, endpoints.in_v)?;
                graph.outgoing.entry(endpoints.out_v).or_default().push(id);
                graph.incoming.entry(endpoints.in_v).or_default().push(id);
                Some(endpoints)
            }
        };

        graph.elements.insert(
            id,
            ElementRecord {
                id,
                kind: request.kind,
                element_type: request.element_type,
                properties: request.properties,
                endpoints,
            },
        );
        Ok(id)
    }

    async fn read(&self, kind: ElementKind, id: ElementId) -> Result<ElementRecord, GraphError> {
        self.graph.read().get(kind, id).cloned()
    }

    async fn delete(&self, kind: ElementKind, id: ElementId) -> Result<(), GraphError> {
        let mut graph = self.graph.write();
        graph.get(kind, id)?;

        match kind {
            ElementKind::Edge => graph.unlink_edge(id),
            ElementKind::Vertex => {
                let mut incident = graph.outgoing.remove(&id).unwrap_or_default();
                incident.extend(graph.incoming.remove(&id).unwrap_or_default());
                for edge_id in incident {
                    graph.unlink_edge(edge_id);
                }
                graph.elements.remove(&id);
            }
        }
        Ok(())
    }

    async fn traverse(&self, request: &TraverseRequest) -> Result<Vec<TraversalHit>, GraphError> {
        let graph = self.graph.read();
        graph.get(ElementKind::Vertex, request.source)?;

        let no_edges = Vec::new();
        let outgoing = graph.outgoing.get(&request.source).unwrap_or(&no_edges);
        let incoming = graph.incoming.get(&request.source).unwrap_or(&no_edges);

        let candidates: Vec<(ElementId, bool)> = match request.direction {
            Direction::Out => outgoing.iter().map(|id| (*id, true)).collect(),
            Direction::In => incoming.iter().map(|id| (*id, false)).collect(),
            Direction::Both => outgoing
                .iter()
                .map(|id| (*id, true))
                .chain(incoming.iter().map(|id| (*id, false)))
                .collect(),
        };

        let mut hits = Vec::new();
        for (edge_id, is_outgoing) in candidates {
            if request.limit.is_some_and(|limit| hits.len() >= limit) {
                break;
            }

            let edge = graph.get(ElementKind::Edge, edge_id)?;
            if !request.labels.is_empty() && !request.labels.contains(&edge.element_type) {
                continue;
            }
            if !request
                .predicates
                .iter()
                .all(|predicate| predicate.matches(&edge.properties))
            {
                continue;
            }

            let Some(endpoints) = edge.endpoints else {
                continue;
            };
            let endpoint_id = if is_outgoing {
                endpoints.in_v
            } else {
                endpoints.out_v
            };
            hits.push(TraversalHit {
                edge: edge.clone(),
                endpoint: graph.get(ElementKind::Vertex, endpoint_id)?.clone(),
            });
        }
        Ok(hits)
    }

    async fn create_key_index(&self, field: &str) -> Result<(), GraphError> {
        let mut graph = self.graph.write();
        if graph.fail_writes {
            return Err(GraphError::Backend {
                store: "memory".to_string(),
                source: anyhow::anyhow!("index creation rejected for {field}"),
            });
        }
        graph.key_indexes.push(field.to_string());
        Ok(())
    }
}

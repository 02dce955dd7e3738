//! Write operations for the Neo4j store.
//!
//! Properties are shipped as one JSON payload and merged with
//! `apoc.convert.fromJsonMap`, so a write touches only the fields it names.
//! Null values remove the property.

use neo4rs::query;
use vertigo_core::{ElementId, ElementKind, Endpoints, Properties, Value};

use crate::client::{GraphClient, GraphError};
use crate::store::WriteRequest;

impl GraphClient {
    /// Create or update a vertex or edge.
    pub async fn write_element(&self, request: WriteRequest) -> Result<ElementId, GraphError> {
        let props = encode_properties(&request.properties)?;

        match (request.kind, request.id) {
            (ElementKind::Vertex, None) => self.create_vertex(&request.element_type, props).await,
            (ElementKind::Vertex, Some(id)) => self.update_vertex(id, props).await,
            (ElementKind::Edge, None) => {
                let endpoints = request.endpoints.ok_or_else(|| {
                    GraphError::InvalidRequest(format!(
                        "edge {} created without endpoints",
                        request.element_type
                    ))
                })?;
                self.create_edge(&request.element_type, endpoints, props)
                    .await
            }
            (ElementKind::Edge, Some(id)) => self.update_edge(id, props).await,
        }
    }

    // ── Vertices ─────────────────────────────────────────────────

    async fn create_vertex(&self, element_type: &str, props: String) -> Result<ElementId, GraphError> {
        let id = ElementId::new();
        let q = query(
            "CREATE (n:Vertex {vid: $id, element_type: $element_type})
             SET n += apoc.convert.fromJsonMap($props)",
        )
        .param("id", id.to_string())
        .param("element_type", element_type.to_string())
        .param("props", props);

        self.run(q).await?;
        tracing::debug!(%id, element_type, "Vertex created");
        Ok(id)
    }

    async fn update_vertex(&self, id: ElementId, props: String) -> Result<ElementId, GraphError> {
        let q = query(
            "MATCH (n:Vertex {vid: $id})
             SET n += apoc.convert.fromJsonMap($props)
             RETURN n.vid AS vid",
        )
        .param("id", id.to_string())
        .param("props", props);

        match self.query_one(q).await? {
            Some(_) => Ok(id),
            None => Err(GraphError::NotFound {
                kind: ElementKind::Vertex,
                id,
            }),
        }
    }

    // ── Edges ────────────────────────────────────────────────────

    async fn create_edge(
        &self,
        label: &str,
        endpoints: Endpoints,
        props: String,
    ) -> Result<ElementId, GraphError> {
        let id = ElementId::new();
        let cypher = format!(
            "MATCH (a:Vertex {{vid: $out_v}})
             MATCH (b:Vertex {{vid: $in_v}})
             CREATE (a)-[r:{label} {{eid: $id}}]->(b)
             SET r += apoc.convert.fromJsonMap($props)
             RETURN r.eid AS eid",
            label = quote_ident(label)
        );

        let q = query(&cypher)
            .param("out_v", endpoints.out_v.to_string())
            .param("in_v", endpoints.in_v.to_string())
            .param("id", id.to_string())
            .param("props", props);

        match self.query_one(q).await? {
            Some(_) => {
                tracing::debug!(%id, label, "Edge created");
                Ok(id)
            }
            // One of the MATCH clauses came back empty.
            None => Err(GraphError::NotFound {
                kind: ElementKind::Vertex,
                id: endpoints.out_v,
            }),
        }
    }

    async fn update_edge(&self, id: ElementId, props: String) -> Result<ElementId, GraphError> {
        let q = query(
            "MATCH ()-[r {eid: $id}]->()
             SET r += apoc.convert.fromJsonMap($props)
             RETURN r.eid AS eid",
        )
        .param("id", id.to_string())
        .param("props", props);

        match self.query_one(q).await? {
            Some(_) => Ok(id),
            None => Err(GraphError::NotFound {
                kind: ElementKind::Edge,
                id,
            }),
        }
    }

    // ── Deletion ─────────────────────────────────────────────────

    /// Delete an element; vertices are detached from their edges first.
    pub async fn delete_element(&self, kind: ElementKind, id: ElementId) -> Result<(), GraphError> {
        let cypher = match kind {
            ElementKind::Vertex => {
                "MATCH (n:Vertex {vid: $id})
                 DETACH DELETE n
                 RETURN count(n) AS cnt"
            }
            ElementKind::Edge => {
                "MATCH ()-[r {eid: $id}]->()
                 DELETE r
                 RETURN count(r) AS cnt"
            }
        };

        let q = query(cypher).param("id", id.to_string());
        let deleted = match self.query_one(q).await? {
            Some(row) => row.get::<i64>("cnt").unwrap_or(0),
            None => 0,
        };

        if deleted == 0 {
            return Err(GraphError::NotFound { kind, id });
        }
        tracing::debug!(%id, %kind, "Element deleted");
        Ok(())
    }

    // ── Indexes ──────────────────────────────────────────────────

    /// Create a range index over a vertex property, if not already present.
    pub async fn create_vertex_index(&self, field: &str) -> Result<(), GraphError> {
        let cypher = format!(
            "CREATE INDEX {name} IF NOT EXISTS FOR (n:Vertex) ON (n.{field})",
            name = index_name(field),
            field = quote_ident(field)
        );

        self.run(query(&cypher)).await?;
        tracing::info!(field, "Key index ensured");
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Backtick-quote a label or property name for interpolation into Cypher.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn index_name(field: &str) -> String {
    let sanitized: String = field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("vertex_{sanitized}")
}

/// Serialize store-form properties for `apoc.convert.fromJsonMap`.
///
/// Neo4j properties cannot hold maps, so map values travel as JSON text.
fn encode_properties(props: &Properties) -> Result<String, GraphError> {
    let map: serde_json::Map<String, serde_json::Value> = props
        .iter()
        .map(|(name, value)| {
            let encoded = match value {
                Value::Map(_) => serde_json::Value::String(value.to_json().to_string()),
                other => other.to_json(),
            };
            (name.clone(), encoded)
        })
        .collect();

    serde_json::to_string(&map).map_err(|e| GraphError::Serialization(e.to_string()))
}

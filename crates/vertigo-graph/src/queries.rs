//! Read operations and the Cypher traversal builder for the Neo4j store.

use neo4rs::{query, Query};
use vertigo_core::{
    Comparator, Direction, ElementId, ElementKind, Endpoints, PredicateOp, Properties, Value,
};

use crate::client::{GraphClient, GraphError};
use crate::mutations::quote_ident;
use crate::store::{ElementRecord, TraversalHit, TraverseRequest};

impl GraphClient {
    // ── Single Element Lookups ───────────────────────────────────

    /// Get a vertex or edge by id.
    pub async fn read_element(
        &self,
        kind: ElementKind,
        id: ElementId,
    ) -> Result<ElementRecord, GraphError> {
        let cypher = match kind {
            ElementKind::Vertex => {
                "MATCH (n:Vertex {vid: $id})
                 RETURN n.element_type AS element_type,
                        apoc.convert.toJson(properties(n)) AS props"
            }
            ElementKind::Edge => {
                "MATCH (a)-[r {eid: $id}]->(b)
                 RETURN type(r) AS element_type,
                        apoc.convert.toJson(properties(r)) AS props,
                        a.vid AS out_v, b.vid AS in_v"
            }
        };

        let q = query(cypher).param("id", id.to_string());
        let Some(row) = self.query_one(q).await? else {
            return Err(GraphError::NotFound { kind, id });
        };

        let element_type: String = get_column(&row, "element_type")?;
        let props: String = get_column(&row, "props")?;
        let endpoints = match kind {
            ElementKind::Vertex => None,
            ElementKind::Edge => Some(Endpoints {
                out_v: parse_id(&get_column::<String>(&row, "out_v")?)?,
                in_v: parse_id(&get_column::<String>(&row, "in_v")?)?,
            }),
        };

        Ok(ElementRecord {
            id,
            kind,
            element_type,
            properties: decode_properties(&props, kind)?,
            endpoints,
        })
    }

    // ── Traversals ───────────────────────────────────────────────

    /// Follow the edges of a vertex matching labels and predicates.
    pub async fn traverse_edges(
        &self,
        request: &TraverseRequest,
    ) -> Result<Vec<TraversalHit>, GraphError> {
        let cypher = TraversalCypher::build(request);
        tracing::debug!(source = %request.source, cypher = %cypher.text, "Traversing");

        let rows = self.query_rows(cypher.into_query(request.source)).await?;
        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            let out_v = parse_id(&get_column::<String>(&row, "out_v")?)?;
            let in_v = parse_id(&get_column::<String>(&row, "in_v")?)?;
            let props: String = get_column(&row, "props")?;
            let endpoint_props: String = get_column(&row, "endpoint_props")?;

            hits.push(TraversalHit {
                edge: ElementRecord {
                    id: parse_id(&get_column::<String>(&row, "eid")?)?,
                    kind: ElementKind::Edge,
                    element_type: get_column(&row, "element_type")?,
                    properties: decode_properties(&props, ElementKind::Edge)?,
                    endpoints: Some(Endpoints { out_v, in_v }),
                },
                endpoint: ElementRecord {
                    id: parse_id(&get_column::<String>(&row, "endpoint")?)?,
                    kind: ElementKind::Vertex,
                    element_type: get_column(&row, "endpoint_type")?,
                    properties: decode_properties(&endpoint_props, ElementKind::Vertex)?,
                    endpoints: None,
                },
            });
        }
        Ok(hits)
    }
}

/// A traversal request rendered as Cypher text plus its parameters.
#[derive(Debug)]
pub(crate) struct TraversalCypher {
    pub text: String,
    pub labels: Vec<String>,
    pub params: Vec<(String, Value)>,
}

impl TraversalCypher {
    pub fn build(request: &TraverseRequest) -> Self {
        let pattern = match request.direction {
            Direction::Out => "(s:Vertex {vid: $source})-[r]->(o:Vertex)",
            Direction::In => "(s:Vertex {vid: $source})<-[r]-(o:Vertex)",
            Direction::Both => "(s:Vertex {vid: $source})-[r]-(o:Vertex)",
        };

        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if !request.labels.is_empty() {
            clauses.push("type(r) IN $labels".to_string());
        }

        for (i, predicate) in request.predicates.iter().enumerate() {
            let field = format!("r.{}", quote_ident(&predicate.field));
            match &predicate.op {
                PredicateOp::Compare { comparator, value } => {
                    let key = format!("p{i}");
                    clauses.push(format!("{field} {} ${key}", cypher_operator(*comparator)));
                    params.push((key, value.clone()));
                }
                PredicateOp::Interval { lower, upper } => {
                    let (lo, hi) = (format!("p{i}_lo"), format!("p{i}_hi"));
                    clauses.push(format!("{field} >= ${lo} AND {field} < ${hi}"));
                    params.push((lo, lower.clone()));
                    params.push((hi, upper.clone()));
                }
            }
        }

        let mut text = format!("MATCH {pattern}");
        if !clauses.is_empty() {
            text.push_str("\nWHERE ");
            text.push_str(&clauses.join("\n  AND "));
        }
        text.push_str(
            "\nRETURN r.eid AS eid, type(r) AS element_type,\
             \n       apoc.convert.toJson(properties(r)) AS props,\
             \n       startNode(r).vid AS out_v, endNode(r).vid AS in_v,\
             \n       o.vid AS endpoint, o.element_type AS endpoint_type,\
             \n       apoc.convert.toJson(properties(o)) AS endpoint_props",
        );
        if let Some(limit) = request.limit {
            text.push_str(&format!("\nLIMIT {limit}"));
        }

        Self {
            text,
            labels: request.labels.iter().cloned().collect(),
            params,
        }
    }

    fn into_query(self, source: ElementId) -> Query {
        let mut q = query(&self.text).param("source", source.to_string());
        if !self.labels.is_empty() {
            q = q.param("labels", self.labels);
        }
        for (key, value) in &self.params {
            q = bind(q, key, value);
        }
        q
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn cypher_operator(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Equal => "=",
        Comparator::NotEqual => "<>",
        Comparator::GreaterThan => ">",
        Comparator::GreaterThanEqual => ">=",
        Comparator::LessThan => "<",
        Comparator::LessThanEqual => "<=",
    }
}

fn bind(q: Query, key: &str, value: &Value) -> Query {
    match value {
        Value::Bool(b) => q.param(key, *b),
        Value::Integer(i) => q.param(key, *i),
        Value::Float(f) => q.param(key, *f),
        Value::String(s) => q.param(key, s.clone()),
        other => q.param(key, other.to_json().to_string()),
    }
}

fn get_column<T>(row: &neo4rs::Row, column: &str) -> Result<T, GraphError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    row.get::<T>(column)
        .map_err(|e| GraphError::Serialization(format!("Failed to read column {column}: {e}")))
}

fn parse_id(raw: &str) -> Result<ElementId, GraphError> {
    ElementId::parse(raw).map_err(|e| GraphError::Serialization(e.to_string()))
}

/// Decode a `properties()` JSON payload, dropping the bookkeeping keys.
fn decode_properties(json: &str, kind: ElementKind) -> Result<Properties, GraphError> {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| GraphError::Serialization(format!("Failed to decode properties: {e}")))?;

    let Value::Map(mut properties) = Value::from(parsed) else {
        return Err(GraphError::Serialization(
            "properties payload is not an object".to_string(),
        ));
    };

    properties.remove(kind.id_field());
    if kind == ElementKind::Vertex {
        properties.remove("element_type");
    }
    Ok(properties)
}

//! Integration tests for the Neo4j store against a live instance.
//!
//! These tests require a Neo4j server with APOC at `bolt://localhost:7687`.
//! Run with: cargo test --package vertigo-graph --test integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available.

use std::collections::BTreeSet;

use vertigo_core::{
    Comparator, Direction, ElementId, ElementKind, Endpoints, Predicate, Properties, Value,
};
use vertigo_graph::{GraphClient, GraphConfig, GraphError, GraphStore, TraverseRequest, WriteRequest};

async fn connect_or_skip() -> Option<GraphClient> {
    let config = GraphConfig::default();
    match GraphClient::connect(&config).await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            None
        }
    }
}

async fn cleanup(client: &GraphClient, ids: &[ElementId]) {
    for id in ids {
        let _ = client.delete(ElementKind::Vertex, *id).await;
    }
}

fn person(name: &str, age: i64) -> WriteRequest {
    let mut properties = Properties::new();
    properties.insert("name".to_string(), Value::from(name));
    properties.insert("age".to_string(), Value::Integer(age));
    WriteRequest {
        kind: ElementKind::Vertex,
        element_type: "person".to_string(),
        id: None,
        properties,
        endpoints: None,
    }
}

fn enrolled_in(out_v: ElementId, in_v: ElementId, enthusiasm: i64) -> WriteRequest {
    let mut properties = Properties::new();
    properties.insert("enthusiasm".to_string(), Value::Integer(enthusiasm));
    WriteRequest {
        kind: ElementKind::Edge,
        element_type: "enrolled_in".to_string(),
        id: None,
        properties,
        endpoints: Some(Endpoints { out_v, in_v }),
    }
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_write_and_read_vertex() {
    let Some(client) = connect_or_skip().await else {
        return;
    };

    let id = client.write(person("Jon", 143)).await.unwrap();
    let record = client.read(ElementKind::Vertex, id).await.unwrap();
    assert_eq!(record.element_type, "person");
    assert_eq!(record.properties["name"], Value::from("Jon"));
    assert_eq!(record.properties["age"], Value::Integer(143));
    assert!(!record.properties.contains_key("vid"));

    cleanup(&client, &[id]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_update_merges_properties() {
    let Some(client) = connect_or_skip().await else {
        return;
    };

    let id = client.write(person("Eric", 25)).await.unwrap();
    let mut update = person("Eric", 26);
    update.id = Some(id);
    update.properties.remove("name");
    client.write(update).await.unwrap();

    let record = client.read(ElementKind::Vertex, id).await.unwrap();
    assert_eq!(record.properties["name"], Value::from("Eric"));
    assert_eq!(record.properties["age"], Value::Integer(26));

    cleanup(&client, &[id]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_traverse_with_predicates() {
    let Some(client) = connect_or_skip().await else {
        return;
    };

    let blake = client.write(person("Blake", 14)).await.unwrap();
    let course = client.write(person("Theoretics", 0)).await.unwrap();
    client.write(enrolled_in(blake, course, 8)).await.unwrap();

    let mut request = TraverseRequest {
        source: blake,
        direction: Direction::Out,
        labels: BTreeSet::from(["enrolled_in".to_string()]),
        predicates: vec![Predicate::interval("enthusiasm", 9, 2)],
        limit: None,
    };
    let hits = client.traverse(&request).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].endpoint.id, course);
    assert_eq!(hits[0].endpoint.properties["name"], Value::from("Theoretics"));

    request.predicates = vec![Predicate::compare("enthusiasm", 8, Comparator::GreaterThan)];
    assert!(client.traverse(&request).await.unwrap().is_empty());

    cleanup(&client, &[blake, course]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_delete_vertex() {
    let Some(client) = connect_or_skip().await else {
        return;
    };

    let id = client.write(person("Temp", 1)).await.unwrap();
    client.delete(ElementKind::Vertex, id).await.unwrap();

    let err = client.read(ElementKind::Vertex, id).await.unwrap_err();
    assert!(matches!(err, GraphError::NotFound { .. }));
}

//! Save, reload, update and delete against the in-memory store.

mod common;

use vertigo_core::config::MappingConfig;
use vertigo_core::{ElementId, ElementKind, Properties, Value};
use vertigo_graph::{GraphStore, MemoryStore, WriteRequest};
use vertigo_model::{Edge, Element, Field, ModelError, SchemaRegistry, Session, Vertex};

use common::{course, enroll, person};

async fn counter_session() -> (Session<MemoryStore>, vertigo_model::VertexType) {
    let store = MemoryStore::new();
    let mut registry = SchemaRegistry::default();
    let counter = registry
        .register_vertex(
            "counter",
            [
                Field::text("label"),
                Field::integer("count").db_field("____count"),
                Field::dictionary("meta"),
            ],
            &store,
        )
        .await
        .unwrap();
    (Session::new(store, registry), counter)
}

#[tokio::test]
async fn test_save_update_reload() {
    let (session, counter) = counter_session().await;

    let mut vertex = Vertex::new(&counter);
    vertex.set("label", "hits").unwrap();
    vertex.set("count", 8).unwrap();
    vertex.save(&session).await.unwrap();
    let id = vertex.id().expect("id assigned on save");

    vertex.set("count", 100).unwrap();
    assert_eq!(vertex.changed_fields(), vec!["count"]);
    vertex.save(&session).await.unwrap();
    assert!(!vertex.is_changed());

    vertex.reload(&session).await.unwrap();
    assert_eq!(vertex.get("count"), Some(&Value::Integer(100)));
    assert_eq!(vertex.id(), Some(id));

    let loaded = Vertex::load(&session, &counter, id).await.unwrap();
    assert_eq!(loaded.get("count"), Some(&Value::Integer(100)));
    assert_eq!(loaded.get("label"), Some(&Value::from("hits")));
}

#[tokio::test]
async fn test_second_save_writes_changed_fields_only() {
    let (session, counter) = counter_session().await;
    let mut vertex = Vertex::create(
        &session,
        &counter,
        [("label", Value::from("a")), ("count", Value::Integer(1))],
    )
    .await
    .unwrap();
    let id = vertex.id().unwrap();

    // Change the stored label behind the entity's back.
    let mut properties = Properties::new();
    properties.insert("label".to_string(), Value::from("external"));
    session
        .store()
        .write(WriteRequest {
            kind: ElementKind::Vertex,
            element_type: "counter".to_string(),
            id: Some(id),
            properties,
            endpoints: None,
        })
        .await
        .unwrap();

    vertex.set("count", 2).unwrap();
    vertex.save(&session).await.unwrap();

    let record = session.store().read(ElementKind::Vertex, id).await.unwrap();
    assert_eq!(record.properties["label"], Value::from("external"));
    assert_eq!(record.properties["____count"], Value::Integer(2));
    assert!(!record.properties.contains_key("count"));
}

#[tokio::test]
async fn test_unchanged_save_makes_no_store_call() {
    let (session, counter) = counter_session().await;
    let mut vertex = Vertex::create(&session, &counter, [("count", Value::Integer(1))])
        .await
        .unwrap();
    let writes = session.store().write_count();

    vertex.save(&session).await.unwrap();
    vertex.set("count", 1).unwrap();
    vertex.save(&session).await.unwrap();
    assert_eq!(session.store().write_count(), writes);
}

#[tokio::test]
async fn test_first_save_writes_defaults() {
    let (session, counter) = counter_session().await;
    let mut vertex = Vertex::new(&counter);
    assert!(!vertex.is_changed());

    vertex.save(&session).await.unwrap();
    assert_eq!(session.store().write_count(), 1);

    let record = session
        .store()
        .read(ElementKind::Vertex, vertex.id().unwrap())
        .await
        .unwrap();
    assert_eq!(record.properties.len(), 3);
    assert_eq!(record.properties["____count"], Value::Null);
}

#[tokio::test]
async fn test_failed_write_keeps_changes_pending() {
    let (session, counter) = counter_session().await;

    session.store().set_fail_writes(true);
    let mut fresh = Vertex::new(&counter);
    fresh.set("count", 3).unwrap();
    let err = fresh.save(&session).await.unwrap_err();
    assert!(matches!(err, ModelError::Store(_)));
    assert!(!err.is_usage());
    assert_eq!(fresh.id(), None);
    session.store().set_fail_writes(false);

    let mut vertex = Vertex::create(&session, &counter, [("count", Value::Integer(1))])
        .await
        .unwrap();
    vertex.set("count", 2).unwrap();

    session.store().set_fail_writes(true);
    assert!(vertex.save(&session).await.is_err());
    assert_eq!(vertex.changed_fields(), vec!["count"]);

    session.store().set_fail_writes(false);
    vertex.save(&session).await.unwrap();
    assert!(!vertex.is_changed());
}

#[tokio::test]
async fn test_update_is_atomic() {
    let (session, counter) = counter_session().await;
    let mut vertex = Vertex::create(&session, &counter, [("count", Value::Integer(1))])
        .await
        .unwrap();
    let writes = session.store().write_count();

    let err = vertex
        .update(
            &session,
            [("count", Value::Integer(5)), ("nope", Value::Integer(1))],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::UnknownField { ref field, .. } if field == "nope"));
    assert_eq!(vertex.get("count"), Some(&Value::Integer(1)));
    assert!(!vertex.is_changed());

    let err = vertex
        .update(
            &session,
            [("label", Value::from("ok")), ("count", Value::from("many"))],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation { ref field, .. } if field == "count"));
    assert_eq!(vertex.get("label"), Some(&Value::Null));
    assert_eq!(session.store().write_count(), writes);

    vertex
        .update(&session, [("count", Value::Integer(5))])
        .await
        .unwrap();
    let loaded = Vertex::load(&session, &counter, vertex.id().unwrap())
        .await
        .unwrap();
    assert_eq!(loaded.get("count"), Some(&Value::Integer(5)));
}

#[tokio::test]
async fn test_set_rejects_unknown_and_mistyped_fields() {
    let (_session, counter) = counter_session().await;
    let mut vertex = Vertex::new(&counter);

    let err = vertex.set("missing", 1).unwrap_err();
    assert!(matches!(err, ModelError::UnknownField { .. }));
    let err = vertex.set("count", true).unwrap_err();
    assert!(matches!(err, ModelError::Validation { .. }));
    assert!(err.is_usage());
    assert!(!vertex.is_changed());
}

#[tokio::test]
async fn test_in_place_container_mutation_is_saved() {
    let (session, counter) = counter_session().await;
    let mut vertex = Vertex::create(
        &session,
        &counter,
        [("meta", Value::Map(Default::default()))],
    )
    .await
    .unwrap();

    vertex
        .get_mut("meta")
        .and_then(Value::as_map_mut)
        .unwrap()
        .insert("source".to_string(), Value::from("sensor"));
    assert_eq!(vertex.changed_fields(), vec!["meta"]);

    vertex.save(&session).await.unwrap();
    let loaded = Vertex::load(&session, &counter, vertex.id().unwrap())
        .await
        .unwrap();
    let meta = loaded.get("meta").cloned().unwrap();
    let mut expected = Properties::new();
    expected.insert("source".to_string(), Value::from("sensor"));
    assert_eq!(meta, Value::Map(expected));
}

#[tokio::test]
async fn test_reload_discards_local_changes() {
    let (session, counter) = counter_session().await;
    let mut vertex = Vertex::create(&session, &counter, [("count", Value::Integer(4))])
        .await
        .unwrap();
    vertex.set("count", 40).unwrap();

    vertex.reload(&session).await.unwrap();
    assert_eq!(vertex.get("count"), Some(&Value::Integer(4)));
    assert!(!vertex.is_changed());
}

#[tokio::test]
async fn test_unsaved_reload_and_delete_are_rejected() {
    let (session, counter) = counter_session().await;
    let mut vertex = Vertex::new(&counter);
    assert!(matches!(
        vertex.reload(&session).await,
        Err(ModelError::Unsaved { .. })
    ));
    assert!(matches!(
        vertex.delete(&session).await,
        Err(ModelError::Unsaved { .. })
    ));
}

#[tokio::test]
async fn test_deleted_vertex_is_unusable() {
    let (session, types) = common::session(MappingConfig::default()).await;
    let mut jon = person(&session, &types, "Jon", 143).await;
    let physics = course(&session, &types, "Physics").await;
    enroll(&session, &types, &jon, &physics, 10).await;

    jon.delete(&session).await.unwrap();
    assert!(jon.is_deleted());
    assert_eq!(session.store().count(ElementKind::Edge), 0);

    jon.set("age", 144).unwrap();
    assert!(matches!(jon.save(&session).await, Err(ModelError::Deleted { .. })));
    assert!(matches!(jon.reload(&session).await, Err(ModelError::Deleted { .. })));
    assert!(matches!(jon.delete(&session).await, Err(ModelError::Deleted { .. })));
    assert!(matches!(jon.query(), Err(ModelError::Deleted { .. })));
    assert!(matches!(
        Edge::new(&types.enrolled_in, &jon, &physics),
        Err(ModelError::Deleted { .. })
    ));
}

#[tokio::test]
async fn test_load_checks_type_and_existence() {
    let (session, types) = common::session(MappingConfig::default()).await;
    let jon = person(&session, &types, "Jon", 143).await;
    let id = jon.id().unwrap();

    let err = Vertex::load(&session, &types.course, id).await.unwrap_err();
    assert!(matches!(err, ModelError::NotFound { kind: ElementKind::Vertex, .. }));

    let err = Edge::load(&session, &types.enrolled_in, id).await.unwrap_err();
    assert!(matches!(err, ModelError::NotFound { kind: ElementKind::Edge, .. }));

    let err = Vertex::load(&session, &types.person, ElementId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::NotFound { .. }));
    assert!(!err.is_usage());
}

#[tokio::test]
async fn test_load_all_preserves_order() {
    let (session, types) = common::session(MappingConfig::default()).await;
    let jon = person(&session, &types, "Jon", 143).await;
    let eric = person(&session, &types, "Eric", 25).await;

    let ids = [eric.id().unwrap(), jon.id().unwrap()];
    let people = Vertex::load_all(&session, &types.person, &ids).await.unwrap();
    assert_eq!(people, vec![eric, jon]);
}

#[tokio::test]
async fn test_unregistered_stored_type() {
    let (session, _types) = common::session(MappingConfig::default()).await;
    let id = session
        .store()
        .write(WriteRequest {
            kind: ElementKind::Vertex,
            element_type: "ghost".to_string(),
            id: None,
            properties: Properties::new(),
            endpoints: None,
        })
        .await
        .unwrap();

    let err = session.load_vertex(id).await.unwrap_err();
    assert!(matches!(err, ModelError::UnknownType { ref type_name, .. } if type_name == "ghost"));
}

#[tokio::test]
async fn test_required_field_blocks_save() {
    let (session, types) = common::session(MappingConfig::default()).await;
    let mut nameless = Vertex::new(&types.person);
    nameless.set("age", 3).unwrap();

    let err = nameless.save(&session).await.unwrap_err();
    assert!(matches!(err, ModelError::Required { ref field, .. } if field == "name"));
    assert_eq!(session.store().count(ElementKind::Vertex), 0);
}

#[tokio::test]
async fn test_defaults_and_datetime_storage() {
    let (session, types) = common::session(MappingConfig::default()).await;
    let jon = person(&session, &types, "Jon", 143).await;
    let physics = course(&session, &types, "Physics").await;
    let edge = enroll(&session, &types, &jon, &physics, 10).await;

    assert_eq!(jon.get("nicknames"), Some(&Value::List(Vec::new())));
    assert!(matches!(edge.get("date_enrolled"), Some(Value::DateTime(_))));

    let record = session
        .store()
        .read(ElementKind::Edge, edge.id().unwrap())
        .await
        .unwrap();
    assert!(matches!(record.properties["date_enrolled"], Value::Integer(_)));

    let loaded = Edge::load(&session, &types.enrolled_in, edge.id().unwrap())
        .await
        .unwrap();
    let millis = |value: Option<&Value>| match value {
        Some(Value::DateTime(dt)) => dt.timestamp_millis(),
        other => panic!("expected a datetime, got {other:?}"),
    };
    assert_eq!(
        millis(loaded.get("date_enrolled")),
        millis(edge.get("date_enrolled"))
    );
}

#[tokio::test]
async fn test_edge_save_and_update() {
    let (session, types) = common::session(MappingConfig::default()).await;
    let jon = person(&session, &types, "Jon", 143).await;
    let physics = course(&session, &types, "Physics").await;

    let unsaved = Vertex::new(&types.course);
    assert!(matches!(
        Edge::new(&types.enrolled_in, &jon, &unsaved),
        Err(ModelError::Unsaved { .. })
    ));

    let mut edge = enroll(&session, &types, &jon, &physics, 10).await;
    edge.update(&session, [("enthusiasm", Value::Integer(11))])
        .await
        .unwrap();

    let loaded = session.load_edge(edge.id().unwrap()).await.unwrap();
    assert_eq!(loaded.get("enthusiasm"), Some(&Value::Integer(11)));
    assert_eq!(loaded.out_id(), jon.id().unwrap());
    assert_eq!(loaded.in_id(), physics.id().unwrap());

    edge.delete(&session).await.unwrap();
    assert_eq!(session.store().count(ElementKind::Edge), 0);
    assert_eq!(session.store().count(ElementKind::Vertex), 2);
}

#[tokio::test]
async fn test_entity_equality() {
    let (session, types) = common::session(MappingConfig::default()).await;

    let mut a = Vertex::new(&types.person);
    let mut b = Vertex::new(&types.person);
    a.set("name", "Jon").unwrap();
    b.set("name", "Jon").unwrap();
    assert_eq!(a, b);

    a.save(&session).await.unwrap();
    assert_ne!(a, b);

    let loaded = Vertex::load(&session, &types.person, a.id().unwrap())
        .await
        .unwrap();
    a.set("name", "Jonathan").unwrap();
    assert_eq!(a, loaded);
}

//! Shared fixture: students enrolled in courses taught by professors.

#![allow(dead_code)]

use chrono::Utc;
use vertigo_core::config::MappingConfig;
use vertigo_core::Value;
use vertigo_graph::MemoryStore;
use vertigo_model::{Edge, EdgeType, Field, SchemaRegistry, Session, Vertex, VertexType};

pub struct Types {
    pub person: VertexType,
    pub course: VertexType,
    pub enrolled_in: EdgeType,
    pub taught_by: EdgeType,
}

pub async fn session(config: MappingConfig) -> (Session<MemoryStore>, Types) {
    let store = MemoryStore::new();
    let mut registry = SchemaRegistry::new(&config);

    let person = registry
        .register_vertex(
            "person",
            [
                Field::text("name").required(),
                Field::integer("age"),
                Field::list("nicknames").with_default(Vec::<Value>::new()),
            ],
            &store,
        )
        .await
        .unwrap();
    let course = registry
        .register_vertex(
            "course",
            [Field::text("name").indexed(), Field::integer("credits")],
            &store,
        )
        .await
        .unwrap();
    let enrolled_in = registry
        .register_edge(
            "enrolled_in",
            [
                Field::integer("enthusiasm"),
                Field::datetime("date_enrolled").with_default_fn(|| Value::DateTime(Utc::now())),
            ],
        )
        .unwrap();
    let taught_by = registry
        .register_edge("taught_by", [Field::text("overall_mood")])
        .unwrap();

    (
        Session::new(store, registry),
        Types {
            person,
            course,
            enrolled_in,
            taught_by,
        },
    )
}

pub async fn person(session: &Session<MemoryStore>, types: &Types, name: &str, age: i64) -> Vertex {
    Vertex::create(
        session,
        &types.person,
        [("name", Value::from(name)), ("age", Value::Integer(age))],
    )
    .await
    .unwrap()
}

pub async fn course(session: &Session<MemoryStore>, types: &Types, name: &str) -> Vertex {
    Vertex::create(session, &types.course, [("name", Value::from(name))])
        .await
        .unwrap()
}

pub async fn enroll(
    session: &Session<MemoryStore>,
    types: &Types,
    student: &Vertex,
    course: &Vertex,
    enthusiasm: i64,
) -> Edge {
    Edge::create(
        session,
        &types.enrolled_in,
        student,
        course,
        [("enthusiasm", Value::Integer(enthusiasm))],
    )
    .await
    .unwrap()
}

pub async fn teach(
    session: &Session<MemoryStore>,
    types: &Types,
    course: &Vertex,
    professor: &Vertex,
    mood: &str,
) -> Edge {
    Edge::create(
        session,
        &types.taught_by,
        course,
        professor,
        [("overall_mood", Value::from(mood))],
    )
    .await
    .unwrap()
}

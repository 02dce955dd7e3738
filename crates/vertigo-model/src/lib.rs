//! vertigo-model: typed vertices and edges over a graph store.
//!
//! Entities track every declared field with a [`ValueManager`], so a save
//! writes only what changed since the last commit. Navigation goes through
//! [`TraversalQuery`], which accumulates direction, edge labels and edge
//! predicates and hands one request to the store when materialized.
//!
//! ```no_run
//! # use vertigo_core::config::MappingConfig;
//! # use vertigo_core::{Comparator, Value};
//! # use vertigo_graph::MemoryStore;
//! # use vertigo_model::{Edge, Field, SchemaRegistry, Session, Vertex};
//! # async fn demo() -> vertigo_model::Result<()> {
//! let store = MemoryStore::new();
//! let mut registry = SchemaRegistry::new(&MappingConfig::default());
//! let person = registry
//!     .register_vertex("person", [Field::text("name"), Field::integer("age")], &store)
//!     .await?;
//! let knows = registry.register_edge("knows", [Field::integer("since")])?;
//! let session = Session::new(store, registry);
//!
//! let jon = Vertex::create(&session, &person, [("name", Value::from("Jon"))]).await?;
//! let eric = Vertex::create(&session, &person, [("name", Value::from("Eric"))]).await?;
//! Edge::create(&session, &knows, &jon, &eric, [("since", Value::from(2012))]).await?;
//!
//! let friends = jon
//!     .query()?
//!     .labels(&[(&knows).into()])?
//!     .has("since", 2000, Comparator::GreaterThan)
//!     .vertices(&session)
//!     .await?;
//! assert_eq!(friends, vec![eric]);
//! # Ok(())
//! # }
//! ```

pub mod edge;
pub mod element;
pub mod error;
pub mod filter;
pub mod index;
pub mod manager;
pub mod query;
pub mod schema;
pub mod session;
pub mod vertex;

pub use edge::Edge;
pub use element::{Element, ElementState};
pub use error::{ModelError, Result};
pub use filter::{resolve_labels, EdgeFilter};
pub use index::IndexRegistrar;
pub use manager::ValueManager;
pub use query::TraversalQuery;
pub use schema::{DefaultValue, EdgeType, Field, SchemaRegistry, TypeSchema, VertexType};
pub use session::Session;
pub use vertex::Vertex;

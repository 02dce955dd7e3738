//! vertigo-core: Shared types, configuration, and error handling for Vertigo.
//!
//! This crate provides the foundational types used by the store and model crates:
//! - Element identifiers and kinds (vertex / edge)
//! - The dynamic field [`Value`] and its store form
//! - Field type descriptors ([`FieldKind`]) and their coercion rules
//! - Traversal direction, comparators, and edge predicates
//! - Configuration loading

pub mod config;
pub mod error;
pub mod predicate;
pub mod types;
pub mod value;

pub use error::CoreError;
pub use predicate::{Comparator, Direction, Predicate, PredicateOp};
pub use types::{ElementId, ElementKind, Endpoints, FieldKind, Properties};
pub use value::Value;

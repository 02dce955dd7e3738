//! Error types for the vertigo-model crate.

use thiserror::Error;
use vertigo_core::{CoreError, ElementId, ElementKind};
use vertigo_graph::GraphError;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid traversal filter: {0}")]
    InvalidFilter(String),

    #[error("Unknown field `{field}` on {element_type}")]
    UnknownField { element_type: String, field: String },

    #[error("Invalid value for {element_type}.{field}: {source}")]
    Validation {
        element_type: String,
        field: String,
        #[source]
        source: CoreError,
    },

    #[error("Field {element_type}.{field} is required")]
    Required { element_type: String, field: String },

    #[error("Invalid definition of {type_name}: {reason}")]
    Definition { type_name: String, reason: String },

    #[error("No {kind} type registered as {type_name}")]
    UnknownType { kind: ElementKind, type_name: String },

    #[error("{kind} {id} has been deleted")]
    Deleted { kind: ElementKind, id: ElementId },

    #[error("{element_type} has not been saved yet")]
    Unsaved { element_type: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: ElementKind, id: ElementId },

    #[error("Graph store error: {0}")]
    Store(GraphError),
}

impl ModelError {
    /// Whether the error is a caller mistake detected before any store call.
    pub fn is_usage(&self) -> bool {
        !matches!(self, Self::NotFound { .. } | Self::Store(_))
    }
}

impl From<GraphError> for ModelError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

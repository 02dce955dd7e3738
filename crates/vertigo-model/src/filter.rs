//! Edge label resolution for traversals.

use std::borrow::Cow;
use std::collections::BTreeSet;

use vertigo_core::Value;

use crate::edge::Edge;
use crate::error::{ModelError, Result};
use crate::schema::EdgeType;

/// One way of naming the edge label a traversal follows.
///
/// Any other kind of value (booleans and integers included) has no
/// variant here; dynamic input goes through `TryFrom<&Value>`, which
/// rejects it.
#[derive(Debug, Clone)]
pub enum EdgeFilter<'a> {
    /// A registered edge type.
    Type(&'a EdgeType),
    /// An edge whose label is followed.
    Instance(&'a Edge),
    /// A raw label string.
    Label(Cow<'a, str>),
}

impl EdgeFilter<'_> {
    pub fn label(&self) -> Result<&str> {
        match self {
            Self::Type(edge_type) => Ok(edge_type.label()),
            Self::Instance(edge) => Ok(edge.label()),
            Self::Label(label) if label.is_empty() => {
                Err(ModelError::InvalidFilter("edge label must not be empty".to_string()))
            }
            Self::Label(label) => Ok(label.as_ref()),
        }
    }
}

impl<'a> From<&'a EdgeType> for EdgeFilter<'a> {
    fn from(edge_type: &'a EdgeType) -> Self {
        Self::Type(edge_type)
    }
}

impl<'a> From<&'a Edge> for EdgeFilter<'a> {
    fn from(edge: &'a Edge) -> Self {
        Self::Instance(edge)
    }
}

impl<'a> From<&'a str> for EdgeFilter<'a> {
    fn from(label: &'a str) -> Self {
        Self::Label(Cow::Borrowed(label))
    }
}

impl From<String> for EdgeFilter<'static> {
    fn from(label: String) -> Self {
        Self::Label(Cow::Owned(label))
    }
}

impl TryFrom<&Value> for EdgeFilter<'static> {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(label) => Ok(Self::Label(Cow::Owned(label.clone()))),
            other => Err(ModelError::InvalidFilter(format!(
                "expected an edge type, edge or label string, got {} `{other}`",
                other.type_name()
            ))),
        }
    }
}

/// The set of labels named by `filters`. Empty means every label.
pub fn resolve_labels(filters: &[EdgeFilter<'_>]) -> Result<BTreeSet<String>> {
    filters
        .iter()
        .map(|filter| filter.label().map(str::to_string))
        .collect()
}

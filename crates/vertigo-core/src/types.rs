//! Core element types shared by the store and model crates.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::value::Value;

/// Field name → value map, keyed by store-facing (physical) names when it
/// crosses the store boundary.
pub type Properties = BTreeMap<String, Value>;

// ── Elements ──────────────────────────────────────────────────────

/// Store-assigned identifier of a vertex or edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| CoreError::Parse {
                expected: "element id",
                value: raw.to_string(),
            })
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an element is a vertex or an edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Vertex,
    Edge,
}

impl ElementKind {
    /// Name of the identifier property the store keeps for this kind.
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Vertex => "vid",
            Self::Edge => "eid",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Edge => write!(f, "edge"),
        }
    }
}

/// The ordered vertex pair of an edge: `out_v` (tail) → `in_v` (head).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Endpoints {
    pub out_v: ElementId,
    pub in_v: ElementId,
}

// ── Field Types ───────────────────────────────────────────────────

/// Type descriptor of a declared field.
///
/// Coercion lives here rather than in the value manager: every value that
/// enters an entity, whether assigned by the caller or loaded from the store,
/// passes through [`FieldKind::coerce`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Uuid,
    List,
    Dictionary,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
            Self::List => "list",
            Self::Dictionary => "dictionary",
        }
    }

    /// Convert a model- or store-form value into this kind's model form.
    ///
    /// `Null` is accepted by every kind; whether a field may stay null is a
    /// descriptor concern (`required`).
    pub fn coerce(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match (self, value) {
            (Self::String | Self::Text, v @ Value::String(_)) => Ok(v),
            (Self::Integer, v @ Value::Integer(_)) => Ok(v),
            (Self::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
            (Self::Float, v @ Value::Float(_)) => Ok(v),
            (Self::Boolean, v @ Value::Bool(_)) => Ok(v),
            (Self::DateTime, v @ Value::DateTime(_)) => Ok(v),
            (Self::DateTime, Value::Integer(millis)) => DateTime::from_timestamp_millis(millis)
                .map(Value::DateTime)
                .ok_or_else(|| self.parse_error(millis.to_string())),
            (Self::DateTime, Value::String(raw)) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
                .map_err(|_| self.parse_error(raw)),
            (Self::Uuid, v @ Value::Uuid(_)) => Ok(v),
            (Self::Uuid, Value::String(raw)) => Uuid::parse_str(&raw)
                .map(Value::Uuid)
                .map_err(|_| self.parse_error(raw)),
            (Self::List, v @ Value::List(_)) => Ok(v),
            (Self::Dictionary, v @ Value::Map(_)) => Ok(v),
            // Stores without nested map support persist dictionaries as JSON text.
            (Self::Dictionary, Value::String(raw)) => {
                match serde_json::from_str::<serde_json::Value>(&raw) {
                    Ok(json @ serde_json::Value::Object(_)) => Ok(Value::from(json)),
                    _ => Err(self.parse_error(raw)),
                }
            }
            (_, other) => Err(CoreError::Conversion {
                expected: self.name(),
                found: other.type_name(),
            }),
        }
    }

    fn parse_error(&self, value: String) -> CoreError {
        CoreError::Parse {
            expected: self.name(),
            value,
        }
    }
}

//! Field descriptors, type schemas and the registry that owns them.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use vertigo_core::config::MappingConfig;
use vertigo_core::{ElementKind, FieldKind, Value};
use vertigo_graph::GraphStore;

use crate::error::{ModelError, Result};
use crate::index::IndexRegistrar;

/// Property names the store keeps for itself.
const RESERVED_NAMES: [&str; 3] = ["vid", "eid", "element_type"];

// ── Fields ────────────────────────────────────────────────────────

/// Initial value of a field on a fresh entity.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    Fixed(Value),
    /// Evaluated once per new entity, e.g. a creation timestamp.
    Generated(fn() -> Value),
}

impl DefaultValue {
    fn produce(&self) -> Value {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::Generated(generate) => generate(),
        }
    }
}

/// A declared field of a vertex or edge type.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    kind: FieldKind,
    default: Option<DefaultValue>,
    db_field: Option<String>,
    indexed: bool,
    required: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            db_field: None,
            indexed: false,
            required: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    pub fn uuid(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Uuid)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::List)
    }

    pub fn dictionary(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Dictionary)
    }

    /// Request a key index on this field regardless of the registry policy.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Persist under a different property name than the model name.
    pub fn db_field(mut self, name: impl Into<String>) -> Self {
        self.db_field = Some(name.into());
        self
    }

    /// Reject saves while the field is null.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Fixed(value.into()));
        self
    }

    pub fn with_default_fn(mut self, generate: fn() -> Value) -> Self {
        self.default = Some(DefaultValue::Generated(generate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Name of the property in the store.
    pub fn physical_name(&self) -> &str {
        self.db_field.as_deref().unwrap_or(&self.name)
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub(crate) fn initial_value(&self) -> Value {
        self.default
            .as_ref()
            .map(DefaultValue::produce)
            .unwrap_or_default()
    }
}

// ── Type Schemas ──────────────────────────────────────────────────

/// The validated field layout of one vertex type or edge label.
#[derive(Debug)]
pub struct TypeSchema {
    kind: ElementKind,
    name: String,
    fields: Vec<Field>,
}

impl TypeSchema {
    pub fn new(
        kind: ElementKind,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self> {
        let name = name.into();
        let definition = |reason: String| ModelError::Definition {
            type_name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(definition(format!("{kind} type name must not be empty")));
        }

        let mut fields: Vec<Field> = fields.into_iter().collect();
        let mut model_names = HashSet::new();
        let mut physical_names = HashSet::new();

        for field in &mut fields {
            if field.name.is_empty() || field.physical_name().is_empty() {
                return Err(definition("field names must not be empty".to_string()));
            }
            for reserved in [field.name(), field.physical_name()] {
                if RESERVED_NAMES.contains(&reserved) {
                    return Err(definition(format!("`{reserved}` is a reserved name")));
                }
            }
            if !model_names.insert(field.name.clone()) {
                return Err(definition(format!("duplicate field `{}`", field.name)));
            }
            if !physical_names.insert(field.physical_name().to_string()) {
                return Err(definition(format!(
                    "duplicate stored name `{}`",
                    field.physical_name()
                )));
            }

            if let Some(DefaultValue::Fixed(value)) = &field.default {
                let coerced = field.kind.coerce(value.clone()).map_err(|e| {
                    definition(format!("default of `{}` is invalid: {e}", field.name))
                })?;
                field.default = Some(DefaultValue::Fixed(coerced));
            }
        }

        Ok(Self { kind, name, fields })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Vertex element type, or edge label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn position(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .ok_or_else(|| ModelError::UnknownField {
                element_type: self.name.clone(),
                field: name.to_string(),
            })
    }
}

/// Handle to a registered vertex type.
#[derive(Debug, Clone)]
pub struct VertexType(Arc<TypeSchema>);

impl VertexType {
    pub fn element_type(&self) -> &str {
        self.0.name()
    }

    pub fn schema(&self) -> &TypeSchema {
        &self.0
    }

    pub(crate) fn shared(&self) -> Arc<TypeSchema> {
        Arc::clone(&self.0)
    }
}

impl PartialEq for VertexType {
    fn eq(&self, other: &Self) -> bool {
        self.element_type() == other.element_type()
    }
}

impl fmt::Display for VertexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element_type())
    }
}

/// Handle to a registered edge type.
#[derive(Debug, Clone)]
pub struct EdgeType(Arc<TypeSchema>);

impl EdgeType {
    pub fn label(&self) -> &str {
        self.0.name()
    }

    pub fn schema(&self) -> &TypeSchema {
        &self.0
    }

    pub(crate) fn shared(&self) -> Arc<TypeSchema> {
        Arc::clone(&self.0)
    }
}

impl PartialEq for EdgeType {
    fn eq(&self, other: &Self) -> bool {
        self.label() == other.label()
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ── Registry ──────────────────────────────────────────────────────

/// Every vertex and edge type a session knows how to decode.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    registrar: IndexRegistrar,
    vertex_types: HashMap<String, VertexType>,
    edge_types: HashMap<String, EdgeType>,
}

impl SchemaRegistry {
    pub fn new(config: &MappingConfig) -> Self {
        Self {
            registrar: IndexRegistrar::new(config.index_all_fields),
            ..Self::default()
        }
    }

    pub fn index_all_fields(&self) -> bool {
        self.registrar.index_all_fields()
    }

    /// Register a vertex type and create its key indexes in `store`.
    ///
    /// Nothing is registered when an index cannot be created.
    pub async fn register_vertex<S: GraphStore>(
        &mut self,
        element_type: &str,
        fields: impl IntoIterator<Item = Field>,
        store: &S,
    ) -> Result<VertexType> {
        if self.vertex_types.contains_key(element_type) {
            return Err(ModelError::Definition {
                type_name: element_type.to_string(),
                reason: "vertex type already registered".to_string(),
            });
        }

        let schema = TypeSchema::new(ElementKind::Vertex, element_type, fields)?;
        let indexed = self.registrar.register(&schema, store).await?;

        tracing::info!(
            element_type,
            fields = schema.fields().len(),
            indexes = indexed.len(),
            "Registered vertex type"
        );

        let vertex_type = VertexType(Arc::new(schema));
        self.vertex_types
            .insert(element_type.to_string(), vertex_type.clone());
        Ok(vertex_type)
    }

    /// Register an edge type. Edge properties are never indexed.
    pub fn register_edge(
        &mut self,
        label: &str,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<EdgeType> {
        if self.edge_types.contains_key(label) {
            return Err(ModelError::Definition {
                type_name: label.to_string(),
                reason: "edge type already registered".to_string(),
            });
        }

        let schema = TypeSchema::new(ElementKind::Edge, label, fields)?;
        tracing::info!(label, fields = schema.fields().len(), "Registered edge type");

        let edge_type = EdgeType(Arc::new(schema));
        self.edge_types.insert(label.to_string(), edge_type.clone());
        Ok(edge_type)
    }

    pub fn vertex_type(&self, element_type: &str) -> Option<&VertexType> {
        self.vertex_types.get(element_type)
    }

    pub fn edge_type(&self, label: &str) -> Option<&EdgeType> {
        self.edge_types.get(label)
    }

    pub(crate) fn require_vertex_type(&self, element_type: &str) -> Result<&VertexType> {
        self.vertex_type(element_type)
            .ok_or_else(|| ModelError::UnknownType {
                kind: ElementKind::Vertex,
                type_name: element_type.to_string(),
            })
    }

    pub(crate) fn require_edge_type(&self, label: &str) -> Result<&EdgeType> {
        self.edge_type(label).ok_or_else(|| ModelError::UnknownType {
            kind: ElementKind::Edge,
            type_name: label.to_string(),
        })
    }
}

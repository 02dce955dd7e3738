//! State and persistence logic shared by vertices and edges.

use std::sync::Arc;

use vertigo_core::{ElementId, ElementKind, Endpoints, Properties, Value};
use vertigo_graph::{ElementRecord, GraphStore, WriteRequest};

use crate::error::{ModelError, Result};
use crate::manager::ValueManager;
use crate::schema::TypeSchema;

/// Identity and tracked fields of one entity.
///
/// `values` is aligned with the schema's declared fields.
#[derive(Debug, Clone)]
pub struct ElementState {
    pub(crate) id: Option<ElementId>,
    pub(crate) schema: Arc<TypeSchema>,
    pub(crate) values: Vec<ValueManager>,
    pub(crate) deleted: bool,
}

impl ElementState {
    pub(crate) fn new(schema: Arc<TypeSchema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|field| ValueManager::new(field.initial_value()))
            .collect();
        Self {
            id: None,
            schema,
            values,
            deleted: false,
        }
    }

    /// Build the state of a persisted element. Every field starts unchanged.
    pub(crate) fn from_record(schema: Arc<TypeSchema>, record: &ElementRecord) -> Result<Self> {
        let values = decode_record(&schema, record)?
            .into_iter()
            .map(ValueManager::new)
            .collect();
        Ok(Self {
            id: Some(record.id),
            schema,
            values,
            deleted: false,
        })
    }

    pub fn id(&self) -> Option<ElementId> {
        self.id
    }

    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn kind(&self) -> ElementKind {
        self.schema.kind()
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        match (self.deleted, self.id) {
            (true, Some(id)) => Err(ModelError::Deleted {
                kind: self.kind(),
                id,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn saved_id(&self) -> Result<ElementId> {
        self.ensure_live()?;
        self.id.ok_or_else(|| ModelError::Unsaved {
            element_type: self.schema.name().to_string(),
        })
    }

    /// Coerce caller-supplied values against the schema without touching
    /// any field, so a bad entry leaves the entity as it was.
    pub(crate) fn prepare<K, I>(&self, fields: I) -> Result<Vec<(usize, Value)>>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        fields
            .into_iter()
            .map(|(name, value)| {
                let index = self.schema.position(name.as_ref())?;
                Ok((index, self.coerce(index, value)?))
            })
            .collect()
    }

    pub(crate) fn apply(&mut self, prepared: Vec<(usize, Value)>) {
        for (index, value) in prepared {
            self.values[index].set(value);
        }
    }

    fn coerce(&self, index: usize, value: Value) -> Result<Value> {
        let field = &self.schema.fields()[index];
        field
            .kind()
            .coerce(value)
            .map_err(|source| ModelError::Validation {
                element_type: self.schema.name().to_string(),
                field: field.name().to_string(),
                source,
            })
    }

    fn manager(&self, name: &str) -> Option<&ValueManager> {
        let index = self.schema.position(name).ok()?;
        self.values.get(index)
    }

    /// Fields to write on the next save, with their store-form properties.
    ///
    /// `None` means nothing needs writing. The first save of an entity always
    /// writes every field.
    fn pending_write(&self) -> Result<Option<(Vec<usize>, Properties)>> {
        self.ensure_live()?;

        let indices: Vec<usize> = match self.id {
            None => (0..self.values.len()).collect(),
            Some(_) => (0..self.values.len())
                .filter(|&i| self.values[i].changed())
                .collect(),
        };
        if self.id.is_some() && indices.is_empty() {
            return Ok(None);
        }

        let fields = self.schema.fields();
        let mut properties = Properties::new();
        for &index in &indices {
            let field = &fields[index];
            let value = self.values[index].get();
            if field.is_required() && value.is_null() {
                return Err(ModelError::Required {
                    element_type: self.schema.name().to_string(),
                    field: field.name().to_string(),
                });
            }
            properties.insert(field.physical_name().to_string(), value.to_store());
        }
        Ok(Some((indices, properties)))
    }

    /// Replace every field with the record's values and clear change marks.
    fn reset_from(&mut self, record: &ElementRecord) -> Result<()> {
        let decoded = decode_record(&self.schema, record)?;
        for (manager, value) in self.values.iter_mut().zip(decoded) {
            manager.reset(value);
        }
        Ok(())
    }
}

impl PartialEq for ElementState {
    /// Saved entities compare by identity, unsaved ones by field values.
    fn eq(&self, other: &Self) -> bool {
        if self.kind() != other.kind() || self.schema.name() != other.schema.name() {
            return false;
        }
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.get() == b.get()),
            _ => false,
        }
    }
}

fn decode_record(schema: &TypeSchema, record: &ElementRecord) -> Result<Vec<Value>> {
    schema
        .fields()
        .iter()
        .map(|field| {
            let raw = record
                .properties
                .get(field.physical_name())
                .cloned()
                .unwrap_or_default();
            field
                .kind()
                .coerce(raw)
                .map_err(|source| ModelError::Validation {
                    element_type: schema.name().to_string(),
                    field: field.name().to_string(),
                    source,
                })
        })
        .collect()
}

/// Write pending changes. Change marks are cleared only after the store
/// accepts the write, and the id is assigned only then.
pub(crate) async fn save_state<S: GraphStore>(
    state: &mut ElementState,
    endpoints: Option<Endpoints>,
    store: &S,
) -> Result<()> {
    let Some((indices, properties)) = state.pending_write()? else {
        tracing::debug!(element_type = state.schema.name(), "Nothing to save");
        return Ok(());
    };

    let request = WriteRequest {
        kind: state.kind(),
        element_type: state.schema.name().to_string(),
        id: state.id,
        properties,
        endpoints,
    };
    let created = request.id.is_none();
    let written = indices.len();

    let id = store.write(request).await?;
    state.id = Some(id);
    for index in indices {
        state.values[index].commit();
    }

    tracing::debug!(
        kind = %state.kind(),
        element_type = state.schema.name(),
        %id,
        created,
        fields = written,
        "Saved element"
    );
    Ok(())
}

/// Re-read stored values into `state`, discarding unsaved changes.
pub(crate) async fn reload_state<S: GraphStore>(state: &mut ElementState, store: &S) -> Result<()> {
    let id = state.saved_id()?;
    let record = store.read(state.kind(), id).await?;
    if record.element_type != state.schema.name() {
        return Err(ModelError::NotFound {
            kind: state.kind(),
            id,
        });
    }
    state.reset_from(&record)
}

/// Assign several fields at once and save. Unknown or invalid fields are
/// rejected before any field changes.
pub(crate) async fn update_state<S, K, I>(
    state: &mut ElementState,
    fields: I,
    endpoints: Option<Endpoints>,
    store: &S,
) -> Result<()>
where
    S: GraphStore,
    K: AsRef<str>,
    I: IntoIterator<Item = (K, Value)>,
{
    state.ensure_live()?;
    let prepared = state.prepare(fields)?;
    state.apply(prepared);
    save_state(state, endpoints, store).await
}

pub(crate) async fn delete_state<S: GraphStore>(state: &mut ElementState, store: &S) -> Result<()> {
    let id = state.saved_id()?;
    store.delete(state.kind(), id).await?;
    state.deleted = true;
    tracing::debug!(kind = %state.kind(), %id, "Deleted element");
    Ok(())
}

/// Field access common to [`Vertex`](crate::Vertex) and [`Edge`](crate::Edge).
pub trait Element {
    fn state(&self) -> &ElementState;

    fn state_mut(&mut self) -> &mut ElementState;

    /// `None` until the first successful save.
    fn id(&self) -> Option<ElementId> {
        self.state().id
    }

    /// Vertex element type or edge label.
    fn element_type(&self) -> &str {
        self.state().schema.name()
    }

    fn is_deleted(&self) -> bool {
        self.state().deleted
    }

    /// Current value of a declared field.
    fn get(&self, field: &str) -> Option<&Value> {
        self.state().manager(field).map(ValueManager::get)
    }

    /// Mutable access to a field's value. In-place edits count as changes.
    fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        let state = self.state_mut();
        let index = state.schema.position(field).ok()?;
        state.values.get_mut(index).map(ValueManager::get_mut)
    }

    /// Assign a field after coercing the value to the field's kind.
    fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let state = self.state_mut();
        let prepared = state.prepare([(field, value.into())])?;
        state.apply(prepared);
        Ok(())
    }

    fn value_manager(&self, field: &str) -> Option<&ValueManager> {
        self.state().manager(field)
    }

    fn is_changed(&self) -> bool {
        self.state().values.iter().any(ValueManager::changed)
    }

    /// Model names of fields changed since the last commit.
    fn changed_fields(&self) -> Vec<&str> {
        let state = self.state();
        state
            .schema
            .fields()
            .iter()
            .zip(&state.values)
            .filter(|(_, manager)| manager.changed())
            .map(|(field, _)| field.name())
            .collect()
    }

    /// Current field values keyed by model name.
    fn as_properties(&self) -> Properties {
        let state = self.state();
        state
            .schema
            .fields()
            .iter()
            .zip(&state.values)
            .map(|(field, manager)| (field.name().to_string(), manager.get().clone()))
            .collect()
    }
}

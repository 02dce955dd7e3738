//! Key index creation for registered vertex types.

use vertigo_core::ElementKind;
use vertigo_graph::GraphStore;

use crate::error::Result;
use crate::schema::TypeSchema;

/// Decides which vertex properties get a key index.
///
/// With `index_all_fields` on, the vertex id and every declared field are
/// indexed. With it off, only fields marked `indexed`. Indexes are always
/// created under the physical property name.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexRegistrar {
    index_all_fields: bool,
}

impl IndexRegistrar {
    pub fn new(index_all_fields: bool) -> Self {
        Self { index_all_fields }
    }

    pub fn index_all_fields(&self) -> bool {
        self.index_all_fields
    }

    /// Physical property names to index, vertex id first.
    pub fn plan(&self, schema: &TypeSchema) -> Vec<String> {
        if schema.kind() != ElementKind::Vertex {
            return Vec::new();
        }

        let mut names = Vec::new();
        if self.index_all_fields {
            names.push(ElementKind::Vertex.id_field().to_string());
        }
        names.extend(
            schema
                .fields()
                .iter()
                .filter(|field| self.index_all_fields || field.is_indexed())
                .map(|field| field.physical_name().to_string()),
        );
        names
    }

    /// Create the planned indexes. Stops at the first store failure.
    pub async fn register<S: GraphStore>(&self, schema: &TypeSchema, store: &S) -> Result<Vec<String>> {
        let planned = self.plan(schema);
        for name in &planned {
            store.create_key_index(name).await?;
            tracing::debug!(element_type = schema.name(), field = %name, "Created key index");
        }
        Ok(planned)
    }
}

//! Neo4j connection management and the Neo4j-backed graph store.

use std::future::Future;
use std::time::Duration;

use neo4rs::{ConfigBuilder, Graph, Query};
use serde::Deserialize;
use vertigo_core::{ElementId, ElementKind};

use crate::store::{ElementRecord, GraphStore, TraversalHit, TraverseRequest, WriteRequest};

/// Errors from graph store operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Element not found: {kind} with id {id}")]
    NotFound { kind: ElementKind, id: ElementId },

    #[error("Store call exceeded {millis}ms timeout")]
    Timeout { millis: u64 },

    #[error("Invalid store request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{store} store error: {source}")]
    Backend {
        store: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Configuration for connecting to Neo4j.
///
/// Loaded from the `[neo4j]` section of `vertigo.toml` or
/// `VERTIGO__NEO4J__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,

    /// Applied unchanged to every store call; no timeout when absent.
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "vertigo-dev".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
            query_timeout_ms: None,
        }
    }
}

impl GraphConfig {
    /// Load the `[neo4j]` section, defaulting when it is absent.
    pub fn load(file_prefix: &str) -> vertigo_core::error::Result<Self> {
        vertigo_core::config::load_section(file_prefix, "neo4j")
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Vertices are stored as `:Vertex` nodes carrying `vid` and `element_type`;
/// edges are relationships typed by their label, carrying `eid`.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    timeout: Option<Duration>,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self {
            graph,
            timeout: config.query_timeout_ms.map(Duration::from_millis),
        })
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.with_timeout(self.graph.run(query)).await
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        self.with_timeout(async {
            let mut stream = self.graph.execute(query).await?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next().await? {
                rows.push(row);
            }
            Ok::<_, neo4rs::Error>(rows)
        })
        .await
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        self.with_timeout(async {
            let mut stream = self.graph.execute(query).await?;
            stream.next().await
        })
        .await
    }

    async fn with_timeout<T, F>(&self, call: F) -> Result<T, GraphError>
    where
        F: Future<Output = Result<T, neo4rs::Error>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GraphError::Timeout {
                    millis: limit.as_millis() as u64,
                })?
                .map_err(GraphError::from),
            None => call.await.map_err(GraphError::from),
        }
    }
}

impl GraphStore for GraphClient {
    async fn write(&self, request: WriteRequest) -> Result<ElementId, GraphError> {
        self.write_element(request).await
    }

    async fn read(&self, kind: ElementKind, id: ElementId) -> Result<ElementRecord, GraphError> {
        self.read_element(kind, id).await
    }

    async fn delete(&self, kind: ElementKind, id: ElementId) -> Result<(), GraphError> {
        self.delete_element(kind, id).await
    }

    async fn traverse(&self, request: &TraverseRequest) -> Result<Vec<TraversalHit>, GraphError> {
        self.traverse_edges(request).await
    }

    async fn create_key_index(&self, field: &str) -> Result<(), GraphError> {
        self.create_vertex_index(field).await
    }
}

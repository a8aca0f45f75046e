//! Contracts a persistence plugin implements to be driven by the admin.

use crate::error::AdminError;
use crate::resource::{Filter, FindOptions, Property, Record};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Entry point of a persistence plugin, registered once per process.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Unique adapter name; registration is keyed by it.
    fn name(&self) -> &str;

    /// Whether this adapter can serve the database at `url`.
    fn is_adapter_for(&self, url: &str) -> bool;

    /// Opens the database at `url`.
    async fn connect(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> Result<Box<dyn DatabaseAdapter>, AdminError>;
}

/// Per-connection settings handed to [`Adapter::connect`]; `None` keeps the adapter's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    pub max_connections: Option<u32>,
}

impl ConnectOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self { max_connections: None }
    }

    #[must_use]
    pub const fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = Some(max_connections);
        self
    }
}

/// A connected database.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Introspects the data model.
    async fn resources(&self) -> Result<Vec<Arc<dyn ResourceAdapter>>, AdminError>;
}

/// CRUD access to one resource (a table, a collection).
///
/// Ids travel as strings; the adapter converts them to its key type.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// Resource id, unique across all databases of an admin.
    fn id(&self) -> &str;

    fn properties(&self) -> &[Property];

    fn id_property(&self) -> Option<&Property> {
        self.properties().iter().find(|p| p.is_id)
    }

    async fn count(&self, filter: &Filter) -> Result<u64, AdminError>;

    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Record>, AdminError>;

    async fn find_one(&self, id: &str) -> Result<Option<Record>, AdminError>;

    async fn create(&self, params: Map<String, Value>) -> Result<Record, AdminError>;

    /// # Errors
    /// [`AdminError::NotFound`] when no record has `id`.
    async fn update(&self, id: &str, params: Map<String, Value>) -> Result<Record, AdminError>;

    /// # Errors
    /// [`AdminError::NotFound`] when no record has `id`.
    async fn delete(&self, id: &str) -> Result<(), AdminError>;
}

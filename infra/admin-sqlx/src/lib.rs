//! # Admin SQLite adapter
//!
//! Serves SQLite databases to the admin backoffice through `sqlx`. Every user table
//! becomes a resource named after the table; columns become properties typed by their
//! declared type.
//!
//! Tables with a single-column primary key are addressed by it. Other tables are
//! addressed by SQLite's implicit `rowid`, exposed as a read-only leading property.
//!
//! ```rust,ignore
//! use gantry_admin::AdminKit;
//! use gantry_admin_sqlx::SqliteAdapter;
//!
//! AdminKit::register_adapter(SqliteAdapter::new());
//! ```

mod error;
mod resource;
mod schema;

pub use crate::error::{SqliteAdapterError, SqliteAdapterErrorExt};

use crate::resource::SqliteResource;
use async_trait::async_trait;
use gantry_admin::{Adapter, AdminError, ConnectOptions, DatabaseAdapter, ResourceAdapter};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing::info;

/// Adapter name used for registration.
pub const ADAPTER_NAME: &str = "sqlite";
/// URL scheme claimed by [`SqliteAdapter`].
pub const URL_SCHEME: &str = "sqlite:";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Claims `sqlite:` URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteAdapter {
    max_connections: u32,
}

impl Default for SqliteAdapter {
    fn default() -> Self {
        Self { max_connections: DEFAULT_MAX_CONNECTIONS }
    }
}

impl SqliteAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = at_least_one(max_connections);
        self
    }

    /// Opens the database at `url`. `options.max_connections` overrides the adapter's pool
    /// size; in-memory databases always get a single connection.
    ///
    /// # Errors
    /// [`SqliteAdapterError::Sqlx`] if the pool cannot connect.
    pub async fn open(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> Result<SqliteDatabase, SqliteAdapterError> {
        // An in-memory database lives and dies with its only connection.
        let pool_options = if is_memory(url) {
            SqlitePoolOptions::new().max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            let max_connections = options.max_connections.map_or(self.max_connections, at_least_one);
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect(url).await.context(format!("Opening {url}"))?;
        info!(url, max_connections = pool.options().get_max_connections(), "SQLite database connected");

        Ok(SqliteDatabase { name: url.to_owned(), pool })
    }
}

const fn at_least_one(max_connections: u32) -> u32 {
    if max_connections == 0 { 1 } else { max_connections }
}

#[async_trait]
impl Adapter for SqliteAdapter {
    fn name(&self) -> &str {
        ADAPTER_NAME
    }

    fn is_adapter_for(&self, url: &str) -> bool {
        url.starts_with(URL_SCHEME)
    }

    async fn connect(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> Result<Box<dyn DatabaseAdapter>, AdminError> {
        Ok(Box::new(self.open(url, options).await?))
    }
}

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// A connected SQLite database.
#[derive(Debug)]
pub struct SqliteDatabase {
    name: String,
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Wraps an existing pool, e.g. one shared with the rest of the application.
    #[must_use]
    pub fn from_pool(name: impl Into<String>, pool: SqlitePool) -> Self {
        Self { name: name.into(), pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resources(&self) -> Result<Vec<Arc<dyn ResourceAdapter>>, AdminError> {
        let schemas = schema::introspect(&self.pool).await?;
        Ok(schemas
            .into_iter()
            .map(|schema| {
                Arc::new(SqliteResource::new(self.pool.clone(), schema)) as Arc<dyn ResourceAdapter>
            })
            .collect())
    }
}

//! Lazy, initialize-once loading of the admin generator.

use crate::error::BackofficeError;
use gantry_admin::{Adapter, AdapterRegistry, AdminKit};
use gantry_admin_axum::{AdminModule, AdminModuleOptions};
use gantry_admin_sqlx::SqliteAdapter;
use gantry_kernel::module::{ModuleDescriptor, ModuleError};
use std::sync::LazyLock;
use tokio::sync::OnceCell;
use tracing::info;

static GLOBAL: LazyLock<AdminLoader> = LazyLock::new(|| AdminLoader::new(GlobalRegistrar));

/// Binds persistence adapters to the admin generator.
pub trait AdapterRegistrar: Send + Sync + 'static {
    /// Registers `adapter`; `Ok(false)` when an adapter of that name is already bound.
    ///
    /// # Errors
    /// [`BackofficeError::Registration`] when the adapter is refused.
    fn register(&self, adapter: impl Adapter) -> Result<bool, BackofficeError>;

    /// Registry the admin resolves database URLs against.
    fn registry(&self) -> AdapterRegistry;
}

/// Registers adapters process-wide through [`AdminKit::register_adapter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalRegistrar;

impl AdapterRegistrar for GlobalRegistrar {
    fn register(&self, adapter: impl Adapter) -> Result<bool, BackofficeError> {
        Ok(AdminKit::register_adapter(adapter))
    }

    fn registry(&self) -> AdapterRegistry {
        AdminKit::registry().clone()
    }
}

/// A local registry also works as a registrar; handy for embedding and tests.
impl AdapterRegistrar for AdapterRegistry {
    fn register(&self, adapter: impl Adapter) -> Result<bool, BackofficeError> {
        Ok(Self::register(self, adapter))
    }

    fn registry(&self) -> AdapterRegistry {
        self.clone()
    }
}

/// What a successful load hands out: the generator root, its web integration and the
/// adapters bound to it.
#[derive(Debug, Clone)]
pub struct AdminCapability {
    pub admin: AdminKit,
    pub module: AdminModule,
    registry: AdapterRegistry,
}

impl AdminCapability {
    /// Adapters the admin resolves database URLs against.
    #[must_use]
    pub const fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Describes the integration module bound to the loaded adapters.
    ///
    /// # Errors
    /// [`ModuleError::Options`] if the options fail to serialize.
    pub fn create_admin(&self, options: AdminModuleOptions) -> Result<ModuleDescriptor, ModuleError> {
        AdminModule::create_admin_with(options, self.registry.clone())
    }
}

/// Registers the SQLite adapter through `R` the first time [`AdminLoader::load`] runs
/// and memoizes the resulting capability.
///
/// Concurrent callers wait for the same registration. A failed load is returned to the
/// caller as is; the loader never retries on its own.
#[derive(Debug)]
pub struct AdminLoader<R = GlobalRegistrar> {
    registrar: R,
    capability: OnceCell<AdminCapability>,
}

impl<R: AdapterRegistrar> AdminLoader<R> {
    pub fn new(registrar: R) -> Self {
        Self { registrar, capability: OnceCell::new() }
    }

    /// # Errors
    /// [`BackofficeError::Registration`] if the registrar refuses the adapter.
    pub async fn load(&self) -> Result<&AdminCapability, BackofficeError> {
        self.capability
            .get_or_try_init(|| async {
                let adapter = SqliteAdapter::new();
                let name = adapter.name().to_owned();
                let fresh = self.registrar.register(adapter)?;
                info!(adapter = %name, fresh, "Admin generator loaded");

                Ok(AdminCapability {
                    admin: AdminKit,
                    module: AdminModule,
                    registry: self.registrar.registry(),
                })
            })
            .await
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.capability.initialized()
    }

    #[must_use]
    pub const fn registrar(&self) -> &R {
        &self.registrar
    }
}

/// The process-wide loader, registering through [`GlobalRegistrar`].
#[must_use]
pub fn global_loader() -> &'static AdminLoader {
    &GLOBAL
}

/// Loads the admin generator once per process.
///
/// # Errors
/// See [`AdminLoader::load`].
pub async fn load_admin() -> Result<&'static AdminCapability, BackofficeError> {
    global_loader().load().await
}

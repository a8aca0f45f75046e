use crate::adapter::Adapter;
use crate::admin::Admin;
use crate::error::AdminError;
use crate::options::AdminOptions;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

static GLOBAL: LazyLock<AdapterRegistry> = LazyLock::new(AdapterRegistry::new);

/// Ordered set of adapters, keyed by [`Adapter::name`].
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Arc<RwLock<Vec<Arc<dyn Adapter>>>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `adapter` unless one with the same name is present.
    ///
    /// Returns `false` when the name was already registered.
    pub fn register(&self, adapter: impl Adapter) -> bool {
        let mut adapters = self.adapters.write();
        if adapters.iter().any(|a| a.name() == adapter.name()) {
            debug!(adapter = adapter.name(), "Adapter already registered");
            return false;
        }
        info!(adapter = adapter.name(), "Admin adapter registered");
        adapters.push(Arc::new(adapter));
        true
    }

    /// Snapshot in registration order.
    #[must_use]
    pub fn adapters(&self) -> Vec<Arc<dyn Adapter>> {
        self.adapters.read().clone()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.adapters.read().iter().map(|a| a.name().to_owned()).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.adapters.read().iter().any(|a| a.name() == name)
    }

    /// First adapter, in registration order, that claims `url`.
    #[must_use]
    pub fn find_for(&self, url: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.read().iter().find(|a| a.is_adapter_for(url)).cloned()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry").field("adapters", &self.names()).finish()
    }
}

/// Root of the admin generator.
///
/// Owns the process-wide adapter registration; every [`Admin`] created through it
/// resolves databases against the globally registered adapters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminKit;

impl AdminKit {
    /// Registers `adapter` for the whole process. Idempotent per adapter name.
    pub fn register_adapter(adapter: impl Adapter) -> bool {
        GLOBAL.register(adapter)
    }

    #[must_use]
    pub fn registry() -> &'static AdapterRegistry {
        &GLOBAL
    }

    #[must_use]
    pub fn adapter_names() -> Vec<String> {
        GLOBAL.names()
    }

    /// Creates an admin bound to the global registry. Call [`Admin::initialize`] next.
    ///
    /// # Errors
    /// [`AdminError::Template`] if the built-in views fail to compile.
    pub fn create(options: AdminOptions) -> Result<Admin, AdminError> {
        Admin::with_registry(options, GLOBAL.clone())
    }
}

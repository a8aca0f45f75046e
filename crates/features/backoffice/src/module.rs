use crate::error::{BackofficeError, BackofficeErrorExt};
use crate::loader::{AdapterRegistrar, AdminLoader, global_loader};
use async_trait::async_trait;
use gantry_admin::AdminOptions;
use gantry_admin_axum::AdminModuleOptions;
use gantry_kernel::domain::registry::InitializedSlice;
pub use gantry_kernel::domain::constants::ADMIN_ROOT_PATH;
use gantry_kernel::module::{ModuleContext, ModuleDescriptor, ModuleError, ModuleOutput, ModuleProvider};
use tracing::info;

/// Descriptor name of the backoffice module.
pub const BACKOFFICE_MODULE: &str = "BackofficeModule";

/// Runtime view of the mounted backoffice, registered in the API state.
#[gantry_derive::gantry_slice]
pub struct Backoffice {
    pub root_path: String,
    pub adapters: Vec<String>,
}

/// The deferred module attaching the admin generator to the application.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackofficeModule;

impl BackofficeModule {
    /// Loads the admin generator through the process-wide loader and describes the module.
    ///
    /// # Errors
    /// Loader failures and descriptor construction failures.
    pub async fn for_root_async() -> Result<ModuleDescriptor, BackofficeError> {
        Self::for_root_with(global_loader()).await
    }

    /// Same as [`BackofficeModule::for_root_async`] with an explicit loader.
    ///
    /// The descriptor's single import is the admin integration mounted at
    /// [`ADMIN_ROOT_PATH`].
    ///
    /// # Errors
    /// Loader failures and descriptor construction failures.
    pub async fn for_root_with<R: AdapterRegistrar>(
        loader: &AdminLoader<R>,
    ) -> Result<ModuleDescriptor, BackofficeError> {
        let capability = loader.load().await?;

        let options = AdminModuleOptions { admin_options: AdminOptions::new(ADMIN_ROOT_PATH) };
        let admin = capability.create_admin(options).context("Creating the admin module")?;

        Ok(ModuleDescriptor::new(BACKOFFICE_MODULE)
            .import(admin)
            .provider(BackofficeProvider { adapters: capability.registry().names() }))
    }
}

struct BackofficeProvider {
    adapters: Vec<String>,
}

#[async_trait]
impl ModuleProvider for BackofficeProvider {
    async fn init(&self, _ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        info!(root_path = ADMIN_ROOT_PATH, adapters = ?self.adapters, "Backoffice slice initialized");

        let slice = Backoffice::new(BackofficeInner {
            root_path: ADMIN_ROOT_PATH.to_owned(),
            adapters: self.adapters.clone(),
        });
        Ok(ModuleOutput::new().slice(InitializedSlice::new(slice)))
    }
}

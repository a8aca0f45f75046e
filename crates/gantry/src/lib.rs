//! Facade crate for Gantry features and shared modules.
//! Re-exports domain/kernel primitives and composes the application root module.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `gantry` with the desired feature flags (`admin` is on by default).
//! - Await [`AppModule::for_root`] and hand the descriptor to the server builder.

mod error;

pub use crate::error::{AppError, AppErrorExt};
#[cfg(feature = "admin")]
pub use gantry_backoffice as backoffice;
pub use gantry_domain as domain;
pub use gantry_kernel as kernel;

use gantry_kernel::module::ModuleDescriptor;
use tracing::debug;

/// Descriptor name of the application root module.
pub const APP_MODULE: &str = "AppModule";

/// Feature registry for runtime introspection.
pub mod features {
    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "admin")]
        "admin",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// The application root: one import per enabled feature module.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppModule;

impl AppModule {
    /// Resolves every enabled feature module and composes them.
    ///
    /// # Errors
    /// The first feature module that fails to load.
    pub async fn for_root() -> Result<ModuleDescriptor, AppError> {
        #[cfg_attr(not(feature = "admin"), allow(unused_mut))]
        let mut imports = Vec::new();

        #[cfg(feature = "admin")]
        imports.push(
            backoffice::BackofficeModule::for_root_async().await.context("Loading the backoffice")?,
        );

        debug!(features = ?features::ENABLED, "Application modules composed");
        Ok(Self::compose(imports))
    }

    /// Root descriptor importing `modules` in order.
    #[must_use]
    pub fn compose(modules: impl IntoIterator<Item = ModuleDescriptor>) -> ModuleDescriptor {
        ModuleDescriptor::new(APP_MODULE).imports(modules)
    }
}

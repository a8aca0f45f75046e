use crate::routes;
use async_trait::async_trait;
use axum::Router;
use axum::response::Redirect;
use axum::routing::get;
use gantry_admin::{AdapterRegistry, Admin, AdminKit, AdminOptions};
use gantry_kernel::module::{ModuleContext, ModuleDescriptor, ModuleError, ModuleOutput, ModuleProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Descriptor name of the integration module.
pub const ADMIN_MODULE: &str = "AdminModule";

/// Options of [`AdminModule::create_admin`]; serialized flat, so the descriptor carries
/// the admin options directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminModuleOptions {
    #[serde(flatten)]
    pub admin_options: AdminOptions,
}

/// Web-framework integration of the admin generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminModule;

impl AdminModule {
    /// Describes an admin mounted at `options.admin_options.root_path`, resolving
    /// databases through the globally registered adapters.
    ///
    /// # Errors
    /// [`ModuleError::Options`] if the options fail to serialize.
    pub fn create_admin(options: AdminModuleOptions) -> Result<ModuleDescriptor, ModuleError> {
        Self::create_admin_with(options, AdminKit::registry().clone())
    }

    /// Same as [`AdminModule::create_admin`] with an explicit adapter registry.
    ///
    /// # Errors
    /// [`ModuleError::Options`] if the options fail to serialize.
    pub fn create_admin_with(
        options: AdminModuleOptions,
        registry: AdapterRegistry,
    ) -> Result<ModuleDescriptor, ModuleError> {
        Ok(ModuleDescriptor::new(ADMIN_MODULE)
            .options(&options)?
            .provider(AdminProvider { options, registry }))
    }
}

struct AdminProvider {
    options: AdminModuleOptions,
    registry: AdapterRegistry,
}

#[async_trait]
impl ModuleProvider for AdminProvider {
    async fn init(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let mut options = self.options.admin_options.clone();
        validate_root_path(&options.root_path)?;

        if let Some(url) = ctx.config.database.url.as_deref() {
            options = options.database(url);
        }
        if options.max_connections.is_none() {
            options = options.max_connections(ctx.config.database.max_connections);
        }

        let mut admin =
            Admin::with_registry(options, self.registry.clone()).map_err(ModuleError::provider)?;
        admin.initialize().await.map_err(ModuleError::provider)?;

        let root_path = admin.root_path().to_owned();
        info!(
            root_path = %root_path,
            resources = admin.resource_ids().count(),
            "Admin mounted"
        );

        // `nest` matches the bare prefix only.
        let canonical = root_path.clone();
        let router = Router::new()
            .route(
                &format!("{root_path}/"),
                get(move || {
                    let target = canonical.clone();
                    async move { Redirect::permanent(&target) }
                }),
            )
            .nest(&root_path, routes::router(Arc::new(admin)));
        Ok(ModuleOutput::new().router(router))
    }
}

/// `rootPath` must start with `/`, must not end with `/` and must not be `/` alone.
pub(crate) fn validate_root_path(path: &str) -> Result<(), ModuleError> {
    let problem = if !path.starts_with('/') {
        Some("must start with '/'")
    } else if path == "/" {
        Some("cannot be '/'")
    } else if path.ends_with('/') {
        Some("must not end with '/'")
    } else {
        None
    };

    problem.map_or(Ok(()), |problem| {
        Err(ModuleError::Validation {
            message: format!("rootPath '{path}' {problem}").into(),
            context: Some(ADMIN_MODULE.into()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_paths_are_validated() {
        assert!(validate_root_path("/admin").is_ok());
        assert!(validate_root_path("/tools/admin").is_ok());

        for bad in ["", "admin", "/", "/admin/"] {
            let err = validate_root_path(bad).unwrap_err();
            assert_eq!(err.kind(), "Validation", "{bad:?} accepted");
        }
    }
}

//! Common imports for feature slices and modules.

pub use crate::config::{ConfigError, ConfigLoader, load_config};
pub use gantry_domain::config::ApiConfig;
pub use gantry_domain::registry::{FeatureSlice, InitializedSlice};

#[cfg(feature = "server")]
pub use crate::module::{
    ModuleContext, ModuleDescriptor, ModuleError, ModuleErrorExt, ModuleOutput, ModuleProvider,
    ResolvedModules, resolve_modules,
};
#[cfg(feature = "server")]
pub use crate::server::{ApiState, system_router};
#[cfg(feature = "server")]
pub use async_trait::async_trait;

//! Kernel utilities shared across slices.
//! Keep this crate lightweight: layered config loading, module descriptors and the API state
//! every feature slice plugs into.
//!
//! ## Config loading
//! ```rust
//! use gantry_kernel::config::ConfigLoader;
//! use gantry_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = ConfigLoader::new().vars([("PORT", "8080")]).load().unwrap();
//! assert_eq!(cfg.server.port, 8080);
//! ```
//!
//! ## Modules
//! ```rust
//! # #[cfg(feature = "server")]
//! # {
//! use gantry_kernel::module::ModuleDescriptor;
//!
//! let root = ModuleDescriptor::new("AppModule").import(ModuleDescriptor::new("HealthModule"));
//! assert_eq!(root.imported().len(), 1);
//! # }
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod module;
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;

pub use gantry_domain as domain;

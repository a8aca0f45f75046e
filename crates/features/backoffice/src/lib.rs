//! Backoffice feature slice.
//!
//! Loads the admin generator on demand, binds the SQLite adapter to it exactly once and
//! describes a module mounting the generated admin under `/admin`.
//!
//! ```rust,ignore
//! let backoffice = gantry_backoffice::BackofficeModule::for_root_async().await?;
//! assert_eq!(backoffice.imported().len(), 1);
//! ```

mod error;
mod loader;
mod module;

pub use crate::error::{BackofficeError, BackofficeErrorExt};
pub use crate::loader::{
    AdapterRegistrar, AdminCapability, AdminLoader, GlobalRegistrar, global_loader, load_admin,
};
pub use crate::module::{
    ADMIN_ROOT_PATH, BACKOFFICE_MODULE, Backoffice, BackofficeInner, BackofficeModule,
};

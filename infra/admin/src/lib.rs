//! # Admin
//!
//! Generates a CRUD backoffice over whatever data model a registered persistence adapter
//! exposes.
//!
//! * [`Adapter`] plugins are registered once per process through [`AdminKit::register_adapter`].
//! * An [`Admin`] connects each configured database URL through the first adapter claiming
//!   it, collects the resources and renders dashboard, list and detail views.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gantry_admin::{AdminKit, AdminOptions};
//!
//! AdminKit::register_adapter(my_adapter);
//! let mut admin = AdminKit::create(AdminOptions::new("/admin").database("sqlite://app.db"))?;
//! admin.initialize().await?;
//! let html = admin.dashboard_page().await?;
//! ```

mod adapter;
mod admin;
mod error;
mod options;
mod registry;
mod resource;
mod views;

pub use crate::adapter::{Adapter, ConnectOptions, DatabaseAdapter, ResourceAdapter};
pub use crate::admin::{Admin, ResourceMeta};
pub use crate::error::{AdminError, AdminErrorExt, BoxError};
pub use crate::options::{AdminOptions, Branding, DEFAULT_COMPANY_NAME};
pub use crate::registry::{AdapterRegistry, AdminKit};
pub use crate::resource::{
    Condition, DEFAULT_LIMIT, Direction, Filter, FindOptions, MAX_LIMIT, Matcher, Property,
    PropertyType, Record, Sort, check_params, find_property,
};

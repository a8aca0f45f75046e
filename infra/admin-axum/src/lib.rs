//! # Admin for Axum
//!
//! Mounts a [`gantry_admin::Admin`] into an application as a module.
//! [`AdminModule::create_admin`] returns a descriptor named `AdminModule` whose options
//! are the admin options (`{"rootPath": "/admin"}`); when the application is constructed
//! the module adds the configured `database.url`, initializes the admin and nests its
//! routes under `rootPath`:
//!
//! | Route | |
//! |---|---|
//! | `GET /` | dashboard |
//! | `GET /resources/{resource}` | record list (`page`, `perPage`) |
//! | `GET /resources/{resource}/records/{id}` | record detail |
//! | `GET /api/resources` | resource metadata |
//! | `GET, POST /api/resources/{resource}/records` | list (`sortBy`, `direction`, `filters.<field>`), create |
//! | `GET, PUT, DELETE /api/resources/{resource}/records/{id}` | show, update, delete |

mod error;
mod module;
mod routes;

pub use crate::error::{AdminHttpError, AdminHttpErrorExt};
pub use crate::module::{ADMIN_MODULE, AdminModule, AdminModuleOptions};

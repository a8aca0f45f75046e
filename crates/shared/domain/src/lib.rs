//! # Domain Models
//!
//! Pure data shared by every crate: configuration, well-known constants and the
//! feature-slice registry. Keep it free of I/O and runtime dependencies.

pub mod config;
pub mod constants;
pub mod registry;

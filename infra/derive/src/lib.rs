#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the workspace crates.
//!
//! * [`macro@gantry_error`] turns an enum into a context-aware `thiserror` error.
//! * [`macro@gantry_slice`] turns a struct into a registrable feature slice handle.
//! * [`macro@main`] boots an `async fn main` on a tuned Tokio runtime.
//! * [`macro@api_model`] and [`macro@api_handler`] keep DTOs and handlers aligned with `OpenAPI`.
//!
//! The examples below are `ignore`d because proc-macro crates cannot use their own output.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the specialized Tokio runtime.
///
/// Turns an `async fn main() -> Result<..>` into a blocking `fn main` that builds a runtime
/// from one of the `gantry_runtime::RuntimeConfig` presets.
///
/// # Arguments
///
/// * `high_performance` - Larger stacks and longer keep-alive for servers.
/// * `memory_efficient` - Half the workers, smaller stacks.
/// * `default` (or no argument) - Auto-detected worker count.
///
/// # Examples
///
/// ```rust,ignore
/// #[gantry_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Defines a wire model for JSON APIs.
///
/// Adds `Debug`, `Serialize` and `Deserialize` when missing, `utoipa::ToSchema` when the
/// consuming crate enables its `server` feature, `rename_all = "camelCase"` and
/// `deny_unknown_fields` unless told otherwise.
///
/// # Example
///
/// ```rust,ignore
/// #[gantry_derive::api_model(deny_unknown_fields = false)]
/// pub struct ResourceSummary {
///     pub id: String,
///     pub record_count: u64,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Registers an Axum handler with `utoipa::path` (under the `server` feature).
///
/// # Example
///
/// ```rust,ignore
/// #[gantry_derive::api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Defines a crate error enum.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and for
///   `Result<T, Source>` of every variant carrying a `source` field.
/// * `From<Source>` for those variants.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * `ErrorName::kind()` returning the variant name, handy for structured logs.
///
/// # Requirements
///
/// Variants use named fields. A variant with a `source` (or `#[source]`/`#[from]`) field
/// must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[gantry_derive::gantry_error]
/// pub enum AdapterError {
///     #[error("Query failed{}: {source}", format_context(.context))]
///     Query { source: sqlx::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal adapter error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn count() -> Result<i64, AdapterError> {
///     run_query().context("Counting rows")
/// }
/// ```
#[proc_macro_attribute]
pub fn gantry_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Defines a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` wraps it in an `Arc`, derefs to it
/// and implements `gantry_kernel::domain::registry::FeatureSlice`.
///
/// # Example
/// ```rust,ignore
/// #[gantry_derive::gantry_slice]
/// pub struct Backoffice {
///     pub root_path: String,
/// }
///
/// let slice = Backoffice::new(BackofficeInner { root_path: "/admin".to_owned() });
/// assert_eq!(slice.root_path, "/admin");
/// ```
#[proc_macro_attribute]
pub fn gantry_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}

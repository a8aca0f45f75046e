//! Module descriptors and their resolution.
//!
//! A [`ModuleDescriptor`] names a module, the modules it imports and the options passed to
//! it. Descriptors are plain data until the application is constructed; at that point
//! [`resolve_modules`] walks the tree and runs each module's [`ModuleProvider`] once.

use async_trait::async_trait;
use axum::Router;
use fxhash::FxHashSet;
use gantry_domain::config::ApiConfig;
use gantry_domain::registry::InitializedSlice;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Boxed error produced by a module provider.
pub type ProviderError = Box<dyn StdError + Send + Sync + 'static>;

#[gantry_derive::gantry_error]
pub enum ModuleError {
    #[error("Module validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Module options error{}: {source}", format_context(.context))]
    Options { source: serde_json::Error, context: Option<Cow<'static, str>> },
    #[error("Module provider error{}: {source}", format_context(.context))]
    Provider { source: ProviderError, context: Option<Cow<'static, str>> },
    #[error("Internal module error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ModuleError {
    /// Wraps a provider's own error type.
    pub fn provider(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Provider { source: Box::new(err), context: None }
    }
}

/// What a module has access to while it initializes.
#[derive(Debug)]
pub struct ModuleContext<'a> {
    pub name: &'a str,
    pub options: &'a Map<String, Value>,
    pub config: &'a ApiConfig,
}

/// Everything a module contributes to the application.
#[derive(Debug, Default)]
pub struct ModuleOutput {
    /// Routes merged into the application router. State must already be applied.
    pub router: Option<Router>,
    pub slices: Vec<InitializedSlice>,
}

impl ModuleOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    #[must_use]
    pub fn slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.push(slice);
        self
    }
}

/// Deferred initialization hook of a module.
#[async_trait]
pub trait ModuleProvider: Send + Sync + 'static {
    /// Runs once, when the application is constructed.
    async fn init(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError>;
}

/// Describes a module: its name, the modules it imports and its options.
///
/// Created at startup, consumed once by [`resolve_modules`].
#[derive(Clone)]
pub struct ModuleDescriptor {
    name: Cow<'static, str>,
    imports: Vec<ModuleDescriptor>,
    options: Map<String, Value>,
    provider: Option<Arc<dyn ModuleProvider>>,
}

impl ModuleDescriptor {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), imports: Vec::new(), options: Map::new(), provider: None }
    }

    #[must_use]
    pub fn import(mut self, module: Self) -> Self {
        self.imports.push(module);
        self
    }

    #[must_use]
    pub fn imports(mut self, modules: impl IntoIterator<Item = Self>) -> Self {
        self.imports.extend(modules);
        self
    }

    /// Serializes typed options into the descriptor.
    ///
    /// # Errors
    /// [`ModuleError::Options`] if `options` fails to serialize, or
    /// [`ModuleError::Validation`] if it does not serialize to a JSON object.
    pub fn options<T: Serialize>(mut self, options: &T) -> Result<Self, ModuleError> {
        let value = serde_json::to_value(options).context(format!("Options of {}", self.name))?;
        let Value::Object(map) = value else {
            return Err(ModuleError::Validation {
                message: "module options must serialize to an object".into(),
                context: Some(self.name.clone()),
            });
        };
        self.options = map;
        Ok(self)
    }

    #[must_use]
    pub fn provider(mut self, provider: impl ModuleProvider) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn imported(&self) -> &[Self] {
        &self.imports
    }

    #[must_use]
    pub const fn options_map(&self) -> &Map<String, Value> {
        &self.options
    }

    #[must_use]
    pub const fn has_provider(&self) -> bool {
        self.provider.is_some()
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("imports", &self.imports)
            .field("options", &self.options)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

/// Deep equality on names, imports and options; providers compare by identity.
impl PartialEq for ModuleDescriptor {
    fn eq(&self, other: &Self) -> bool {
        let same_provider = match (&self.provider, &other.provider) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        same_provider
            && self.name == other.name
            && self.options == other.options
            && self.imports == other.imports
    }
}

/// Output of [`resolve_modules`].
#[derive(Debug, Default)]
pub struct ResolvedModules {
    /// Module names in initialization order.
    pub order: Vec<String>,
    pub routers: Vec<Router>,
    pub slices: Vec<InitializedSlice>,
}

/// Initializes the descriptor tree rooted at `root`.
///
/// Imports are initialized before the module importing them, and a module name is
/// initialized at most once. The first provider error aborts resolution.
///
/// # Errors
/// The first [`ModuleError`] returned by a provider, with the module name as context.
pub async fn resolve_modules(
    root: &ModuleDescriptor,
    config: &ApiConfig,
) -> Result<ResolvedModules, ModuleError> {
    let mut seen = FxHashSet::default();
    let mut plan = Vec::new();
    plan_modules(root, &mut seen, &mut plan);

    let mut resolved = ResolvedModules::default();
    for module in plan {
        let name = module.name();
        if let Some(provider) = &module.provider {
            debug!(module = name, "Initializing module");
            let ctx = ModuleContext { name, options: &module.options, config };
            let output =
                provider.init(&ctx).await.context(format!("Initializing module {name}"))?;

            resolved.routers.extend(output.router);
            resolved.slices.extend(output.slices);
        }
        info!(module = name, "Module initialized");
        resolved.order.push(name.to_owned());
    }

    Ok(resolved)
}

fn plan_modules<'a>(
    module: &'a ModuleDescriptor,
    seen: &mut FxHashSet<&'a str>,
    plan: &mut Vec<&'a ModuleDescriptor>,
) {
    if seen.contains(module.name()) {
        return;
    }
    for import in &module.imports {
        plan_modules(import, seen, plan);
    }
    if seen.insert(module.name()) {
        plan.push(module);
    }
}

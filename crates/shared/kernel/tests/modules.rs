use async_trait::async_trait;
use gantry_kernel::domain::config::ApiConfig;
use gantry_kernel::domain::registry::{FeatureSlice, InitializedSlice};
use gantry_kernel::module::{
    ModuleContext, ModuleDescriptor, ModuleError, ModuleOutput, ModuleProvider, resolve_modules,
};
use serde_json::{Value, json};
use std::any::Any;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct Marker(&'static str);

impl FeatureSlice for Marker {
    fn name(&self) -> &'static str {
        self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Counting {
    calls: Arc<AtomicUsize>,
    saw_port: Arc<AtomicUsize>,
}

#[async_trait]
impl ModuleProvider for Counting {
    async fn init(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.saw_port.store(usize::from(ctx.config.server.port), Ordering::SeqCst);
        Ok(ModuleOutput::new().slice(InitializedSlice::new(Marker("counting"))))
    }
}

struct Failing;

#[async_trait]
impl ModuleProvider for Failing {
    async fn init(&self, _ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        Err(ModuleError::Validation { message: "boom".into(), context: None })
    }
}

struct EchoOptions {
    seen: Arc<Mutex<Option<Value>>>,
}

#[async_trait]
impl ModuleProvider for EchoOptions {
    async fn init(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        if let Ok(mut slot) = self.seen.lock() {
            *slot = Some(Value::Object(ctx.options.clone()));
        }
        Ok(ModuleOutput::new())
    }
}

#[tokio::test]
async fn imports_resolve_before_importers_and_once_per_name() -> Result<(), ModuleError> {
    let calls = Arc::new(AtomicUsize::new(0));
    let saw_port = Arc::new(AtomicUsize::new(0));
    let shared = ModuleDescriptor::new("Shared")
        .provider(Counting { calls: calls.clone(), saw_port: saw_port.clone() });

    let root = ModuleDescriptor::new("Root")
        .import(ModuleDescriptor::new("Left").import(shared.clone()))
        .import(ModuleDescriptor::new("Right").import(shared));

    let resolved = resolve_modules(&root, &ApiConfig::default()).await?;

    assert_eq!(resolved.order, ["Shared", "Left", "Right", "Root"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(saw_port.load(Ordering::SeqCst), 3000);
    assert_eq!(resolved.slices.len(), 1);
    assert_eq!(resolved.slices[0].name, "counting");
    Ok(())
}

#[tokio::test]
async fn first_provider_error_aborts_resolution() {
    let calls = Arc::new(AtomicUsize::new(0));
    let root = ModuleDescriptor::new("Root")
        .import(ModuleDescriptor::new("Broken").provider(Failing))
        .import(ModuleDescriptor::new("Later").provider(Counting {
            calls: calls.clone(),
            saw_port: Arc::new(AtomicUsize::new(0)),
        }));

    let err = resolve_modules(&root, &ApiConfig::default()).await.unwrap_err();

    assert!(matches!(err, ModuleError::Validation { .. }));
    assert!(err.to_string().contains("Initializing module Broken"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn providers_receive_their_options() -> Result<(), ModuleError> {
    let seen = Arc::new(Mutex::new(None));
    let root = ModuleDescriptor::new("Configured")
        .options(&json!({ "rootPath": "/admin" }))?
        .provider(EchoOptions { seen: seen.clone() });

    resolve_modules(&root, &ApiConfig::default()).await?;

    let captured = seen.lock().ok().and_then(|slot| slot.clone());
    assert_eq!(captured, Some(json!({ "rootPath": "/admin" })));
    Ok(())
}

#[test]
fn descriptor_without_options_has_an_empty_object() {
    let module = ModuleDescriptor::new("Bare");
    assert!(module.options_map().is_empty());
    assert!(!module.has_provider());
}

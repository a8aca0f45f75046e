mod common;

use common::{MemoryAdapter, MemoryResource};
use gantry_admin::{
    AdapterRegistry, Admin, AdminError, AdminKit, AdminOptions, ConnectOptions, Direction,
    Filter, FindOptions, ResourceAdapter,
};
use serde_json::json;
use serial_test::serial;

fn admin_with(registry: &AdapterRegistry, databases: &[&str]) -> Result<Admin, AdminError> {
    let options = databases
        .iter()
        .fold(AdminOptions::new("/admin"), |options, url| options.database(*url));
    Admin::with_registry(options, registry.clone())
}

#[test]
fn registration_is_idempotent_per_name() {
    let registry = AdapterRegistry::new();

    assert!(registry.register(MemoryAdapter::named("memory")));
    assert!(!registry.register(MemoryAdapter::named("memory")));
    assert!(registry.register(MemoryAdapter::named("memory-replica")));

    assert_eq!(registry.names(), ["memory", "memory-replica"]);
    assert!(registry.find_for("memory:one").is_some());
    assert!(registry.find_for("postgres://db").is_none());
}

#[test]
#[serial]
fn global_registration_happens_once() {
    assert!(AdminKit::register_adapter(MemoryAdapter::named("memory-global")));
    assert!(!AdminKit::register_adapter(MemoryAdapter::named("memory-global")));
    assert!(AdminKit::registry().contains("memory-global"));
    assert_eq!(AdminKit::adapter_names().iter().filter(|n| *n == "memory-global").count(), 1);
}

#[tokio::test]
async fn unclaimed_url_fails_with_no_adapter() -> Result<(), AdminError> {
    let registry = AdapterRegistry::new();
    registry.register(MemoryAdapter::named("memory"));
    let mut admin = admin_with(&registry, &["postgres://elsewhere"])?;

    let err = admin.initialize().await.unwrap_err();
    assert!(matches!(err, AdminError::NoAdapter { ref url, .. } if url == "postgres://elsewhere"));
    Ok(())
}

#[tokio::test]
async fn resources_are_discovered_and_must_be_unique() -> Result<(), AdminError> {
    let registry = AdapterRegistry::new();
    registry.register(MemoryAdapter::named("memory"));

    let mut admin = admin_with(&registry, &["memory:a"])?;
    admin.initialize().await?;
    assert_eq!(admin.resource_ids().collect::<Vec<_>>(), ["tasks"]);
    assert_eq!(admin.metadata()[0].id_property.as_deref(), Some("id"));

    let mut twice = admin_with(&registry, &["memory:a", "memory:b"])?;
    let err = twice.initialize().await.unwrap_err();
    assert!(matches!(err, AdminError::DuplicateResource { ref id, .. } if id == "tasks"));
    Ok(())
}

#[tokio::test]
async fn pool_size_is_passed_to_every_connection() -> Result<(), AdminError> {
    let adapter = MemoryAdapter::named("memory");
    let connects = adapter.connects.clone();
    let registry = AdapterRegistry::new();
    registry.register(adapter);

    let mut admin = Admin::with_registry(
        AdminOptions::new("/admin").database("memory:a").max_connections(7),
        registry.clone(),
    )?;
    admin.initialize().await?;

    let mut defaults = admin_with(&registry, &["memory:b"])?;
    defaults.initialize().await?;

    assert_eq!(*connects.lock(), [ConnectOptions::new().max_connections(7), ConnectOptions::new()]);
    Ok(())
}

#[tokio::test]
async fn no_databases_render_an_empty_dashboard() -> Result<(), AdminError> {
    let mut admin = admin_with(&AdapterRegistry::new(), &[])?;
    admin.initialize().await?;

    let html = admin.dashboard_page().await?;
    assert!(html.contains("No database is connected"));
    Ok(())
}

#[tokio::test]
async fn pages_render_records() -> Result<(), AdminError> {
    let registry = AdapterRegistry::new();
    registry.register(MemoryAdapter::named("memory"));
    let mut admin = admin_with(&registry, &["memory:a"])?;
    admin.initialize().await?;

    let dashboard = admin.dashboard_page().await?;
    assert!(dashboard.contains("tasks"));
    assert!(dashboard.contains("30"));

    let list = admin.list_page("tasks", &Filter::new(), &FindOptions::page(2, 10)).await?;
    assert!(list.contains("task 11"));
    assert!(!list.contains("task 21"));
    assert!(list.contains("Page 2 of 3"));

    let detail = admin.detail_page("tasks", "5").await?;
    assert!(detail.contains("task 5"));

    let missing = admin.detail_page("tasks", "999").await.unwrap_err();
    assert_eq!(missing.kind(), "NotFound");
    let unknown = admin.list_page("users", &Filter::new(), &FindOptions::new()).await.unwrap_err();
    assert_eq!(unknown.kind(), "NotFound");
    Ok(())
}

#[tokio::test]
async fn list_page_applies_filters_and_keeps_them_in_links() -> Result<(), AdminError> {
    let registry = AdapterRegistry::new();
    registry.register(MemoryAdapter::named("memory"));
    let mut admin = admin_with(&registry, &["memory:a"])?;
    admin.initialize().await?;

    let filter = Filter::new().with("title", "task 1");
    let list = admin.list_page("tasks", &filter, &FindOptions::page(1, 5)).await?;

    assert!(list.contains("11 records"));
    assert!(list.contains("Page 1 of 3"));
    assert!(!list.contains("task 2<"));
    assert!(list.contains("?page=2&amp;perPage=5&amp;filters.title=task+1"));

    let unknown = FindOptions::new().sort("colour", Direction::Asc);
    let err = admin.list_page("tasks", &Filter::new(), &unknown).await.unwrap_err();
    assert_eq!(err.kind(), "Validation");
    Ok(())
}

#[tokio::test]
async fn filters_follow_property_types() -> Result<(), AdminError> {
    let tasks = MemoryResource::tasks(12);

    let by_title = Filter::new().with("title", "task 1");
    assert_eq!(tasks.count(&by_title).await?, 4);

    let done = Filter::new().with("done", "true");
    assert_eq!(tasks.find(&done, &FindOptions::new().limit(3)).await?.len(), 3);

    let created = tasks.create(common::object(json!({ "title": "new", "done": false }))).await?;
    assert_eq!(created.id, "13");

    let rejected = tasks.create(common::object(json!({ "colour": "red" }))).await.unwrap_err();
    assert_eq!(rejected.kind(), "Validation");
    Ok(())
}

use gantry_admin::{
    Adapter, AdminError, ConnectOptions, DatabaseAdapter, Direction, Filter, FindOptions, PropertyType,
    ResourceAdapter,
};
use gantry_admin_sqlx::{SqliteAdapter, SqliteDatabase};
use serde_json::{Map, Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

const SCHEMA: &str = r#"
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        email VARCHAR(255) NOT NULL,
        active BOOLEAN NOT NULL DEFAULT 1,
        meta JSON
    );
    CREATE TABLE notes (body TEXT, score REAL);

    INSERT INTO users (email, active, meta) VALUES
        ('ada@example.com', 1, '{"role":"admin"}'),
        ('bob@example.com', 0, NULL),
        ('carol@example.com', 1, NULL);
    INSERT INTO notes (body, score) VALUES ('first', 1.5), ('second', NULL);
"#;

async fn seed(pool: &SqlitePool) {
    sqlx::raw_sql(SCHEMA).execute(pool).await.expect("seed schema");
}

async fn memory_database() -> SqliteDatabase {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database");
    seed(&pool).await;
    SqliteDatabase::from_pool("memory", pool)
}

async fn resource(database: &SqliteDatabase, id: &str) -> Arc<dyn ResourceAdapter> {
    database
        .resources()
        .await
        .expect("introspect")
        .into_iter()
        .find(|resource| resource.id() == id)
        .expect("resource exists")
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[tokio::test]
async fn tables_become_resources() -> Result<(), AdminError> {
    let database = memory_database().await;
    let resources = database.resources().await?;
    let ids = resources.iter().map(|r| r.id()).collect::<Vec<_>>();
    assert_eq!(ids, ["notes", "users"]);

    let users = &resources[1];
    let kinds = users.properties().iter().map(|p| (p.name.as_str(), p.kind)).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        [
            ("id", PropertyType::Integer),
            ("email", PropertyType::String),
            ("active", PropertyType::Boolean),
            ("meta", PropertyType::Json),
        ]
    );
    assert_eq!(users.id_property().map(|p| p.name.as_str()), Some("id"));
    assert!(!users.properties()[1].nullable);

    let notes = &resources[0];
    let names = notes.properties().iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["rowid", "body", "score"]);
    assert_eq!(notes.id_property().map(|p| p.kind), Some(PropertyType::Integer));
    Ok(())
}

#[tokio::test]
async fn rows_decode_by_declared_type() -> Result<(), AdminError> {
    let users = resource(&memory_database().await, "users").await;
    let records = users.find(&Filter::new(), &FindOptions::new()).await?;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[0].params["active"], json!(true));
    assert_eq!(records[0].params["meta"], json!({ "role": "admin" }));
    assert_eq!(records[1].params["active"], json!(false));
    assert_eq!(records[1].params["meta"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn filters_sorting_and_paging() -> Result<(), AdminError> {
    let users = resource(&memory_database().await, "users").await;

    assert_eq!(users.count(&Filter::new()).await?, 3);
    assert_eq!(users.count(&Filter::new().with("email", "BOB")).await?, 1);
    assert_eq!(users.count(&Filter::new().with("active", "true")).await?, 2);
    assert_eq!(users.count(&Filter::new().with("email", "%")).await?, 0);

    let sorted = users
        .find(&Filter::new(), &FindOptions::new().sort("email", Direction::Desc))
        .await?;
    assert_eq!(sorted[0].params["email"], json!("carol@example.com"));

    let last_page = users.find(&Filter::new(), &FindOptions::page(2, 2)).await?;
    assert_eq!(last_page.len(), 1);
    assert_eq!(last_page[0].id, "3");
    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_rejected() {
    let users = resource(&memory_database().await, "users").await;

    let err = users.create(object(json!({ "color": "red" }))).await.unwrap_err();
    assert_eq!(err.kind(), "Validation");

    let err = users
        .find(&Filter::new(), &FindOptions::new().sort("color", Direction::Asc))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "Validation");

    let err = users.count(&Filter::new().with("id", "seven")).await.unwrap_err();
    assert_eq!(err.kind(), "Validation");
}

#[tokio::test]
async fn crud_by_primary_key() -> Result<(), AdminError> {
    let users = resource(&memory_database().await, "users").await;

    let created = users.create(object(json!({ "email": "dan@example.com" }))).await?;
    assert_eq!(created.id, "4");
    assert_eq!(created.params["active"], json!(true));

    let updated = users.update("4", object(json!({ "active": false }))).await?;
    assert_eq!(updated.params["active"], json!(false));
    assert_eq!(updated.params["email"], json!("dan@example.com"));

    let unchanged = users.update("4", Map::new()).await?;
    assert_eq!(unchanged, updated);

    users.delete("4").await?;
    assert!(users.find_one("4").await?.is_none());

    assert_eq!(users.delete("4").await.unwrap_err().kind(), "NotFound");
    assert_eq!(users.update("42", object(json!({ "active": true }))).await.unwrap_err().kind(), "NotFound");
    assert!(users.find_one("not-a-number").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn crud_by_rowid() -> Result<(), AdminError> {
    let notes = resource(&memory_database().await, "notes").await;

    let first = notes.find_one("1").await?.expect("first note");
    assert_eq!(first.params["body"], json!("first"));
    assert_eq!(first.params["score"], json!(1.5));

    let updated = notes.update("2", object(json!({ "score": 2.5 }))).await?;
    assert_eq!(updated.params["score"], json!(2.5));

    let blank = notes.create(Map::new()).await?;
    assert_eq!(blank.id, "3");
    assert_eq!(blank.params["body"], Value::Null);

    notes.delete("1").await?;
    assert_eq!(notes.count(&Filter::new()).await?, 2);
    Ok(())
}

#[tokio::test]
async fn connects_file_databases() -> Result<(), AdminError> {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("app.db").display());

    let pool = SqlitePoolOptions::new().connect(&url).await.expect("create database file");
    seed(&pool).await;
    pool.close().await;

    let adapter = SqliteAdapter::new();
    assert!(adapter.is_adapter_for(&url));

    let database = adapter.connect(&url, &ConnectOptions::new()).await?;
    assert_eq!(database.name(), url);
    assert_eq!(database.resources().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn requested_pool_size_reaches_the_pool() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("pool.db").display());
    let adapter = SqliteAdapter::new().with_max_connections(4);

    let configured = adapter.open(&url, &ConnectOptions::new().max_connections(2)).await?;
    assert_eq!(configured.pool().options().get_max_connections(), 2);

    let fallback = adapter.open(&url, &ConnectOptions::new()).await?;
    assert_eq!(fallback.pool().options().get_max_connections(), 4);

    let memory = adapter.open("sqlite::memory:", &ConnectOptions::new().max_connections(9)).await?;
    assert_eq!(memory.pool().options().get_max_connections(), 1);
    Ok(())
}

#[tokio::test]
async fn unreachable_database_is_a_database_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=ro", dir.path().join("missing.db").display());

    let Err(err) = SqliteAdapter::new().connect(&url, &ConnectOptions::new()).await else {
        panic!("read-only open of a missing file succeeded");
    };
    assert_eq!(err.kind(), "Database");
}

//! In-memory adapter used to drive the admin in tests.

use async_trait::async_trait;
use gantry_admin::{
    Adapter, AdminError, ConnectOptions, DatabaseAdapter, Filter, FindOptions, Matcher, Property, PropertyType,
    Record, ResourceAdapter, check_params,
};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const SCHEME: &str = "memory:";

/// Records the options of every `connect` call.
#[derive(Debug)]
pub struct MemoryAdapter {
    pub name: &'static str,
    pub connects: Arc<Mutex<Vec<ConnectOptions>>>,
}

impl MemoryAdapter {
    pub fn named(name: &'static str) -> Self {
        Self { name, connects: Arc::default() }
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    fn name(&self) -> &str {
        self.name
    }

    fn is_adapter_for(&self, url: &str) -> bool {
        url.starts_with(SCHEME)
    }

    async fn connect(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> Result<Box<dyn DatabaseAdapter>, AdminError> {
        self.connects.lock().push(*options);
        Ok(Box::new(MemoryDatabase { name: url.to_owned() }))
    }
}

struct MemoryDatabase {
    name: String,
}

#[async_trait]
impl DatabaseAdapter for MemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resources(&self) -> Result<Vec<Arc<dyn ResourceAdapter>>, AdminError> {
        Ok(vec![Arc::new(MemoryResource::tasks(30))])
    }
}

pub struct MemoryResource {
    properties: Vec<Property>,
    rows: Mutex<Vec<Record>>,
}

impl MemoryResource {
    pub fn tasks(count: usize) -> Self {
        let rows = (1..=count)
            .map(|i| Record {
                id: i.to_string(),
                params: object(json!({ "id": i, "title": format!("task {i}"), "done": i % 2 == 0 })),
            })
            .collect();
        Self {
            properties: vec![
                Property::new("id", PropertyType::Integer).id(),
                Property::new("title", PropertyType::String).required(),
                Property::new("done", PropertyType::Boolean),
            ],
            rows: Mutex::new(rows),
        }
    }

    fn matching(&self, filter: &Filter) -> Result<Vec<Record>, AdminError> {
        let conditions = filter.resolve(&self.properties)?;
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|row| {
                conditions.iter().all(|c| match (&c.matcher, row.params.get(&c.property)) {
                    (Matcher::Contains(needle), Some(Value::String(s))) => s.contains(needle.as_str()),
                    (Matcher::Equals(expected), Some(actual)) => expected == actual,
                    _ => false,
                })
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ResourceAdapter for MemoryResource {
    fn id(&self) -> &str {
        "tasks"
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }

    async fn count(&self, filter: &Filter) -> Result<u64, AdminError> {
        Ok(self.matching(filter)?.len() as u64)
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Record>, AdminError> {
        let rows = self.matching(filter)?;
        let offset = usize::try_from(options.offset).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(options.limit as usize).collect())
    }

    async fn find_one(&self, id: &str) -> Result<Option<Record>, AdminError> {
        Ok(self.rows.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, params: Map<String, Value>) -> Result<Record, AdminError> {
        check_params(&self.properties, &params)?;
        let mut rows = self.rows.lock();
        let id = (rows.len() + 1).to_string();
        let record = Record { id, params };
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, params: Map<String, Value>) -> Result<Record, AdminError> {
        check_params(&self.properties, &params)?;
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AdminError::not_found(format!("record '{id}'")))?;
        row.params.extend(params);
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AdminError> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(AdminError::not_found(format!("record '{id}'")));
        }
        Ok(())
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

use crate::adapter::{ConnectOptions, ResourceAdapter};
use crate::error::{AdminError, AdminErrorExt};
use crate::options::AdminOptions;
use crate::registry::AdapterRegistry;
use crate::resource::{Direction, Filter, FindOptions, Property, find_property};
use crate::views::{Column, DashboardCard, DetailField, Layout, Pager, Row, Views, truncate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

const LIST_CELL_CHARS: usize = 80;

/// Resource description served to API clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    pub id: String,
    pub id_property: Option<String>,
    pub properties: Vec<Property>,
}

/// An admin instance: options, discovered resources and the views rendering them.
pub struct Admin {
    options: AdminOptions,
    registry: AdapterRegistry,
    resources: BTreeMap<String, Arc<dyn ResourceAdapter>>,
    views: Views,
}

impl Admin {
    /// Creates an admin resolving databases through `registry`.
    ///
    /// # Errors
    /// [`AdminError::Template`] if the built-in views fail to compile.
    pub fn with_registry(options: AdminOptions, registry: AdapterRegistry) -> Result<Self, AdminError> {
        Ok(Self { options, registry, resources: BTreeMap::new(), views: Views::new()? })
    }

    /// Connects every configured database and collects its resources.
    ///
    /// Each URL goes to the first registered adapter that claims it. Calling this again
    /// replaces the previously discovered resources.
    ///
    /// # Errors
    /// * [`AdminError::NoAdapter`] if no adapter claims a URL.
    /// * [`AdminError::DuplicateResource`] if two databases expose the same resource id.
    /// * Any error raised by an adapter while connecting or introspecting.
    #[instrument(skip(self), fields(root_path = %self.options.root_path))]
    pub async fn initialize(&mut self) -> Result<(), AdminError> {
        let mut resources = BTreeMap::new();
        let connect = ConnectOptions { max_connections: self.options.max_connections };

        for url in &self.options.databases {
            let adapter = self
                .registry
                .find_for(url)
                .ok_or_else(|| AdminError::NoAdapter { url: url.clone(), context: None })?;

            let database = adapter
                .connect(url, &connect)
                .await
                .context(format!("Connecting with {}", adapter.name()))?;
            let found =
                database.resources().await.context(format!("Introspecting {}", database.name()))?;

            info!(
                adapter = adapter.name(),
                database = database.name(),
                resources = found.len(),
                "Resources discovered"
            );

            for resource in found {
                match resources.entry(resource.id().to_owned()) {
                    Entry::Occupied(entry) => {
                        return Err(AdminError::DuplicateResource {
                            id: entry.key().clone(),
                            context: Some(database.name().to_owned().into()),
                        });
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(resource);
                    }
                }
            }
        }

        self.resources = resources;
        Ok(())
    }

    #[must_use]
    pub const fn options(&self) -> &AdminOptions {
        &self.options
    }

    #[must_use]
    pub fn root_path(&self) -> &str {
        &self.options.root_path
    }

    /// Resource ids, sorted.
    pub fn resource_ids(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// # Errors
    /// [`AdminError::NotFound`] for an unknown resource id.
    pub fn resource(&self, id: &str) -> Result<&Arc<dyn ResourceAdapter>, AdminError> {
        self.resources
            .get(id)
            .ok_or_else(|| AdminError::not_found(format!("resource '{id}'")))
    }

    #[must_use]
    pub fn metadata(&self) -> Vec<ResourceMeta> {
        self.resources
            .values()
            .map(|resource| ResourceMeta {
                id: resource.id().to_owned(),
                id_property: resource.id_property().map(|p| p.name.clone()),
                properties: resource.properties().to_vec(),
            })
            .collect()
    }

    /// Renders the dashboard: every resource with its record count.
    ///
    /// # Errors
    /// Adapter or template failures.
    pub async fn dashboard_page(&self) -> Result<String, AdminError> {
        let mut cards = Vec::with_capacity(self.resources.len());
        for resource in self.resources.values() {
            let count = resource.count(&Filter::new()).await.context(resource.id().to_owned())?;
            cards.push(DashboardCard { id: resource.id().to_owned(), count });
        }
        self.views.dashboard(&self.layout("Dashboard"), &cards)
    }

    /// Renders the page of a resource's records selected by `filter` and `options`.
    ///
    /// Pager links keep the page size, sort and filters.
    ///
    /// # Errors
    /// * [`AdminError::NotFound`] for an unknown resource.
    /// * [`AdminError::Validation`] for unknown sort or filter properties.
    /// * Adapter or template failures.
    pub async fn list_page(
        &self,
        id: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<String, AdminError> {
        let resource = self.resource(id)?;
        if let Some(sort) = &options.sort {
            find_property(resource.properties(), &sort.property)?;
        }

        let total = resource.count(filter).await?;
        let records = resource.find(filter, options).await?;

        let properties = resource.properties();
        let columns = properties.iter().map(Column::from).collect::<Vec<_>>();
        let rows = records
            .iter()
            .map(|record| Row {
                id: record.id.clone(),
                cells: properties
                    .iter()
                    .map(|p| truncate(record.display(&p.name), LIST_CELL_CHARS))
                    .collect(),
            })
            .collect::<Vec<_>>();

        let limit = options.limit.max(1);
        let page = u32::try_from(options.offset / u64::from(limit))
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1);
        let total_pages = total.div_ceil(u64::from(limit)).max(1);

        self.views.list(
            &self.layout(id),
            id,
            &columns,
            &rows,
            &Pager { page, per_page: limit, total, total_pages, query: pager_query(filter, options)? },
        )
    }

    /// Renders a single record.
    ///
    /// # Errors
    /// [`AdminError::NotFound`] for an unknown resource or record; template failures.
    pub async fn detail_page(&self, id: &str, record_id: &str) -> Result<String, AdminError> {
        let resource = self.resource(id)?;
        let record = resource
            .find_one(record_id)
            .await?
            .ok_or_else(|| AdminError::not_found(format!("record '{record_id}' of '{id}'")))?;

        let fields = resource
            .properties()
            .iter()
            .map(|p| DetailField { name: p.name.clone(), kind: p.kind, value: record.display(&p.name) })
            .collect::<Vec<_>>();

        self.views.detail(&self.layout(id), id, &record.id, &fields)
    }

    fn layout(&self, title: &str) -> Layout {
        Layout {
            title: title.to_owned(),
            company_name: self.options.company_name().to_owned(),
            root_path: self.options.root_path.clone(),
            resources: self.resources.keys().cloned().collect(),
        }
    }
}

/// Query string carried by pager links, without `page`.
fn pager_query(filter: &Filter, options: &FindOptions) -> Result<String, AdminError> {
    let mut pairs = vec![("perPage".to_owned(), options.limit.to_string())];
    if let Some(sort) = &options.sort {
        let direction = match sort.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        pairs.push(("sortBy".to_owned(), sort.property.clone()));
        pairs.push(("direction".to_owned(), direction.to_owned()));
    }
    pairs.extend(filter.iter().map(|(property, value)| (format!("filters.{property}"), value.to_owned())));

    serde_urlencoded::to_string(&pairs).context("Encoding pager links")
}

impl fmt::Debug for Admin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admin")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

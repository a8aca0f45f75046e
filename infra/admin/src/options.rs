use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPANY_NAME: &str = "Gantry Admin";

/// Options of an admin instance.
///
/// Serialized in camelCase; empty `databases`, unset `maxConnections` and absent `branding`
/// are omitted, so
/// `AdminOptions::new("/admin")` serializes to exactly `{"rootPath":"/admin"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOptions {
    pub root_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub databases: Vec<String>,
    /// Pool size requested from adapters for every database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
}

impl AdminOptions {
    pub fn new(root_path: impl Into<String>) -> Self {
        Self { root_path: root_path.into(), databases: Vec::new(), max_connections: None, branding: None }
    }

    /// Adds a database URL; duplicates are ignored.
    #[must_use]
    pub fn database(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !self.databases.contains(&url) {
            self.databases.push(url);
        }
        self
    }

    #[must_use]
    pub const fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    #[must_use]
    pub fn branding(mut self, branding: Branding) -> Self {
        self.branding = Some(branding);
        self
    }

    #[must_use]
    pub fn company_name(&self) -> &str {
        self.branding.as_ref().map_or(DEFAULT_COMPANY_NAME, |b| b.company_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Branding {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self { company_name: company_name.into(), logo: None }
    }
}

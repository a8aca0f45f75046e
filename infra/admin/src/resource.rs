//! Generic resource model shared by every adapter.

use crate::error::AdminError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Default page size of [`FindOptions`].
pub const DEFAULT_LIMIT: u32 = 25;
/// Upper bound of [`FindOptions::limit`].
pub const MAX_LIMIT: u32 = 500;

/// Column type as exposed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    String,
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Json,
    Binary,
}

impl PropertyType {
    /// Filters on these types match substrings instead of whole values.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String | Self::Text)
    }
}

/// One field of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub is_id: bool,
    pub nullable: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, kind: PropertyType) -> Self {
        Self { name: name.into(), kind, is_id: false, nullable: true }
    }

    #[must_use]
    pub const fn id(mut self) -> Self {
        self.is_id = true;
        self.nullable = false;
        self
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A single row of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub params: Map<String, Value>,
}

impl Record {
    /// Display string of a parameter; empty for null or missing values.
    #[must_use]
    pub fn display(&self, property: &str) -> String {
        match self.params.get(property) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// How a filter value is compared.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// Substring match, for textual properties.
    Contains(String),
    /// Whole-value equality, already converted to the property's type.
    Equals(Value),
}

/// A filter condition checked against the resource's properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub property: String,
    pub matcher: Matcher,
}

/// Raw filter values keyed by property name, as they arrive from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    values: BTreeMap<String, String>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition; blank values are ignored.
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(property, value);
        self
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.values.insert(property.into(), value);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Checks every key against `properties` and converts values to typed matchers.
    ///
    /// # Errors
    /// [`AdminError::Validation`] for unknown properties or values that do not parse as
    /// the property's type.
    pub fn resolve(&self, properties: &[Property]) -> Result<Vec<Condition>, AdminError> {
        self.values
            .iter()
            .map(|(name, raw)| {
                let property = find_property(properties, name)?;
                let matcher = if property.kind.is_textual() {
                    Matcher::Contains(raw.clone())
                } else {
                    Matcher::Equals(parse_value(property, raw)?)
                };
                Ok(Condition { property: property.name.clone(), matcher })
            })
            .collect()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

/// Paging and ordering for [`crate::ResourceAdapter::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    pub limit: u32,
    pub offset: u64,
    pub sort: Option<Sort>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, offset: 0, sort: None }
    }
}

impl FindOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a 1-based `page` of `per_page` records.
    #[must_use]
    pub fn page(page: u32, per_page: u32) -> Self {
        let options = Self::new().limit(per_page);
        let offset = u64::from(page.max(1) - 1) * u64::from(options.limit);
        options.offset(offset)
    }

    /// Clamped to `1..=500`.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn sort(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.sort = Some(Sort { property: property.into(), direction });
        self
    }
}

/// Looks up a property by name.
///
/// # Errors
/// [`AdminError::Validation`] when `properties` has no such name.
pub fn find_property<'a>(properties: &'a [Property], name: &str) -> Result<&'a Property, AdminError> {
    properties
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| AdminError::validation(format!("unknown property '{name}'")))
}

/// Rejects parameter names that are not properties of the resource.
///
/// # Errors
/// [`AdminError::Validation`] naming the first unknown parameter.
pub fn check_params(properties: &[Property], params: &Map<String, Value>) -> Result<(), AdminError> {
    params.keys().try_for_each(|name| find_property(properties, name).map(|_| ()))
}

fn parse_value(property: &Property, raw: &str) -> Result<Value, AdminError> {
    let raw = raw.trim();
    let invalid = || {
        AdminError::validation(format!(
            "'{raw}' is not a valid {:?} value for '{}'",
            property.kind, property.name
        ))
    };

    match property.kind {
        PropertyType::Integer => raw.parse::<i64>().map(Value::from).map_err(|_| invalid()),
        PropertyType::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        PropertyType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Value::Bool(true)),
            "false" | "0" | "no" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        _ => Ok(Value::String(raw.to_owned())),
    }
}

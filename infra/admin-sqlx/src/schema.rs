//! Table introspection and SQL fragments.

use crate::error::{SqliteAdapterError, SqliteAdapterErrorExt};
use gantry_admin::{Property, PropertyType};
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

/// Name of the implicit key used when a table has no single-column primary key.
pub(crate) const ROWID: &str = "rowid";

/// Everything needed to query one table.
#[derive(Debug, Clone)]
pub(crate) struct TableSchema {
    pub(crate) table: String,
    pub(crate) properties: Vec<Property>,
    /// Name of the id property; [`ROWID`] for tables without a single primary key.
    pub(crate) id: String,
    pub(crate) id_kind: PropertyType,
    /// Whether [`Self::id`] is SQLite's implicit rowid.
    pub(crate) rowid: bool,
    /// `SELECT` list, one expression per property, in property order.
    pub(crate) select_list: String,
}

impl TableSchema {
    /// SQL expression addressing the id.
    pub(crate) fn id_expr(&self) -> String {
        if self.rowid { ROWID.to_owned() } else { quote_ident(&self.id) }
    }
}

/// Double-quotes an identifier, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Maps a declared column type to a property type, following SQLite's affinity rules with
/// a few extra names (`BOOLEAN`, `DATETIME`, `JSON`).
pub(crate) fn property_type(declared: &str) -> PropertyType {
    let declared = declared.to_ascii_uppercase();
    let has = |needle: &str| declared.contains(needle);

    if has("BOOL") {
        PropertyType::Boolean
    } else if has("DATE") || has("TIME") {
        PropertyType::DateTime
    } else if has("JSON") {
        PropertyType::Json
    } else if has("INT") {
        PropertyType::Integer
    } else if has("CHAR") {
        PropertyType::String
    } else if has("CLOB") || has("TEXT") {
        PropertyType::Text
    } else if has("BLOB") {
        PropertyType::Binary
    } else if has("REAL") || has("FLOA") || has("DOUB") || has("NUM") || has("DEC") {
        PropertyType::Float
    } else {
        PropertyType::String
    }
}

/// Reads every user table of the database.
///
/// `WITHOUT ROWID` tables lacking a single-column primary key are skipped.
pub(crate) async fn introspect(pool: &SqlitePool) -> Result<Vec<TableSchema>, SqliteAdapterError> {
    let tables = sqlx::query(
        "SELECT name, COALESCE(sql, '') AS sql FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .context("Listing tables")?;

    let mut schemas = Vec::with_capacity(tables.len());
    for table in tables {
        let name: String = table.try_get("name").context("Reading table name")?;
        let sql: String = table.try_get("sql").context("Reading table definition")?;

        match table_schema(pool, &name, &sql).await {
            Ok(schema) => {
                debug!(table = %name, columns = schema.properties.len(), "Table introspected");
                schemas.push(schema);
            }
            Err(SqliteAdapterError::Introspection { message, .. }) => {
                warn!(table = %name, reason = %message, "Skipping table");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(schemas)
}

async fn table_schema(
    pool: &SqlitePool,
    table: &str,
    sql: &str,
) -> Result<TableSchema, SqliteAdapterError> {
    let columns = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(table)))
        .fetch_all(pool)
        .await
        .context(format!("Reading columns of {table}"))?;

    let mut properties = Vec::with_capacity(columns.len() + 1);
    let mut primary_keys = Vec::new();
    for column in &columns {
        let name: String = column.try_get("name")?;
        let declared: String = column.try_get::<Option<String>, _>("type")?.unwrap_or_default();
        let not_null: i64 = column.try_get("notnull")?;
        let pk: i64 = column.try_get("pk")?;

        if pk > 0 {
            primary_keys.push(name.clone());
        }
        properties.push(Property {
            name,
            kind: property_type(&declared),
            is_id: false,
            nullable: not_null == 0 && pk == 0,
        });
    }

    if let [single] = primary_keys.as_slice() {
        let id = single.clone();
        let mut id_kind = PropertyType::String;
        for property in &mut properties {
            if property.name == id {
                property.is_id = true;
                property.nullable = false;
                id_kind = property.kind;
            }
        }
        let select_list = select_list(&properties, false);
        return Ok(TableSchema {
            table: table.to_owned(),
            properties,
            id,
            id_kind,
            rowid: false,
            select_list,
        });
    }

    if sql.to_ascii_uppercase().contains("WITHOUT ROWID") {
        return Err(SqliteAdapterError::Introspection {
            message: "WITHOUT ROWID table without a single-column primary key".into(),
            context: None,
        });
    }
    if properties.iter().any(|p| p.name.eq_ignore_ascii_case(ROWID)) {
        return Err(SqliteAdapterError::Introspection {
            message: "column named rowid shadows the implicit key".into(),
            context: None,
        });
    }

    properties.insert(0, Property::new(ROWID, PropertyType::Integer).id());
    let select_list = select_list(&properties, true);
    Ok(TableSchema {
        table: table.to_owned(),
        properties,
        id: ROWID.to_owned(),
        id_kind: PropertyType::Integer,
        rowid: true,
        select_list,
    })
}

fn select_list(properties: &[Property], rowid_first: bool) -> String {
    properties
        .iter()
        .enumerate()
        .map(|(index, property)| {
            if rowid_first && index == 0 {
                format!("{ROWID} AS {}", quote_ident(ROWID))
            } else {
                quote_ident(&property.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

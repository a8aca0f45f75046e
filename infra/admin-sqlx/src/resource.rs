use crate::error::{SqliteAdapterError, SqliteAdapterErrorExt};
use crate::schema::{ROWID, TableSchema, quote_ident};
use async_trait::async_trait;
use gantry_admin::{
    AdminError, Direction, Filter, FindOptions, Matcher, Property, PropertyType, Record,
    ResourceAdapter, check_params, find_property,
};
use serde_json::{Map, Number, Value};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, TypeInfo, ValueRef};
use std::fmt::{self, Write};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// One table exposed as an admin resource.
pub(crate) struct SqliteResource {
    pool: SqlitePool,
    schema: TableSchema,
}

impl SqliteResource {
    pub(crate) const fn new(pool: SqlitePool, schema: TableSchema) -> Self {
        Self { pool, schema }
    }

    fn table(&self) -> String {
        quote_ident(&self.schema.table)
    }

    fn column(&self, name: &str) -> String {
        if self.schema.rowid && name == ROWID { ROWID.to_owned() } else { quote_ident(name) }
    }

    /// `WHERE` clause of `filter` with the values to bind, in placeholder order.
    fn where_clause(&self, filter: &Filter) -> Result<(String, Vec<Value>), AdminError> {
        let conditions = filter.resolve(&self.schema.properties)?;
        if conditions.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut parts = Vec::with_capacity(conditions.len());
        let mut values = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let column = self.column(&condition.property);
            match condition.matcher {
                Matcher::Contains(needle) => {
                    parts.push(format!("{column} LIKE ? ESCAPE '\\'"));
                    values.push(Value::String(format!("%{}%", escape_like(&needle))));
                }
                Matcher::Equals(value) => {
                    parts.push(format!("{column} = ?"));
                    values.push(value);
                }
            }
        }
        Ok((format!(" WHERE {}", parts.join(" AND ")), values))
    }

    fn order_by(&self, options: &FindOptions) -> Result<String, AdminError> {
        let Some(sort) = &options.sort else {
            return Ok(format!("{} ASC", self.schema.id_expr()));
        };
        let property = find_property(&self.schema.properties, &sort.property)?;
        let direction = match sort.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        Ok(format!("{} {direction}", self.column(&property.name)))
    }

    fn bind_id<'q>(&self, query: SqliteQuery<'q>, id: &str) -> SqliteQuery<'q> {
        match id.trim().parse::<i64>() {
            Ok(number) if self.schema.id_kind == PropertyType::Integer => query.bind(number),
            _ => query.bind(id.to_owned()),
        }
    }

    fn decode(&self, row: &SqliteRow) -> Result<Record, SqliteAdapterError> {
        let mut params = Map::new();
        for (index, property) in self.schema.properties.iter().enumerate() {
            params.insert(property.name.clone(), decode_column(row, index, property)?);
        }

        let mut record = Record { id: String::new(), params };
        record.id = record.display(&self.schema.id);
        Ok(record)
    }

    fn not_found(&self, id: &str) -> AdminError {
        AdminError::not_found(format!("record '{id}' of '{}'", self.schema.table))
    }
}

#[async_trait]
impl ResourceAdapter for SqliteResource {
    fn id(&self) -> &str {
        &self.schema.table
    }

    fn properties(&self) -> &[Property] {
        &self.schema.properties
    }

    async fn count(&self, filter: &Filter) -> Result<u64, AdminError> {
        let (clause, values) = self.where_clause(filter)?;
        let sql = format!("SELECT COUNT(*) FROM {}{clause}", self.table());

        let row = bind_all(sqlx::query(&sql), values)
            .fetch_one(&self.pool)
            .await
            .context(format!("Counting {}", self.schema.table))?;
        let count: i64 = row.try_get(0).context("Reading count")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Record>, AdminError> {
        let (clause, values) = self.where_clause(filter)?;
        let sql = format!(
            "SELECT {} FROM {}{clause} ORDER BY {} LIMIT ? OFFSET ?",
            self.schema.select_list,
            self.table(),
            self.order_by(options)?,
        );

        let rows = bind_all(sqlx::query(&sql), values)
            .bind(i64::from(options.limit))
            .bind(i64::try_from(options.offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .context(format!("Listing {}", self.schema.table))?;

        Ok(rows.iter().map(|row| self.decode(row)).collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_one(&self, id: &str) -> Result<Option<Record>, AdminError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            self.schema.select_list,
            self.table(),
            self.schema.id_expr(),
        );

        let row = self
            .bind_id(sqlx::query(&sql), id)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Reading {} '{id}'", self.schema.table))?;

        Ok(row.map(|row| self.decode(&row)).transpose()?)
    }

    async fn create(&self, params: Map<String, Value>) -> Result<Record, AdminError> {
        check_params(&self.schema.properties, &params)?;

        let sql = if params.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", self.table(), self.schema.select_list)
        } else {
            let columns = params.keys().map(|name| self.column(name)).collect::<Vec<_>>();
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                self.table(),
                columns.join(", "),
                vec!["?"; columns.len()].join(", "),
                self.schema.select_list,
            )
        };

        let row = bind_all(sqlx::query(&sql), params.into_iter().map(|(_, value)| value))
            .fetch_one(&self.pool)
            .await
            .context(format!("Inserting into {}", self.schema.table))?;

        Ok(self.decode(&row)?)
    }

    async fn update(&self, id: &str, params: Map<String, Value>) -> Result<Record, AdminError> {
        check_params(&self.schema.properties, &params)?;
        if params.is_empty() {
            return self.find_one(id).await?.ok_or_else(|| self.not_found(id));
        }

        let assignments =
            params.keys().map(|name| format!("{} = ?", self.column(name))).collect::<Vec<_>>();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ? RETURNING {}",
            self.table(),
            assignments.join(", "),
            self.schema.id_expr(),
            self.schema.select_list,
        );

        let query = bind_all(sqlx::query(&sql), params.into_iter().map(|(_, value)| value));
        let row = self
            .bind_id(query, id)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Updating {} '{id}'", self.schema.table))?;

        match row {
            Some(row) => Ok(self.decode(&row)?),
            None => Err(self.not_found(id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), AdminError> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", self.table(), self.schema.id_expr());

        let result = self
            .bind_id(sqlx::query(&sql), id)
            .execute(&self.pool)
            .await
            .context(format!("Deleting {} '{id}'", self.schema.table))?;

        if result.rows_affected() == 0 {
            return Err(self.not_found(id));
        }
        Ok(())
    }
}

impl fmt::Debug for SqliteResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteResource").field("schema", &self.schema).finish_non_exhaustive()
    }
}

fn bind_all<'q>(query: SqliteQuery<'q>, values: impl IntoIterator<Item = Value>) -> SqliteQuery<'q> {
    values.into_iter().fold(query, bind_value)
}

fn bind_value(query: SqliteQuery<'_>, value: Value) -> SqliteQuery<'_> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(flag) => query.bind(flag),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => query.bind(integer),
            None => query.bind(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => query.bind(text),
        other => query.bind(other.to_string()),
    }
}

/// Decodes a column by its runtime storage class; SQLite does not enforce declared types.
fn decode_column(
    row: &SqliteRow,
    index: usize,
    property: &Property,
) -> Result<Value, SqliteAdapterError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage = raw.type_info().name().to_owned();

    let value = match storage.as_str() {
        "INTEGER" => {
            let integer: i64 = row.try_get_unchecked(index)?;
            if property.kind == PropertyType::Boolean {
                Value::Bool(integer != 0)
            } else {
                Value::from(integer)
            }
        }
        "REAL" => {
            let real: f64 = row.try_get_unchecked(index)?;
            Number::from_f64(real).map_or(Value::Null, Value::Number)
        }
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get_unchecked(index)?;
            Value::String(hex(&bytes))
        }
        _ => {
            let text: String = row.try_get_unchecked(index)?;
            if property.kind == PropertyType::Json {
                serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text))
            } else {
                Value::String(text)
            }
        }
    };
    Ok(value)
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("milk"), "milk");
    }

    #[test]
    fn blobs_render_as_hex() {
        assert_eq!(hex(&[0x00, 0xab, 0x10]), "00ab10");
        assert_eq!(hex(&[]), "");
    }
}

//! Read-only catalog introspection.
//!
//! Every query here is side-effect free and scoped to the connection's
//! current schema via `DATABASE()`. A failed read propagates immediately
//! with no retry.

use sqlx::mysql::MySqlPool;
use sqlx::Row;

use quarry_sql_core::{Dialect, IndexDescriptor};
use quarry_sql_mysql::MySqlDialect;

use crate::error::{MigrateError, Result};

/// One introspected column: the live state a declared field is compared to.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnCatalogEntry {
    /// Column name.
    pub name: String,
    /// Base data type name (`int`, `varchar`, ...).
    pub data_type: String,
    /// Declared character length, if any.
    pub size: Option<u64>,
    /// Numeric precision, if any.
    pub precision: Option<u64>,
    /// Numeric scale, if any.
    pub scale: Option<u64>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column is part of the primary key.
    pub primary: bool,
    /// Full native type text plus extras (`int(11) auto_increment`), used
    /// for structured type comparison.
    pub column_type: String,
}

/// Reads schema state from the `information_schema` catalog.
pub struct Introspector<'a> {
    pool: &'a MySqlPool,
}

impl<'a> Introspector<'a> {
    /// Creates an introspector over a pool.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Returns whether a base table with this name exists.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' AND TABLE_NAME = ?",
        )
        .bind(table)
        .fetch_one(self.pool)
        .await
        .map_err(MigrateError::Catalog)?;
        Ok(row.0 > 0)
    }

    /// Returns whether a view with this name exists.
    pub async fn view_exists(&self, view: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'VIEW' AND TABLE_NAME = ?",
        )
        .bind(view)
        .fetch_one(self.pool)
        .await
        .map_err(MigrateError::Catalog)?;
        Ok(row.0 > 0)
    }

    /// Lists base table names in the current schema.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT TABLE_NAME FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME",
        )
        .fetch_all(self.pool)
        .await
        .map_err(MigrateError::Catalog)?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Lists view names in the current schema.
    pub async fn list_views(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT TABLE_NAME FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'VIEW' ORDER BY TABLE_NAME",
        )
        .fetch_all(self.pool)
        .await
        .map_err(MigrateError::Catalog)?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Returns every column of a table in ordinal order.
    pub async fn columns(&self, table: &str) -> Result<Vec<ColumnCatalogEntry>> {
        let rows = sqlx::query(
            "SELECT COLUMN_NAME, DATA_TYPE, CHARACTER_MAXIMUM_LENGTH, IS_NULLABLE, \
             NUMERIC_PRECISION, NUMERIC_SCALE, COLUMN_KEY, \
             CONCAT(COLUMN_TYPE, ' ', EXTRA) AS FULL_TYPE \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION",
        )
        .bind(table)
        .fetch_all(self.pool)
        .await
        .map_err(MigrateError::Catalog)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let nullable: String = row.try_get("IS_NULLABLE").map_err(MigrateError::Catalog)?;
            let key: String = row.try_get("COLUMN_KEY").map_err(MigrateError::Catalog)?;
            entries.push(ColumnCatalogEntry {
                name: row.try_get("COLUMN_NAME").map_err(MigrateError::Catalog)?,
                data_type: row.try_get("DATA_TYPE").map_err(MigrateError::Catalog)?,
                size: row
                    .try_get("CHARACTER_MAXIMUM_LENGTH")
                    .map_err(MigrateError::Catalog)?,
                precision: row
                    .try_get("NUMERIC_PRECISION")
                    .map_err(MigrateError::Catalog)?,
                scale: row.try_get("NUMERIC_SCALE").map_err(MigrateError::Catalog)?,
                nullable: nullable.eq_ignore_ascii_case("YES"),
                primary: key.eq_ignore_ascii_case("PRI"),
                column_type: row.try_get("FULL_TYPE").map_err(MigrateError::Catalog)?,
            });
        }
        Ok(entries)
    }

    /// Returns a table's indexes grouped by name, columns in index order.
    pub async fn indexes(&self, table: &str) -> Result<Vec<IndexDescriptor>> {
        let dialect = MySqlDialect::new();
        // SHOW INDEXES cannot bind identifiers, so the name goes through
        // identifier escaping.
        let sql = format!("SHOW INDEXES FROM {}", dialect.escape_name(table));
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(MigrateError::Catalog)?;

        let mut indexes: Vec<IndexDescriptor> = Vec::new();
        for row in rows {
            let name: String = row.try_get("Key_name").map_err(MigrateError::Catalog)?;
            let column: String = row.try_get("Column_name").map_err(MigrateError::Catalog)?;
            match indexes.iter_mut().find(|index| index.name == name) {
                Some(index) => index.columns.push(column),
                None => indexes.push(IndexDescriptor::new(name, vec![column])),
            }
        }
        Ok(indexes)
    }

    /// Returns whether a database (schema) with this name exists.
    pub async fn database_exists(&self, database: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = ?",
        )
        .bind(database)
        .fetch_one(self.pool)
        .await
        .map_err(MigrateError::Catalog)?;
        Ok(row.0 > 0)
    }
}

//! Migration execution.
//!
//! [`Migrator`] interprets the pure plans from [`crate::plan`] against a
//! live connection. Every identifier in generated DDL goes through the
//! dialect's identifier escaping; literal table or column names are never
//! interpolated raw.

use sqlx::mysql::MySqlPool;
use tracing::{debug, info};

use quarry_sql_core::ast::SelectStatement;
use quarry_sql_core::{
    Dialect, FieldDescriptor, IndexDescriptor, MigrationDescriptor, SqlFormatter,
};
use quarry_sql_mysql::MySqlDialect;

use crate::error::{MigrateError, Result};
use crate::introspect::{ColumnCatalogEntry, Introspector};
use crate::ledger::{ledger_fields, MigrationLedger, LEDGER_TABLE};
use crate::plan::{plan_index, plan_table, validate, IndexAction, MigrationState, TablePlan};

/// Applies schema migrations against one MySQL database.
pub struct Migrator {
    pool: MySqlPool,
    formatter: SqlFormatter<MySqlDialect>,
}

impl Migrator {
    /// Creates a migrator over a pool.
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            formatter: SqlFormatter::new(MySqlDialect::new()),
        }
    }

    /// Returns the SQL formatter used for generated DDL.
    #[must_use]
    pub fn formatter(&self) -> &SqlFormatter<MySqlDialect> {
        &self.formatter
    }

    /// Returns table operations for one table.
    #[must_use]
    pub fn table(&self, name: impl Into<String>) -> TableOps<'_> {
        TableOps {
            migrator: self,
            name: name.into(),
        }
    }

    /// Returns view operations for one view.
    #[must_use]
    pub fn view(&self, name: impl Into<String>) -> ViewOps<'_> {
        ViewOps {
            migrator: self,
            name: name.into(),
        }
    }

    /// Returns index operations for one table.
    #[must_use]
    pub fn index(&self, table: impl Into<String>) -> IndexOps<'_> {
        IndexOps {
            migrator: self,
            table: table.into(),
        }
    }

    /// Returns database-level operations.
    #[must_use]
    pub fn database(&self) -> DatabaseOps<'_> {
        DatabaseOps { migrator: self }
    }

    /// Applies one migration descriptor.
    ///
    /// Returns `Ok(true)` if structural work ran now, `Ok(false)` if the
    /// migration was already applied or converged to a no-op. A no-op run
    /// leaves the ledger untouched, so a migration whose ledger write
    /// previously failed heals on the next call.
    pub async fn migrate(&self, descriptor: &MigrationDescriptor) -> Result<bool> {
        validate(descriptor)?;
        self.ensure_ledger().await?;

        let ledger = MigrationLedger::new(&self.pool);
        let mut state = MigrationState::LedgerChecked;
        self.trace_state(descriptor, state);
        if ledger
            .is_applied(&descriptor.applies_to, &descriptor.version)
            .await?
        {
            info!(
                table = %descriptor.applies_to,
                version = %descriptor.version,
                "migration already applied"
            );
            return Ok(false);
        }

        let table = self.table(descriptor.applies_to.clone());
        let exists = table.exists().await?;
        state = MigrationState::TableChecked;
        self.trace_state(descriptor, state);

        let plan = if exists {
            let existing = table.columns().await?;
            plan_table(&descriptor.add, &existing)
        } else {
            TablePlan::Create(descriptor.add.clone())
        };
        let mut structural = !plan.is_noop();
        match &plan {
            TablePlan::Create(fields) => {
                table.create(fields).await?;
                state = MigrationState::Created;
                self.trace_state(descriptor, state);
            }
            TablePlan::Alter { add, change } => {
                if !plan.is_noop() {
                    // Adds run before changes; a change may assume every
                    // declared column exists.
                    table.add(add).await?;
                    table.change(change).await?;
                    state = MigrationState::Altered;
                    self.trace_state(descriptor, state);
                }
            }
        }

        let index_ops = self.index(descriptor.applies_to.clone());
        for index in &descriptor.indexes {
            structural |= index_ops.create(index).await?;
        }
        state = MigrationState::IndexesApplied;
        self.trace_state(descriptor, state);

        if structural {
            ledger.record(descriptor).await?;
            state = MigrationState::Recorded;
            self.trace_state(descriptor, state);
            info!(
                table = %descriptor.applies_to,
                version = %descriptor.version,
                "migration applied"
            );
        } else {
            info!(
                table = %descriptor.applies_to,
                version = %descriptor.version,
                "migration converged with no structural work"
            );
        }
        self.trace_state(descriptor, MigrationState::Done);
        Ok(structural)
    }

    /// Creates the ledger table on first use.
    async fn ensure_ledger(&self) -> Result<()> {
        let introspector = Introspector::new(&self.pool);
        if !introspector.table_exists(LEDGER_TABLE).await? {
            self.table(LEDGER_TABLE).create(&ledger_fields()).await?;
        }
        Ok(())
    }

    fn trace_state(&self, descriptor: &MigrationDescriptor, state: MigrationState) {
        debug!(
            table = %descriptor.applies_to,
            version = %descriptor.version,
            state = state.as_str(),
            "migration state"
        );
    }

    async fn execute_ddl(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "executing DDL");
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|source| MigrateError::Ddl {
                statement: String::from(sql),
                source,
            })?;
        Ok(())
    }

    fn column_clause(&self, field: &FieldDescriptor) -> Result<String> {
        let dialect = self.formatter.dialect();
        Ok(format!(
            "{} {}",
            dialect.escape_name(&field.name),
            dialect.format_type(field)?
        ))
    }

    fn create_table_sql(&self, table: &str, fields: &[FieldDescriptor]) -> Result<String> {
        let dialect = self.formatter.dialect();
        let mut definitions = fields
            .iter()
            .map(|field| self.column_clause(field))
            .collect::<Result<Vec<String>>>()?;
        let primary: Vec<String> = fields
            .iter()
            .filter(|field| field.primary)
            .map(|field| dialect.escape_name(&field.name))
            .collect();
        if !primary.is_empty() {
            definitions.push(format!("PRIMARY KEY ({})", primary.join(", ")));
        }
        Ok(format!(
            "CREATE TABLE {} ({})",
            dialect.escape_name(table),
            definitions.join(", ")
        ))
    }

    fn alter_table_sql(
        &self,
        table: &str,
        verb: &str,
        fields: &[FieldDescriptor],
    ) -> Result<String> {
        let dialect = self.formatter.dialect();
        let actions = fields
            .iter()
            .map(|field| Ok(format!("{verb} COLUMN {}", self.column_clause(field)?)))
            .collect::<Result<Vec<String>>>()?;
        Ok(format!(
            "ALTER TABLE {} {}",
            dialect.escape_name(table),
            actions.join(", ")
        ))
    }
}

/// Table existence, creation and alteration.
pub struct TableOps<'a> {
    migrator: &'a Migrator,
    name: String,
}

impl TableOps<'_> {
    /// Returns whether the table exists.
    pub async fn exists(&self) -> Result<bool> {
        Introspector::new(&self.migrator.pool)
            .table_exists(&self.name)
            .await
    }

    /// Returns the table's columns in ordinal order.
    pub async fn columns(&self) -> Result<Vec<ColumnCatalogEntry>> {
        Introspector::new(&self.migrator.pool)
            .columns(&self.name)
            .await
    }

    /// Returns the highest migration version recorded for this table.
    pub async fn version(&self) -> Result<Option<String>> {
        MigrationLedger::new(&self.migrator.pool)
            .version(&self.name)
            .await
    }

    /// Creates the table with the given fields; primary fields form a
    /// composite primary-key clause.
    pub async fn create(&self, fields: &[FieldDescriptor]) -> Result<()> {
        if fields.is_empty() {
            return Err(MigrateError::Validation(format!(
                "cannot create table '{}' with no fields",
                self.name
            )));
        }
        let sql = self.migrator.create_table_sql(&self.name, fields)?;
        self.migrator.execute_ddl(&sql).await
    }

    /// Adds the given columns.
    pub async fn add(&self, fields: &[FieldDescriptor]) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let sql = self.migrator.alter_table_sql(&self.name, "ADD", fields)?;
        self.migrator.execute_ddl(&sql).await
    }

    /// Modifies the given columns to their declared definitions.
    pub async fn change(&self, fields: &[FieldDescriptor]) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let sql = self
            .migrator
            .alter_table_sql(&self.name, "MODIFY", fields)?;
        self.migrator.execute_ddl(&sql).await
    }
}

/// View existence, drop and transactional create.
pub struct ViewOps<'a> {
    migrator: &'a Migrator,
    name: String,
}

impl ViewOps<'_> {
    /// Returns whether the view exists.
    pub async fn exists(&self) -> Result<bool> {
        Introspector::new(&self.migrator.pool)
            .view_exists(&self.name)
            .await
    }

    /// Drops the view if it exists.
    pub async fn drop(&self) -> Result<()> {
        let dialect = self.migrator.formatter.dialect();
        let sql = format!("DROP VIEW IF EXISTS {}", dialect.escape_name(&self.name));
        self.migrator.execute_ddl(&sql).await
    }

    /// Replaces the view with the given query.
    ///
    /// Drop and create run inside one transaction so a rejected create
    /// rolls the drop back instead of leaving the view half-gone.
    pub async fn create(&self, query: &SelectStatement) -> Result<()> {
        let dialect = self.migrator.formatter.dialect();
        let drop_sql = format!("DROP VIEW IF EXISTS {}", dialect.escape_name(&self.name));
        let create_sql = format!(
            "CREATE VIEW {} AS {}",
            dialect.escape_name(&self.name),
            self.migrator.formatter.format_select(query)?
        );

        let mut tx = self
            .migrator
            .pool
            .begin()
            .await
            .map_err(|source| MigrateError::Ddl {
                statement: String::from("START TRANSACTION"),
                source,
            })?;
        for sql in [&drop_sql, &create_sql] {
            debug!(sql = %sql, "executing DDL");
            sqlx::query(sql)
                .execute(&mut *tx)
                .await
                .map_err(|source| MigrateError::Ddl {
                    statement: sql.clone(),
                    source,
                })?;
        }
        tx.commit().await.map_err(|source| MigrateError::Ddl {
            statement: String::from("COMMIT"),
            source,
        })
    }
}

/// Index listing and idempotent creation.
pub struct IndexOps<'a> {
    migrator: &'a Migrator,
    table: String,
}

impl IndexOps<'_> {
    /// Returns the table's current indexes.
    pub async fn list(&self) -> Result<Vec<IndexDescriptor>> {
        Introspector::new(&self.migrator.pool)
            .indexes(&self.table)
            .await
    }

    /// Converges one declared index against the live list.
    ///
    /// Re-derives the live index list on every call, so the operation is
    /// idempotent on its own. Returns whether any DDL ran.
    pub async fn create(&self, index: &IndexDescriptor) -> Result<bool> {
        let existing = self.list().await?;
        match plan_index(index, &existing) {
            IndexAction::Skip => Ok(false),
            IndexAction::Create => {
                self.migrator
                    .execute_ddl(&self.create_index_sql(index))
                    .await?;
                Ok(true)
            }
            IndexAction::Recreate => {
                self.migrator
                    .execute_ddl(&self.drop_index_sql(&index.name))
                    .await?;
                self.migrator
                    .execute_ddl(&self.create_index_sql(index))
                    .await?;
                Ok(true)
            }
        }
    }

    /// Drops an index if it exists; returns whether any DDL ran.
    pub async fn drop(&self, name: &str) -> Result<bool> {
        let existing = self.list().await?;
        if !existing.iter().any(|index| index.name == name) {
            return Ok(false);
        }
        self.migrator.execute_ddl(&self.drop_index_sql(name)).await?;
        Ok(true)
    }

    fn create_index_sql(&self, index: &IndexDescriptor) -> String {
        let dialect = self.migrator.formatter.dialect();
        let columns: Vec<String> = index
            .columns
            .iter()
            .map(|column| dialect.escape_name(column))
            .collect();
        format!(
            "CREATE INDEX {} ON {} ({})",
            dialect.escape_name(&index.name),
            dialect.escape_name(&self.table),
            columns.join(", ")
        )
    }

    fn drop_index_sql(&self, name: &str) -> String {
        let dialect = self.migrator.formatter.dialect();
        format!(
            "DROP INDEX {} ON {}",
            dialect.escape_name(name),
            dialect.escape_name(&self.table)
        )
    }
}

/// Database (schema) existence and creation.
pub struct DatabaseOps<'a> {
    migrator: &'a Migrator,
}

impl DatabaseOps<'_> {
    /// Returns whether a database with this name exists.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        Introspector::new(&self.migrator.pool)
            .database_exists(name)
            .await
    }

    /// Creates a database if it does not already exist.
    pub async fn create(&self, name: &str) -> Result<()> {
        let dialect = self.migrator.formatter.dialect();
        let sql = format!(
            "CREATE DATABASE IF NOT EXISTS {}",
            dialect.escape_name(name)
        );
        self.migrator.execute_ddl(&sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_sql_core::FieldKind;
    use sqlx::mysql::MySqlPoolOptions;

    fn test_migrator() -> Migrator {
        // connect_lazy performs no I/O; only SQL generation is exercised.
        let pool = MySqlPoolOptions::new()
            .connect_lazy("mysql://root@localhost/quarry_test")
            .unwrap();
        Migrator::new(pool)
    }

    #[tokio::test]
    async fn test_create_table_sql() {
        let migrator = test_migrator();
        let fields = vec![
            FieldDescriptor::new("id", FieldKind::Counter).primary(),
            FieldDescriptor::new("name", FieldKind::Text).size(120).not_null(),
            FieldDescriptor::new("active", FieldKind::Boolean),
        ];
        assert_eq!(
            migrator.create_table_sql("Users", &fields).unwrap(),
            "CREATE TABLE `Users` (`id` int(11) auto_increment not null, \
             `name` varchar(120) not null, `active` tinyint(1) null, PRIMARY KEY (`id`))"
        );
    }

    #[tokio::test]
    async fn test_create_table_sql_composite_primary_key() {
        let migrator = test_migrator();
        let fields = vec![
            FieldDescriptor::new("order", FieldKind::Integer).primary(),
            FieldDescriptor::new("line", FieldKind::Integer).primary(),
        ];
        assert_eq!(
            migrator.create_table_sql("OrderLines", &fields).unwrap(),
            "CREATE TABLE `OrderLines` (`order` int(11) not null, `line` int(11) not null, \
             PRIMARY KEY (`order`, `line`))"
        );
    }

    #[tokio::test]
    async fn test_alter_table_sql() {
        let migrator = test_migrator();
        let fields = vec![
            FieldDescriptor::new("description", FieldKind::Text).size(512),
            FieldDescriptor::new("rank", FieldKind::Integer),
        ];
        assert_eq!(
            migrator
                .alter_table_sql("Items", "ADD", &fields)
                .unwrap(),
            "ALTER TABLE `Items` ADD COLUMN `description` varchar(512) null, \
             ADD COLUMN `rank` int(11) null"
        );
        assert_eq!(
            migrator
                .alter_table_sql("Items", "MODIFY", &fields[..1])
                .unwrap(),
            "ALTER TABLE `Items` MODIFY COLUMN `description` varchar(512) null"
        );
    }

    #[tokio::test]
    async fn test_index_sql() {
        let migrator = test_migrator();
        let ops = migrator.index("People");
        let index = IndexDescriptor::new("idx_name", vec!["familyName", "givenName"]);
        assert_eq!(
            ops.create_index_sql(&index),
            "CREATE INDEX `idx_name` ON `People` (`familyName`, `givenName`)"
        );
        assert_eq!(
            ops.drop_index_sql("idx_name"),
            "DROP INDEX `idx_name` ON `People`"
        );
    }

    #[tokio::test]
    async fn test_migrate_rejects_empty_target_before_io() {
        let migrator = test_migrator();
        let descriptor = MigrationDescriptor::new("", "1.0")
            .field(FieldDescriptor::new("id", FieldKind::Counter).primary());
        // Validation runs before any connection is made, so the lazy pool
        // is never touched.
        assert!(matches!(
            migrator.migrate(&descriptor).await,
            Err(MigrateError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_migrate_rejects_removals_before_io() {
        let migrator = test_migrator();
        let mut descriptor = MigrationDescriptor::new("Users", "1.0")
            .field(FieldDescriptor::new("id", FieldKind::Counter).primary());
        descriptor.remove = vec![FieldDescriptor::new("legacy", FieldKind::Text)];
        assert!(matches!(
            migrator.migrate(&descriptor).await,
            Err(MigrateError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_ledger_create_sql() {
        let migrator = test_migrator();
        let sql = migrator
            .create_table_sql(LEDGER_TABLE, &ledger_fields())
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE `migrations` (`id` int(11) auto_increment not null, \
             `appliesTo` varchar(80) not null, `model` varchar(120) null, \
             `description` varchar(512) null, `version` varchar(40) not null, \
             PRIMARY KEY (`id`))"
        );
    }
}

//! The migration ledger.
//!
//! One insert-only `migrations` table records which `(appliesTo, version)`
//! pairs have been applied. Presence of a pair is the sole idempotence
//! mechanism: the engine never diffs ledger contents, only membership.

use sqlx::mysql::MySqlPool;

use quarry_sql_core::{FieldDescriptor, FieldKind, MigrationDescriptor};

use crate::error::{MigrateError, Result};

/// Name of the ledger table.
pub const LEDGER_TABLE: &str = "migrations";

/// Returns the ledger table's own schema.
///
/// The ledger is created through the same table-creation path as any other
/// table, so its shape is declared as ordinary field descriptors.
#[must_use]
pub fn ledger_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("id", FieldKind::Counter).primary(),
        FieldDescriptor::new("appliesTo", FieldKind::Text)
            .size(80)
            .not_null(),
        FieldDescriptor::new("model", FieldKind::Text).size(120),
        FieldDescriptor::new("description", FieldKind::Text).size(512),
        FieldDescriptor::new("version", FieldKind::Text)
            .size(40)
            .not_null(),
    ]
}

/// Reads and appends migration ledger rows.
pub struct MigrationLedger<'a> {
    pool: &'a MySqlPool,
}

impl<'a> MigrationLedger<'a> {
    /// Creates a ledger over a pool.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Returns whether a `(appliesTo, version)` pair is recorded.
    pub async fn is_applied(&self, applies_to: &str, version: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM `migrations` WHERE `appliesTo` = ? AND `version` = ? LIMIT 1",
        )
        .bind(applies_to)
        .bind(version)
        .fetch_optional(self.pool)
        .await
        .map_err(MigrateError::Ledger)?;
        Ok(row.is_some())
    }

    /// Appends one ledger row for an applied migration.
    pub async fn record(&self, descriptor: &MigrationDescriptor) -> Result<()> {
        sqlx::query(
            "INSERT INTO `migrations` (`appliesTo`, `model`, `description`, `version`) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(descriptor.applies_to.as_str())
        .bind(descriptor.model.as_deref())
        .bind(descriptor.description.as_deref())
        .bind(descriptor.version.as_str())
        .execute(self.pool)
        .await
        .map_err(MigrateError::Ledger)?;
        Ok(())
    }

    /// Returns the highest recorded version for a table, if any.
    pub async fn version(&self, applies_to: &str) -> Result<Option<String>> {
        let row: (Option<String>,) =
            sqlx::query_as("SELECT MAX(`version`) FROM `migrations` WHERE `appliesTo` = ?")
                .bind(applies_to)
                .fetch_one(self.pool)
                .await
                .map_err(MigrateError::Ledger)?;
        Ok(row.0)
    }
}

//! Ledger-tracked schema migration for MySQL.
//!
//! `quarry-migrate` reconciles a declared table schema against the live
//! `information_schema` catalog and converges it with minimal additive DDL.
//! A [`MigrationDescriptor`] names a target table, a version, its fields
//! and indexes; [`Migrator::migrate`] checks the insert-only ledger, plans
//! the diff, applies it, and records the outcome. Applying the same
//! descriptor twice emits no structural DDL the second time.
//!
//! The engine is additive and widening only: column removal and explicit
//! change declarations are rejected before any DDL runs.
//!
//! ```no_run
//! use quarry_migrate::Migrator;
//! use quarry_sql_core::{FieldDescriptor, FieldKind, MigrationDescriptor};
//!
//! # async fn demo(pool: sqlx::MySqlPool) -> quarry_migrate::Result<()> {
//! let migrator = Migrator::new(pool);
//! let descriptor = MigrationDescriptor::new("People", "1.0")
//!     .field(FieldDescriptor::new("id", FieldKind::Counter).primary())
//!     .field(FieldDescriptor::new("familyName", FieldKind::Text).size(120));
//! let applied = migrator.migrate(&descriptor).await?;
//! assert!(applied);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod introspect;
pub mod ledger;
pub mod plan;

pub use error::{MigrateError, Result};
pub use executor::{DatabaseOps, IndexOps, Migrator, TableOps, ViewOps};
pub use introspect::{ColumnCatalogEntry, Introspector};
pub use ledger::MigrationLedger;
pub use plan::{IndexAction, MigrationState, TablePlan};

pub use quarry_sql_core::{FieldDescriptor, FieldKind, IndexDescriptor, MigrationDescriptor};

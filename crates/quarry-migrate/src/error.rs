//! Error types for introspection and migration.

use quarry_sql_core::FormatError;

/// Errors that can occur while planning or applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Malformed migration input, detected before any I/O.
    #[error("invalid migration: {0}")]
    Validation(String),

    /// A catalog introspection query failed. Never retried: schema state is
    /// not assumed consistent after a failed read.
    #[error("catalog query failed")]
    Catalog(#[source] sqlx::Error),

    /// The migration declares something this engine refuses to do, such as
    /// removing a column.
    #[error("unsupported migration: {0}")]
    Unsupported(String),

    /// A DDL statement was rejected by the server. Statements already
    /// executed stay applied.
    #[error("DDL statement failed: {statement}")]
    Ddl {
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    /// Reading or writing the migration ledger failed.
    #[error("migration ledger access failed")]
    Ledger(#[source] sqlx::Error),

    /// SQL text generation failed.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

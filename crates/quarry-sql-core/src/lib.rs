//! Dialect-neutral SQL expression tree and renderer.
//!
//! `quarry-sql-core` defines a caller-owned query expression tree
//! ([`ast::Expr`], [`ast::SelectStatement`], [`ast::InsertStatement`]), a
//! literal [`Value`] type, and a [`SqlFormatter`] that walks the tree and
//! emits SQL text. Everything dialect-specific (identifier quoting, literal
//! escaping, column types, casts, JSON and date functions) goes through the
//! [`Dialect`] capability trait, so the renderer itself stays engine-neutral.
//!
//! The formatter is pure and synchronous: each call owns its input tree and
//! produces independent output text, so it is safe to call concurrently.
//!
//! Dialect crates (e.g. `quarry-sql-mysql`) implement [`Dialect`] for one
//! concrete engine; [`GenericDialect`] provides ANSI defaults.

pub mod ast;
pub mod dialect;
pub mod error;
pub mod formatter;
pub mod schema;
pub mod value;

pub use dialect::{Dialect, GenericDialect};
pub use error::{FormatError, Result};
pub use formatter::SqlFormatter;
pub use schema::{FieldDescriptor, FieldKind, IndexDescriptor, MigrationDescriptor};
pub use value::{ToValue, Value};

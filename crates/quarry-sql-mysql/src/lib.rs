//! MySQL dialect for the quarry-sql renderer.
//!
//! Implements [`quarry_sql_core::Dialect`] with MySQL conventions: backtick
//! identifier quoting, forced projection aliases, backslash string escaping,
//! timezone-explicit date literals, native JSON functions, and the fixed
//! logical-kind to column-type mapping used by the migration engine.

pub mod dialect;
pub mod escape;
pub mod types;

pub use dialect::MySqlDialect;
pub use types::NativeType;

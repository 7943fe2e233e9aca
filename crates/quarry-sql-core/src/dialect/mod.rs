//! SQL dialect support.
//!
//! Different engines disagree on identifier quoting, literal escaping,
//! column types, casts, JSON functions and date handling. This module
//! defines a capability trait for all of those seams: the formatter asks
//! the dialect for every piece of engine-specific text, and a dialect
//! that cannot provide a capability returns [`FormatError::Unsupported`]
//! instead of emitting broken SQL.

mod generic;

pub use generic::GenericDialect;

use crate::ast::{CastKind, DateGranularity};
use crate::error::{FormatError, Result};
use crate::schema::FieldDescriptor;
use crate::value::Value;

/// Trait for SQL dialect-specific behavior.
///
/// Defaults implement ANSI SQL where a portable answer exists; engine-only
/// features (JSON functions, UUIDs) default to [`FormatError::Unsupported`].
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g. `"` for standard SQL,
    /// `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns whether every projection must carry an explicit alias.
    fn force_alias(&self) -> bool {
        false
    }

    /// Quotes an identifier, quoting each dot-separated part on its own so
    /// `Orders.id` becomes two quoted segments. Embedded quote characters
    /// are doubled.
    fn escape_name(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let doubled = format!("{quote}{quote}");
        name.split('.')
            .map(|part| format!("{quote}{}{quote}", part.replace(quote, &doubled)))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Escapes the inside of a string literal (quote doubling).
    fn escape_string(&self, text: &str) -> String {
        text.replace('\'', "''")
    }

    /// Renders a literal value as inline SQL text.
    fn escape_value(&self, value: &Value) -> Result<String> {
        default_escape_value(self, value)
    }

    /// Renders the native column type clause for a declared field, including
    /// nullability.
    fn format_type(&self, field: &FieldDescriptor) -> Result<String>;

    /// Renders an explicit cast around already-rendered SQL text.
    fn cast(&self, inner: &str, target: CastKind) -> Result<String> {
        match target {
            CastKind::Text => Ok(format!("CAST({inner} AS VARCHAR)")),
            CastKind::Integer | CastKind::Long => Ok(format!("CAST({inner} AS INTEGER)")),
            CastKind::Double => Ok(format!("CAST({inner} AS DOUBLE PRECISION)")),
            CastKind::Decimal { precision, scale } => {
                Ok(format!("CAST({inner} AS DECIMAL({precision},{scale}))"))
            }
        }
    }

    /// Renders a freshly generated random UUID.
    fn random_uuid(&self) -> Result<String> {
        Err(FormatError::Unsupported("random uuid generation"))
    }

    /// Renders a UUID derived deterministically from the argument text.
    fn derived_uuid(&self, _inner: &str) -> Result<String> {
        Err(FormatError::Unsupported("derived uuid generation"))
    }

    /// Renders the current date or timestamp.
    fn now(&self, granularity: DateGranularity) -> Result<String> {
        Ok(String::from(match granularity {
            DateGranularity::Date => "CURRENT_DATE",
            DateGranularity::Timestamp => "CURRENT_TIMESTAMP",
        }))
    }

    /// Renders extraction of a JSON path from a quoted column reference.
    fn json_extract(&self, _column: &str, _path: &str) -> Result<String> {
        Err(FormatError::Unsupported("json path extraction"))
    }

    /// Renders a JSON object constructor from rendered key/value pairs.
    fn json_object(&self, _pairs: &[(String, String)]) -> Result<String> {
        Err(FormatError::Unsupported("json object construction"))
    }

    /// Renders a JSON array constructor from rendered item text.
    fn json_array(&self, _items: &[String]) -> Result<String> {
        Err(FormatError::Unsupported("json array construction"))
    }

    /// Renders a grouped JSON array aggregate over rendered inner text.
    fn json_group_array(&self, _inner: &str) -> Result<String> {
        Err(FormatError::Unsupported("json array aggregation"))
    }
}

/// ANSI literal rendering backing the default [`Dialect::escape_value`].
///
/// Kept as a free function so dialects that override only some value shapes
/// can delegate the rest here.
pub fn default_escape_value<D: Dialect + ?Sized>(dialect: &D, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::from("NULL")),
        Value::Bool(b) => Ok(String::from(if *b { "TRUE" } else { "FALSE" })),
        Value::Int(n) => Ok(n.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Text(s) => Ok(format!("'{}'", dialect.escape_string(s))),
        Value::Blob(_) => Err(FormatError::UnsupportedValue(String::from(
            "binary literal",
        ))),
        Value::DateTime(dt) => Ok(format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S"))),
        Value::Array(_) => Err(FormatError::UnsupportedValue(String::from(
            "array literal",
        ))),
        Value::Json(doc) => Ok(format!("'{}'", dialect.escape_string(&doc.to_string()))),
    }
}

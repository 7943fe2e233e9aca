//! The MySQL dialect.

use quarry_sql_core::ast::{CastKind, DateGranularity};
use quarry_sql_core::{Dialect, FieldDescriptor, Result, Value};

use crate::escape;
use crate::types;

/// MySQL dialect: backtick quoting, forced projection aliases, native JSON
/// functions and timezone-explicit date literals.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    // Nested JSON object construction needs a stable name per projected
    // field, so every projection carries an alias.
    fn force_alias(&self) -> bool {
        true
    }

    fn escape_string(&self, text: &str) -> String {
        escape::escape_string(text)
    }

    fn escape_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Bool(b) => Ok(String::from(if *b { "1" } else { "0" })),
            Value::Blob(bytes) => Ok(escape::escape_blob(bytes)),
            Value::DateTime(dt) => Ok(escape::escape_datetime(dt)),
            Value::Array(items) => {
                if items.iter().all(Value::is_scalar) {
                    let items: Result<Vec<String>> =
                        items.iter().map(|item| self.escape_value(item)).collect();
                    self.json_array(&items?)
                } else {
                    let document = value.to_json();
                    Ok(format!("'{}'", self.escape_string(&document.to_string())))
                }
            }
            other => quarry_sql_core::dialect::default_escape_value(self, other),
        }
    }

    fn format_type(&self, field: &FieldDescriptor) -> Result<String> {
        Ok(types::format_type(field))
    }

    fn cast(&self, inner: &str, target: CastKind) -> Result<String> {
        Ok(match target {
            CastKind::Text => format!("CAST({inner} AS CHAR)"),
            // Floor of a wide decimal cast, so fractional inputs truncate
            // instead of tripping driver rounding.
            CastKind::Integer => format!("FLOOR(CAST({inner} AS DECIMAL(19,8)))"),
            CastKind::Long => format!("CAST({inner} AS SIGNED)"),
            CastKind::Double => format!("CAST({inner} AS DOUBLE)"),
            CastKind::Decimal { precision, scale } => {
                format!("CAST({inner} AS DECIMAL({precision},{scale}))")
            }
        })
    }

    fn random_uuid(&self) -> Result<String> {
        Ok(String::from("UUID()"))
    }

    fn derived_uuid(&self, inner: &str) -> Result<String> {
        // Hash then reformat as the canonical 8-4-4-4-12 shape; stable for
        // identical input.
        Ok(format!(
            "LOWER(CONCAT(SUBSTRING(MD5({inner}),1,8),'-',SUBSTRING(MD5({inner}),9,4),'-',\
             SUBSTRING(MD5({inner}),13,4),'-',SUBSTRING(MD5({inner}),17,4),'-',\
             SUBSTRING(MD5({inner}),21,12)))"
        ))
    }

    fn now(&self, granularity: DateGranularity) -> Result<String> {
        Ok(String::from(match granularity {
            DateGranularity::Date => "CURDATE()",
            DateGranularity::Timestamp => "CURRENT_TIMESTAMP",
        }))
    }

    fn json_extract(&self, column: &str, path: &str) -> Result<String> {
        // Document keys come from caller input and may hold quotes.
        Ok(format!(
            "json_extract({column}, '{}')",
            self.escape_string(path)
        ))
    }

    fn json_object(&self, pairs: &[(String, String)]) -> Result<String> {
        let flattened: Vec<String> = pairs
            .iter()
            .map(|(key, value)| format!("'{}', {value}", self.escape_string(key)))
            .collect();
        Ok(format!("JSON_OBJECT({})", flattened.join(", ")))
    }

    fn json_array(&self, items: &[String]) -> Result<String> {
        Ok(format!("JSON_ARRAY({})", items.join(", ")))
    }

    fn json_group_array(&self, inner: &str) -> Result<String> {
        Ok(format!("JSON_ARRAYAGG({inner})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_escape_name_backticks() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.escape_name("Orders"), "`Orders`");
        assert_eq!(dialect.escape_name("Orders.id"), "`Orders`.`id`");
        assert_eq!(dialect.escape_name("a`b"), "`a``b`");
    }

    #[test]
    fn test_escape_scalars() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.escape_value(&Value::Bool(true)).unwrap(), "1");
        assert_eq!(dialect.escape_value(&Value::Bool(false)).unwrap(), "0");
        assert_eq!(dialect.escape_value(&Value::Null).unwrap(), "NULL");
        assert_eq!(
            dialect
                .escape_value(&Value::Text(String::from("it's")))
                .unwrap(),
            "'it\\'s'"
        );
    }

    #[test]
    fn test_escape_datetime() {
        let dialect = MySqlDialect::new();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let value = offset.with_ymd_and_hms(2019, 11, 30, 12, 10, 20).unwrap();
        assert_eq!(
            dialect.escape_value(&Value::DateTime(value)).unwrap(),
            "CONVERT_TZ('2019-11-30 12:10:20','+02:00', @@session.time_zone)"
        );
    }

    #[test]
    fn test_escape_scalar_array() {
        let dialect = MySqlDialect::new();
        let value = Value::Array(vec![
            Value::Text(String::from("user")),
            Value::Text(String::from("customer")),
            Value::Text(String::from("admin")),
        ]);
        assert_eq!(
            dialect.escape_value(&value).unwrap(),
            "JSON_ARRAY('user', 'customer', 'admin')"
        );
    }

    #[test]
    fn test_escape_mixed_array_serializes_once() {
        let dialect = MySqlDialect::new();
        let value = Value::Array(vec![
            Value::Int(1),
            Value::Json(serde_json::json!({"a": 2})),
        ]);
        assert_eq!(
            dialect.escape_value(&value).unwrap(),
            "'[1,{\\\"a\\\":2}]'"
        );
    }

    #[test]
    fn test_casts() {
        let dialect = MySqlDialect::new();
        assert_eq!(
            dialect.cast("`x`", CastKind::Text).unwrap(),
            "CAST(`x` AS CHAR)"
        );
        assert_eq!(
            dialect.cast("`x`", CastKind::Integer).unwrap(),
            "FLOOR(CAST(`x` AS DECIMAL(19,8)))"
        );
        assert_eq!(
            dialect.cast("`x`", CastKind::Long).unwrap(),
            "CAST(`x` AS SIGNED)"
        );
        assert_eq!(
            dialect
                .cast("`x`", CastKind::Decimal { precision: 10, scale: 2 })
                .unwrap(),
            "CAST(`x` AS DECIMAL(10,2))"
        );
    }

    #[test]
    fn test_now() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.now(DateGranularity::Date).unwrap(), "CURDATE()");
        assert_eq!(
            dialect.now(DateGranularity::Timestamp).unwrap(),
            "CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_derived_uuid_is_stable() {
        let dialect = MySqlDialect::new();
        let first = dialect.derived_uuid("'x'").unwrap();
        let second = dialect.derived_uuid("'x'").unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("LOWER(CONCAT(SUBSTRING(MD5('x'),1,8)"));
    }
}

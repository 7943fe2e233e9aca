//! Logical kind to native MySQL column-type mapping, plus structured
//! comparison of declared types against catalog text.
//!
//! Comparing rendered clauses as raw strings breaks across server versions
//! (MySQL 8 stopped reporting integer display widths), so declared and
//! introspected types are both brought into [`NativeType`] and compared
//! field by field.

use quarry_sql_core::{FieldDescriptor, FieldKind};

/// A parsed native column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Lowercase base type name (`int`, `varchar`, ...).
    pub name: String,
    /// Parenthesized arguments (length, or precision and scale).
    pub args: Vec<u32>,
    /// Whether the type carries the `unsigned` attribute.
    pub unsigned: bool,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
}

/// Integer family names whose display width is presentational only.
///
/// MySQL 8.0.19+ drops display widths from the catalog, so `int(11)` and
/// `int` must compare equal.
const INTEGER_FAMILY: [&str; 5] = ["tinyint", "smallint", "mediumint", "int", "bigint"];

impl NativeType {
    fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            args: Vec::new(),
            unsigned: false,
            auto_increment: false,
        }
    }

    fn with_args(name: &str, args: Vec<u32>) -> Self {
        Self {
            args,
            ..Self::new(name)
        }
    }

    /// Parses catalog type text such as `int(11) unsigned auto_increment`.
    ///
    /// The input is the catalog's `COLUMN_TYPE` concatenated with `EXTRA`,
    /// which is where the auto-increment marker lives.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim().to_lowercase();
        let (name, args, attrs) = match (text.find('('), text.find(')')) {
            (Some(open), Some(close)) if open < close => {
                let args = text[open + 1..close]
                    .split(',')
                    .filter_map(|arg| arg.trim().parse().ok())
                    .collect();
                (&text[..open], args, &text[close + 1..])
            }
            _ => match text.split_once(' ') {
                Some((name, attrs)) => (name, Vec::new(), attrs),
                None => (text.as_str(), Vec::new(), ""),
            },
        };
        Self {
            name: String::from(name.trim()),
            args,
            unsigned: attrs.contains("unsigned"),
            auto_increment: attrs.contains("auto_increment"),
        }
    }

    /// Renders the type as DDL text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.name.clone();
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(u32::to_string).collect();
            out.push_str(&format!("({})", args.join(",")));
        }
        if self.unsigned {
            out.push_str(" unsigned");
        }
        if self.auto_increment {
            out.push_str(" auto_increment");
        }
        out
    }

    /// Compares two types for migration purposes.
    ///
    /// Display widths of the integer family are ignored; everything else
    /// must match exactly.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        if self.name != other.name
            || self.unsigned != other.unsigned
            || self.auto_increment != other.auto_increment
        {
            return false;
        }
        INTEGER_FAMILY.contains(&self.name.as_str()) || self.args == other.args
    }
}

/// Resolves a declared field to its native MySQL type.
#[must_use]
pub fn resolve_type(field: &FieldDescriptor) -> NativeType {
    let size = field.size;
    match field.kind {
        FieldKind::Boolean => NativeType::with_args("tinyint", vec![1]),
        FieldKind::Byte => NativeType {
            unsigned: true,
            ..NativeType::with_args("tinyint", vec![3])
        },
        FieldKind::Number | FieldKind::Float => NativeType::new("float"),
        FieldKind::Counter => NativeType {
            auto_increment: true,
            ..NativeType::with_args("int", vec![11])
        },
        FieldKind::Currency => NativeType::with_args("decimal", vec![19, 4]),
        FieldKind::Decimal => NativeType::with_args(
            "decimal",
            vec![size.unwrap_or(19), field.scale.unwrap_or(8)],
        ),
        FieldKind::Date => NativeType::new("date"),
        FieldKind::DateTime | FieldKind::Time => NativeType::new("timestamp"),
        FieldKind::Integer => NativeType::with_args("int", vec![11]),
        FieldKind::Duration => NativeType::with_args("varchar", vec![size.unwrap_or(36)]),
        FieldKind::Url | FieldKind::Text => {
            NativeType::with_args("varchar", vec![size.unwrap_or(512)])
        }
        FieldKind::Note => match size {
            Some(n) => NativeType::with_args("varchar", vec![n]),
            None => NativeType::new("text"),
        },
        FieldKind::Image | FieldKind::Binary => match size {
            Some(n) => NativeType::with_args("blob", vec![n]),
            None => NativeType::new("blob"),
        },
        FieldKind::Guid => NativeType::with_args("varchar", vec![36]),
        FieldKind::Short => NativeType::with_args("smallint", vec![6]),
        FieldKind::Json => NativeType::new("json"),
    }
}

/// Renders the full column type clause for a declared field, nullability
/// included. Auto-increment and primary columns are always NOT NULL.
#[must_use]
pub fn format_type(field: &FieldDescriptor) -> String {
    let native = resolve_type(field);
    let nullable = field.nullable && !field.primary && !native.auto_increment;
    format!(
        "{} {}",
        native.render(),
        if nullable { "null" } else { "not null" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_type_mapping() {
        let cases = [
            (FieldDescriptor::new("f", FieldKind::Boolean), "tinyint(1) null"),
            (
                FieldDescriptor::new("f", FieldKind::Byte),
                "tinyint(3) unsigned null",
            ),
            (
                FieldDescriptor::new("id", FieldKind::Counter).primary(),
                "int(11) auto_increment not null",
            ),
            (
                FieldDescriptor::new("f", FieldKind::Currency),
                "decimal(19,4) null",
            ),
            (FieldDescriptor::new("f", FieldKind::Decimal), "decimal(19,8) null"),
            (
                FieldDescriptor::new("f", FieldKind::Decimal).size(10).scale(2),
                "decimal(10,2) null",
            ),
            (FieldDescriptor::new("f", FieldKind::DateTime), "timestamp null"),
            (
                FieldDescriptor::new("f", FieldKind::Text).not_null(),
                "varchar(512) not null",
            ),
            (
                FieldDescriptor::new("f", FieldKind::Text).size(80).not_null(),
                "varchar(80) not null",
            ),
            (FieldDescriptor::new("f", FieldKind::Note), "text null"),
            (FieldDescriptor::new("f", FieldKind::Guid), "varchar(36) null"),
            (FieldDescriptor::new("f", FieldKind::Short), "smallint(6) null"),
            (FieldDescriptor::new("f", FieldKind::Json), "json null"),
        ];
        for (field, expected) in cases {
            assert_eq!(format_type(&field), expected, "kind {:?}", field.kind);
        }
    }

    #[test]
    fn test_counter_is_not_null_even_when_nullable() {
        let field = FieldDescriptor::new("id", FieldKind::Counter);
        assert_eq!(format_type(&field), "int(11) auto_increment not null");
    }

    #[test]
    fn test_parse_catalog_text() {
        let parsed = NativeType::parse("int(11) unsigned auto_increment");
        assert_eq!(parsed.name, "int");
        assert_eq!(parsed.args, vec![11]);
        assert!(parsed.unsigned);
        assert!(parsed.auto_increment);

        let parsed = NativeType::parse("varchar(255)");
        assert_eq!(parsed.name, "varchar");
        assert_eq!(parsed.args, vec![255]);
        assert!(!parsed.unsigned);

        let parsed = NativeType::parse("timestamp");
        assert_eq!(parsed.name, "timestamp");
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn test_integer_display_width_ignored() {
        // MySQL 8 catalogs report `int` where older servers said `int(11)`.
        let declared = resolve_type(&FieldDescriptor::new("f", FieldKind::Integer));
        assert!(declared.matches(&NativeType::parse("int")));
        assert!(declared.matches(&NativeType::parse("int(11)")));
        assert!(!declared.matches(&NativeType::parse("bigint")));
        assert!(!declared.matches(&NativeType::parse("int unsigned")));
    }

    #[test]
    fn test_varchar_width_compared() {
        let declared = resolve_type(&FieldDescriptor::new("f", FieldKind::Text));
        assert!(declared.matches(&NativeType::parse("varchar(512)")));
        assert!(!declared.matches(&NativeType::parse("varchar(255)")));
    }
}

//! Generic SQL dialect.

use super::Dialect;
use crate::error::Result;
use crate::schema::{FieldDescriptor, FieldKind};

/// A generic SQL dialect using ANSI SQL standards.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn format_type(&self, field: &FieldDescriptor) -> Result<String> {
        let size = field.size;
        let base = match field.kind {
            FieldKind::Boolean => String::from("boolean"),
            FieldKind::Byte | FieldKind::Short => String::from("smallint"),
            FieldKind::Number | FieldKind::Float => String::from("real"),
            FieldKind::Counter | FieldKind::Integer => String::from("integer"),
            FieldKind::Currency => String::from("decimal(19,4)"),
            FieldKind::Decimal => format!(
                "decimal({},{})",
                size.unwrap_or(19),
                field.scale.unwrap_or(8)
            ),
            FieldKind::Date => String::from("date"),
            FieldKind::DateTime | FieldKind::Time => String::from("timestamp"),
            FieldKind::Duration => format!("varchar({})", size.unwrap_or(36)),
            FieldKind::Url | FieldKind::Text => format!("varchar({})", size.unwrap_or(512)),
            FieldKind::Note => match size {
                Some(n) => format!("varchar({n})"),
                None => String::from("text"),
            },
            FieldKind::Image | FieldKind::Binary => String::from("blob"),
            FieldKind::Guid => String::from("varchar(36)"),
            FieldKind::Json => String::from("text"),
        };
        let nullability = if field.nullable && !field.primary {
            "null"
        } else {
            "not null"
        };
        Ok(format!("{base} {nullability}"))
    }
}

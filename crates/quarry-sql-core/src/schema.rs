//! Declarative schema descriptors.
//!
//! These types describe the schema a caller *wants*: fields, indexes and
//! migration units. They are data only: the migration engine compares them
//! against the live catalog and plans the DDL to converge.

use serde::{Deserialize, Serialize};

/// Logical field kinds understood by the type mapper.
///
/// Each kind maps to exactly one native column type per dialect; the mapping
/// is fixed so a declared field always round-trips to the same clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// True/false flag.
    Boolean,
    /// Single unsigned byte.
    Byte,
    /// Floating point number.
    Number,
    /// Floating point number (alias of `Number`).
    Float,
    /// Auto-incrementing integer key.
    Counter,
    /// Monetary amount with fixed scale.
    Currency,
    /// Decimal with declarable precision and scale.
    Decimal,
    /// Calendar date.
    Date,
    /// Date and time.
    DateTime,
    /// Time of day.
    Time,
    /// 32-bit integer.
    Integer,
    /// ISO-8601 duration text.
    Duration,
    /// URL text.
    Url,
    /// Short text with a declarable size.
    Text,
    /// Long free-form text.
    Note,
    /// Image blob.
    Image,
    /// Binary blob.
    Binary,
    /// Globally unique identifier text.
    Guid,
    /// 16-bit integer.
    Short,
    /// JSON document.
    Json,
}

/// A declared field: the immutable input to type formatting and migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Logical kind.
    pub kind: FieldKind,
    /// Declared size (length for text/binary, precision for decimals).
    #[serde(default)]
    pub size: Option<u32>,
    /// Declared scale for decimals.
    #[serde(default)]
    pub scale: Option<u32>,
    /// Whether the field accepts NULL. Ignored for primary fields, which
    /// are always NOT NULL.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Whether the field is part of the primary key.
    #[serde(default)]
    pub primary: bool,
}

const fn default_nullable() -> bool {
    true
}

impl FieldDescriptor {
    /// Creates a new nullable, non-primary field.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            size: None,
            scale: None,
            nullable: true,
            primary: false,
        }
    }

    /// Sets the declared size.
    #[must_use]
    pub const fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the declared scale.
    #[must_use]
    pub const fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Marks the field NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the field as part of the primary key (implies NOT NULL).
    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self.nullable = false;
        self
    }
}

/// A declared or introspected index: a name and its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name, unique per table.
    pub name: String,
    /// Ordered column names.
    pub columns: Vec<String>,
}

impl IndexDescriptor {
    /// Creates a new index descriptor.
    #[must_use]
    pub fn new<S: Into<String>>(name: impl Into<String>, columns: Vec<S>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// One schema revision: consumed once by the migration planner, its outcome
/// permanently recorded in the ledger under `(applies_to, version)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MigrationDescriptor {
    /// Target table name.
    #[serde(rename = "appliesTo")]
    pub applies_to: String,
    /// Model name recorded in the ledger (informational).
    #[serde(default)]
    pub model: Option<String>,
    /// Human-readable description recorded in the ledger.
    #[serde(default)]
    pub description: Option<String>,
    /// Revision version; part of the idempotence key.
    pub version: String,
    /// Fields to ensure exist (additive only).
    #[serde(default)]
    pub add: Vec<FieldDescriptor>,
    /// Explicitly declared column changes. Rejected by this engine: widening
    /// is inferred from `add`, narrowing is unsupported.
    #[serde(default)]
    pub change: Vec<FieldDescriptor>,
    /// Explicitly declared column removals. Rejected by this engine.
    #[serde(default)]
    pub remove: Vec<FieldDescriptor>,
    /// Indexes to converge.
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
}

impl MigrationDescriptor {
    /// Creates a new migration descriptor for a table and version.
    #[must_use]
    pub fn new(applies_to: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            applies_to: applies_to.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Sets the recorded model name.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the recorded description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field to ensure.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.add.push(field);
        self
    }

    /// Adds an index to converge.
    #[must_use]
    pub fn index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_builder() {
        let field = FieldDescriptor::new("id", FieldKind::Counter).primary();
        assert!(field.primary);
        assert!(!field.nullable);

        let field = FieldDescriptor::new("name", FieldKind::Text).size(255).not_null();
        assert_eq!(field.size, Some(255));
        assert!(!field.nullable);
    }

    #[test]
    fn test_descriptor_builder() {
        let migration = MigrationDescriptor::new("Table1", "1.0")
            .field(FieldDescriptor::new("id", FieldKind::Counter).primary())
            .index(IndexDescriptor::new("idx_name", vec!["name"]));

        assert_eq!(migration.applies_to, "Table1");
        assert_eq!(migration.add.len(), 1);
        assert_eq!(migration.indexes[0].columns, vec!["name"]);
    }

    #[test]
    fn test_descriptor_deserializes_applies_to() {
        let migration: MigrationDescriptor = serde_json::from_str(
            r#"{"appliesTo": "Table1", "version": "1.0",
                "add": [{"name": "id", "kind": "Counter", "primary": true}]}"#,
        )
        .unwrap();
        assert_eq!(migration.applies_to, "Table1");
        assert_eq!(migration.add[0].kind, FieldKind::Counter);
        assert!(migration.add[0].nullable);
    }
}

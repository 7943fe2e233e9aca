//! Pure migration planning.
//!
//! The planner never touches the database: it validates a descriptor,
//! diffs declared fields against introspected catalog entries, and decides
//! per-index actions. The executor interprets the resulting plans.

use quarry_sql_core::{FieldDescriptor, IndexDescriptor, MigrationDescriptor};
use quarry_sql_mysql::{types, NativeType};

use crate::error::{MigrateError, Result};
use crate::introspect::ColumnCatalogEntry;

/// Progress of one migration application.
///
/// Each state gates the next; any error aborts the run in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// The ledger was consulted for `(appliesTo, version)`.
    LedgerChecked,
    /// Target table existence is known.
    TableChecked,
    /// The table was created with all declared fields.
    Created,
    /// Existing table received add/change DDL.
    Altered,
    /// Declared indexes were converged.
    IndexesApplied,
    /// The ledger row was written.
    Recorded,
    /// Nothing left to do.
    Done,
}

impl MigrationState {
    /// Returns the state name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LedgerChecked => "ledger_checked",
            Self::TableChecked => "table_checked",
            Self::Created => "created",
            Self::Altered => "altered",
            Self::IndexesApplied => "indexes_applied",
            Self::Recorded => "recorded",
            Self::Done => "done",
        }
    }
}

/// Structural work planned for the target table.
#[derive(Debug, Clone, PartialEq)]
pub enum TablePlan {
    /// Create the table with all declared fields.
    Create(Vec<FieldDescriptor>),
    /// Alter an existing table: adds run before changes.
    Alter {
        add: Vec<FieldDescriptor>,
        change: Vec<FieldDescriptor>,
    },
}

impl TablePlan {
    /// Returns whether the plan emits no DDL at all.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Create(_) => false,
            Self::Alter { add, change } => add.is_empty() && change.is_empty(),
        }
    }
}

/// Decision for one declared index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAction {
    /// No index of this name exists; create it.
    Create,
    /// An index of this name exists with different columns; drop and
    /// recreate it.
    Recreate,
    /// An identical index already exists.
    Skip,
}

/// Validates a descriptor before any I/O.
///
/// Explicit removals and explicit changes are rejected up front: this
/// engine is additive/widening only, and changes are inferred from `add`.
pub fn validate(descriptor: &MigrationDescriptor) -> Result<()> {
    if descriptor.applies_to.is_empty() {
        return Err(MigrateError::Validation(String::from(
            "migration target table name is empty",
        )));
    }
    if descriptor.version.is_empty() {
        return Err(MigrateError::Validation(String::from(
            "migration version is empty",
        )));
    }
    if descriptor.add.is_empty() {
        return Err(MigrateError::Validation(format!(
            "migration for '{}' declares no fields",
            descriptor.applies_to
        )));
    }
    if !descriptor.remove.is_empty() {
        return Err(MigrateError::Unsupported(format!(
            "migration for '{}' declares column removals",
            descriptor.applies_to
        )));
    }
    if !descriptor.change.is_empty() {
        return Err(MigrateError::Unsupported(format!(
            "migration for '{}' declares explicit column changes; changes are inferred",
            descriptor.applies_to
        )));
    }
    for index in &descriptor.indexes {
        if index.name.is_empty() {
            return Err(MigrateError::Validation(format!(
                "index on '{}' has an empty name",
                descriptor.applies_to
            )));
        }
        if index.columns.is_empty() {
            return Err(MigrateError::Validation(format!(
                "index '{}' declares no columns",
                index.name
            )));
        }
    }
    Ok(())
}

/// Returns whether a declared field already matches its catalog entry,
/// comparing structured native type plus nullability.
#[must_use]
pub fn column_matches(field: &FieldDescriptor, entry: &ColumnCatalogEntry) -> bool {
    let declared = types::resolve_type(field);
    let existing = NativeType::parse(&entry.column_type);
    let declared_nullable = field.nullable && !field.primary && !declared.auto_increment;
    declared.matches(&existing) && declared_nullable == entry.nullable
}

/// Diffs declared fields against the live table.
///
/// Missing columns go to `add`; existing non-primary columns whose type or
/// nullability differ go to `change`; primary columns are never altered
/// once the table exists; identical columns drop out of the plan.
#[must_use]
pub fn plan_table(declared: &[FieldDescriptor], existing: &[ColumnCatalogEntry]) -> TablePlan {
    let mut add = Vec::new();
    let mut change = Vec::new();
    for field in declared {
        match existing.iter().find(|entry| entry.name == field.name) {
            None => add.push(field.clone()),
            Some(entry) if entry.primary => {}
            Some(entry) => {
                if !column_matches(field, entry) {
                    change.push(field.clone());
                }
            }
        }
    }
    TablePlan::Alter { add, change }
}

/// Decides what to do for one declared index given the live index list.
#[must_use]
pub fn plan_index(declared: &IndexDescriptor, existing: &[IndexDescriptor]) -> IndexAction {
    match existing.iter().find(|index| index.name == declared.name) {
        None => IndexAction::Create,
        Some(index) if index.columns == declared.columns => IndexAction::Skip,
        Some(_) => IndexAction::Recreate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_sql_core::FieldKind;

    fn entry(name: &str, column_type: &str, nullable: bool, primary: bool) -> ColumnCatalogEntry {
        ColumnCatalogEntry {
            name: String::from(name),
            data_type: String::from(column_type.split('(').next().unwrap_or(column_type)),
            size: None,
            precision: None,
            scale: None,
            nullable,
            primary,
            column_type: String::from(column_type),
        }
    }

    #[test]
    fn test_validate_rejects_removals_and_changes() {
        let mut descriptor = MigrationDescriptor::new("Table1", "1.0")
            .field(FieldDescriptor::new("id", FieldKind::Counter).primary());
        assert!(validate(&descriptor).is_ok());

        descriptor.remove = vec![FieldDescriptor::new("old", FieldKind::Text)];
        assert!(matches!(
            validate(&descriptor),
            Err(MigrateError::Unsupported(_))
        ));

        descriptor.remove.clear();
        descriptor.change = vec![FieldDescriptor::new("id", FieldKind::Integer)];
        assert!(matches!(
            validate(&descriptor),
            Err(MigrateError::Unsupported(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_field_list() {
        let descriptor = MigrationDescriptor::new("Table1", "1.0");
        assert!(matches!(
            validate(&descriptor),
            Err(MigrateError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_column_is_added() {
        let declared = vec![FieldDescriptor::new("description", FieldKind::Text)];
        let plan = plan_table(&declared, &[]);
        assert_eq!(
            plan,
            TablePlan::Alter {
                add: declared,
                change: vec![]
            }
        );
    }

    #[test]
    fn test_widened_column_is_changed() {
        let declared = vec![FieldDescriptor::new("description", FieldKind::Text).size(512)];
        let existing = vec![entry("description", "varchar(255)", true, false)];
        let plan = plan_table(&declared, &existing);
        match plan {
            TablePlan::Alter { add, change } => {
                assert!(add.is_empty());
                assert_eq!(change.len(), 1);
                assert_eq!(change[0].name, "description");
            }
            TablePlan::Create(_) => panic!("unexpected create plan"),
        }
    }

    #[test]
    fn test_identical_column_is_noop() {
        let declared = vec![FieldDescriptor::new("description", FieldKind::Text).size(512)];
        let existing = vec![entry("description", "varchar(512)", true, false)];
        assert!(plan_table(&declared, &existing).is_noop());
    }

    #[test]
    fn test_primary_column_never_altered() {
        // Declared type differs from live, but primary structure is
        // immutable post-creation.
        let declared = vec![FieldDescriptor::new("id", FieldKind::Guid).primary()];
        let existing = vec![entry("id", "int(11) auto_increment", false, true)];
        assert!(plan_table(&declared, &existing).is_noop());
    }

    #[test]
    fn test_nullability_difference_is_changed() {
        let declared = vec![FieldDescriptor::new("name", FieldKind::Text).size(100).not_null()];
        let existing = vec![entry("name", "varchar(100)", true, false)];
        match plan_table(&declared, &existing) {
            TablePlan::Alter { change, .. } => assert_eq!(change.len(), 1),
            TablePlan::Create(_) => panic!("unexpected create plan"),
        }
    }

    #[test]
    fn test_integer_display_width_is_noop() {
        // MySQL 8 catalogs omit display widths; int(11) vs int is no change.
        let declared = vec![FieldDescriptor::new("count", FieldKind::Integer)];
        let existing = vec![entry("count", "int", true, false)];
        assert!(plan_table(&declared, &existing).is_noop());
    }

    #[test]
    fn test_plan_index_decisions() {
        let declared = IndexDescriptor::new("idx_name", vec!["familyName", "givenName"]);
        assert_eq!(plan_index(&declared, &[]), IndexAction::Create);
        assert_eq!(
            plan_index(
                &declared,
                &[IndexDescriptor::new("idx_name", vec!["familyName", "givenName"])]
            ),
            IndexAction::Skip
        );
        assert_eq!(
            plan_index(
                &declared,
                &[IndexDescriptor::new("idx_name", vec!["familyName"])]
            ),
            IndexAction::Recreate
        );
    }

    #[test]
    fn test_state_names() {
        assert_eq!(MigrationState::LedgerChecked.as_str(), "ledger_checked");
        assert_eq!(MigrationState::Done.as_str(), "done");
    }
}

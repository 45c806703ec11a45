use crate::{err, prelude::*};
use std::collections::BTreeSet;

// validate_field
// the relationship and select invariants, reported per field
#[must_use]
pub fn validate_field(field: &FieldDescriptor) -> ErrorTree {
    let mut errs = ErrorTree::new();

    if field.field_type.is_relationship()
        && field
            .linked_entity
            .as_deref()
            .is_none_or(|target| target.trim().is_empty())
    {
        err!(errs, "{} field has no linked entity", field.field_type);
    }

    if field.field_type.is_select() && field.select_values().is_none_or(<[String]>::is_empty) {
        err!(errs, "select field has no values");
    }

    errs
}

// validate_child_tables
pub fn validate_child_tables(tables: &[ChildTable], errs: &mut ErrorTree) {
    let mut seen = BTreeSet::new();

    for table in tables {
        if !seen.insert(table.table_id.as_str()) {
            errs.add_for(
                &table.table_id,
                format!("duplicate child table id '{}'", table.table_id),
            );
        }
        if table
            .linked_entity
            .as_deref()
            .is_none_or(|target| target.trim().is_empty())
        {
            errs.add_for(&table.table_id, "child table has no linked entity");
        }
    }
}

///
/// TESTS
///

//! Entity validation orchestration.
//!
//! Validation never blocks translation: callers log the flattened tree and
//! carry on, the same way follow-up markers are advisory.

pub mod field;
pub mod naming;

use crate::{error::ErrorTree, node::EntityDescriptor};

/// Run every entity check in a fixed order.
pub fn validate_entity(entity: &EntityDescriptor) -> Result<(), ErrorTree> {
    let mut errors = ErrorTree::new();

    // identity first, then per-field invariants
    naming::validate_entity_key(&entity.entity_key, &mut errors);
    naming::validate_field_ids(&entity.schema.fields, &mut errors);

    for field in &entity.schema.fields {
        errors.merge_for(&field.field_id, field::validate_field(field));
    }

    field::validate_child_tables(&entity.schema.child_tables, &mut errors);

    errors.result()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use std::path::PathBuf;

    fn entity(key: &str, fields: Vec<FieldDescriptor>) -> EntityDescriptor {
        EntityDescriptor {
            entity_key: key.to_string(),
            title: String::new(),
            kind: None,
            status: None,
            classification: Classification::default(),
            is_public: false,
            schema: EntitySchema {
                fields,
                ..EntitySchema::default()
            },
            actions: Vec::new(),
            permissions: Vec::new(),
            origin: EntityOrigin::SubmoduleDoc,
            source_path: PathBuf::new(),
        }
    }

    #[test]
    fn clean_entity_passes() {
        let mut customer = FieldDescriptor::new("customer", "Customer", FieldType::Link);
        customer.linked_entity = Some("Customer".to_string());

        assert!(validate_entity(&entity("invoice", vec![customer])).is_ok());
    }

    #[test]
    fn errors_are_routed_by_field_id() {
        let customer = FieldDescriptor::new("customer", "Customer", FieldType::Link);
        let status = FieldDescriptor::new("status", "Status", FieldType::Select);

        let errs = validate_entity(&entity("invoice", vec![customer, status])).unwrap_err();
        let routes: Vec<_> = errs.flatten().into_iter().map(|(route, _)| route).collect();

        assert_eq!(routes, vec!["customer", "status"]);
    }
}

use crate::{MAX_ENTITY_KEY_LEN, MAX_FIELD_ID_LEN, err, prelude::*};
use std::collections::BTreeMap;

// validate_entity_key
// keys become folder, module and route names
pub fn validate_entity_key(key: &str, errs: &mut ErrorTree) {
    if key.trim().is_empty() {
        err!(errs, "entity key is empty");
        return;
    }
    if key.len() > MAX_ENTITY_KEY_LEN {
        err!(
            errs,
            "entity key '{key}' exceeds max length {MAX_ENTITY_KEY_LEN}"
        );
    }
    if key.contains(['/', '\\']) || key.contains("..") {
        err!(errs, "entity key '{key}' must not contain a path");
        return;
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        err!(
            errs,
            "entity key '{key}' may only use ASCII letters, digits and '_'"
        );
    }
}

/// Entity key usable as a generated file stem and Python module name.
#[must_use]
pub fn is_valid_entity_key(key: &str) -> bool {
    let mut errs = ErrorTree::new();
    validate_entity_key(key, &mut errs);

    errs.is_empty()
}

// validate_field_ids
pub fn validate_field_ids(fields: &[FieldDescriptor], errs: &mut ErrorTree) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();

    for (index, field) in fields.iter().enumerate() {
        let id = field.field_id.as_str();

        if id.is_empty() {
            err!(errs, "field at position {index} has an empty id");
            continue;
        }
        if id.len() > MAX_FIELD_ID_LEN {
            err!(errs, "field id '{id}' exceeds max length {MAX_FIELD_ID_LEN}");
        }
        if let Some(prev) = seen.insert(id, index) {
            err!(
                errs,
                "duplicate field id '{id}' at positions {prev} and {index}"
            );
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_oversized_keys_are_rejected() {
        let mut errs = ErrorTree::new();
        validate_entity_key("  ", &mut errs);
        validate_entity_key(&"k".repeat(MAX_ENTITY_KEY_LEN + 1), &mut errs);

        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn path_like_keys_are_rejected() {
        for key in ["../../escape", "sales/lead", "sales\\lead", "..", "lead.py", "sales lead"] {
            assert!(!is_valid_entity_key(key), "{key}");
        }
        assert!(is_valid_entity_key("plt_d1_ticket"));
    }

    #[test]
    fn duplicate_field_ids_are_reported_once_per_repeat() {
        let fields = vec![
            FieldDescriptor::new("title", "Title", FieldType::Data),
            FieldDescriptor::new("title", "Title", FieldType::Data),
            FieldDescriptor::new("owner", "Owner", FieldType::Data),
        ];
        let mut errs = ErrorTree::new();
        validate_field_ids(&fields, &mut errs);

        assert_eq!(errs.len(), 1);
        assert!(errs.to_string().contains("duplicate field id 'title'"));
    }
}

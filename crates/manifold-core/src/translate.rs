//! Field translation between the legacy doctype vocabulary and doc schemas.
//!
//! Translation is total over well-formed objects: nothing here fails.  Where
//! a best-effort default is used the field carries a [`FollowUp`] marker so
//! a reviewer can find it later.

use manifold_schema::{PERMISSION_ACTIONS, prelude::*, wire::DoctypeMeta};
use manifold_utils::case::{to_label, to_snake_case};

/// Provenance keys written into a translated field's `source` block.
pub const SOURCE_FIELDNAME: &str = "doctype_fieldname";
pub const SOURCE_FIELDTYPE: &str = "doctype_fieldtype";

/// Provenance keys used by older exact-mapping seeds.
const LEGACY_SOURCE_FIELDNAME: &str = "frappe_fieldname";
const LEGACY_SOURCE_FIELDTYPE: &str = "frappe_fieldtype";

///
/// SourceVocabulary
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceVocabulary {
    /// legacy doctype field rows (`fieldname`, `fieldtype`, `reqd`, ...)
    Doctype,

    /// an already-translated doc schema field, possibly hand-edited
    Doc,
}

// to_bool
/// Normalize a loosely-typed flag.
///
/// `true`, non-zero numbers and the strings `1`/`true`/`yes`/`y` (any case,
/// surrounding whitespace ignored) are true; everything else is false.
#[must_use]
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y"
        ),
        _ => false,
    }
}

// is_truthy
// JSON value considered "set" for options payloads
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).is_some_and(to_bool)
}

fn text<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// translate_field
/// Translate one source field; `None` for layout-only fields, non-objects
/// and fields with no identity (neither id nor label).
#[must_use]
pub fn translate_field(raw: &Value, vocabulary: SourceVocabulary) -> Option<FieldDescriptor> {
    let obj = raw.as_object()?;

    match vocabulary {
        SourceVocabulary::Doctype => from_doctype(obj),
        SourceVocabulary::Doc => from_doc(obj),
    }
}

fn from_doctype(obj: &Map<String, Value>) -> Option<FieldDescriptor> {
    let type_name = text(obj, "fieldtype");
    let mut field = base_field(obj, "fieldname", type_name)?;

    field.required = flag(obj, "reqd");
    field.read_only = flag(obj, "read_only");
    field.default = obj.get("default").filter(|v| !v.is_null()).cloned();
    field.indexed = flag(obj, "search_index") || flag(obj, "unique");
    field.ui = FieldUi {
        visible: !flag(obj, "hidden"),
        list_visible: flag(obj, "in_list_view"),
        filterable: flag(obj, "in_standard_filter"),
        sortable: true,
    };

    if let Some(options) = obj.get("options").filter(|v| is_truthy(v)) {
        if field.field_type.is_relationship() {
            field.linked_entity = options
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string);
        } else {
            field.options = Some(options_from(options, &field.field_type));
        }
    } else if field.field_type.is_select() && obj.get("options").is_some_and(Value::is_string) {
        // an empty option string still reads as an (empty) value list
        field.options = Some(FieldOptions::Values { values: Vec::new() });
    }

    field.source.insert(
        SOURCE_FIELDTYPE.to_string(),
        obj.get("fieldtype").cloned().unwrap_or(Value::Null),
    );
    field.source.insert(
        SOURCE_FIELDNAME.to_string(),
        Value::String(field.field_id.clone()),
    );

    mark_invariants(&mut field);
    Some(field)
}

fn from_doc(obj: &Map<String, Value>) -> Option<FieldDescriptor> {
    let type_name = text(obj, "type");
    let mut field = base_field(obj, "field_id", type_name)?;

    field.required = flag(obj, "required");
    field.read_only = flag(obj, "read_only");
    field.default = obj.get("default").filter(|v| !v.is_null()).cloned();
    field.indexed = flag(obj, "indexed");
    field.linked_entity = text(obj, "linked_doc")
        .or_else(|| text(obj, "linked_entity"))
        .map(ToString::to_string);

    if let Some(ui) = obj.get("ui").and_then(Value::as_object) {
        field.ui = FieldUi {
            visible: ui.get("visible").is_none_or(to_bool),
            list_visible: flag(ui, "list_visible"),
            filterable: flag(ui, "filterable"),
            sortable: ui.get("sortable").is_none_or(to_bool),
        };
    }

    field.options = obj
        .get("options")
        .filter(|v| is_truthy(v))
        .map(|options| match options.as_object() {
            Some(o) if o.get("values").is_some_and(Value::is_array) => FieldOptions::Values {
                values: o
                    .get("values")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().map(value_text).collect())
                    .unwrap_or_default(),
            },
            Some(o) if o.contains_key("raw") => FieldOptions::Raw {
                raw: o.get("raw").cloned().unwrap_or(Value::Null),
            },
            _ => options_from(options, &field.field_type),
        });

    if let Some(source) = obj.get("source").and_then(Value::as_object) {
        field.source.clone_from(source);
    }
    if let Some(markers) = obj.get("follow_up").and_then(Value::as_array) {
        for marker in markers {
            if let Ok(marker) = serde_json::from_value::<FollowUp>(marker.clone()) {
                field.mark(marker);
            }
        }
    }

    mark_invariants(&mut field);
    Some(field)
}

// base_field
// identity, label and type with their follow-up markers
fn base_field(
    obj: &Map<String, Value>,
    id_key: &str,
    type_name: Option<&str>,
) -> Option<FieldDescriptor> {
    let field_type = type_name.map(|t| FieldType::from(t.to_string()));
    if field_type.as_ref().is_some_and(FieldType::is_structural) {
        return None;
    }

    let label = text(obj, "label");
    let field_id = match text(obj, id_key) {
        Some(id) => id.to_string(),
        None => Some(to_snake_case(label?)).filter(|s| !s.is_empty())?,
    };

    let mut field = FieldDescriptor::new(
        &field_id,
        &label.map_or_else(|| to_label(&field_id), ToString::to_string),
        field_type.clone().unwrap_or_default(),
    );
    if label.is_none() {
        field.mark(FollowUp::LabelDerived);
    }
    if field_type.is_none() {
        field.mark(FollowUp::TypeDefaulted);
    }

    Some(field)
}

// options_from
// a select's newline list becomes values, anything else is kept raw
fn options_from(options: &Value, field_type: &FieldType) -> FieldOptions {
    match options {
        Value::String(s) if field_type.is_select() => FieldOptions::Values {
            values: s
                .split('\n')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
                .collect(),
        },
        other => FieldOptions::Raw { raw: other.clone() },
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn mark_invariants(field: &mut FieldDescriptor) {
    if field.field_type.is_relationship() && field.linked_entity.is_none() {
        field.mark(FollowUp::MissingLinkedEntity);
    }
    if field.field_type.is_select() && field.select_values().is_none_or(<[String]>::is_empty) {
        field.mark(FollowUp::MissingSelectValues);
    }
}

///
/// SchemaSeed
///
/// Everything a legacy doctype contributes to a doc schema.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SchemaSeed {
    pub fields: Vec<FieldDescriptor>,
    pub child_tables: Vec<ChildTable>,
    pub validation_rules: Vec<Value>,
    pub naming_rule: NamingRule,
    pub doctype_meta: BorrowedMeta,
}

///
/// BorrowedMeta
/// doctype-level settings carried alongside a seed
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BorrowedMeta {
    pub name: Option<String>,
    pub module: Option<String>,
    pub default_view: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub permissions: Vec<Value>,
    pub role_action_matrix_seed: Vec<PermissionSeed>,
}

// translate_doctype
#[must_use]
pub fn translate_doctype(meta: &DoctypeMeta) -> SchemaSeed {
    let mut fields = Vec::new();
    let mut child_tables = Vec::new();

    for raw in &meta.fields {
        let Some(field) = translate_field(raw, SourceVocabulary::Doctype) else {
            continue;
        };
        if field.field_type.is_child_table() {
            child_tables.push(ChildTable::new(&field.field_id, field.linked_entity.clone()));
        }
        fields.push(field);
    }

    SchemaSeed {
        fields,
        child_tables,
        validation_rules: Vec::new(),
        naming_rule: NamingRule::from_autoname(meta.autoname.as_deref()),
        doctype_meta: BorrowedMeta {
            name: meta.name.clone(),
            module: meta.module.clone(),
            default_view: meta.default_view.clone(),
            sort_field: meta.sort_field.clone(),
            sort_order: meta.sort_order.clone(),
            permissions: meta.permissions.clone(),
            role_action_matrix_seed: permission_seeds(&meta.permissions),
        },
    }
}

// permission_seeds
/// One seed per permission row that names a role.
#[must_use]
pub fn permission_seeds(rows: &[Value]) -> Vec<PermissionSeed> {
    rows.iter()
        .filter_map(Value::as_object)
        .filter_map(|row| {
            let role_id = text(row, "role")?;
            let actions = PERMISSION_ACTIONS
                .iter()
                .filter(|action| flag(row, action))
                .map(ToString::to_string)
                .collect();

            Some(PermissionSeed {
                role_id: role_id.to_string(),
                actions,
            })
        })
        .collect()
}

// to_doctype_field
/// Reverse translation used by bridge sync.  Flags are written only when
/// set, in doctype spelling (`reqd: 1`, `hidden: 1`, ...).
#[must_use]
pub fn to_doctype_field(field: &FieldDescriptor) -> Map<String, Value> {
    let source_text = |keys: [&str; 2]| {
        keys.iter()
            .find_map(|k| text(&field.source, k))
            .map(ToString::to_string)
    };

    let fieldname = source_text([SOURCE_FIELDNAME, LEGACY_SOURCE_FIELDNAME])
        .unwrap_or_else(|| field.field_id.clone());
    let fieldtype = source_text([SOURCE_FIELDTYPE, LEGACY_SOURCE_FIELDTYPE])
        .unwrap_or_else(|| field.field_type.as_str().to_string());

    let mut row = Map::new();
    row.insert("fieldname".to_string(), Value::String(fieldname));
    row.insert("fieldtype".to_string(), Value::String(fieldtype));

    if !field.label.is_empty() {
        row.insert("label".to_string(), Value::String(field.label.clone()));
    }
    if field.required {
        row.insert("reqd".to_string(), Value::from(1));
    }
    if field.read_only {
        row.insert("read_only".to_string(), Value::from(1));
    }
    if let Some(default) = &field.default {
        row.insert("default".to_string(), default.clone());
    }
    if field.ui.list_visible {
        row.insert("in_list_view".to_string(), Value::from(1));
    }
    if field.ui.filterable {
        row.insert("in_standard_filter".to_string(), Value::from(1));
    }
    if !field.ui.visible {
        row.insert("hidden".to_string(), Value::from(1));
    }

    let options = match (&field.linked_entity, &field.options) {
        (Some(linked), _) if field.field_type.is_relationship() => {
            Some(Value::String(linked.clone()))
        }
        (_, Some(FieldOptions::Values { values })) => Some(Value::String(values.join("\n"))),
        (_, Some(FieldOptions::Raw { raw })) => Some(raw.clone()),
        _ => None,
    };
    if let Some(options) = options.filter(|o| !o.is_null() && o.as_str() != Some("")) {
        row.insert("options".to_string(), options);
    }

    row
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn doctype(fields: Value) -> DoctypeMeta {
        serde_json::from_value(json!({ "name": "Sales Invoice", "fields": fields })).unwrap()
    }

    fn doctype_field(raw: &Value) -> Option<FieldDescriptor> {
        translate_field(raw, SourceVocabulary::Doctype)
    }

    #[test]
    fn boolean_normalization_table() {
        let truthy = [
            json!(1),
            json!("1"),
            json!("true"),
            json!("Yes"),
            json!(" y "),
            json!(true),
            json!(2.5),
        ];
        for truthy in truthy {
            assert!(to_bool(&truthy), "{truthy} should be true");
        }
        for falsy in [json!(0), json!(""), json!(null), json!(false), json!("no"), json!([1])] {
            assert!(!to_bool(&falsy), "{falsy} should be false");
        }

        let field = doctype_field(&json!({"fieldname": "x", "fieldtype": "Data"})).unwrap();
        assert!(!field.required);
    }

    #[test]
    fn link_field_translation_drops_section_break() {
        let seed = translate_doctype(&doctype(json!([
            {"fieldname": "customer", "fieldtype": "Link", "options": "Customer", "reqd": 1},
            {"fieldname": "notes", "fieldtype": "Section Break"},
        ])));

        assert_eq!(seed.fields.len(), 1);
        let customer = &seed.fields[0];
        assert_eq!(customer.field_id, "customer");
        assert_eq!(customer.field_type, FieldType::Link);
        assert!(customer.required);
        assert_eq!(customer.linked_entity.as_deref(), Some("Customer"));
        assert_eq!(customer.label, "Customer");
        assert_eq!(customer.follow_up, vec![FollowUp::LabelDerived]);
        assert!(customer.options.is_none());
    }

    #[test]
    fn select_options_split_into_values() {
        let field = doctype_field(&json!({
            "fieldname": "status",
            "fieldtype": "Select",
            "options": "Draft\n\n Paid \nCancelled",
        }))
        .unwrap();

        let values = ["Draft".to_string(), "Paid".to_string(), "Cancelled".to_string()];
        assert_eq!(field.select_values(), Some(&values[..]));
        assert!(field.follow_up.is_empty());
    }

    #[test]
    fn non_select_options_pass_through_raw() {
        let field = doctype_field(&json!({
            "fieldname": "amount",
            "fieldtype": "Currency",
            "options": "currency",
        }))
        .unwrap();

        assert_eq!(field.options, Some(FieldOptions::Raw { raw: json!("currency") }));
    }

    #[test]
    fn missing_pieces_are_marked_not_fatal() {
        let link = doctype_field(&json!({"fieldname": "owner", "fieldtype": "Link"})).unwrap();
        assert!(link.follow_up.contains(&FollowUp::MissingLinkedEntity));

        let untyped = doctype_field(&json!({"fieldname": "code"})).unwrap();
        assert_eq!(untyped.field_type, FieldType::Data);
        assert!(untyped.follow_up.contains(&FollowUp::TypeDefaulted));

        let select = doctype_field(&json!({"fieldname": "kind", "fieldtype": "Select"})).unwrap();
        assert!(select.follow_up.contains(&FollowUp::MissingSelectValues));
    }

    #[test]
    fn identity_falls_back_to_label() {
        let field = doctype_field(&json!({"label": "Due Date", "fieldtype": "Date"})).unwrap();
        assert_eq!(field.field_id, "due_date");

        assert!(doctype_field(&json!({"fieldtype": "Date"})).is_none());
        assert!(doctype_field(&json!("customer")).is_none());
    }

    #[test]
    fn flags_and_ui_hints() {
        let field = translate_field(
            &json!({
                "fieldname": "email", "fieldtype": "Data", "unique": "1",
                "hidden": 1, "in_list_view": true, "in_standard_filter": "yes",
            }),
            SourceVocabulary::Doctype,
        )
        .unwrap();

        assert!(field.indexed);
        assert_eq!(
            field.ui,
            FieldUi { visible: false, list_visible: true, filterable: true, sortable: true }
        );
        assert_eq!(field.source.get(SOURCE_FIELDNAME), Some(&json!("email")));
    }

    #[test]
    fn child_tables_and_naming_rule() {
        let mut meta = doctype(json!([
            {"fieldname": "items", "fieldtype": "Table", "options": "Sales Invoice Item"},
        ]));
        meta.autoname = Some("naming_series:SINV-.YYYY.-".to_string());
        let seed = translate_doctype(&meta);

        assert_eq!(
            seed.child_tables,
            vec![ChildTable::new("items", Some("Sales Invoice Item".to_string()))]
        );
        assert_eq!(seed.naming_rule.pattern(), Some("SINV-.YYYY.-"));
    }

    #[test]
    fn permission_rows_become_seeds() {
        let seeds = permission_seeds(&[
            json!({"role": "Accounts User", "read": 1, "write": "1", "submit": 0}),
            json!({"read": 1}),
        ]);

        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].role_id, "Accounts User");
        assert_eq!(seeds[0].actions, vec!["read", "write"]);
    }

    #[test]
    fn doc_vocabulary_normalizes_hand_edits() {
        let field = translate_field(
            &json!({
                "field_id": "status", "type": "Select", "required": "true",
                "options": {"values": ["Open", "Closed"]},
                "ui": {"visible": 0},
            }),
            SourceVocabulary::Doc,
        )
        .unwrap();

        assert!(field.required);
        assert!(!field.ui.visible);
        assert!(field.ui.sortable);
        assert_eq!(field.select_values().map(<[String]>::len), Some(2));
    }

    #[test]
    fn reverse_translation_writes_only_set_flags() {
        let seed = translate_doctype(&doctype(json!([
            {"fieldname": "customer", "fieldtype": "Link", "options": "Customer",
             "reqd": 1, "label": "Customer"},
            {"fieldname": "status", "fieldtype": "Select", "options": "Open\nClosed"},
        ])));

        let customer = to_doctype_field(&seed.fields[0]);
        assert_eq!(
            Value::Object(customer),
            json!({
                "fieldname": "customer",
                "fieldtype": "Link",
                "label": "Customer",
                "reqd": 1,
                "options": "Customer",
            })
        );

        let status = to_doctype_field(&seed.fields[1]);
        assert_eq!(status.get("options"), Some(&json!("Open\nClosed")));
        assert!(!status.contains_key("reqd"));
    }

    proptest! {
        #[test]
        fn structural_fields_never_translate(
            name in "[a-z_]{1,12}",
            ty in prop::sample::select(
                vec!["Section Break", "Column Break", "Tab Break", "HTML", "Button"],
            ),
        ) {
            let raw = json!({"fieldname": name, "fieldtype": ty, "label": "X"});
            prop_assert!(doctype_field(&raw).is_none());
            let doc = json!({"field_id": name, "type": ty});
            prop_assert!(translate_field(&doc, SourceVocabulary::Doc).is_none());
        }

        #[test]
        fn integer_flags_follow_zero_test(n in any::<i64>()) {
            prop_assert_eq!(to_bool(&json!(n)), n != 0);
            prop_assert_eq!(to_bool(&json!(n.to_string())), n == 1);
        }
    }
}

//! Bridge sync: mirror translated doc schemas back into the legacy doctype
//! JSON files the Django wrapper pipeline still reads.

use crate::{
    discover::find_doc_folders,
    error::Error,
    fs::{ArtifactSink, write_json},
    load::{list_len, load_json_map},
    translate::{SourceVocabulary, to_doctype_field, translate_field},
};
use manifold_schema::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

///
/// BridgeStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct BridgeStats {
    pub docs_processed: usize,
    pub doctype_json_found: usize,
    pub doctype_updated: usize,
    pub doctype_missing: usize,
    pub schema_with_fields: usize,
}

// sync_bridge
pub fn sync_bridge(app_root: &Path, sink: &mut dyn ArtifactSink) -> Result<BridgeStats, Error> {
    let mut stats = BridgeStats::default();

    for folder in find_doc_folders(app_root) {
        let schema_path = folder.triplet().schema_json;
        if !schema_path.is_file() {
            continue;
        }
        stats.docs_processed += 1;

        let schema = match load_json_map(&schema_path) {
            Ok(schema) => schema,
            Err(err) => {
                warn!(error = %err, "skipping malformed schema");
                continue;
            }
        };
        if list_len(&schema, "fields") == 0 {
            continue;
        }
        stats.schema_with_fields += 1;

        let doc_key = schema
            .get("doc_key")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .unwrap_or(folder.doc_key.as_str());
        let doctype_path = app_root
            .join(&folder.module_id)
            .join("doctype")
            .join(doc_key)
            .join(format!("{doc_key}.json"));

        if !doctype_path.is_file() {
            debug!(doc_key, "no legacy doctype to bridge");
            stats.doctype_missing += 1;
            continue;
        }
        stats.doctype_json_found += 1;

        let mut doctype = match load_json_map(&doctype_path) {
            Ok(doctype) => doctype,
            Err(err) => {
                warn!(error = %err, "skipping malformed doctype");
                continue;
            }
        };

        bridge_schema(&schema, &mut doctype);
        write_json(sink, &doctype_path, &doctype)?;
        stats.doctype_updated += 1;
    }

    Ok(stats)
}

// bridge_schema
/// Overwrite the doctype's fields and carry naming and view settings over.
pub fn bridge_schema(schema: &Map<String, Value>, doctype: &mut Map<String, Value>) {
    let fields: Vec<Value> = schema
        .get("fields")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|raw| translate_field(raw, SourceVocabulary::Doc))
        .map(|field| Value::Object(to_doctype_field(&field)))
        .collect();
    doctype.insert("fields".to_string(), Value::Array(fields));

    let naming_rule = schema
        .get("naming_rule")
        .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
        .and_then(|v| serde_json::from_value::<NamingRule>(v.clone()).ok());
    match naming_rule {
        Some(NamingRule::Series { pattern: None }) => {
            doctype
                .entry("autoname")
                .or_insert_with(|| Value::from("naming_series:"));
        }
        Some(rule) => {
            if let Some(autoname) = rule.to_autoname() {
                doctype.insert("autoname".to_string(), Value::String(autoname));
            }
        }
        None => {}
    }

    let Some(reference) = schema
        .get("seed_reference")
        .or_else(|| schema.get("frappe_seed_reference"))
        .and_then(Value::as_object)
    else {
        return;
    };
    let set = |key: &str| {
        reference
            .get(key)
            .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
            .cloned()
    };

    let has_view = doctype
        .get("default_view")
        .is_some_and(|v| v.as_str().is_some_and(|s| !s.is_empty()));
    if let Some(view) = set("default_view").filter(|_| !has_view) {
        doctype.insert("default_view".to_string(), view);
    }
    for key in ["sort_field", "sort_order"] {
        if let Some(value) = set(key) {
            doctype.insert(key.to_string(), value);
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FsSink;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn fields_and_naming_are_mirrored() {
        let schema = map(json!({
            "fields": [
                {"field_id": "customer", "label": "Customer", "type": "Link",
                 "linked_doc": "Customer", "required": true,
                 "source": {"frappe_fieldname": "customer_name", "frappe_fieldtype": "Link"}},
                {"field_id": "state", "label": "State", "type": "Select",
                 "options": {"values": ["open", "closed"]}, "ui": {"visible": false}},
            ],
            "naming_rule": {"strategy": "series", "pattern": "INV-"},
            "seed_reference": {
                "default_view": "List",
                "sort_field": "modified",
                "sort_order": "",
            },
        }));
        let mut doctype = map(json!({
            "name": "Invoice",
            "default_view": "Report",
            "fields": [{"fieldname": "old"}],
        }));

        bridge_schema(&schema, &mut doctype);

        assert_eq!(
            doctype["fields"],
            json!([
                {"fieldname": "customer_name", "fieldtype": "Link", "label": "Customer",
                 "reqd": 1, "options": "Customer"},
                {"fieldname": "state", "fieldtype": "Select", "label": "State",
                 "hidden": 1, "options": "open\nclosed"},
            ])
        );
        assert_eq!(doctype["autoname"], "naming_series:INV-");
        assert_eq!(doctype["default_view"], "Report");
        assert_eq!(doctype["sort_field"], "modified");
        assert!(doctype.get("sort_order").is_none());
    }

    #[test]
    fn bare_series_keeps_existing_autoname() {
        let schema = map(json!({
            "fields": [],
            "naming_rule": {"strategy": "series", "pattern": null},
        }));

        let mut doctype = map(json!({"autoname": "field:title"}));
        bridge_schema(&schema, &mut doctype);
        assert_eq!(doctype["autoname"], "field:title");

        let mut doctype = map(json!({}));
        bridge_schema(&schema, &mut doctype);
        assert_eq!(doctype["autoname"], "naming_series:");
    }

    #[test]
    fn sync_counts_missing_doctypes() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("crm/submodule/leads/docs");
        let with_fields =
            json!({"fields": [{"field_id": "title", "label": "Title", "type": "Data"}]});
        let empty = json!({"fields": []});
        for (key, schema) in [("lead", &with_fields), ("deal", &with_fields), ("empty", &empty)] {
            fs::create_dir_all(docs.join(key)).unwrap();
            fs::write(docs.join(key).join("doc.json"), "{}").unwrap();
            fs::write(docs.join(key).join("schema.json"), schema.to_string()).unwrap();
        }
        let doctype = dir.path().join("crm/doctype/lead/lead.json");
        fs::create_dir_all(doctype.parent().unwrap()).unwrap();
        fs::write(&doctype, r#"{"name": "Lead", "fields": []}"#).unwrap();

        let stats = sync_bridge(dir.path(), &mut FsSink::new()).unwrap();

        assert_eq!(
            stats,
            BridgeStats {
                docs_processed: 3,
                doctype_json_found: 1,
                doctype_updated: 1,
                doctype_missing: 1,
                schema_with_fields: 2,
            }
        );
        let written: Value = serde_json::from_str(&fs::read_to_string(&doctype).unwrap()).unwrap();
        assert_eq!(written["fields"][0]["fieldname"], "title");
    }
}

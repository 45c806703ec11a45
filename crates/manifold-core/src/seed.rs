//! First-writer-wins seeding of empty doc schemas.
//!
//! A `schema.json` that already lists at least one field is never touched
//! by either seeder.

use crate::{
    discover::find_doc_folders,
    error::{Error, FsError},
    fs::{ArtifactSink, encode, write_json},
    load::{has_entries, load_json, load_json_map},
    registry::MappingRegistry,
    translate::translate_doctype,
};
use manifold_config::Config;
use manifold_schema::{prelude::*, wire::DoctypeMeta};
use serde_json::json;
use std::path::Path;
use tracing::{debug, warn};

pub const EXACT_SEED_SOURCE: &str = "doctype_exact_mapping_seed";
pub const NATIVE_SEED_SOURCE: &str = "native_manual_seed";

fn put<T: Serialize>(
    map: &mut Map<String, Value>,
    key: &str,
    value: &T,
    path: &Path,
) -> Result<(), FsError> {
    map.insert(key.to_string(), encode(value, path)?);

    Ok(())
}

///
/// ExactSeedSummary
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ExactSeedSummary {
    pub mappings_total: usize,
    pub enabled: usize,
    pub seedable: usize,
    pub seeded: usize,
    pub skipped_missing_files: usize,
    pub skipped_existing_schema_fields: usize,
    pub invalid: usize,
}

// seed_exact
/// Seed doc schemas from the legacy doctype each enabled mapping names.
pub fn seed_exact(config: &Config, sink: &mut dyn ArtifactSink) -> Result<ExactSeedSummary, Error> {
    let registry = MappingRegistry::load(&config.exact_mapping_path())?;
    let mut summary = ExactSeedSummary {
        mappings_total: registry.mappings.len(),
        ..ExactSeedSummary::default()
    };

    for record in registry.enabled() {
        summary.enabled += 1;

        let (Some(doc_path), Some(json_file)) = (
            record.source_doc.doc_path.as_deref().filter(|p| !p.is_empty()),
            record.top_match.json_file.as_deref().filter(|p| !p.is_empty()),
        ) else {
            summary.skipped_missing_files += 1;
            continue;
        };

        let schema_path = config.resolve(Path::new(doc_path)).join("schema.json");
        let source_path = config.resolve(Path::new(json_file));
        if !schema_path.is_file() || !source_path.is_file() {
            debug!(doc_path, json_file, "mapping names a missing file");
            summary.skipped_missing_files += 1;
            continue;
        }

        let loaded = load_json_map(&schema_path)
            .and_then(|schema| Ok((schema, load_json::<DoctypeMeta>(&source_path)?)));
        let (mut schema, doctype) = match loaded {
            Ok(pair) => pair,
            Err(err) => {
                warn!(error = %err, "skipping mapping with malformed input");
                summary.invalid += 1;
                continue;
            }
        };

        if has_entries(&schema, "fields") {
            summary.skipped_existing_schema_fields += 1;
            continue;
        }

        let seed = translate_doctype(&doctype);
        summary.seedable += 1;
        if seed.fields.is_empty() {
            continue;
        }

        put(&mut schema, "fields", &seed.fields, &schema_path)?;
        put(&mut schema, "child_tables", &seed.child_tables, &schema_path)?;
        put(&mut schema, "naming_rule", &seed.naming_rule, &schema_path)?;
        schema.insert("source".to_string(), Value::from(EXACT_SEED_SOURCE));
        schema.insert(
            "seed_reference".to_string(),
            json!({
                "json_file": json_file,
                "doctype_name": doctype.name,
                "module": doctype.module,
                "default_view": doctype.default_view,
                "sort_field": doctype.sort_field,
                "sort_order": doctype.sort_order,
            }),
        );

        write_json(sink, &schema_path, &schema)?;
        summary.seeded += 1;
    }

    Ok(summary)
}

///
/// NativeSeedSummary
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct NativeSeedSummary {
    pub remaining_targets_found: usize,
    pub seeded: usize,
}

// seed_native
/// Give every still-empty submodule doc schema a role template.
pub fn seed_native(
    app_root: &Path,
    sink: &mut dyn ArtifactSink,
) -> Result<NativeSeedSummary, Error> {
    let mut summary = NativeSeedSummary::default();

    for folder in find_doc_folders(app_root) {
        let schema_path = folder.triplet().schema_json;
        if !schema_path.is_file() {
            continue;
        }

        let mut schema = match load_json_map(&schema_path) {
            Ok(schema) => schema,
            Err(err) => {
                warn!(error = %err, "skipping malformed schema");
                continue;
            }
        };
        if has_entries(&schema, "fields") {
            continue;
        }
        summary.remaining_targets_found += 1;

        let doc_key = schema
            .get("doc_key")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .unwrap_or(folder.doc_key.as_str())
            .to_string();

        put(&mut schema, "fields", &native_fields_for(&doc_key), &schema_path)?;
        for key in ["child_tables", "validation_rules"] {
            if !has_entries(&schema, key) {
                schema.insert(key.to_string(), Value::Array(Vec::new()));
            }
        }
        if schema.get("naming_rule").is_none_or(is_blank) {
            put(&mut schema, "naming_rule", &NamingRule::default(), &schema_path)?;
        }
        schema.insert("source".to_string(), Value::from(NATIVE_SEED_SOURCE));
        schema.insert(
            "native_seed_reference".to_string(),
            json!({
                "generator": "plug seed native",
                "reason": "No exact mapping candidate available (build_from_scratch)",
            }),
        );

        write_json(sink, &schema_path, &schema)?;
        summary.seeded += 1;
    }

    Ok(summary)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(o) => o.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

///
/// Native templates
///

fn native(field_id: &str, label: &str, field_type: FieldType) -> FieldDescriptor {
    let mut field = FieldDescriptor::new(field_id, label, field_type);
    field
        .source
        .insert("kind".to_string(), Value::from("native_seed"));

    field
}

fn required(mut field: FieldDescriptor) -> FieldDescriptor {
    field.required = true;
    field
}

fn read_only(mut field: FieldDescriptor) -> FieldDescriptor {
    field.read_only = true;
    field
}

fn select(field_id: &str, label: &str, values: &[&str], default: Option<&str>) -> FieldDescriptor {
    let mut field = native(field_id, label, FieldType::Select);
    field.options = Some(FieldOptions::Values {
        values: values.iter().map(ToString::to_string).collect(),
    });
    field.default = default.map(Value::from);

    field
}

fn common_fields() -> Vec<FieldDescriptor> {
    let mut owner = native("owner_user", "Owner User", FieldType::Link);
    owner.linked_entity = Some("User".to_string());

    vec![
        read_only(native("record_id", "Record ID", FieldType::Data)),
        required(native("title", "Title", FieldType::Data)),
        native("description", "Description", FieldType::LongText),
        select(
            "priority",
            "Priority",
            &["low", "medium", "high", "critical"],
            Some("medium"),
        ),
        owner,
        read_only(native("created_at", "Created At", FieldType::Datetime)),
        read_only(native("updated_at", "Updated At", FieldType::Datetime)),
    ]
}

fn source_record() -> FieldDescriptor {
    required(native("source_record_id", "Source Record ID", FieldType::Data))
}

// native_fields_for
/// Template chosen by the role suffix embedded in the doc key.
#[must_use]
pub fn native_fields_for(doc_key: &str) -> Vec<FieldDescriptor> {
    let mut fields = common_fields();

    if doc_key.contains("_bt1_request") {
        fields.extend([
            required(select(
                "request_type",
                "Request Type",
                &["test", "restore", "alert", "incident", "policy"],
                None,
            )),
            required(native("target_scope", "Target Scope", FieldType::Data)),
            required(select(
                "status",
                "Status",
                &["draft", "submitted", "queued"],
                Some("draft"),
            )),
        ]);
    } else if doc_key.contains("_bt2_status") {
        fields.extend([
            source_record(),
            required(select(
                "current_status",
                "Current Status",
                &["open", "in_progress", "blocked", "resolved", "closed"],
                None,
            )),
            native("status_reason", "Status Reason", FieldType::SmallText),
            required(native("effective_at", "Effective At", FieldType::Datetime)),
        ]);
    } else if doc_key.contains("_bt2_work_log") {
        fields.extend([
            source_record(),
            required(select(
                "work_type",
                "Work Type",
                &["observation", "action", "validation", "escalation"],
                None,
            )),
            required(native("work_note", "Work Note", FieldType::LongText)),
            required(native("worked_at", "Worked At", FieldType::Datetime)),
        ]);
    } else if doc_key.contains("_bt3_closure") {
        fields.extend([
            source_record(),
            required(select(
                "closure_status",
                "Closure Status",
                &["closed", "completed", "cancelled"],
                None,
            )),
            required(native("closure_summary", "Closure Summary", FieldType::LongText)),
            required(native("closed_at", "Closed At", FieldType::Datetime)),
        ]);
    }

    fields
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{DryRunSink, FsSink};
    use manifold_schema::validate::field::validate_field;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, value: &Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn exact_fixture(dir: &Path) -> Config {
        let config = Config::with_root(dir);
        let doc = "apps/platform_core/support/submodule/desk/docs";

        write(
            &dir.join(doc).join("ticket/schema.json"),
            &json!({"doc_key": "ticket", "fields": []}),
        );
        write(
            &dir.join(doc).join("queue/schema.json"),
            &json!({
                "doc_key": "queue",
                "fields": [{"field_id": "kept", "label": "Kept", "type": "Data"}],
            }),
        );
        write(
            &dir.join("source/hd_ticket.json"),
            &json!({
                "name": "HD Ticket",
                "module": "Helpdesk",
                "autoname": "naming_series:HD-.#####",
                "sort_field": "modified",
                "fields": [
                    {"fieldname": "subject", "fieldtype": "Data", "reqd": 1},
                    {"fieldname": "sb", "fieldtype": "Section Break"},
                ],
            }),
        );
        write(
            &config.exact_mapping_path(),
            &json!({"mappings": [
                {"enabled": true,
                 "source_doc": {"doc_key": "ticket", "doc_path": format!("{doc}/ticket")},
                 "match": {"json_file": "source/hd_ticket.json"}},
                {"enabled": true,
                 "source_doc": {"doc_key": "queue", "doc_path": format!("{doc}/queue")},
                 "match": {"json_file": "source/hd_ticket.json"}},
                {"enabled": true,
                 "source_doc": {"doc_key": "gone", "doc_path": format!("{doc}/gone")},
                 "match": {"json_file": "source/hd_ticket.json"}},
                {"enabled": false, "source_doc": {"doc_key": "draft"}, "match": null},
            ]}),
        );

        config
    }

    #[test]
    fn exact_seed_is_first_writer_wins() {
        let dir = TempDir::new().unwrap();
        let config = exact_fixture(dir.path());

        let summary = seed_exact(&config, &mut FsSink::new()).unwrap();

        assert_eq!(
            summary,
            ExactSeedSummary {
                mappings_total: 4,
                enabled: 3,
                seedable: 1,
                seeded: 1,
                skipped_missing_files: 1,
                skipped_existing_schema_fields: 1,
                invalid: 0,
            }
        );

        let docs = dir.path().join("apps/platform_core/support/submodule/desk/docs");
        let ticket = read(&docs.join("ticket/schema.json"));
        assert_eq!(ticket["fields"][0]["field_id"], "subject");
        assert_eq!(ticket["fields"].as_array().unwrap().len(), 1);
        assert_eq!(ticket["naming_rule"], json!({"strategy": "series", "pattern": "HD-.#####"}));
        assert_eq!(ticket["source"], EXACT_SEED_SOURCE);
        assert_eq!(ticket["seed_reference"]["sort_field"], "modified");

        let queue = read(&docs.join("queue/schema.json"));
        assert_eq!(queue["fields"][0]["field_id"], "kept");

        let again = seed_exact(&config, &mut FsSink::new()).unwrap();
        assert_eq!(again.seeded, 0);
        assert_eq!(again.skipped_existing_schema_fields, 2);
    }

    #[test]
    fn dry_run_counts_match_write() {
        let dir = TempDir::new().unwrap();
        let config = exact_fixture(dir.path());
        let mut sink = DryRunSink::new();

        let summary = seed_exact(&config, &mut sink).unwrap();

        assert_eq!(summary.seeded, 1);
        let ticket = read(
            &dir.path()
                .join("apps/platform_core/support/submodule/desk/docs/ticket/schema.json"),
        );
        assert_eq!(ticket["fields"], json!([]));
    }

    #[test]
    fn native_seed_fills_only_empty_schemas() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("core/submodule/ops/docs");
        write(&docs.join("backup_bt1_request/doc.json"), &json!({}));
        write(&docs.join("backup_bt1_request/schema.json"), &json!({"fields": []}));
        write(&docs.join("seeded/doc.json"), &json!({}));
        write(&docs.join("seeded/schema.json"), &json!({"fields": [{"field_id": "x"}]}));

        let summary = seed_native(dir.path(), &mut FsSink::new()).unwrap();
        assert_eq!(summary, NativeSeedSummary { remaining_targets_found: 1, seeded: 1 });

        let schema = read(&docs.join("backup_bt1_request/schema.json"));
        let ids: Vec<_> = schema["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field_id"].as_str().unwrap().to_string())
            .collect();
        assert!(ids.starts_with(&["record_id".to_string(), "title".to_string()]));
        assert!(ids.ends_with(&["target_scope".to_string(), "status".to_string()]));
        assert_eq!(schema["source"], NATIVE_SEED_SOURCE);
        assert_eq!(schema["naming_rule"]["strategy"], "series");
        assert_eq!(schema["fields"][0]["source"]["kind"], "native_seed");
    }

    #[test]
    fn keyed_field_maps_are_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let config = exact_fixture(dir.path());
        let docs = dir.path().join("apps/platform_core/support/submodule/desk/docs");
        let keyed = json!({"doc_key": "ticket", "fields": {"subject": {"type": "Data"}}});
        write(&docs.join("ticket/schema.json"), &keyed);
        write(&docs.join("ticket/doc.json"), &json!({}));

        let exact = seed_exact(&config, &mut FsSink::new()).unwrap();
        assert_eq!(exact.seeded, 0);
        assert_eq!(exact.skipped_existing_schema_fields, 2);

        let native = seed_native(&config.app_root("platform_core"), &mut FsSink::new()).unwrap();
        assert_eq!(native.seeded, 0);
        assert_eq!(read(&docs.join("ticket/schema.json")), keyed);
    }

    #[test]
    fn native_templates_pass_field_validation() {
        for key in ["a_bt1_request", "a_bt2_status", "a_bt2_work_log", "a_bt3_closure", "plain"] {
            for field in native_fields_for(key) {
                assert!(validate_field(&field).is_empty(), "{key}.{}", field.field_id);
            }
        }
        assert_eq!(native_fields_for("plain").len(), 7);
        assert_eq!(native_fields_for("x_bt2_work_log").len(), 11);
    }
}

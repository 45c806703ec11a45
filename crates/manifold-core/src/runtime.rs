//! Per-doc runtime artifacts: `<doc_key>.json`, `.py` and `.js` written
//! beside each ready doc triplet.

use crate::{
    discover::{DocFolder, find_doc_folders, relative_display},
    error::{Error, FsError},
    fs::{ArtifactSink, encode, write_json},
    load::{has_entries, load_action_vocabulary, load_json, load_json_map},
    translate::{SchemaSeed, translate_doctype},
};
use manifold_build::{
    Render, RuntimeDoc, RuntimeHooksJs, RuntimeInterop, RuntimeSchema,
    runtime::{DoctypeSource, RuntimeBlock, hooks_py},
};
use manifold_config::Config;
use manifold_schema::wire::{ActionVocabulary, ActionsDoc, DoctypeMeta};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::path::Path;
use tracing::{debug, warn};

/// Schema source tag left when the runtime pass seeds an empty schema.
pub const RUNTIME_SEED_SOURCE: &str = "doctype_translation_seed";

///
/// RuntimeSummary
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RuntimeSummary {
    pub docs_found: usize,
    pub generated: usize,
    pub invalid_action_refs: usize,
    pub schema_empty_fields: usize,
    pub doctype_json_found: usize,
    pub doctype_fields_borrowed: usize,
}

///
/// LegacySource
/// a doctype JSON found beside a doc, plus its translation
///

struct LegacySource {
    path: String,
    meta: DoctypeMeta,
    seed: SchemaSeed,
}

// generate_runtime
/// Build runtime artifacts for the ready docs of the configured app, at
/// most `limit` of them when given.
pub fn generate_runtime(
    config: &Config,
    sink: &mut dyn ArtifactSink,
    limit: Option<usize>,
) -> Result<RuntimeSummary, Error> {
    let app_root = config.app_root(&config.runtime.app);
    let vocabulary = load_action_vocabulary(&config.action_model())?;

    let mut folders: Vec<DocFolder> = find_doc_folders(&app_root)
        .into_iter()
        .filter(|f| f.triplet().is_ready())
        .collect();
    if let Some(limit) = limit.filter(|l| *l > 0) {
        folders.truncate(limit);
    }

    let mut summary = RuntimeSummary {
        docs_found: folders.len(),
        ..RuntimeSummary::default()
    };

    for folder in &folders {
        match generate_one(config, &app_root, folder, &vocabulary, sink, &mut summary) {
            Ok(()) => summary.generated += 1,
            Err(Error::Load(err)) => {
                warn!(doc = %folder.doc_key, error = %err, "skipping doc");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(summary)
}

fn generate_one(
    config: &Config,
    app_root: &Path,
    folder: &DocFolder,
    vocabulary: &ActionVocabulary,
    sink: &mut dyn ArtifactSink,
    summary: &mut RuntimeSummary,
) -> Result<(), Error> {
    let triplet = folder.triplet();
    let doc = load_json_map(&triplet.doc_json)?;
    let mut schema = load_json_map(&triplet.schema_json)?;
    let actions: ActionsDoc = load_json(&triplet.actions_json)?;

    let doctype_path = folder.doctype_json(app_root);
    let legacy = if doctype_path.is_file() {
        let meta: DoctypeMeta = load_json(&doctype_path)?;
        let seed = translate_doctype(&meta);
        summary.doctype_json_found += 1;
        if !seed.fields.is_empty() {
            summary.doctype_fields_borrowed += 1;
        }
        Some(LegacySource {
            path: relative_display(&doctype_path, config.root()),
            meta,
            seed,
        })
    } else {
        None
    };

    let action_ids = actions.action_ids();
    let invalid = vocabulary.invalid(&action_ids);
    if !invalid.is_empty() {
        debug!(doc = %folder.doc_key, ?invalid, "actions outside the shared vocabulary");
        summary.invalid_action_refs += 1;
    }

    let schema_empty = !has_entries(&schema, "fields");
    if schema_empty {
        summary.schema_empty_fields += 1;
    }

    let runtime_json = runtime_doc(&doc, &schema, &actions, legacy.as_ref(), &triplet.schema_json)?;

    if let Some(legacy) = legacy.as_ref().filter(|l| schema_empty && !l.seed.fields.is_empty()) {
        let path = &triplet.schema_json;
        schema.insert("fields".to_string(), encode(&legacy.seed.fields, path)?);
        schema.insert("child_tables".to_string(), encode(&legacy.seed.child_tables, path)?);
        schema.insert("naming_rule".to_string(), encode(&legacy.seed.naming_rule, path)?);
        schema.insert("source".to_string(), Value::from(RUNTIME_SEED_SOURCE));
        write_json(sink, path, &schema)?;
    }

    write_json(sink, &folder.runtime_file("json"), &runtime_json)?;
    sink.write(
        &folder.runtime_file("py"),
        &hooks_py(&folder.doc_key, &action_ids).render(),
    )?;
    sink.write(
        &folder.runtime_file("js"),
        &RuntimeHooksJs::new(&folder.doc_key, &action_ids).render(),
    )?;

    Ok(())
}

fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(ToString::to_string)
}

fn list(map: &Map<String, Value>, key: &str) -> Vec<Value> {
    map.get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

// runtime_doc
// the doc triplet with empty schema parts borrowed from the legacy doctype
fn runtime_doc(
    doc: &Map<String, Value>,
    schema: &Map<String, Value>,
    actions: &ActionsDoc,
    legacy: Option<&LegacySource>,
    path: &Path,
) -> Result<RuntimeDoc, FsError> {
    let mut runtime_schema = RuntimeSchema {
        schema_version: schema.get("schema_version").cloned(),
        source: schema.get("source").cloned(),
        fields: list(schema, "fields"),
        child_tables: list(schema, "child_tables"),
        validation_rules: list(schema, "validation_rules"),
        naming_rule: schema.get("naming_rule").cloned().unwrap_or_else(|| json!({})),
    };

    if let Some(LegacySource { seed, .. }) = legacy {
        if runtime_schema.fields.is_empty() && !seed.fields.is_empty() {
            runtime_schema.fields = as_values(&seed.fields, path)?;
        }
        if runtime_schema.child_tables.is_empty() && !seed.child_tables.is_empty() {
            runtime_schema.child_tables = as_values(&seed.child_tables, path)?;
        }
        if runtime_schema.validation_rules.is_empty() {
            runtime_schema.validation_rules.clone_from(&seed.validation_rules);
        }
        let has_pattern = runtime_schema
            .naming_rule
            .get("pattern")
            .is_some_and(|p| p.as_str().is_some_and(|s| !s.is_empty()));
        if !has_pattern {
            runtime_schema.naming_rule = encode(&seed.naming_rule, path)?;
        }
    }

    let interop = match legacy {
        Some(source) => RuntimeInterop {
            doctype_json_source: DoctypeSource {
                mapped: true,
                path: Some(source.path.clone()),
                name: source.meta.name.clone(),
                module: source.meta.module.clone(),
            },
            borrowed_doctype_meta: Some(encode(&source.seed.doctype_meta, path)?),
        },
        None => RuntimeInterop::default(),
    };

    Ok(RuntimeDoc {
        doc_key: text(doc, "doc_key"),
        doc_title: text(doc, "doc_title"),
        doc_kind: text(doc, "doc_kind"),
        status: text(doc, "status"),
        classification: doc
            .get("classification")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!({})),
        allowed_actions: actions.actions.clone(),
        schema: runtime_schema,
        interop,
        runtime: RuntimeBlock::default(),
    })
}

fn as_values<T: Serialize>(items: &[T], path: &Path) -> Result<Vec<Value>, FsError> {
    items.iter().map(|item| encode(item, path)).collect()
}

///
/// TESTS
///

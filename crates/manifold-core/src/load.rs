//! Metadata loaders for both on-disk vocabularies.

use crate::{
    error::LoadError,
    fs::dir_name,
    translate::{SourceVocabulary, to_bool, translate_doctype, translate_field},
};
use manifold_schema::{
    prelude::*,
    wire::{
        ActionModel, ActionVocabulary, ActionsDoc, DocMeta, DoctypeMeta, SchemaDoc,
        SourceInventory,
    },
};
use serde::de::DeserializeOwned;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::warn;

const BOM: char = '\u{feff}';

/// File listing an app's modules, one per line.
pub const MODULES_FILE: &str = "modules.txt";

// read_text
// whole file as UTF-8 with any byte-order mark removed
pub fn read_text(path: &Path) -> Result<String, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    Ok(match text.strip_prefix(BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

// load_json
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = read_text(path)?;

    serde_json::from_str(&text).map_err(|source| LoadError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

/// A JSON object with its keys in file order, for read-modify-write.
pub fn load_json_map(path: &Path) -> Result<Map<String, Value>, LoadError> {
    load_json(path)
}

/// Length of the array under `key`; anything else counts as empty.
#[must_use]
pub fn list_len(map: &Map<String, Value>, key: &str) -> usize {
    map.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

/// Whether `key` holds anything at all; seeding never overwrites such a value
/// even when it is not a list.
#[must_use]
pub fn has_entries(map: &Map<String, Value>, key: &str) -> bool {
    match map.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(entries)) => !entries.is_empty(),
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => true,
    }
}

pub fn load_action_vocabulary(path: &Path) -> Result<ActionVocabulary, LoadError> {
    load_json::<ActionModel>(path).map(ActionVocabulary::from)
}

pub fn load_source_corpus(path: &Path) -> Result<SourceInventory, LoadError> {
    load_json(path)
}

// load_app_modules
/// Module names from `<app_root>/modules.txt`; blank lines and `#` comments
/// are ignored.
pub fn load_app_modules(app_root: &Path) -> Result<Vec<String>, LoadError> {
    let text = read_text(&app_root.join(MODULES_FILE))?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect())
}

///
/// DocTriplet
/// file paths of one doc folder
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DocTriplet {
    pub doc_json: PathBuf,
    pub schema_json: PathBuf,
    pub actions_json: PathBuf,
}

impl DocTriplet {
    #[must_use]
    pub fn in_folder(folder: &Path) -> Self {
        Self {
            doc_json: folder.join("doc.json"),
            schema_json: folder.join("schema.json"),
            actions_json: folder.join("actions.json"),
        }
    }

    /// Both companions of `doc.json` exist.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.schema_json.is_file() && self.actions_json.is_file()
    }
}

/// Legacy `<name>/<name>.json` inside an entity folder.
#[must_use]
pub fn legacy_json_path(folder: &Path) -> PathBuf {
    folder.join(format!("{}.json", dir_name(folder)))
}

// load_entity
/// Load the entity rooted at `folder`.
///
/// A folder with `doc.json` is read as a doc triplet and yields `Ok(None)`
/// when a companion file is still missing.  Otherwise the folder must hold
/// a legacy `<name>.json`.
pub fn load_entity(folder: &Path) -> Result<Option<EntityDescriptor>, LoadError> {
    let triplet = DocTriplet::in_folder(folder);

    if triplet.doc_json.is_file() {
        if !triplet.is_ready() {
            return Ok(None);
        }
        return load_triplet(folder, &triplet).map(Some);
    }

    let legacy = legacy_json_path(folder);
    if !legacy.is_file() {
        return Err(LoadError::NotFound { path: legacy });
    }

    let origin = match folder.parent().map(dir_name) {
        Some("doc") => EntityOrigin::LegacyDoc,
        _ => EntityOrigin::Doctype,
    };

    load_legacy(folder, &legacy, origin).map(Some)
}

fn load_triplet(folder: &Path, triplet: &DocTriplet) -> Result<EntityDescriptor, LoadError> {
    let meta: DocMeta = load_json(&triplet.doc_json)?;
    let schema: SchemaDoc = load_json(&triplet.schema_json)?;
    let actions: ActionsDoc = load_json(&triplet.actions_json)?;

    // generated file and route names follow the folder, not the doc body
    let entity_key = dir_name(folder).to_string();
    if meta.doc_key.as_deref().is_some_and(|key| key != entity_key) {
        warn!(entity = %entity_key, doc_key = ?meta.doc_key, "doc_key differs from folder name");
    }

    let fields = schema
        .fields
        .iter()
        .filter_map(|raw| translate_field(raw, SourceVocabulary::Doc))
        .collect();

    let child_tables = schema
        .child_tables
        .iter()
        .filter_map(|raw| match serde_json::from_value::<ChildTable>(raw.clone()) {
            Ok(table) => Some(table),
            Err(err) => {
                warn!(entity = %entity_key, "skipping malformed child table: {err}");
                None
            }
        })
        .collect();

    let naming_rule = schema
        .naming_rule
        .clone()
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    Ok(EntityDescriptor {
        title: meta.doc_title.unwrap_or_default(),
        kind: meta.doc_kind,
        status: meta.status,
        classification: meta.classification,
        is_public: to_bool(&meta.is_public),
        schema: EntitySchema {
            schema_version: schema.schema_version,
            source: schema.source,
            fields,
            child_tables,
            validation_rules: schema.validation_rules,
            naming_rule,
        },
        actions: actions.action_ids(),
        permissions: Vec::new(),
        origin: EntityOrigin::SubmoduleDoc,
        source_path: folder.to_path_buf(),
        entity_key,
    })
}

fn load_legacy(
    folder: &Path,
    path: &Path,
    origin: EntityOrigin,
) -> Result<EntityDescriptor, LoadError> {
    let meta: DoctypeMeta = load_json(path)?;
    let seed = translate_doctype(&meta);
    let entity_key = dir_name(folder).to_string();

    Ok(EntityDescriptor {
        title: meta.name.clone().unwrap_or_else(|| entity_key.clone()),
        kind: None,
        status: None,
        classification: Classification {
            module_id: meta.module.clone(),
            ..Classification::default()
        },
        is_public: to_bool(&meta.is_public),
        schema: EntitySchema {
            schema_version: None,
            source: Some(Value::String("doctype_translation".to_string())),
            fields: seed.fields,
            child_tables: seed.child_tables,
            validation_rules: seed.validation_rules,
            naming_rule: seed.naming_rule,
        },
        actions: Vec::new(),
        permissions: seed.doctype_meta.role_action_matrix_seed,
        origin,
        source_path: folder.to_path_buf(),
        entity_key,
    })
}

///
/// TESTS
///

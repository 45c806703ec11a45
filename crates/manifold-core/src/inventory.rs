//! Translation readiness inventory across an app's submodule docs.

use crate::{
    discover::{find_doc_folders, relative_display},
    load::{list_len, load_json_map},
};
use manifold_config::Config;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, path::Path};

///
/// Priority
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

///
/// RuntimeFiles
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RuntimeFiles {
    pub json: bool,
    pub py: bool,
    pub js: bool,
}

impl RuntimeFiles {
    #[must_use]
    pub const fn complete(&self) -> bool {
        self.json && self.py && self.js
    }
}

///
/// InventoryItem
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InventoryItem {
    pub doc_key: String,
    pub path: String,
    pub module_id: String,
    pub submodule_id: String,
    pub doc_title: Option<String>,
    pub doc_kind: Option<String>,
    pub doc_role: Option<String>,
    pub priority: Priority,
    pub schema_field_count: usize,
    pub schema_empty_fields: bool,
    pub doctype_json_exists: bool,
    pub doctype_field_count: usize,
    pub runtime_files: RuntimeFiles,
}

///
/// ModuleRollup
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ModuleRollup {
    pub docs: usize,
    pub schema_empty_fields: usize,
    pub doctype_json_found: usize,
    pub doctype_fields_nonempty: usize,
    pub runtime_generated: usize,
}

///
/// InventoryCounters
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct InventoryCounters {
    pub docs: usize,
    pub schema_empty_fields: usize,
    pub doctype_json_exists: usize,
    pub doctype_fields_nonempty: usize,
    pub runtime_json: usize,
    pub runtime_py: usize,
    pub runtime_js: usize,
}

///
/// InventoryReport
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InventoryReport {
    pub bundle: String,
    pub app: String,
    pub summary: InventoryCounters,
    pub module_summary: BTreeMap<String, ModuleRollup>,
    pub items: Vec<InventoryItem>,
}

// unreadable files count as empty
fn read_map(path: &Path) -> Map<String, Value> {
    load_json_map(path).unwrap_or_default()
}

fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(ToString::to_string)
}

// build_inventory
#[must_use]
pub fn build_inventory(config: &Config) -> InventoryReport {
    let app_root = config.app_root(&config.runtime.app);
    let high: Vec<&str> = config
        .inventory
        .high_priority_modules
        .iter()
        .map(String::as_str)
        .collect();

    let mut items = Vec::new();
    let mut module_summary: BTreeMap<String, ModuleRollup> = BTreeMap::new();

    for folder in find_doc_folders(&app_root) {
        let triplet = folder.triplet();
        if !triplet.is_ready() {
            continue;
        }

        let doc = read_map(&triplet.doc_json);
        let schema_field_count = list_len(&read_map(&triplet.schema_json), "fields");
        let doctype_path = folder.doctype_json(&app_root);
        let doctype_json_exists = doctype_path.is_file();
        let doctype_field_count = if doctype_json_exists {
            list_len(&read_map(&doctype_path), "fields")
        } else {
            0
        };

        let item = InventoryItem {
            path: relative_display(&folder.path, config.root()),
            doc_title: text(&doc, "doc_title"),
            doc_kind: text(&doc, "doc_kind"),
            doc_role: doc
                .get("classification")
                .and_then(Value::as_object)
                .and_then(|c| text(c, "doc_role")),
            priority: if high.contains(&folder.module_id.as_str()) {
                Priority::High
            } else {
                Priority::Normal
            },
            schema_field_count,
            schema_empty_fields: schema_field_count == 0,
            doctype_json_exists,
            doctype_field_count,
            runtime_files: RuntimeFiles {
                json: folder.runtime_file("json").is_file(),
                py: folder.runtime_file("py").is_file(),
                js: folder.runtime_file("js").is_file(),
            },
            doc_key: folder.doc_key,
            module_id: folder.module_id,
            submodule_id: folder.submodule_id,
        };

        let rollup = module_summary.entry(item.module_id.clone()).or_default();
        rollup.docs += 1;
        rollup.schema_empty_fields += usize::from(item.schema_empty_fields);
        rollup.doctype_json_found += usize::from(item.doctype_json_exists);
        rollup.doctype_fields_nonempty += usize::from(item.doctype_field_count > 0);
        rollup.runtime_generated += usize::from(item.runtime_files.complete());

        items.push(item);
    }

    items.sort_by(|a, b| {
        (a.priority, &a.module_id, &a.submodule_id, &a.doc_key)
            .cmp(&(b.priority, &b.module_id, &b.submodule_id, &b.doc_key))
    });

    let mut summary = InventoryCounters::default();
    for item in &items {
        summary.docs += 1;
        summary.schema_empty_fields += usize::from(item.schema_empty_fields);
        summary.doctype_json_exists += usize::from(item.doctype_json_exists);
        summary.doctype_fields_nonempty += usize::from(item.doctype_field_count > 0);
        summary.runtime_json += usize::from(item.runtime_files.json);
        summary.runtime_py += usize::from(item.runtime_files.py);
        summary.runtime_js += usize::from(item.runtime_files.js);
    }

    InventoryReport {
        bundle: config.runtime.bundle.clone(),
        app: config.runtime.app.clone(),
        summary,
        module_summary,
        items,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn doc(app: &Path, module: &str, key: &str, fields: usize) {
        let folder = app.join(module).join("submodule/main/docs").join(key);
        fs::create_dir_all(&folder).unwrap();
        fs::write(
            folder.join("doc.json"),
            r#"{"doc_title": "T", "classification": {"doc_role": "bt1"}}"#,
        )
        .unwrap();
        let fields: Vec<_> = (0..fields)
            .map(|i| serde_json::json!({"field_id": format!("f{i}")}))
            .collect();
        let schema = serde_json::json!({"fields": fields});
        fs::write(folder.join("schema.json"), schema.to_string()).unwrap();
        fs::write(folder.join("actions.json"), "{}").unwrap();
    }

    #[test]
    fn high_priority_modules_sort_first() {
        let dir = TempDir::new().unwrap();
        let config = Config::with_root(dir.path());
        let app = config.app_root(&config.runtime.app);

        doc(&app, "assets", "asset", 0);
        doc(&app, "role_permission_engine", "role", 3);
        doc(&app, "assets", "asset_type", 1);
        fs::write(app.join("assets/submodule/main/docs/asset/asset.json"), "{}").unwrap();
        fs::write(app.join("assets/submodule/main/docs/asset/asset.py"), "").unwrap();
        fs::write(app.join("assets/submodule/main/docs/asset/asset.js"), "").unwrap();

        let report = build_inventory(&config);
        let keys: Vec<_> = report.items.iter().map(|i| i.doc_key.as_str()).collect();

        assert_eq!(keys, vec!["role", "asset", "asset_type"]);
        assert_eq!(report.items[0].priority, Priority::High);
        assert_eq!(report.items[0].doc_role.as_deref(), Some("bt1"));
        assert_eq!(report.summary.docs, 3);
        assert_eq!(report.summary.schema_empty_fields, 1);
        assert_eq!(report.summary.runtime_json, 1);
        assert_eq!(report.module_summary["assets"].docs, 2);
        assert_eq!(report.module_summary["assets"].runtime_generated, 1);
        assert_eq!(report.items[1].path, "apps/platform_core/assets/submodule/main/docs/asset");
    }
}

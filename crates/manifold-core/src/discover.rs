//! Doc folder discovery under an app root.

use crate::{
    fs::dir_name,
    load::{DocTriplet, load_json},
    matcher::MatchTarget,
};
use manifold_schema::wire::DocMeta;
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

const SUBMODULE_DIR: &str = "submodule";
const DOCS_DIR: &str = "docs";

///
/// DocFolder
///
/// `<app>/<module>/submodule/<submodule>/docs/<doc_key>/` holding a
/// `doc.json`.  Companion files may or may not exist yet.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct DocFolder {
    pub path: PathBuf,
    pub module_id: String,
    pub submodule_id: String,
    pub doc_key: String,
}

impl DocFolder {
    /// Classify a doc folder by its position under `app_root`.
    #[must_use]
    pub fn from_path(app_root: &Path, folder: &Path) -> Option<Self> {
        let parts: Vec<&str> = folder
            .strip_prefix(app_root)
            .ok()?
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();

        let module_id = parts.first()?;
        let submodule = parts.iter().position(|p| *p == SUBMODULE_DIR)?;
        let docs = parts.iter().position(|p| *p == DOCS_DIR)?;

        Some(Self {
            path: folder.to_path_buf(),
            module_id: (*module_id).to_string(),
            submodule_id: (*parts.get(submodule + 1)?).to_string(),
            doc_key: (*parts.get(docs + 1)?).to_string(),
        })
    }

    #[must_use]
    pub fn triplet(&self) -> DocTriplet {
        DocTriplet::in_folder(&self.path)
    }

    /// Legacy doctype JSON for the same key: `<module>/doctype/<key>/<key>.json`.
    #[must_use]
    pub fn doctype_json(&self, app_root: &Path) -> PathBuf {
        app_root
            .join(&self.module_id)
            .join("doctype")
            .join(&self.doc_key)
            .join(format!("{}.json", self.doc_key))
    }

    /// Runtime artifact next to the triplet, e.g. `runtime_file("py")`.
    #[must_use]
    pub fn runtime_file(&self, ext: &str) -> PathBuf {
        self.path.join(format!("{}.{ext}", self.doc_key))
    }
}

// find_doc_folders
// every `docs/<key>/doc.json` below the app root, sorted by path
#[must_use]
pub fn find_doc_folders(app_root: &Path) -> Vec<DocFolder> {
    let mut folders: Vec<DocFolder> = WalkDir::new(app_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == "doc.json")
        .filter_map(|e| {
            let folder = e.path().parent()?;
            if dir_name(folder.parent()?) != DOCS_DIR {
                return None;
            }
            DocFolder::from_path(app_root, folder)
        })
        .collect();
    folders.sort();

    folders
}

/// `path` relative to `root` with forward slashes; absolute when outside.
#[must_use]
pub fn relative_display(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);

    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// match_targets
// matcher inputs for folders whose doc.json classifies them under `bundle`
#[must_use]
pub fn match_targets(folders: &[DocFolder], root: &Path, bundle: &str) -> Vec<MatchTarget> {
    folders
        .iter()
        .filter_map(|folder| {
            let meta: DocMeta = match load_json(&folder.triplet().doc_json) {
                Ok(meta) => meta,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable doc");
                    return None;
                }
            };
            let class = meta.classification;
            if class.bundle_id.as_deref() != Some(bundle) {
                return None;
            }

            Some(MatchTarget {
                doc_key: meta.doc_key.unwrap_or_else(|| folder.doc_key.clone()),
                doc_code: meta.doc_code,
                doc_title: meta.doc_title,
                doc_kind: meta.doc_kind,
                doc_role: class.doc_role,
                bundle_id: class.bundle_id,
                app_id: class.app_id,
                module_id: class.module_id,
                submodule_id: class.submodule_id,
                doc_path: relative_display(&folder.path, root),
            })
        })
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn doc(root: &Path, rel: &str, body: &str) {
        let folder = root.join(rel);
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("doc.json"), body).unwrap();
    }

    #[test]
    fn finds_submodule_docs_in_path_order() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("platform_core");
        doc(&app, "support/submodule/desk/docs/ticket", "{}");
        doc(&app, "billing/submodule/plans/docs/plan", "{}");
        doc(&app, "billing/doctype/plan", "{}");

        let found = find_doc_folders(&app);
        let keys: Vec<_> = found
            .iter()
            .map(|f| (f.module_id.as_str(), f.doc_key.as_str()))
            .collect();

        assert_eq!(keys, vec![("billing", "plan"), ("support", "ticket")]);
        assert_eq!(found[0].submodule_id, "plans");
        assert_eq!(
            found[0].doctype_json(&app),
            app.join("billing/doctype/plan/plan.json")
        );
    }

    #[test]
    fn targets_filter_on_bundle() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("apps/platform_core");
        doc(
            &app,
            "support/submodule/desk/docs/ticket",
            r#"{"doc_title": "Ticket",
                "classification": {"bundle_id": "plt", "module_id": "support"}}"#,
        );
        doc(
            &app,
            "support/submodule/desk/docs/other",
            r#"{"classification": {"bundle_id": "crm"}}"#,
        );
        doc(&app, "support/submodule/desk/docs/broken", "{");

        let targets = match_targets(&find_doc_folders(&app), dir.path(), "plt");

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].doc_key, "ticket");
        assert_eq!(targets[0].doc_path, "apps/platform_core/support/submodule/desk/docs/ticket");
    }
}

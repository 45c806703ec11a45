//! App migration: regenerate the Django wrapper package for one app.
//!
//! The run clears the app's structure folders, walks `modules.txt`, and for
//! each module generates one view module and one manifest per entity.  The
//! URL table is rebuilt last, from the routes collected along the way.

use crate::{
    cancel::CancelToken,
    error::{FsError, MigrateError},
    fs::{ArtifactSink, dir_name, list_dirs},
    load::{load_app_modules, load_entity},
};
use manifold_build::{PackageInit, Render, RouteTable, UrlsModule};
use manifold_config::Config;
use manifold_schema::{
    node::EntityDescriptor,
    validate::{naming::is_valid_entity_key, validate_entity},
};
use manifold_utils::case::to_snake_case;
use serde::Serialize;
use std::{
    collections::BTreeSet,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Generated folders inside `<app>_app`, each holding one package per module.
pub const STRUCTURE: [&str; 6] = [
    "views",
    "models",
    "filters",
    "serializers",
    "tests",
    "manifests",
];

const INIT_FILE: &str = "__init__.py";

///
/// EntitySource
/// which on-disk layout a module's entities were read from
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntitySource {
    SubmoduleDocs,
    LegacyDoc,
    Doctype,
}

///
/// MigrateSummary
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MigrateSummary {
    pub app: String,
    pub modules: usize,
    pub modules_missing: usize,
    pub modules_empty: usize,
    /// Entity folders discovered; always `generated + skipped + invalid`.
    pub found: usize,
    pub generated: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub validation_warnings: usize,
    pub routes: usize,
    pub files_written: usize,
}

// module_entities
/// Entity folders of one module, in the order they are generated.
///
/// Submodule docs win; the legacy `doc/` folder is read only when there are
/// none, and `doctype/` only when both are empty.  Submodule docs count only
/// once their runtime JSON exists.
#[must_use]
pub fn module_entities(module_root: &Path) -> Option<(EntitySource, Vec<PathBuf>)> {
    let mut seen = BTreeSet::new();
    let submodule_docs: Vec<PathBuf> = list_dirs(&module_root.join("submodule"))
        .iter()
        .flat_map(|sub| list_dirs(&sub.join("docs")))
        .filter(|doc| {
            let key = dir_name(doc);
            doc.join(format!("{key}.json")).is_file() && seen.insert(key.to_string())
        })
        .collect();
    if !submodule_docs.is_empty() {
        return Some((EntitySource::SubmoduleDocs, submodule_docs));
    }

    [
        ("doc", EntitySource::LegacyDoc),
        ("doctype", EntitySource::Doctype),
    ]
    .into_iter()
    .map(|(folder, source)| (source, list_dirs(&module_root.join(folder))))
    .find(|(_, folders)| !folders.is_empty())
}

// lexical normalisation, enough to catch `..` escapes without touching disk
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }

    out
}

///
/// Migration
///

struct Migration<'a> {
    app: &'a str,
    django_app: PathBuf,
    sink: &'a mut dyn ArtifactSink,
    cancel: &'a CancelToken,
    routes: RouteTable,
    summary: MigrateSummary,
}

// migrate
/// Regenerate `<django_root>/<app>_app` from the app's entity metadata.
pub fn migrate(
    config: &Config,
    app: &str,
    sink: &mut dyn ArtifactSink,
    cancel: &CancelToken,
) -> Result<MigrateSummary, MigrateError> {
    let app_root = config.app_root(app);
    let modules = load_app_modules(&app_root)?;
    let django_root = normalize(&config.django_root());
    let django_app = normalize(&config.django_app_root(app));

    for folder in STRUCTURE {
        let path = django_app.join(folder);
        if !path.starts_with(&django_root) || django_app == django_root {
            return Err(MigrateError::OutsideRoot {
                path,
                root: django_root,
            });
        }
    }

    info!(app, modules = modules.len(), "migrating app");

    let mut run = Migration {
        app,
        django_app,
        sink,
        cancel,
        routes: RouteTable::new(),
        summary: MigrateSummary {
            app: app.to_string(),
            modules: modules.len(),
            ..MigrateSummary::default()
        },
    };

    run.prepare()?;
    for module in &modules {
        run.module(&app_root, module)?;
    }
    run.finish()
}

impl Migration<'_> {
    // signals.py is emptied and every structure folder is cleared down to
    // its package init
    fn prepare(&mut self) -> Result<(), MigrateError> {
        self.sink.write(&self.django_app.join("signals.py"), "")?;

        let init = PackageInit::Wildcard.render();
        for folder in STRUCTURE {
            let dir = self.django_app.join(folder);
            self.sink.clear_files(&dir, INIT_FILE)?;
            self.sink.write(&dir.join(INIT_FILE), &init)?;
        }

        Ok(())
    }

    fn module(&mut self, app_root: &Path, module: &str) -> Result<(), MigrateError> {
        let module_id = to_snake_case(module);
        let module_root = app_root.join(&module_id);
        if !module_root.is_dir() {
            warn!(app = self.app, module, "module folder missing, skipping");
            self.summary.modules_missing += 1;
            return Ok(());
        }

        let Some((source, folders)) = module_entities(&module_root) else {
            warn!(app = self.app, module, "module has no docs or doctypes");
            self.summary.modules_empty += 1;
            return Ok(());
        };
        debug!(module = %module_id, ?source, entities = folders.len(), "generating module");

        for folder in STRUCTURE {
            self.sink
                .reset_dir(&self.django_app.join(folder).join(&module_id))?;
        }

        let mut stems = Vec::new();
        for folder in &folders {
            if self.cancel.is_cancelled() {
                return Err(MigrateError::Cancelled {
                    app: self.app.to_string(),
                    generated: self.summary.generated,
                });
            }

            self.summary.found += 1;
            match load_entity(folder) {
                Ok(Some(entity)) if !is_valid_entity_key(&entity.entity_key) => {
                    warn!(folder = %folder.display(), "entity key is not a valid module name");
                    self.summary.invalid += 1;
                }
                Ok(Some(entity)) => {
                    self.entity(&module_id, &entity)?;
                    stems.push(entity.entity_key);
                }
                Ok(None) => {
                    debug!(folder = %folder.display(), "doc not ready, skipping");
                    self.summary.skipped += 1;
                }
                Err(err) if err.is_not_found() => {
                    debug!(error = %err, "skipping entity");
                    self.summary.skipped += 1;
                }
                Err(err) => {
                    warn!(error = %err, "skipping malformed entity");
                    self.summary.invalid += 1;
                }
            }
        }

        for folder in STRUCTURE {
            let init = if folder == "views" {
                PackageInit::for_files(&stems)
            } else {
                PackageInit::Modules(Vec::new())
            };
            let path = self.django_app.join(folder).join(&module_id).join(INIT_FILE);
            self.sink.write(&path, &init.render())?;
        }

        Ok(())
    }

    fn entity(&mut self, module_id: &str, entity: &EntityDescriptor) -> Result<(), MigrateError> {
        if let Err(errs) = validate_entity(entity) {
            warn!(entity = %entity.entity_key, "validation: {errs}");
            self.summary.validation_warnings += 1;
        }

        let artifacts = manifold_build::generate(entity, self.app, module_id);
        let view_path = self
            .django_app
            .join("views")
            .join(module_id)
            .join(format!("{}.py", artifacts.model_id));
        let manifest_path = self
            .django_app
            .join("manifests")
            .join(module_id)
            .join(format!("{}.json", artifacts.model_id));

        let manifest = artifacts
            .manifest
            .to_json()
            .map_err(|source| FsError::Encode {
                path: manifest_path.clone(),
                source,
            })?;
        self.sink.write(&view_path, &artifacts.view.render())?;
        self.sink.write(&manifest_path, &manifest)?;

        self.routes
            .push(module_id, &artifacts.model_id, artifacts.routes);
        self.summary.generated += 1;

        Ok(())
    }

    fn finish(mut self) -> Result<MigrateSummary, MigrateError> {
        let urls = UrlsModule::from_routes(&self.routes).render();
        self.sink.write(&self.django_app.join("urls.py"), &urls)?;

        self.summary.routes = self.routes.len();
        self.summary.files_written = self.sink.written().len();
        info!(
            app = self.app,
            generated = self.summary.generated,
            routes = self.summary.routes,
            "migration finished"
        );

        Ok(self.summary)
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

    fn mkdir(path: &Path) {
        fs::create_dir_all(path).unwrap();
    }

    #[test]
    fn submodule_docs_need_runtime_json() {
        let dir = TempDir::new().unwrap();
        let module = dir.path().join("billing");
        mkdir(&module.join("submodule/plans/docs/plan"));
        mkdir(&module.join("doctype/invoice"));

        let (source, folders) = module_entities(&module).unwrap();
        assert_eq!(source, EntitySource::Doctype);
        assert_eq!(folders.len(), 1);

        fs::write(module.join("submodule/plans/docs/plan/plan.json"), "{}").unwrap();
        let (source, folders) = module_entities(&module).unwrap();
        assert_eq!(source, EntitySource::SubmoduleDocs);
        assert_eq!(dir_name(&folders[0]), "plan");
    }

    #[test]
    fn legacy_doc_beats_doctype() {
        let dir = TempDir::new().unwrap();
        mkdir(&dir.path().join("doc/lead"));
        mkdir(&dir.path().join("doctype/lead"));
        mkdir(&dir.path().join("doctype/deal"));

        let (source, folders) = module_entities(dir.path()).unwrap();
        assert_eq!(source, EntitySource::LegacyDoc);
        assert_eq!(folders.len(), 1);

        assert!(module_entities(&dir.path().join("nothing")).is_none());
    }

    #[test]
    fn escaping_app_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = Config::with_root(dir.path());
        mkdir(&config.app_root("../escape"));
        fs::write(config.app_root("../escape").join("modules.txt"), "").unwrap();

        let err = migrate(
            &config,
            "../escape",
            &mut crate::fs::DryRunSink::new(),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MigrateError::OutsideRoot { .. }));
    }

    #[test]
    fn normalize_collapses_parents() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
    }
}

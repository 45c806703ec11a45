//! `plug.toml` loading.
//!
//! The engine never discovers its project root on its own; callers load a
//! [`Config`] from an explicit path and hand it to every entry point.
//! Relative paths inside the file are resolved against the directory the
//! file lives in.

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Default file name looked up by the CLI when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "plug.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub paths: PathsConfig,
    pub matcher: MatcherConfig,
    pub inventory: InventoryConfig,
    pub runtime: RuntimeConfig,

    #[serde(skip)]
    root: PathBuf,
}

impl Config {
    /// Load and validate a config file, anchoring relative paths at its directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;

        Ok(config)
    }

    /// Parse config text with an explicit root directory.
    pub fn from_toml_str(text: &str, root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(CONFIG_FILE_NAME),
            source,
        })?;
        config.root = root.into();
        config.validate()?;

        Ok(config)
    }

    /// Default configuration rooted at `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a configured path against the config root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    #[must_use]
    pub fn apps_root(&self) -> PathBuf {
        self.resolve(&self.paths.apps_root)
    }

    #[must_use]
    pub fn django_root(&self) -> PathBuf {
        self.resolve(&self.paths.django_root)
    }

    #[must_use]
    pub fn mapping_dir(&self) -> PathBuf {
        self.resolve(&self.paths.mapping_dir)
    }

    #[must_use]
    pub fn action_model(&self) -> PathBuf {
        self.resolve(&self.paths.action_model)
    }

    #[must_use]
    pub fn source_inventory(&self) -> PathBuf {
        self.resolve(&self.paths.source_inventory)
    }

    /// Source folder of one app: `<apps_root>/<app>`.
    #[must_use]
    pub fn app_root(&self, app: &str) -> PathBuf {
        self.apps_root().join(app)
    }

    /// Generated Django wrapper folder of one app: `<django_root>/<app>_app`.
    #[must_use]
    pub fn django_app_root(&self, app: &str) -> PathBuf {
        self.django_root().join(format!("{app}_app"))
    }

    #[must_use]
    pub fn seed_mapping_path(&self) -> PathBuf {
        self.mapping_dir()
            .join(format!("{}_doctype_to_doc_mapping_seed.json", self.runtime.bundle))
    }

    #[must_use]
    pub fn exact_mapping_path(&self) -> PathBuf {
        self.mapping_dir()
            .join(format!("{}_doctype_to_doc_mapping_exact.json", self.runtime.bundle))
    }

    #[must_use]
    pub fn inventory_report_path(&self) -> PathBuf {
        self.mapping_dir()
            .join(format!("{}_translation_inventory.json", self.runtime.bundle))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.matcher.max_candidates == 0 {
            return Err(ConfigError::Invalid(
                "matcher.max_candidates must be at least 1".to_string(),
            ));
        }
        if !self.matcher.domain_bonus.is_finite() || self.matcher.domain_bonus < 0.0 {
            return Err(ConfigError::Invalid(
                "matcher.domain_bonus must be a non-negative number".to_string(),
            ));
        }
        if !self.matcher.high_confidence.is_finite() {
            return Err(ConfigError::Invalid(
                "matcher.high_confidence must be finite".to_string(),
            ));
        }
        if self.runtime.bundle.trim().is_empty() {
            return Err(ConfigError::Invalid("runtime.bundle is empty".to_string()));
        }

        Ok(())
    }
}

///
/// PathsConfig
///

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub apps_root: PathBuf,
    pub django_root: PathBuf,
    pub mapping_dir: PathBuf,
    pub action_model: PathBuf,
    pub source_inventory: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            apps_root: PathBuf::from("apps"),
            django_root: PathBuf::from("manifold"),
            mapping_dir: PathBuf::from("doc/mapping"),
            action_model: PathBuf::from("doc/mapping/doc_actions_model.json"),
            source_inventory: PathBuf::from("doc/files/frappe_doctypes_inventory.json"),
        }
    }
}

///
/// MatcherConfig
///

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherConfig {
    pub max_candidates: usize,
    pub high_confidence: f64,
    pub domain_bonus: f64,
    pub stop_words: Vec<String>,
    pub domain_terms: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_candidates: 5,
            high_confidence: 5.0,
            domain_bonus: 0.5,
            stop_words: to_strings(&[
                "plt", "bt", "d1", "d2", "request", "detail", "status", "work", "log",
                "approval", "closure", "record", "update", "process", "initiate", "close",
                "core",
            ]),
            domain_terms: to_strings(&[
                "api",
                "user",
                "role",
                "permission",
                "billing",
                "license",
                "subscription",
                "notification",
                "alert",
                "monitor",
                "analytics",
                "support",
                "ticket",
                "deploy",
                "integration",
                "publisher",
                "workflow",
                "auth",
                "security",
            ]),
        }
    }
}

///
/// InventoryConfig
///

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InventoryConfig {
    pub high_priority_modules: Vec<String>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            high_priority_modules: to_strings(&[
                "identity_access_management",
                "role_permission_engine",
                "billing_subscription_licensing",
                "localization_i18n_l10n",
                "monitoring_observability",
                "notification_communication_center",
                "publisher_partner_operations",
                "analytics_reporting_intelligence",
            ]),
        }
    }
}

///
/// RuntimeConfig
///

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Bundle id whose docs take part in candidate matching.
    pub bundle: String,

    /// App whose doc folders feed the runtime, seed and bridge passes.
    pub app: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bundle: "plt".to_string(),
            app: "platform_core".to_string(),
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(ToString::to_string).collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml_str("", "/srv/plug").unwrap();

        assert_eq!(config.matcher.max_candidates, 5);
        assert_eq!(config.apps_root(), PathBuf::from("/srv/plug/apps"));
        assert_eq!(
            config.django_app_root("billing"),
            PathBuf::from("/srv/plug/manifold/billing_app")
        );
    }

    #[test]
    fn relative_paths_anchor_at_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[paths]\napps_root = \"bundles/plt\"").unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.apps_root(), dir.path().join("bundles/plt"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[paths]\nnope = 1", "/").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_candidates_is_invalid() {
        let err = Config::from_toml_str("[matcher]\nmax_candidates = 0", "/").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn mapping_paths_follow_bundle() {
        let config = Config::from_toml_str("[runtime]\nbundle = \"crm\"", "/r").unwrap();
        assert_eq!(
            config.exact_mapping_path(),
            PathBuf::from("/r/doc/mapping/crm_doctype_to_doc_mapping_exact.json")
        );
    }
}

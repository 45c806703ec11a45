//! The `plug` command line.
//!
//! Every verb prints a pretty JSON summary followed by a `mode:` line.
//! Verbs that can touch app sources default to a dry run; pass `--write`
//! to apply.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use manifold::{
    Error,
    config::{CONFIG_FILE_NAME, Config},
    core::{
        ArtifactSink, CancelToken, DryRunSink, FsSink, bridge, fs::write_json, inventory, mapping,
        migrate, runtime, seed,
    },
};
use serde::Serialize;
use std::{fmt, path::PathBuf};
use tracing::info;

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(
    name = "plug",
    version = manifold::VERSION,
    about = "Doc metadata translation and Django scaffolding"
)]
pub struct Cli {
    /// Path to plug.toml; defaults to ./plug.toml when present.
    #[arg(long, global = true, env = "PLUG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Regenerate the Django wrapper of one app.
    Migrate {
        app: String,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Build runtime JSON/PY/JS for the configured app's docs.
    Runtime {
        #[command(flatten)]
        mode: ModeArgs,

        /// Stop after this many docs.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Doc to doctype mapping files.
    #[command(subcommand)]
    Mapping(MappingCommand),

    /// Fill empty doc schemas.
    #[command(subcommand)]
    Seed(SeedCommand),

    /// Push doc schemas back into legacy doctype JSON.
    Bridge {
        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Write the translation inventory report.
    Inventory,
}

#[derive(Debug, Subcommand)]
pub enum MappingCommand {
    /// Propose candidates for every doc of the bundle.
    Seed,

    /// Add a placeholder record for every doc without one.
    Expand,

    /// Draft candidates into placeholder records.
    Fill,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Seed from enabled exact mapping records.
    Exact {
        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Seed role templates into docs that are still empty.
    Native {
        #[command(flatten)]
        mode: ModeArgs,
    },
}

#[derive(Clone, Copy, Debug, Args)]
pub struct ModeArgs {
    /// Apply changes instead of reporting them.
    #[arg(long)]
    pub write: bool,
}

///
/// Mode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Write,
    DryRun,
}

impl Mode {
    #[must_use]
    pub const fn from_flag(write: bool) -> Self {
        if write { Self::Write } else { Self::DryRun }
    }

    fn sink(self) -> Box<dyn ArtifactSink> {
        match self {
            Self::Write => Box::new(FsSink::new()),
            Self::DryRun => Box::new(DryRunSink::new()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Write => "write",
            Self::DryRun => "dry-run",
        })
    }
}

///
/// Report
/// what a verb prints
///

#[derive(Clone, Debug)]
pub struct Report {
    pub summary: serde_json::Value,
    pub mode: Mode,
}

impl Report {
    fn new<T: Serialize>(summary: &T, mode: Mode) -> Result<Self> {
        Ok(Self {
            summary: serde_json::to_value(summary).context("encoding summary")?,
            mode,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(&self.summary).map_err(|_| fmt::Error)?;
        writeln!(f, "{text}")?;
        write!(f, "mode: {}", self.mode)
    }
}

impl Cli {
    // load_config
    fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::from_path(path).map_err(Error::from)?,
            None => {
                let path = PathBuf::from(CONFIG_FILE_NAME);
                if path.is_file() {
                    Config::from_path(&path).map_err(Error::from)?
                } else {
                    Config::with_root(".")
                }
            }
        };
        info!(root = %config.root().display(), "config loaded");

        Ok(config)
    }

    // execute
    pub fn execute(&self) -> Result<Report> {
        let config = self.load_config()?;

        match &self.command {
            Command::Migrate { app, mode } => {
                let mode = Mode::from_flag(mode.write);
                let summary = migrate(&config, app, mode.sink().as_mut(), &CancelToken::new())
                    .map_err(Error::from)
                    .with_context(|| format!("migrating app '{app}'"))?;
                Report::new(&summary, mode)
            }
            Command::Runtime { mode, limit } => {
                let mode = Mode::from_flag(mode.write);
                let summary = runtime::generate_runtime(&config, mode.sink().as_mut(), *limit)
                    .map_err(Error::from)?;
                Report::new(&summary, mode)
            }
            Command::Mapping(verb) => execute_mapping(&config, verb),
            Command::Seed(SeedCommand::Exact { mode }) => {
                let mode = Mode::from_flag(mode.write);
                let summary =
                    seed::seed_exact(&config, mode.sink().as_mut()).map_err(Error::from)?;
                Report::new(&summary, mode)
            }
            Command::Seed(SeedCommand::Native { mode }) => {
                let mode = Mode::from_flag(mode.write);
                let app_root = config.app_root(&config.runtime.app);
                let summary =
                    seed::seed_native(&app_root, mode.sink().as_mut()).map_err(Error::from)?;
                Report::new(&summary, mode)
            }
            Command::Bridge { mode } => {
                let mode = Mode::from_flag(mode.write);
                let app_root = config.app_root(&config.runtime.app);
                let summary =
                    bridge::sync_bridge(&app_root, mode.sink().as_mut()).map_err(Error::from)?;
                Report::new(&summary, mode)
            }
            Command::Inventory => {
                let report = inventory::build_inventory(&config);
                write_json(&mut FsSink::new(), &config.inventory_report_path(), &report)
                    .map_err(Error::from)?;
                Report::new(&report.summary, Mode::Write)
            }
        }
    }
}

// execute_mapping
// mapping files are always written
fn execute_mapping(config: &Config, verb: &MappingCommand) -> Result<Report> {
    let mut sink = FsSink::new();

    match verb {
        MappingCommand::Seed => {
            let report = mapping::seed_mapping(config, &mut sink).map_err(Error::from)?;
            Report::new(&report.counts, Mode::Write)
        }
        MappingCommand::Expand => {
            let counts = mapping::expand_registry(config, &mut sink).map_err(Error::from)?;
            Report::new(&counts, Mode::Write)
        }
        MappingCommand::Fill => {
            let stats = mapping::fill_registry(config, &mut sink).map_err(Error::from)?;
            Report::new(&stats, Mode::Write)
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn migrate_defaults_to_dry_run() {
        let cli = Cli::parse_from(["plug", "migrate", "crm"]);

        match cli.command {
            Command::Migrate { app, mode } => {
                assert_eq!(app, "crm");
                assert_eq!(Mode::from_flag(mode.write), Mode::DryRun);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn nested_verbs_parse() {
        let cli = Cli::parse_from([
            "plug",
            "seed",
            "exact",
            "--write",
            "--config",
            "/srv/plug.toml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/srv/plug.toml")));
        assert!(matches!(
            cli.command,
            Command::Seed(SeedCommand::Exact { mode: ModeArgs { write: true } })
        ));

        let cli = Cli::parse_from(["plug", "runtime", "--limit", "3"]);
        assert!(matches!(cli.command, Command::Runtime { limit: Some(3), .. }));
    }

    #[test]
    fn report_ends_with_mode_line() {
        let report = Report::new(&serde_json::json!({"generated": 2}), Mode::DryRun).unwrap();
        let text = report.to_string();

        assert!(text.starts_with("{\n  \"generated\": 2\n}"));
        assert!(text.ends_with("mode: dry-run"));
    }

    #[test]
    fn migrate_dry_run_on_empty_app() {
        let dir = tempfile::tempdir().unwrap();
        let app_root = dir.path().join("apps/crm");
        fs::create_dir_all(&app_root).unwrap();
        fs::write(app_root.join("modules.txt"), "Sales\n").unwrap();
        let config = dir.path().join("plug.toml");
        fs::write(&config, "").unwrap();

        let cli = Cli::parse_from(["plug", "--config", config.to_str().unwrap(), "migrate", "crm"]);
        let report = cli.execute().unwrap();

        assert_eq!(report.mode, Mode::DryRun);
        assert_eq!(report.summary["modules_missing"], 1);
        assert!(!dir.path().join("manifold").exists());
    }
}

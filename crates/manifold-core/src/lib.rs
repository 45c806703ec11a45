//! Metadata translation and generation passes over plug apps.
//!
//! Every pass writes through an [`fs::ArtifactSink`], so the same call
//! serves both `--write` and dry runs.

pub mod bridge;
pub mod cancel;
pub mod discover;
pub mod error;
pub mod fs;
pub mod inventory;
pub mod load;
pub mod mapping;
pub mod matcher;
pub mod migrate;
pub mod registry;
pub mod runtime;
pub mod seed;
pub mod translate;

pub use cancel::CancelToken;
pub use error::{Error, FsError, LoadError, MigrateError, RegistryError};
pub use fs::{ArtifactSink, DryRunSink, FsSink};
pub use load::load_entity;
pub use matcher::{Matcher, ScoringStrategy};
pub use migrate::{MigrateSummary, migrate};
pub use registry::MappingRegistry;
pub use translate::{SourceVocabulary, translate_field};

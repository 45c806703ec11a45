//! ## Crate layout
//! - `build`: artifact builders and text renderers.
//! - `config`: `plug.toml` loading and path resolution.
//! - `core`: loaders, translator, matcher, registry and the batch passes.
//! - `schema`: the neutral entity model, wire types and validation.
//! - `utils`: case conversion and stable hashing.
//!
//! [`Error`] folds every layer's failures into one kind + origin taxonomy.

pub use manifold_build as build;
pub use manifold_config as config;
pub use manifold_core as core;
pub use manifold_schema as schema;
pub use manifold_utils as utils;

pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::Config,
        core::{
            ArtifactSink, CancelToken, DryRunSink, FsSink, MigrateSummary, load_entity, migrate,
        },
        error::{Error, ErrorKind, ErrorOrigin},
        schema::prelude::*,
    };
}

use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

///
/// LoadError
///

#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Io { path, .. } | Self::MalformedJson { path, .. } => {
                path
            }
        }
    }

    /// Missing input is skipped; anything else means the input is broken.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

///
/// FsError
/// failures while writing or clearing generated output
///

#[derive(Debug, ThisError)]
pub enum FsError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has no parent directory", path.display())]
    NoParent { path: PathBuf },
}

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fs(#[from] FsError),
}

///
/// MigrateError
///

#[derive(Debug, ThisError)]
pub enum MigrateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("generated path {} is outside {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("migration of '{app}' cancelled after {generated} entities")]
    Cancelled { app: String, generated: usize },
}

///
/// Error
/// umbrella for the batch verbs that touch several concerns
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

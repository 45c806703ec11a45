use derive_more::Display;
use manifold_config::ConfigError;
use manifold_core::{FsError, LoadError, MigrateError, RegistryError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Errors a batch run counts and moves past rather than aborting on.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(self.kind, ErrorKind::Input(_))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::Read { .. } => ConfigErrorKind::Unreadable,
            ConfigError::Parse { .. } => ConfigErrorKind::Malformed,
            ConfigError::Invalid(_) => ConfigErrorKind::Invalid,
        };

        Self::new(ErrorKind::Config(kind), ErrorOrigin::Config, err.to_string())
    }
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        let kind = match err {
            LoadError::NotFound { .. } => InputErrorKind::NotFound,
            LoadError::Io { .. } => InputErrorKind::Unreadable,
            LoadError::MalformedJson { .. } => InputErrorKind::Malformed,
        };

        Self::new(ErrorKind::Input(kind), ErrorOrigin::Load, err.to_string())
    }
}

impl From<FsError> for Error {
    fn from(err: FsError) -> Self {
        let kind = match err {
            FsError::Encode { .. } => OutputErrorKind::Encode,
            FsError::Write { .. } | FsError::Remove { .. } | FsError::NoParent { .. } => {
                OutputErrorKind::Write
            }
        };

        Self::new(ErrorKind::Output(kind), ErrorOrigin::Fs, err.to_string())
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        let mut out: Self = match err {
            RegistryError::Load(err) => err.into(),
            RegistryError::Fs(err) => err.into(),
        };
        out.origin = ErrorOrigin::Registry;

        out
    }
}

impl From<MigrateError> for Error {
    fn from(err: MigrateError) -> Self {
        match err {
            MigrateError::Load(err) => err.into(),
            MigrateError::Fs(err) => err.into(),
            MigrateError::OutsideRoot { .. } => Self::new(
                ErrorKind::Migration(MigrationErrorKind::OutsideRoot),
                ErrorOrigin::Migrate,
                err.to_string(),
            ),
            MigrateError::Cancelled { .. } => Self::new(
                ErrorKind::Migration(MigrationErrorKind::Cancelled),
                ErrorOrigin::Migrate,
                err.to_string(),
            ),
        }
    }
}

impl From<manifold_core::Error> for Error {
    fn from(err: manifold_core::Error) -> Self {
        match err {
            manifold_core::Error::Load(err) => err.into(),
            manifold_core::Error::Fs(err) => err.into(),
            manifold_core::Error::Registry(err) => err.into(),
            manifold_core::Error::Migrate(err) => err.into(),
        }
    }
}

impl From<manifold_schema::Error> for Error {
    fn from(err: manifold_schema::Error) -> Self {
        Self::new(ErrorKind::Validation, ErrorOrigin::Schema, err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Input(InputErrorKind),
    Output(OutputErrorKind),
    Migration(MigrationErrorKind),

    /// Entity metadata breaks a schema rule.
    Validation,
}

///
/// ConfigErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ConfigErrorKind {
    Unreadable,
    Malformed,

    /// Parsed, but a value is out of range.
    Invalid,
}

///
/// InputErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum InputErrorKind {
    /// Primary metadata file is absent.
    NotFound,

    /// The file exists but could not be read.
    Unreadable,

    /// The file is not valid JSON, or not the expected shape.
    Malformed,
}

///
/// OutputErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OutputErrorKind {
    Write,
    Encode,
}

///
/// MigrationErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MigrationErrorKind {
    /// A generated path would land outside the Django root.
    OutsideRoot,

    Cancelled,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Fs,
    Load,
    Migrate,
    Registry,
    Schema,
}

///
/// TESTS
///

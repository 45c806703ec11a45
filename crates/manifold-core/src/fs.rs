//! Filesystem access for generated output.
//!
//! Every mutation goes through an [`ArtifactSink`].  [`FsSink`] writes each
//! file to a sibling temp file and renames it into place, so an interrupted
//! run never leaves a torn file behind.  [`DryRunSink`] records what would
//! have been touched and touches nothing.

use crate::error::FsError;
use serde::Serialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Folder names never treated as entities or modules.
#[must_use]
pub fn is_ignored_dir(name: &str) -> bool {
    name.starts_with('_') || name.starts_with("pycache")
}

// list_dirs
// immediate subdirectories, sorted by name, ignored names dropped
#[must_use]
pub fn list_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|e| !e.file_name().to_str().is_none_or(is_ignored_dir))
        .map(|e| e.path())
        .collect();
    dirs.sort();

    dirs
}

/// Final path component as UTF-8, empty when it has none.
#[must_use]
pub fn dir_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or_default()
}

// write_atomic
/// Replace `path` with `bytes` via temp file + rename in the same directory.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FsError> {
    let parent = path.parent().ok_or_else(|| FsError::NoParent {
        path: path.to_path_buf(),
    })?;
    let write_err = |source| FsError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(parent).map_err(write_err)?;

    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("artifact"),
        std::process::id()
    ));
    {
        let mut file = fs::File::create(&tmp).map_err(write_err)?;
        file.write_all(bytes).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
    }
    fs::rename(&tmp, path).map_err(write_err)?;

    Ok(())
}

///
/// ArtifactSink
///

pub trait ArtifactSink {
    /// Replace a whole file.
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), FsError>;

    /// Remove a directory tree (if present) and recreate it empty.
    fn reset_dir(&mut self, dir: &Path) -> Result<(), FsError>;

    /// Delete the plain files directly inside `dir`, keeping `keep`.
    fn clear_files(&mut self, dir: &Path, keep: &str) -> Result<(), FsError>;

    /// Paths written so far, in write order.
    fn written(&self) -> &[PathBuf];
}

/// Serialize into a JSON value, reporting failures against `path`.
pub fn encode<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<serde_json::Value, FsError> {
    serde_json::to_value(value).map_err(|source| FsError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

// write_json
/// Serialize `value` as pretty JSON with a trailing newline and write it.
pub fn write_json<T: Serialize + ?Sized>(
    sink: &mut dyn ArtifactSink,
    path: &Path,
    value: &T,
) -> Result<(), FsError> {
    let text = manifold_build::render::json_text(value).map_err(|source| FsError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    sink.write(path, &text)
}

///
/// FsSink
///

#[derive(Debug, Default)]
pub struct FsSink {
    written: Vec<PathBuf>,
}

impl FsSink {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            written: Vec::new(),
        }
    }
}

impl ArtifactSink for FsSink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), FsError> {
        write_atomic(path, contents.as_bytes())?;
        self.written.push(path.to_path_buf());

        Ok(())
    }

    fn reset_dir(&mut self, dir: &Path) -> Result<(), FsError> {
        if dir.exists() {
            fs::remove_dir_all(dir).map_err(|source| FsError::Remove {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::create_dir_all(dir).map_err(|source| FsError::Write {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn clear_files(&mut self, dir: &Path, keep: &str) -> Result<(), FsError> {
        let Ok(entries) = fs::read_dir(dir) else {
            return fs::create_dir_all(dir).map_err(|source| FsError::Write {
                path: dir.to_path_buf(),
                source,
            });
        };

        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.is_file() && entry.file_name() != keep {
                fs::remove_file(&path).map_err(|source| FsError::Remove { path, source })?;
            }
        }

        Ok(())
    }

    fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

///
/// DryRunSink
///

#[derive(Debug, Default)]
pub struct DryRunSink {
    written: Vec<PathBuf>,
}

impl DryRunSink {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            written: Vec::new(),
        }
    }
}

impl ArtifactSink for DryRunSink {
    fn write(&mut self, path: &Path, _contents: &str) -> Result<(), FsError> {
        self.written.push(path.to_path_buf());
        Ok(())
    }

    fn reset_dir(&mut self, _dir: &Path) -> Result<(), FsError> {
        Ok(())
    }

    fn clear_files(&mut self, _dir: &Path, _keep: &str) -> Result<(), FsError> {
        Ok(())
    }

    fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_replaces_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/urls.py");

        write_atomic(&path, b"first version, long").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn clear_files_keeps_init_and_subdirs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("__init__.py"), "x").unwrap();
        fs::write(dir.path().join("stale.py"), "x").unwrap();
        fs::create_dir(dir.path().join("accounts")).unwrap();

        FsSink::new().clear_files(dir.path(), "__init__.py").unwrap();

        assert!(dir.path().join("__init__.py").exists());
        assert!(!dir.path().join("stale.py").exists());
        assert!(dir.path().join("accounts").is_dir());
    }

    #[test]
    fn dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let mut sink = DryRunSink::new();

        write_json(&mut sink, &path, &serde_json::json!({"a": 1})).unwrap();
        sink.reset_dir(dir.path()).unwrap();

        assert!(!path.exists());
        assert_eq!(sink.written(), &[path]);
    }

    #[test]
    fn list_dirs_is_sorted_and_skips_private() {
        let dir = TempDir::new().unwrap();
        for name in ["zeta", "_hidden", "alpha", "pycache"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("file.txt"), "").unwrap();

        let names: Vec<_> = list_dirs(dir.path())
            .iter()
            .map(|p| dir_name(p).to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}

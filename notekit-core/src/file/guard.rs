use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Result};

use crate::file::error::FsError;

/// Lexically normalizes a path: resolves `.` and `..` components and drops
/// redundant separators without touching the filesystem. `..` at the root
/// stays at the root. Symlinks are deliberately not resolved here; listing
/// code handles those separately so that a guard check never requires the
/// path to exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(name) => normalized.push(name),
        }
    }
    normalized
}

/// Enforces the sandbox boundary. Every path handed to the filesystem layer
/// goes through [`PathGuard::validate`] first; nothing below this type ever
/// touches a path that has not been proven to sit inside the root.
///
/// Containment is component-wise, so a root of `/data` rejects
/// `/data2/secret` even though it shares the string prefix.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_absolute() {
            bail!("root directory must be an absolute path: {root:?}");
        }
        Ok(Self {
            root: normalize(&root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `candidate` to a normalized absolute path inside the root.
    /// Relative candidates are interpreted against the root. Runs before any
    /// I/O: a traversal attempt fails here, never at the filesystem.
    pub fn validate(&self, candidate: &Path) -> Result<PathBuf, FsError> {
        let absolute = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };
        let normalized = normalize(&absolute);
        if normalized.starts_with(&self.root) {
            Ok(normalized)
        } else {
            Err(FsError::PathTraversal {
                path: candidate.to_path_buf(),
            })
        }
    }

    pub fn contains(&self, candidate: &Path) -> bool {
        self.validate(candidate).is_ok()
    }
}

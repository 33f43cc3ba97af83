use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A file open in the tab strip. The (normalized) path is the unique key;
/// list position is open order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenFile {
    pub path: PathBuf,
    pub name: String,
    pub content: String,
    pub modified: bool,
}

/// What an open request requires of the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Already open; only the active tab moved.
    Activated,
    /// A read for this path is already in flight; this open folds into it.
    Coalesced,
    /// The open was registered; the caller must read the file.
    Fetch,
}

/// Result of closing a file.
#[derive(Debug, PartialEq, Eq)]
pub struct Closed {
    pub was_active: bool,
    /// The file activated in its place, if any.
    pub active: Option<PathBuf>,
}

/// The single authoritative model of open files. Pure like the tree model:
/// [`Workspace::begin_open`] decides whether a read is needed and the actor
/// reports the result through [`Workspace::complete_open`] /
/// [`Workspace::fail_open`].
#[derive(Default)]
pub struct Workspace {
    files: Vec<OpenFile>,
    active: Option<PathBuf>,
    pending: HashSet<PathBuf>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[OpenFile] {
        &self.files
    }

    pub fn open_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|file| file.path.clone()).collect()
    }

    pub fn active(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    pub fn get(&self, path: &Path) -> Option<&OpenFile> {
        self.files.iter().find(|file| file.path == path)
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Opening an already-open file is idempotent: it re-activates the tab
    /// and nothing else. A second open racing the first read coalesces.
    pub fn begin_open(&mut self, path: &Path) -> OpenOutcome {
        if self.is_open(path) {
            self.active = Some(path.to_path_buf());
            return OpenOutcome::Activated;
        }
        if !self.pending.insert(path.to_path_buf()) {
            return OpenOutcome::Coalesced;
        }
        OpenOutcome::Fetch
    }

    /// Applies a finished read. Returns `None` when the pending open was
    /// discarded in the meantime (root change), in which case nothing is
    /// added.
    pub fn complete_open(
        &mut self,
        path: &Path,
        content: String,
        activate: bool,
    ) -> Option<&OpenFile> {
        if !self.pending.remove(path) {
            return None;
        }
        self.files.push(OpenFile {
            path: path.to_path_buf(),
            name: display_name(path),
            content,
            modified: false,
        });
        if activate {
            self.active = Some(path.to_path_buf());
        }
        self.files.last()
    }

    /// Drops a pending open after a failed read. Returns whether it was
    /// still pending.
    pub fn fail_open(&mut self, path: &Path) -> bool {
        self.pending.remove(path)
    }

    /// Closing the active file activates the first remaining file in list
    /// order, deterministically. Returns `None` if the path was not open.
    pub fn close(&mut self, path: &Path) -> Option<Closed> {
        let index = self.files.iter().position(|file| file.path == path)?;
        self.files.remove(index);
        let was_active = self.active.as_deref() == Some(path);
        if was_active {
            self.active = self.files.first().map(|file| file.path.clone());
        }
        Some(Closed {
            was_active,
            active: self.active.clone(),
        })
    }

    /// First edit flips the dirty flag; further edits are no-ops. Returns
    /// whether the flag changed.
    pub fn mark_modified(&mut self, path: &Path) -> bool {
        let Some(file) = self.get_mut(path) else {
            return false;
        };
        if file.modified {
            return false;
        }
        file.modified = true;
        true
    }

    /// A successful save replaces the cached content and clears the dirty
    /// flag. Returns the previous flag, or `None` if the path is not open.
    pub fn mark_saved(&mut self, path: &Path, content: String) -> Option<bool> {
        let file = self.get_mut(path)?;
        file.content = content;
        let was_modified = file.modified;
        file.modified = false;
        Some(was_modified)
    }

    pub fn activate(&mut self, path: &Path) -> bool {
        if self.is_open(path) {
            self.active = Some(path.to_path_buf());
            true
        } else {
            false
        }
    }

    /// Atomically drops every open and pending file not contained in
    /// `root`. Returns the dropped open paths in tab order; the active file
    /// falls back to the first survivor when it was dropped.
    pub fn retain_under(&mut self, root: &Path) -> Vec<PathBuf> {
        let mut dropped = Vec::new();
        self.files.retain(|file| {
            if file.path.starts_with(root) {
                true
            } else {
                dropped.push(file.path.clone());
                false
            }
        });
        self.pending.retain(|path| path.starts_with(root));
        if let Some(active) = &self.active {
            if !active.starts_with(root) {
                self.active = self.files.first().map(|file| file.path.clone());
            }
        }
        dropped
    }

    fn get_mut(&mut self, path: &Path) -> Option<&mut OpenFile> {
        self.files.iter_mut().find(|file| file.path == path)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::file::error::FsError;
use crate::file::guard::PathGuard;

/// One entry of a directory listing, shaped for direct display in the tree
/// view. `last_modified` is unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: u64,
    pub last_modified: u64,
}

/// All filesystem operations for the editor, every one of them behind the
/// [`PathGuard`]. The root handed to [`FileAccess::new`] must already be
/// canonicalized; listing code compares canonicalized entry paths against it
/// to keep symlinked escapes out of the tree.
#[derive(Debug, Clone)]
pub struct FileAccess {
    guard: PathGuard,
}

impl FileAccess {
    pub fn new(guard: PathGuard) -> Self {
        Self { guard }
    }

    pub fn root(&self) -> &Path {
        self.guard.root()
    }

    pub fn validate(&self, path: &Path) -> Result<PathBuf, FsError> {
        self.guard.validate(path)
    }

    /// A [`DirectoryEntry`] describing the root itself, used as the anchor
    /// node of the tree.
    pub fn root_entry(&self) -> DirectoryEntry {
        let root = self.guard.root();
        let last_modified = std::fs::metadata(root)
            .map(|metadata| modified_millis(&metadata))
            .unwrap_or(0);
        DirectoryEntry {
            name: root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.display().to_string()),
            path: root.to_path_buf(),
            is_directory: true,
            size: 0,
            last_modified,
        }
    }

    /// Lists the immediate children of `path`, directories first, names
    /// collated case-insensitively within each group. Entries that resolve
    /// outside the root (symlinks out of the sandbox) are omitted rather
    /// than reported as errors.
    pub async fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FsError> {
        let dir = self.guard.validate(path)?;
        let metadata = fs::metadata(&dir)
            .await
            .map_err(|e| FsError::from_io(&dir, e))?;
        if !metadata.is_dir() {
            return Err(FsError::NotADirectory { path: dir });
        }

        let mut read_dir = fs::read_dir(&dir)
            .await
            .map_err(|e| FsError::from_io(&dir, e))?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| FsError::from_io(&dir, e))?
        {
            let entry_path = entry.path();
            let canonical = match fs::canonicalize(&entry_path).await {
                Ok(canonical) => canonical,
                Err(e) => {
                    // Broken symlink or vanished mid-listing.
                    debug!(path = ?entry_path, ?e, "skipping unresolvable entry");
                    continue;
                }
            };
            if !canonical.starts_with(self.guard.root()) {
                debug!(path = ?entry_path, "skipping entry that resolves outside the root");
                continue;
            }
            let Some(name) = entry_path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
            else {
                debug!(path = ?entry_path, "skipping entry with non-utf8 name");
                continue;
            };
            let metadata = match fs::metadata(&entry_path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!(path = ?entry_path, ?e, "skipping unreadable entry");
                    continue;
                }
            };
            entries.push(DirectoryEntry {
                name,
                path: entry_path,
                is_directory: metadata.is_dir(),
                size: metadata.len(),
                last_modified: modified_millis(&metadata),
            });
        }

        sort_entries(&mut entries);
        Ok(entries)
    }

    pub async fn read_file(&self, path: &Path) -> Result<String, FsError> {
        let file = self.guard.validate(path)?;
        let metadata = fs::metadata(&file)
            .await
            .map_err(|e| FsError::from_io(&file, e))?;
        if !metadata.is_file() {
            return Err(FsError::NotAFile { path: file });
        }
        fs::read_to_string(&file)
            .await
            .map_err(|e| FsError::from_io(&file, e))
    }

    /// Writes `content` to `path`, creating missing parent directories.
    /// The content lands in a temporary sibling first and is renamed over
    /// the target, so a crash mid-write never leaves a truncated file.
    pub async fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError> {
        let target = self.guard.validate(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FsError::from_io(parent, e))?;
        }
        let temp = temp_sibling(&target);
        fs::write(&temp, content)
            .await
            .map_err(|e| FsError::from_io(&temp, e))?;
        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(FsError::from_io(&target, e));
        }
        Ok(())
    }
}

/// Checks that `dir` is writable by creating and removing a uniquely named
/// marker file. Run against a prospective root before accepting it, so an
/// unwritable selection is rejected up front instead of failing on the
/// first save.
pub async fn probe_write_access(dir: &Path) -> Result<(), FsError> {
    let marker = dir.join(format!(".notekit-probe-{}", Uuid::new_v4()));
    fs::write(&marker, b"")
        .await
        .map_err(|e| FsError::from_io(&marker, e))?;
    fs::remove_file(&marker)
        .await
        .map_err(|e| FsError::from_io(&marker, e))?;
    Ok(())
}

fn temp_sibling(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()))
}

pub(crate) fn modified_millis(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .map(|time| DateTime::<Utc>::from(time).timestamp_millis().max(0) as u64)
        .unwrap_or(0)
}

/// Directories before files; within each group names compare
/// case-insensitively, raw name as tiebreak so names differing only by case
/// order deterministically.
fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn access_for(dir: &tempfile::TempDir) -> FileAccess {
        let root = fs::canonicalize(dir.path()).await.unwrap();
        FileAccess::new(PathGuard::new(root).unwrap())
    }

    #[tokio::test]
    async fn lists_directories_first_then_case_insensitive() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("Beta.txt"), "B").unwrap();
        std::fs::create_dir(dir.path().join("zeta")).unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();

        let access = access_for(&dir).await;
        let entries = access.list_directory(access.root()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "zeta", "a.txt", "b.txt", "Beta.txt"]);
        assert!(entries[0].is_directory);
        assert!(entries[1].is_directory);
        assert!(!entries[2].is_directory);
    }

    #[tokio::test]
    async fn names_differing_only_by_case_order_deterministically() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("read.md"), "x").unwrap();
        std::fs::write(dir.path().join("Read.md"), "y").unwrap();

        let access = access_for(&dir).await;
        let entries = access.list_directory(access.root()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Read.md", "read.md"]);
    }

    #[tokio::test]
    async fn listing_a_file_fails() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("note.md"), "x").unwrap();

        let access = access_for(&dir).await;
        let result = access.list_directory(&access.root().join("note.md")).await;
        assert!(matches!(result, Err(FsError::NotADirectory { .. })));
    }

    #[tokio::test]
    async fn listing_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let access = access_for(&dir).await;
        let result = access.list_directory(&access.root().join("gone")).await;
        assert!(matches!(result, Err(FsError::NotFound { .. })));
    }

    #[tokio::test]
    async fn read_rejects_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let access = access_for(&dir).await;
        let result = access.read_file(&access.root().join("sub")).await;
        assert!(matches!(result, Err(FsError::NotAFile { .. })));
    }

    #[tokio::test]
    async fn read_returns_contents() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("note.md"), "# hello").unwrap();

        let access = access_for(&dir).await;
        let content = access.read_file(&access.root().join("note.md")).await.unwrap();
        assert_eq!(content, "# hello");
    }

    #[tokio::test]
    async fn write_creates_missing_parents() {
        let dir = tempdir().unwrap();
        let access = access_for(&dir).await;
        let target = access.root().join("a/b/c.md");
        access.write_file(&target, "deep").await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "deep");
    }

    #[tokio::test]
    async fn write_replaces_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("note.md"), "old").unwrap();

        let access = access_for(&dir).await;
        let target = access.root().join("note.md");
        access.write_file(&target, "new").await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name != "note.md")
            .collect();
        assert!(leftovers.is_empty(), "unexpected leftovers: {leftovers:?}");
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_any_io() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("workspace")).unwrap();
        let root = fs::canonicalize(dir.path().join("workspace")).await.unwrap();
        let access = FileAccess::new(PathGuard::new(root.clone()).unwrap());

        let escape = root.join("../escape.txt");
        let result = access.write_file(&escape, "nope").await;
        assert!(matches!(result, Err(FsError::PathTraversal { .. })));
        assert!(!dir.path().join("escape.txt").exists());

        let result = access.read_file(Path::new("/etc/passwd")).await;
        assert!(matches!(result, Err(FsError::PathTraversal { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_escaping_the_root_are_omitted() {
        let dir = tempdir().unwrap();
        let outside = dir.path().join("outside");
        let root = dir.path().join("root");
        std::fs::create_dir(&outside).unwrap();
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outside.join("secret.txt"), "s").unwrap();
        std::fs::write(root.join("inside.txt"), "i").unwrap();
        std::os::unix::fs::symlink(outside.join("secret.txt"), root.join("leak")).unwrap();
        std::os::unix::fs::symlink(root.join("inside.txt"), root.join("alias")).unwrap();

        let canonical = fs::canonicalize(&root).await.unwrap();
        let access = FileAccess::new(PathGuard::new(canonical).unwrap());
        let entries = access.list_directory(access.root()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"inside.txt"));
        assert!(names.contains(&"alias"), "in-root symlink should stay visible");
        assert!(!names.contains(&"leak"), "escaping symlink must be omitted");
    }

    #[tokio::test]
    async fn probe_accepts_writable_directory() {
        let dir = tempdir().unwrap();
        probe_write_access(dir.path()).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn probe_rejects_missing_directory() {
        let dir = tempdir().unwrap();
        let result = probe_write_access(&dir.path().join("gone")).await;
        assert!(result.is_err());
    }
}

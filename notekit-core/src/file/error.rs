use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure taxonomy for guarded filesystem operations. GUI shells branch on
/// the variant (via the wire-level error code) rather than parsing messages,
/// so `PermissionDenied` and `NotFound` are promoted out of the generic
/// `Io` bucket.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("path escapes the root directory: {path:?}")]
    PathTraversal { path: PathBuf },

    #[error("not found: {path:?}")]
    NotFound { path: PathBuf },

    #[error("not a file: {path:?}")]
    NotAFile { path: PathBuf },

    #[error("not a directory: {path:?}")]
    NotADirectory { path: PathBuf },

    #[error("permission denied: {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotes_not_found() {
        let e = FsError::from_io(
            Path::new("/tmp/missing"),
            io::Error::new(io::ErrorKind::NotFound, "nope"),
        );
        assert!(matches!(e, FsError::NotFound { .. }));
    }

    #[test]
    fn promotes_permission_denied() {
        let e = FsError::from_io(
            Path::new("/tmp/locked"),
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(e, FsError::PermissionDenied { .. }));
    }

    #[test]
    fn other_kinds_stay_io() {
        let e = FsError::from_io(
            Path::new("/tmp/full"),
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(matches!(e, FsError::Io { .. }));
    }
}

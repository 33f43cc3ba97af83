use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::ConfigError;
use crate::file::{DirectoryEntry, FsError};
use crate::workspace::OpenFile;

/// Output events from the editor actor. GUI shells hold no logic of their
/// own; they render state as a pure projection of this stream. Every event
/// reports a state change that has already happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum EditorEvent {
    /// A new sandbox root is in effect (explicit selection or startup
    /// restore). All previous tree and workspace state is gone.
    RootChanged { path: PathBuf },
    /// The user dismissed the folder dialog; nothing changed.
    RootSelectionCancelled,

    // Tree
    NodeLoading { path: PathBuf },
    NodeExpanded { path: PathBuf },
    NodeCollapsed { path: PathBuf },
    NodeLoaded { path: PathBuf, children: Vec<DirectoryEntry> },
    NodeLoadFailed { path: PathBuf, error: ErrorInfo },

    // Workspace
    FileOpened { file: OpenFile },
    FileClosed { path: PathBuf },
    ActiveFileChanged { path: Option<PathBuf> },
    FileDirtyChanged { path: PathBuf, modified: bool },
    FileSaved { path: PathBuf },

    // Direct bridge results
    DirectoryListed { path: PathBuf, entries: Vec<DirectoryEntry> },
    FileRead { path: PathBuf, content: String },
    FileWritten { path: PathBuf },
    ConfigValue { key: String, value: Option<serde_json::Value> },

    /// A request that could not be carried out. `operation` names the
    /// request in snake_case.
    OperationFailed {
        operation: String,
        path: Option<PathBuf>,
        error: ErrorInfo,
    },
}

/// Wire-level error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    PathTraversal,
    NotFound,
    NotAFile,
    NotADirectory,
    PermissionDenied,
    Io,
    Config,
    /// Tree or file request arrived before any root was selected.
    NoRoot,
}

impl From<&FsError> for ErrorInfo {
    fn from(error: &FsError) -> Self {
        let code = match error {
            FsError::PathTraversal { .. } => ErrorCode::PathTraversal,
            FsError::NotFound { .. } => ErrorCode::NotFound,
            FsError::NotAFile { .. } => ErrorCode::NotAFile,
            FsError::NotADirectory { .. } => ErrorCode::NotADirectory,
            FsError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            FsError::Io { .. } => ErrorCode::Io,
        };
        Self {
            code,
            message: error.to_string(),
        }
    }
}

impl From<&ConfigError> for ErrorInfo {
    fn from(error: &ConfigError) -> Self {
        Self {
            code: ErrorCode::Config,
            message: error.to_string(),
        }
    }
}

/// Sending half of the event stream handed to every part of the actor.
#[derive(Clone)]
pub struct EventSender {
    event_tx: mpsc::UnboundedSender<EditorEvent>,
}

impl EventSender {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EditorEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }

    /// A send failure means the receiver is gone and the actor is about to
    /// stop; dropping the event is fine.
    pub fn send(&self, event: EditorEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn operation_failed(&self, operation: &str, path: Option<&Path>, error: ErrorInfo) {
        warn!(operation, ?path, code = ?error.code, message = %error.message, "operation failed");
        self.send(EditorEvent::OperationFailed {
            operation: operation.to_string(),
            path: path.map(Path::to_path_buf),
            error,
        });
    }

    pub fn fs_failure(&self, operation: &str, path: &Path, error: &FsError) {
        self.operation_failed(operation, Some(path), ErrorInfo::from(error));
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Input messages to the editor actor.
///
/// Serde derives exist because GUI shells usually host the core out of
/// process: requests arrive as newline-delimited JSON on the subprocess
/// stdin. Paths cross the boundary as plain strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum EditorRequest {
    /// Opens the OS folder dialog and, when confirmed, replaces the
    /// sandbox root.
    SelectRootDirectory,

    // Tree
    ExpandNode { path: PathBuf },
    CollapseNode { path: PathBuf },
    RefreshNode { path: PathBuf },

    // Workspace
    OpenFile { path: PathBuf },
    CloseFile { path: PathBuf },
    SaveFile { path: PathBuf, content: String },
    /// The GUI's first-edit notification for an open file.
    MarkModified { path: PathBuf },

    // Direct filesystem bridge, stateless with respect to tree/workspace.
    ListDirectory { path: PathBuf },
    ReadFile { path: PathBuf },
    WriteFile { path: PathBuf, content: String },

    // Raw config passthrough for host-owned keys.
    GetConfigValue { key: String },
    SetConfigValue { key: String, value: serde_json::Value },
}

use serde::{Deserialize, Serialize};

use crate::file::DirectoryEntry;

/// Fetch state of one directory node. Collapsing never changes this;
/// cached children stay trusted until an explicit refresh replaces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Children have never been fetched.
    Unloaded,
    /// A listing is in flight; further expand/refresh requests coalesce.
    Loading,
    /// `children` reflects the last successful listing.
    Loaded,
    /// The last listing failed; retry only via an explicit refresh.
    Error,
}

/// One materialized node of the directory tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub entry: DirectoryEntry,
    pub load_state: LoadState,
    pub expanded: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(entry: DirectoryEntry) -> Self {
        Self {
            entry,
            load_state: LoadState::Unloaded,
            expanded: false,
            children: Vec::new(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.entry.is_directory
    }
}

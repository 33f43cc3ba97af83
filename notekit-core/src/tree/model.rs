use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::file::DirectoryEntry;
use crate::tree::node::{LoadState, TreeNode};

/// What an expand request requires of the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// The node flipped to `Loading`; the caller must fetch its listing.
    Fetch,
    /// A fetch is already in flight; this expand folds into it.
    Coalesced,
    /// Cached children were shown again; pure UI toggle, no I/O.
    Expanded,
    NotADirectory,
    NotFound,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The node flipped to `Loading`; the caller must re-fetch its listing.
    Fetch,
    /// A fetch is already in flight; the refresh folds into it.
    Coalesced,
    /// Never-loaded nodes have nothing to refresh.
    Nothing,
    NotFound,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The listing was applied. `auto_expand` holds directories that had a
    /// persisted pending expansion and now need their own fetch.
    Applied { auto_expand: Vec<PathBuf> },
    /// The node was collapsed while its fetch was in flight; the listing is
    /// dropped and the node reverts to `Unloaded`.
    Discarded,
    /// No node in `Loading` state matches; a late or duplicate response.
    Stale,
}

/// The single authoritative model of the directory tree.
///
/// Transitions here are pure: the model records what needs fetching and the
/// actor performs the I/O, reporting back through [`DirectoryTree::complete_load`]
/// and [`DirectoryTree::fail_load`]. That keeps every coalescing and
/// discard decision in one synchronous place, testable without a
/// filesystem.
pub struct DirectoryTree {
    root: TreeNode,
    pending_expansions: HashSet<PathBuf>,
}

impl DirectoryTree {
    pub fn new(root: DirectoryEntry) -> Self {
        Self::with_pending_expansions(root, HashSet::new())
    }

    /// `pending` carries expansion state persisted by an earlier session.
    /// It re-applies lazily: whenever a listing materializes one of these
    /// directories, the node expands and fetches without a user toggle.
    pub fn with_pending_expansions(root: DirectoryEntry, pending: HashSet<PathBuf>) -> Self {
        Self {
            root: TreeNode::new(root),
            pending_expansions: pending,
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn find(&self, path: &Path) -> Option<&TreeNode> {
        find_node(&self.root, path)
    }

    pub fn expand(&mut self, path: &Path) -> ExpandOutcome {
        let Some(node) = find_node_mut(&mut self.root, path) else {
            return ExpandOutcome::NotFound;
        };
        if !node.is_directory() {
            return ExpandOutcome::NotADirectory;
        }
        node.expanded = true;
        match node.load_state {
            LoadState::Unloaded => {
                node.load_state = LoadState::Loading;
                ExpandOutcome::Fetch
            }
            LoadState::Loading => ExpandOutcome::Coalesced,
            LoadState::Loaded | LoadState::Error => ExpandOutcome::Expanded,
        }
    }

    /// Pure toggle. Returns whether the node was expanded before. Cached
    /// children and load state are retained so re-expanding is instant.
    pub fn collapse(&mut self, path: &Path) -> bool {
        let Some(node) = find_node_mut(&mut self.root, path) else {
            return false;
        };
        let was_expanded = node.expanded;
        node.expanded = false;
        was_expanded
    }

    /// Explicit re-list of exactly this node, never recursive.
    pub fn refresh(&mut self, path: &Path) -> RefreshOutcome {
        let Some(node) = find_node_mut(&mut self.root, path) else {
            return RefreshOutcome::NotFound;
        };
        match node.load_state {
            LoadState::Loaded | LoadState::Error => {
                node.load_state = LoadState::Loading;
                RefreshOutcome::Fetch
            }
            LoadState::Loading => RefreshOutcome::Coalesced,
            LoadState::Unloaded => RefreshOutcome::Nothing,
        }
    }

    /// Applies a finished listing to the node that requested it.
    ///
    /// Children that survived (same path, same kind) keep their entire
    /// subtree, so refreshing a node never disturbs the expansion or load
    /// state of untouched descendants. Vanished children drop with their
    /// subtrees; new directories may auto-expand if a persisted expansion
    /// is pending for them.
    pub fn complete_load(&mut self, path: &Path, entries: Vec<DirectoryEntry>) -> LoadOutcome {
        let pending = &mut self.pending_expansions;
        let Some(node) = find_node_mut(&mut self.root, path) else {
            return LoadOutcome::Stale;
        };
        if node.load_state != LoadState::Loading {
            return LoadOutcome::Stale;
        }
        if !node.expanded {
            // Collapsed while the fetch was in flight: drop the response so
            // a later expand fetches fresh data.
            node.load_state = LoadState::Unloaded;
            node.children.clear();
            return LoadOutcome::Discarded;
        }

        let mut previous: HashMap<PathBuf, TreeNode> = std::mem::take(&mut node.children)
            .into_iter()
            .map(|child| (child.entry.path.clone(), child))
            .collect();

        let mut auto_expand = Vec::new();
        for entry in entries {
            let mut child = match previous.remove(&entry.path) {
                Some(prev) if prev.entry.is_directory == entry.is_directory => {
                    TreeNode { entry, ..prev }
                }
                _ => TreeNode::new(entry),
            };
            if child.is_directory()
                && child.load_state == LoadState::Unloaded
                && pending.remove(&child.entry.path)
            {
                child.expanded = true;
                child.load_state = LoadState::Loading;
                auto_expand.push(child.entry.path.clone());
            }
            node.children.push(child);
        }
        node.load_state = LoadState::Loaded;
        LoadOutcome::Applied { auto_expand }
    }

    /// Marks a failed fetch. Returns whether the failure should surface:
    /// a node collapsed mid-fetch swallows the error and reverts to
    /// `Unloaded`, anything else lands in `Error` awaiting a manual
    /// refresh. No automatic retries.
    pub fn fail_load(&mut self, path: &Path) -> bool {
        let Some(node) = find_node_mut(&mut self.root, path) else {
            return false;
        };
        if node.load_state != LoadState::Loading {
            return false;
        }
        if !node.expanded {
            node.load_state = LoadState::Unloaded;
            node.children.clear();
            return false;
        }
        node.load_state = LoadState::Error;
        true
    }

    /// Every expanded directory below the root, plus pending expansions
    /// that have not materialized yet. This is the durable projection
    /// written to `expandedFolders`; sorted so persisted output is stable.
    pub fn expanded_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        collect_expanded(&self.root, &mut dirs);
        dirs.extend(self.pending_expansions.iter().cloned());
        dirs.sort();
        dirs
    }
}

fn collect_expanded(node: &TreeNode, out: &mut Vec<PathBuf>) {
    for child in &node.children {
        if child.is_directory() && child.expanded {
            out.push(child.entry.path.clone());
        }
        collect_expanded(child, out);
    }
}

fn find_node<'a>(node: &'a TreeNode, path: &Path) -> Option<&'a TreeNode> {
    if node.entry.path == path {
        return Some(node);
    }
    if !path.starts_with(&node.entry.path) {
        return None;
    }
    node.children.iter().find_map(|child| find_node(child, path))
}

fn find_node_mut<'a>(node: &'a mut TreeNode, path: &Path) -> Option<&'a mut TreeNode> {
    if node.entry.path == path {
        return Some(node);
    }
    if !path.starts_with(&node.entry.path) {
        return None;
    }
    node.children
        .iter_mut()
        .find_map(|child| find_node_mut(child, path))
}

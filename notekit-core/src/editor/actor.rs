use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, ConfigStore, JsonFileStore, SessionConfig};
use crate::editor::events::{EditorEvent, ErrorCode, ErrorInfo, EventSender};
use crate::editor::requests::EditorRequest;
use crate::file::guard::normalize;
use crate::file::{
    probe_write_access, DirectoryEntry, FileAccess, FolderPicker, FsError, PathGuard,
    SystemFolderPicker,
};
use crate::tree::{DirectoryTree, ExpandOutcome, LoadOutcome, RefreshOutcome};
use crate::workspace::{OpenOutcome, Workspace};

/// The editor actor owns all mutable state: the sandbox guard, the
/// directory tree, the workspace and the persisted session. Requests are
/// processed one at a time off a channel, so every decision about
/// coalescing or discarding runs on a consistent snapshot. Filesystem
/// fetches are spawned as local tasks and report back through a completion
/// channel; the actor never blocks on I/O while requests queue up.
///
/// Handles are cheap to clone. Dropping all handles stops the actor.
#[derive(Clone)]
pub struct EditorActor {
    tx: mpsc::UnboundedSender<EditorRequest>,
}

impl EditorActor {
    /// Launch with production defaults: the platform folder dialog and the
    /// JSON config store under `~/.notekit`. Must run inside a
    /// `tokio::task::LocalSet`.
    pub fn launch() -> Result<(Self, mpsc::UnboundedReceiver<EditorEvent>)> {
        Self::builder().build()
    }

    pub fn builder() -> EditorActorBuilder {
        EditorActorBuilder::default()
    }

    pub fn send(&self, request: EditorRequest) -> Result<()> {
        self.tx.send(request)?;
        Ok(())
    }

    pub fn select_root_directory(&self) -> Result<()> {
        self.send(EditorRequest::SelectRootDirectory)
    }

    pub fn expand_node(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(EditorRequest::ExpandNode { path: path.into() })
    }

    pub fn collapse_node(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(EditorRequest::CollapseNode { path: path.into() })
    }

    pub fn refresh_node(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(EditorRequest::RefreshNode { path: path.into() })
    }

    pub fn open_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(EditorRequest::OpenFile { path: path.into() })
    }

    pub fn close_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(EditorRequest::CloseFile { path: path.into() })
    }

    pub fn save_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) -> Result<()> {
        self.send(EditorRequest::SaveFile {
            path: path.into(),
            content: content.into(),
        })
    }

    pub fn mark_modified(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(EditorRequest::MarkModified { path: path.into() })
    }
}

#[derive(Default)]
pub struct EditorActorBuilder {
    config_store: Option<Arc<dyn ConfigStore>>,
    picker: Option<Box<dyn FolderPicker>>,
}

impl EditorActorBuilder {
    pub fn config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn picker(mut self, picker: Box<dyn FolderPicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn build(self) -> Result<(EditorActor, mpsc::UnboundedReceiver<EditorEvent>)> {
        let store = match self.config_store {
            Some(store) => store,
            None => Arc::new(JsonFileStore::new().context("failed to open config store")?),
        };
        let picker = self.picker.unwrap_or_else(|| Box::new(SystemFolderPicker));

        let (tx, rx) = mpsc::unbounded_channel();
        let (events, event_rx) = EventSender::new();
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let state = ActorState {
            events,
            config: SessionConfig::new(store),
            picker,
            access: None,
            tree: None,
            workspace: Workspace::new(),
            generation: 0,
            done_tx,
        };

        tokio::task::spawn_local(run_actor(state, rx, done_rx));

        Ok((EditorActor { tx }, event_rx))
    }
}

struct ActorState {
    events: EventSender,
    config: SessionConfig,
    picker: Box<dyn FolderPicker>,
    /// `access` and `tree` are set together when a root is in effect.
    access: Option<FileAccess>,
    tree: Option<DirectoryTree>,
    workspace: Workspace,
    /// Bumped on every root change. Completions stamped with an older
    /// generation belong to a superseded root and are dropped unprocessed.
    generation: u64,
    done_tx: mpsc::UnboundedSender<TaskDone>,
}

/// Completion messages posted back by spawned filesystem tasks.
enum TaskDone {
    TreeListing {
        generation: u64,
        path: PathBuf,
        result: Result<Vec<DirectoryEntry>, FsError>,
    },
    WorkspaceRead {
        generation: u64,
        path: PathBuf,
        result: Result<String, FsError>,
    },
    WorkspaceWrite {
        generation: u64,
        path: PathBuf,
        content: String,
        result: Result<(), FsError>,
    },
    BridgeList {
        generation: u64,
        path: PathBuf,
        result: Result<Vec<DirectoryEntry>, FsError>,
    },
    BridgeRead {
        generation: u64,
        path: PathBuf,
        result: Result<String, FsError>,
    },
    BridgeWrite {
        generation: u64,
        path: PathBuf,
        result: Result<(), FsError>,
    },
}

impl TaskDone {
    fn generation(&self) -> u64 {
        match self {
            TaskDone::TreeListing { generation, .. }
            | TaskDone::WorkspaceRead { generation, .. }
            | TaskDone::WorkspaceWrite { generation, .. }
            | TaskDone::BridgeList { generation, .. }
            | TaskDone::BridgeRead { generation, .. }
            | TaskDone::BridgeWrite { generation, .. } => *generation,
        }
    }
}

async fn run_actor(
    mut state: ActorState,
    mut rx: mpsc::UnboundedReceiver<EditorRequest>,
    mut done_rx: mpsc::UnboundedReceiver<TaskDone>,
) {
    info!("editor actor started");

    if let Err(e) = restore_session(&mut state).await {
        error!(?e, "session restore failed");
    }

    loop {
        tokio::select! {
            request = rx.recv() => {
                let Some(request) = request else {
                    info!("request channel closed, editor actor stopping");
                    break;
                };
                if let Err(e) = handle_request(&mut state, request).await {
                    error!(?e, "error handling request");
                }
            }
            Some(done) = done_rx.recv() => {
                apply_completion(&mut state, done);
            }
        }
    }
}

async fn handle_request(state: &mut ActorState, request: EditorRequest) -> Result<()> {
    debug!(?request, "handling request");
    match request {
        EditorRequest::SelectRootDirectory => handle_select_root(state).await?,
        EditorRequest::ExpandNode { path } => handle_expand(state, &path),
        EditorRequest::CollapseNode { path } => handle_collapse(state, &path),
        EditorRequest::RefreshNode { path } => handle_refresh(state, &path),
        EditorRequest::OpenFile { path } => handle_open_file(state, &path),
        EditorRequest::CloseFile { path } => handle_close_file(state, &path),
        EditorRequest::SaveFile { path, content } => handle_save_file(state, &path, content),
        EditorRequest::MarkModified { path } => handle_mark_modified(state, &path),
        EditorRequest::ListDirectory { path } => spawn_bridge_list(state, path),
        EditorRequest::ReadFile { path } => spawn_bridge_read(state, path),
        EditorRequest::WriteFile { path, content } => spawn_bridge_write(state, path, content),
        EditorRequest::GetConfigValue { key } => handle_get_config(state, key),
        EditorRequest::SetConfigValue { key, value } => handle_set_config(state, key, value),
    }
    Ok(())
}

/// Startup restore. Re-validates the persisted root before trusting it (the
/// directory may have been moved or deleted between sessions), then replays
/// the persisted workspace through the same events live mutations emit.
/// An unusable root leaves the editor rootless without touching the config,
/// exactly as if the app had never had a root selected.
async fn restore_session(state: &mut ActorState) -> Result<()> {
    let Some(persisted) = state.config.root_directory() else {
        info!("no persisted root directory, waiting for selection");
        return Ok(());
    };

    let root = match tokio::fs::canonicalize(&persisted).await {
        Ok(root) => root,
        Err(e) => {
            warn!(path = ?persisted, ?e, "persisted root is no longer reachable");
            return Ok(());
        }
    };
    let metadata = match tokio::fs::metadata(&root).await {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(path = ?root, ?e, "persisted root is no longer reachable");
            return Ok(());
        }
    };
    if !metadata.is_dir() {
        warn!(path = ?root, "persisted root is not a directory");
        return Ok(());
    }

    info!(path = ?root, "restoring session");
    apply_root(state, root)?;
    restore_workspace(state).await;
    Ok(())
}

/// Re-opens the persisted workspace in its original order. Paths that fall
/// outside the restored root or fail to read are dropped with a warning;
/// activation happens once at the end so restore never flickers through
/// intermediate active files.
async fn restore_workspace(state: &mut ActorState) {
    let Some(access) = state.access.clone() else {
        return;
    };

    let mut dropped_any = false;
    for path in state.config.open_files() {
        let validated = match access.validate(&path) {
            Ok(validated) => validated,
            Err(e) => {
                warn!(?path, %e, "dropping persisted open file outside the root");
                dropped_any = true;
                continue;
            }
        };
        if !matches!(state.workspace.begin_open(&validated), OpenOutcome::Fetch) {
            // Duplicate persisted entry.
            continue;
        }
        match access.read_file(&validated).await {
            Ok(content) => {
                let opened = state
                    .workspace
                    .complete_open(&validated, content, false)
                    .cloned();
                if let Some(file) = opened {
                    state.events.send(EditorEvent::FileOpened { file });
                }
            }
            Err(e) => {
                warn!(path = ?validated, %e, "dropping unreadable persisted open file");
                state.workspace.fail_open(&validated);
                dropped_any = true;
            }
        }
    }

    let persisted_active = state.config.active_file().map(|path| normalize(&path));
    let active = match persisted_active {
        Some(path) if state.workspace.activate(&path) => Some(path),
        _ => {
            let first = state.workspace.files().first().map(|file| file.path.clone());
            if let Some(path) = &first {
                state.workspace.activate(path);
            }
            first
        }
    };
    state.events.send(EditorEvent::ActiveFileChanged { path: active });

    if dropped_any {
        persist_workspace(state);
    }
}

async fn handle_select_root(state: &mut ActorState) -> Result<()> {
    let Some(chosen) = state.picker.pick_folder().await else {
        info!("root selection cancelled");
        state.events.send(EditorEvent::RootSelectionCancelled);
        return Ok(());
    };

    // Canonicalize before anything else; listing code compares canonical
    // entry paths against this root when filtering symlinks.
    let root = match tokio::fs::canonicalize(&chosen).await {
        Ok(root) => root,
        Err(e) => {
            let error = FsError::from_io(&chosen, e);
            state.events.fs_failure("select_root_directory", &chosen, &error);
            return Ok(());
        }
    };

    if let Err(e) = probe_write_access(&root).await {
        warn!(path = ?root, %e, "selected root failed the write probe");
        let error = FsError::PermissionDenied { path: root.clone() };
        state.events.fs_failure("select_root_directory", &root, &error);
        return Ok(());
    }

    info!(path = ?root, "root directory selected");
    apply_root(state, root.clone())?;
    persist(state.config.set_root_directory(&root));
    persist_expansions(state);
    Ok(())
}

/// Installs `root` as the sandbox boundary. In one step: invalidates every
/// in-flight fetch from the previous root, closes open files not contained
/// in the new root, replaces guard and tree, and kicks off the root
/// listing. Persisted expansions contained in the new root carry over as
/// pending; everything else is forgotten.
fn apply_root(state: &mut ActorState, root: PathBuf) -> Result<()> {
    state.generation += 1;

    let guard = PathGuard::new(root)?;
    let access = FileAccess::new(guard);

    let previous_active = state.workspace.active().map(Path::to_path_buf);
    let dropped = state.workspace.retain_under(access.root());
    for path in &dropped {
        state.events.send(EditorEvent::FileClosed { path: path.clone() });
    }
    let active = state.workspace.active().map(Path::to_path_buf);
    if active != previous_active {
        state.events.send(EditorEvent::ActiveFileChanged { path: active });
    }
    if !dropped.is_empty() {
        persist_workspace(state);
    }

    let pending: HashSet<PathBuf> = state
        .config
        .expanded_folders()
        .into_iter()
        .filter(|path| path.starts_with(access.root()))
        .collect();

    let mut tree = DirectoryTree::with_pending_expansions(access.root_entry(), pending);
    // The root node is always expanded; the GUI renders its children as the
    // top level.
    tree.expand(access.root());

    let root_path = access.root().to_path_buf();
    state.events.send(EditorEvent::RootChanged { path: root_path.clone() });
    state.events.send(EditorEvent::NodeLoading { path: root_path.clone() });

    state.tree = Some(tree);
    state.access = Some(access);
    spawn_tree_listing(state, root_path);
    Ok(())
}

fn handle_expand(state: &mut ActorState, path: &Path) {
    let path = normalize(path);
    let outcome = match state.tree.as_mut() {
        Some(tree) => tree.expand(&path),
        None => return no_root(state, "expand_node", &path),
    };
    match outcome {
        ExpandOutcome::Fetch => {
            state.events.send(EditorEvent::NodeExpanded { path: path.clone() });
            state.events.send(EditorEvent::NodeLoading { path: path.clone() });
            spawn_tree_listing(state, path);
        }
        ExpandOutcome::Coalesced => {
            debug!(?path, "expand coalesced into in-flight fetch");
            state.events.send(EditorEvent::NodeExpanded { path });
        }
        ExpandOutcome::Expanded => {
            // Cached children; pure toggle.
            state.events.send(EditorEvent::NodeExpanded { path });
        }
        ExpandOutcome::NotADirectory => {
            return state.events.operation_failed(
                "expand_node",
                Some(&path),
                ErrorInfo {
                    code: ErrorCode::NotADirectory,
                    message: format!("not a directory: {path:?}"),
                },
            );
        }
        ExpandOutcome::NotFound => {
            return state.events.operation_failed(
                "expand_node",
                Some(&path),
                ErrorInfo {
                    code: ErrorCode::NotFound,
                    message: format!("path is not in the tree: {path:?}"),
                },
            );
        }
    }
    persist_expansions(state);
}

fn handle_collapse(state: &mut ActorState, path: &Path) {
    let path = normalize(path);
    let collapsed = match state.tree.as_mut() {
        Some(tree) => tree.collapse(&path),
        None => return no_root(state, "collapse_node", &path),
    };
    if collapsed {
        state.events.send(EditorEvent::NodeCollapsed { path });
        persist_expansions(state);
    } else {
        debug!(?path, "collapse ignored, node not expanded");
    }
}

fn handle_refresh(state: &mut ActorState, path: &Path) {
    let path = normalize(path);
    let outcome = match state.tree.as_mut() {
        Some(tree) => tree.refresh(&path),
        None => return no_root(state, "refresh_node", &path),
    };
    match outcome {
        RefreshOutcome::Fetch => {
            state.events.send(EditorEvent::NodeLoading { path: path.clone() });
            spawn_tree_listing(state, path);
        }
        RefreshOutcome::Coalesced => debug!(?path, "refresh coalesced into in-flight fetch"),
        RefreshOutcome::Nothing => debug!(?path, "refresh ignored, node never loaded"),
        RefreshOutcome::NotFound => state.events.operation_failed(
            "refresh_node",
            Some(&path),
            ErrorInfo {
                code: ErrorCode::NotFound,
                message: format!("path is not in the tree: {path:?}"),
            },
        ),
    }
}

fn handle_open_file(state: &mut ActorState, path: &Path) {
    let Some(access) = state.access.clone() else {
        return no_root(state, "open_file", path);
    };
    // Guard before registering anything, so a traversal attempt never even
    // becomes a pending open.
    let validated = match access.validate(path) {
        Ok(validated) => validated,
        Err(e) => return state.events.fs_failure("open_file", path, &e),
    };

    match state.workspace.begin_open(&validated) {
        OpenOutcome::Activated => {
            state
                .events
                .send(EditorEvent::ActiveFileChanged { path: Some(validated) });
            persist_workspace(state);
        }
        OpenOutcome::Coalesced => debug!(path = ?validated, "open already in flight"),
        OpenOutcome::Fetch => {
            let done_tx = state.done_tx.clone();
            let generation = state.generation;
            tokio::task::spawn_local(async move {
                let result = access.read_file(&validated).await;
                let _ = done_tx.send(TaskDone::WorkspaceRead {
                    generation,
                    path: validated,
                    result,
                });
            });
        }
    }
}

fn handle_close_file(state: &mut ActorState, path: &Path) {
    let path = normalize(path);
    let Some(closed) = state.workspace.close(&path) else {
        return state.events.operation_failed(
            "close_file",
            Some(&path),
            ErrorInfo {
                code: ErrorCode::NotFound,
                message: format!("file is not open: {path:?}"),
            },
        );
    };
    state.events.send(EditorEvent::FileClosed { path });
    if closed.was_active {
        state
            .events
            .send(EditorEvent::ActiveFileChanged { path: closed.active });
    }
    persist_workspace(state);
}

fn handle_save_file(state: &mut ActorState, path: &Path, content: String) {
    let Some(access) = state.access.clone() else {
        return no_root(state, "save_file", path);
    };
    let validated = match access.validate(path) {
        Ok(validated) => validated,
        Err(e) => return state.events.fs_failure("save_file", path, &e),
    };

    let done_tx = state.done_tx.clone();
    let generation = state.generation;
    tokio::task::spawn_local(async move {
        let result = access.write_file(&validated, &content).await;
        let _ = done_tx.send(TaskDone::WorkspaceWrite {
            generation,
            path: validated,
            content,
            result,
        });
    });
}

fn handle_mark_modified(state: &mut ActorState, path: &Path) {
    let path = normalize(path);
    if state.workspace.mark_modified(&path) {
        state
            .events
            .send(EditorEvent::FileDirtyChanged { path, modified: true });
    } else {
        // Already dirty, or not open at all; either way idempotent.
        debug!(?path, "mark_modified changed nothing");
    }
}

fn spawn_bridge_list(state: &ActorState, path: PathBuf) {
    let Some(access) = state.access.clone() else {
        return no_root(state, "list_directory", &path);
    };
    let done_tx = state.done_tx.clone();
    let generation = state.generation;
    tokio::task::spawn_local(async move {
        let result = access.list_directory(&path).await;
        let _ = done_tx.send(TaskDone::BridgeList {
            generation,
            path,
            result,
        });
    });
}

fn spawn_bridge_read(state: &ActorState, path: PathBuf) {
    let Some(access) = state.access.clone() else {
        return no_root(state, "read_file", &path);
    };
    let done_tx = state.done_tx.clone();
    let generation = state.generation;
    tokio::task::spawn_local(async move {
        let result = access.read_file(&path).await;
        let _ = done_tx.send(TaskDone::BridgeRead {
            generation,
            path,
            result,
        });
    });
}

fn spawn_bridge_write(state: &ActorState, path: PathBuf, content: String) {
    let Some(access) = state.access.clone() else {
        return no_root(state, "write_file", &path);
    };
    let done_tx = state.done_tx.clone();
    let generation = state.generation;
    tokio::task::spawn_local(async move {
        let result = access.write_file(&path, &content).await;
        let _ = done_tx.send(TaskDone::BridgeWrite {
            generation,
            path,
            result,
        });
    });
}

fn handle_get_config(state: &ActorState, key: String) {
    let value = state.config.store().get(&key);
    state.events.send(EditorEvent::ConfigValue { key, value });
}

fn handle_set_config(state: &ActorState, key: String, value: serde_json::Value) {
    if let Err(e) = state.config.store().set(&key, value) {
        warn!(key, ?e, "failed to persist config value");
        state
            .events
            .operation_failed("set_config_value", None, ErrorInfo::from(&e));
    }
}

fn apply_completion(state: &mut ActorState, done: TaskDone) {
    if done.generation() != state.generation {
        // The root changed while this task was in flight; its result
        // belongs to a sandbox that no longer exists.
        debug!("dropping completion from a superseded root");
        return;
    }
    match done {
        TaskDone::TreeListing { path, result, .. } => apply_tree_listing(state, path, result),
        TaskDone::WorkspaceRead { path, result, .. } => apply_workspace_read(state, path, result),
        TaskDone::WorkspaceWrite {
            path,
            content,
            result,
            ..
        } => apply_workspace_write(state, path, content, result),
        TaskDone::BridgeList { path, result, .. } => match result {
            Ok(entries) => state.events.send(EditorEvent::DirectoryListed { path, entries }),
            Err(e) => state.events.fs_failure("list_directory", &path, &e),
        },
        TaskDone::BridgeRead { path, result, .. } => match result {
            Ok(content) => state.events.send(EditorEvent::FileRead { path, content }),
            Err(e) => state.events.fs_failure("read_file", &path, &e),
        },
        TaskDone::BridgeWrite { path, result, .. } => match result {
            Ok(()) => state.events.send(EditorEvent::FileWritten { path }),
            Err(e) => state.events.fs_failure("write_file", &path, &e),
        },
    }
}

fn apply_tree_listing(
    state: &mut ActorState,
    path: PathBuf,
    result: Result<Vec<DirectoryEntry>, FsError>,
) {
    enum Applied {
        Loaded {
            children: Vec<DirectoryEntry>,
            auto_expand: Vec<PathBuf>,
        },
        Failed(FsError),
        Dropped,
    }

    let applied = {
        let Some(tree) = state.tree.as_mut() else {
            return;
        };
        match result {
            Ok(entries) => match tree.complete_load(&path, entries) {
                LoadOutcome::Applied { auto_expand } => {
                    let children = tree
                        .find(&path)
                        .map(|node| node.children.iter().map(|child| child.entry.clone()).collect())
                        .unwrap_or_default();
                    Applied::Loaded {
                        children,
                        auto_expand,
                    }
                }
                LoadOutcome::Discarded | LoadOutcome::Stale => Applied::Dropped,
            },
            Err(e) => {
                if tree.fail_load(&path) {
                    Applied::Failed(e)
                } else {
                    Applied::Dropped
                }
            }
        }
    };

    match applied {
        Applied::Loaded {
            children,
            auto_expand,
        } => {
            state.events.send(EditorEvent::NodeLoaded { path, children });
            // Persisted expansions materialize here: expand each one and
            // fetch its listing in turn.
            for dir in auto_expand {
                state.events.send(EditorEvent::NodeExpanded { path: dir.clone() });
                state.events.send(EditorEvent::NodeLoading { path: dir.clone() });
                spawn_tree_listing(state, dir);
            }
        }
        Applied::Failed(e) => {
            warn!(?path, %e, "directory listing failed");
            state
                .events
                .send(EditorEvent::NodeLoadFailed { path, error: ErrorInfo::from(&e) });
        }
        Applied::Dropped => debug!(?path, "listing discarded, node collapsed or already settled"),
    }
}

fn apply_workspace_read(state: &mut ActorState, path: PathBuf, result: Result<String, FsError>) {
    match result {
        Ok(content) => {
            let opened = state.workspace.complete_open(&path, content, true).cloned();
            let Some(file) = opened else {
                return debug!(?path, "read discarded, open no longer pending");
            };
            state.events.send(EditorEvent::FileOpened { file });
            state
                .events
                .send(EditorEvent::ActiveFileChanged { path: Some(path) });
            persist_workspace(state);
        }
        Err(e) => {
            state.workspace.fail_open(&path);
            state.events.fs_failure("open_file", &path, &e);
        }
    }
}

fn apply_workspace_write(
    state: &mut ActorState,
    path: PathBuf,
    content: String,
    result: Result<(), FsError>,
) {
    match result {
        Ok(()) => {
            // A save of a file that is not open still succeeds on disk; the
            // workspace just has nothing to update.
            if state.workspace.mark_saved(&path, content) == Some(true) {
                state.events.send(EditorEvent::FileDirtyChanged {
                    path: path.clone(),
                    modified: false,
                });
            }
            state.events.send(EditorEvent::FileSaved { path });
        }
        Err(e) => state.events.fs_failure("save_file", &path, &e),
    }
}

fn spawn_tree_listing(state: &ActorState, path: PathBuf) {
    let Some(access) = state.access.clone() else {
        debug!(?path, "no access service, dropping listing request");
        return;
    };
    let done_tx = state.done_tx.clone();
    let generation = state.generation;
    tokio::task::spawn_local(async move {
        let result = access.list_directory(&path).await;
        let _ = done_tx.send(TaskDone::TreeListing {
            generation,
            path,
            result,
        });
    });
}

fn no_root(state: &ActorState, operation: &str, path: &Path) {
    state.events.operation_failed(
        operation,
        Some(path),
        ErrorInfo {
            code: ErrorCode::NoRoot,
            message: "no root directory selected".to_string(),
        },
    );
}

fn persist(result: Result<(), ConfigError>) {
    // Persistence is fire-and-forget: a failed write leaves in-memory state
    // ahead of disk until the next successful write.
    if let Err(e) = result {
        warn!(?e, "failed to persist config");
    }
}

fn persist_workspace(state: &ActorState) {
    persist(state.config.set_open_files(&state.workspace.open_paths()));
    persist(state.config.set_active_file(state.workspace.active()));
}

fn persist_expansions(state: &ActorState) {
    if let Some(tree) = &state.tree {
        persist(state.config.set_expanded_folders(&tree.expanded_dirs()));
    }
}

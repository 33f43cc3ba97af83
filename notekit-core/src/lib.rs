pub mod config;
pub mod editor;
pub mod file;
pub mod tree;
pub mod workspace;

// Public API - GUI shells embedding the core in-process should prefer these
pub use config::{ConfigStore, JsonFileStore, MemoryStore, SessionConfig};
pub use editor::{EditorActor, EditorEvent, EditorRequest};
pub use file::{DirectoryEntry, FileAccess, FolderPicker, FsError, PathGuard, ScriptedPicker};
pub use tree::{DirectoryTree, LoadState, TreeNode};
pub use workspace::{OpenFile, Workspace};

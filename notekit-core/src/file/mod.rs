//! Sandboxed filesystem access for the editor.
//!
//! ## Architecture
//!
//! All disk access funnels through one chokepoint with a strict layering:
//!
//! ### guard.rs
//! Lexical path normalization and the containment check. [`PathGuard`]
//! proves a path sits inside the selected root before any I/O happens;
//! everything else in this module takes that proof as its precondition.
//!
//! ### access.rs
//! The async operations themselves (list, read, atomic write, write
//! probing), each one validating through the guard first. Directory
//! listings omit entries that resolve outside the root via symlinks.
//!
//! ### picker.rs
//! The OS folder dialog behind a trait so the actor can be driven by a
//! scripted picker in tests.

pub mod access;
pub mod error;
pub mod guard;
pub mod picker;

pub use access::{probe_write_access, DirectoryEntry, FileAccess};
pub use error::FsError;
pub use guard::PathGuard;
pub use picker::{FolderPicker, ScriptedPicker, SystemFolderPicker};

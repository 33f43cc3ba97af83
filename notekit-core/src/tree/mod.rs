//! Lazily loaded directory tree.
//!
//! Directory contents are fetched per node on first expand and cached until
//! an explicit refresh. The model itself never touches the filesystem; it
//! only tracks state and tells the actor which paths need listing.

pub mod model;
pub mod node;

pub use model::{DirectoryTree, ExpandOutcome, LoadOutcome, RefreshOutcome};
pub use node::{LoadState, TreeNode};

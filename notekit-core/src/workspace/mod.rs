//! Open-file (tab) state.

pub mod state;

pub use state::{Closed, OpenFile, OpenOutcome, Workspace};

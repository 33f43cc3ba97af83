use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Seam in front of the OS folder-selection dialog so tests (and headless
/// hosts) can drive root selection without a display server.
#[async_trait(?Send)]
pub trait FolderPicker {
    /// Returns the chosen directory, or `None` when the user cancelled.
    async fn pick_folder(&self) -> Option<PathBuf>;
}

/// Production picker backed by the platform dialog.
pub struct SystemFolderPicker;

#[async_trait(?Send)]
impl FolderPicker for SystemFolderPicker {
    async fn pick_folder(&self) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf())
    }
}

/// Test picker that replays a queue of scripted selections and counts how
/// often the dialog was requested. An empty queue behaves like a cancel.
#[derive(Clone, Default)]
pub struct ScriptedPicker {
    responses: Arc<Mutex<VecDeque<Option<PathBuf>>>>,
    pick_count: Arc<Mutex<usize>>,
}

impl ScriptedPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Option<PathBuf>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn pick_count(&self) -> usize {
        *self.pick_count.lock().unwrap()
    }
}

#[async_trait(?Send)]
impl FolderPicker for ScriptedPicker {
    async fn pick_folder(&self) -> Option<PathBuf> {
        *self.pick_count.lock().unwrap() += 1;
        self.responses.lock().unwrap().pop_front().flatten()
    }
}

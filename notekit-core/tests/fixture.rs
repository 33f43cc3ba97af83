use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notekit_core::config::{MemoryStore, SessionConfig};
use notekit_core::editor::{EditorActor, EditorEvent, EditorRequest};
use notekit_core::file::ScriptedPicker;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// One editor actor wired to an in-memory config store, a scripted folder
/// picker and a real temp directory seeded with:
///
/// ```text
/// <root>/archive/
/// <root>/notes/alpha.md
/// <root>/notes/beta.md
/// <root>/readme.md
/// ```
#[allow(dead_code)]
pub struct Fixture {
    pub actor: EditorActor,
    pub event_rx: mpsc::UnboundedReceiver<EditorEvent>,
    /// Owns the on-disk tree; dropping it deletes the directory.
    pub root_dir: TempDir,
    /// Canonicalized root path, matching the paths the actor emits.
    pub root: PathBuf,
    pub store: Arc<MemoryStore>,
    pub picker: ScriptedPicker,
}

impl Fixture {
    fn build(store: Arc<MemoryStore>, seed: impl FnOnce(&Path, &SessionConfig)) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let root_dir = TempDir::new().expect("failed to create temp dir");
        let root = root_dir
            .path()
            .canonicalize()
            .expect("failed to canonicalize temp dir");
        std::fs::create_dir(root.join("notes")).unwrap();
        std::fs::create_dir(root.join("archive")).unwrap();
        std::fs::write(root.join("notes/alpha.md"), "# alpha").unwrap();
        std::fs::write(root.join("notes/beta.md"), "# beta").unwrap();
        std::fs::write(root.join("readme.md"), "hello").unwrap();

        seed(&root, &SessionConfig::new(store.clone()));

        let picker = ScriptedPicker::new();
        let (actor, event_rx) = EditorActor::builder()
            .config_store(store.clone())
            .picker(Box::new(picker.clone()))
            .build()
            .expect("failed to build editor actor");

        Fixture {
            actor,
            event_rx,
            root_dir,
            root,
            store,
            picker,
        }
    }

    /// Typed view over the fixture's config store.
    #[allow(dead_code)]
    pub fn session(&self) -> SessionConfig {
        SessionConfig::new(self.store.clone())
    }

    /// Queues the fixture root in the picker, requests selection and waits
    /// for the initial root listing. Returns everything emitted up to and
    /// including that `NodeLoaded`.
    pub async fn select_root(&mut self) -> Vec<EditorEvent> {
        self.picker.push(Some(self.root.clone()));
        self.actor.select_root_directory().expect("actor stopped");
        self.expect_until(|event| matches!(event, EditorEvent::NodeLoaded { .. }))
            .await
    }

    /// Receives events until `pred` matches, returning everything received
    /// including the matching event. Panics after 5s.
    pub async fn expect_until<F>(&mut self, pred: F) -> Vec<EditorEvent>
    where
        F: Fn(&EditorEvent) -> bool,
    {
        let mut events = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), self.event_rx.recv())
                .await
                .unwrap_or_else(|_| panic!("timed out waiting for event, saw: {events:#?}"))
                .expect("event stream closed");
            let matched = pred(&event);
            events.push(event);
            if matched {
                return events;
            }
        }
    }

    /// Round-trips a config read through the actor. Requests are handled in
    /// order, so once the fence response arrives every request sent before
    /// it has been fully handled and its synchronous events emitted.
    /// Returns the events seen before the fence response, fence excluded.
    pub async fn fence(&mut self) -> Vec<EditorEvent> {
        self.actor
            .send(EditorRequest::GetConfigValue {
                key: "fence".to_string(),
            })
            .expect("actor stopped");
        let mut events = self
            .expect_until(|event| {
                matches!(event, EditorEvent::ConfigValue { key, .. } if key == "fence")
            })
            .await;
        events.pop();
        events
    }
}

/// Runs a test against a fresh fixture on a current-thread runtime. The
/// actor relies on `spawn_local`, so everything lives on one `LocalSet`.
pub fn run<F, Fut>(test_fn: F)
where
    F: FnOnce(Fixture) -> Fut,
    Fut: Future<Output = ()>,
{
    run_seeded(|_, _| {}, test_fn);
}

/// Like [`run`], but `seed` can populate the config store (keyed by the
/// canonical fixture root) before the actor launches, for session restore
/// scenarios.
pub fn run_seeded<S, F, Fut>(seed: S, test_fn: F)
where
    S: FnOnce(&Path, &SessionConfig),
    F: FnOnce(Fixture) -> Fut,
    Fut: Future<Output = ()>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");
    let local = tokio::task::LocalSet::new();
    runtime.block_on(local.run_until(async move {
        let fixture = Fixture::build(Arc::new(MemoryStore::new()), seed);
        let test_future = test_fn(fixture);
        tokio::time::timeout(Duration::from_secs(30), test_future)
            .await
            .expect("test timed out after 30 seconds");
    }));
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use notekit_core::config::JsonFileStore;
use notekit_core::editor::{EditorActor, EditorRequest};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;
use tracing::error;

/// Hosts the editor actor over stdio: requests arrive as newline-delimited
/// JSON on stdin, events leave as newline-delimited JSON on stdout. Any GUI
/// shell that can spawn a process and speak line JSON can embed the core
/// this way. Must run inside a `tokio::task::LocalSet`.
pub async fn run_subprocess(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut builder = EditorActor::builder();
    if let Some(path) = config_path {
        builder = builder.config_store(Arc::new(JsonFileStore::from_path(path)?));
    }
    let (actor, mut event_rx) = builder.build()?;

    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    join_set.spawn(async move {
        let mut stdout = io::stdout();
        while let Some(event) = event_rx.recv().await {
            let json = serde_json::to_string(&event)?;
            let line = format!("{json}\n");
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok(())
    });

    join_set.spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let request: EditorRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    // One malformed line from the host must not take the
                    // whole editor down.
                    error!(%e, "ignoring unparseable request line");
                    continue;
                }
            };
            actor.send(request)?;
        }
        Ok(())
    });

    // Either side finishing (stdin closed, stdout gone) ends the session.
    if let Some(result) = join_set.join_next().await {
        return match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(join_error) => Err(anyhow!(join_error)),
        };
    }
    Ok(())
}

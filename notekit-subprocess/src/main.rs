use std::env;
use std::path::PathBuf;

use anyhow::Result;
use notekit_subprocess::run_subprocess;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config-path" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                }
            }
            other => {
                info!(arg = other, "ignoring unknown argument");
            }
        }
        i += 1;
    }

    // The actor relies on spawn_local, so everything runs on one LocalSet.
    let local = LocalSet::new();
    local.run_until(run_subprocess(config_path)).await?;
    Ok(())
}

/// stdout carries the JSON protocol, so all diagnostics go to stderr.
fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

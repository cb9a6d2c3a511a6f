use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qbofix_engine::NoiseFilter;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod config;
mod process;

#[derive(Parser, Debug)]
#[command(name = "qbofix", version, about = "Repair bank QBO downloads for QuickBooks import")]
struct Cli {
    /// Path to a TOML config file (directories, noise rules, bank identity)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Repair every statement file waiting in the download directory
    Sweep,

    /// Sweep, then keep watching the download directory for new files
    Watch,

    /// Convert a CSV bank export into a repaired QBO statement
    Convert {
        /// Path to the CSV export
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let filter = NoiseFilter::from_config(&config.filter)?;

    match cli.command {
        Command::Sweep => {
            process::sweep(&config, &filter)?;
        }
        Command::Watch => {
            process::sweep(&config, &filter)?;
            watch(&config, &filter).await?;
        }
        Command::Convert { csv } => {
            let written = process::convert_file(&csv, &config, &filter)?;
            tracing::info!("converted {} -> {}", csv.display(), written.display());
        }
    }
    Ok(())
}

/// Block on the download directory, repairing statement files as they
/// appear. The channel bridges the notify watcher thread and the async
/// loop; the watcher must stay alive for the duration.
async fn watch(config: &config::Config, filter: &NoiseFilter) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    let _watcher = spawn_download_watcher(&config.download_dir, tx)
        .with_context(|| format!("watch directory {}", config.download_dir.display()))?;

    tracing::info!("watching {}", config.download_dir.display());

    while let Some(path) = rx.recv().await {
        if !process::is_statement(&path, &config.statement_ext) {
            continue;
        }
        match process::repair_file(&path, config, filter) {
            Ok(output) => tracing::info!("repaired {} -> {}", path.display(), output.display()),
            Err(e) => tracing::warn!("skipping {}: {e:#}", path.display()),
        }
    }
    Ok(())
}

/// Spawn a notify watcher on `watch_dir` that sends new file paths to `tx`.
/// Returns the watcher — it must be kept alive for watching to continue.
fn spawn_download_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(ev) = event {
            if matches!(ev.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                for path in ev.paths {
                    let _ = tx.try_send(path);
                }
            }
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

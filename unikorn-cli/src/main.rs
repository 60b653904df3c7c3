use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use unikorn_core::{scheduler, ControlPlane, KubernetesCluster, TickRunner, UpgradeChecker, UtcClock};
use unikorn_store::FileStore;

mod config;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "unikorn", version, about = "Application-bundle upgrade scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scheduler loop until SIGTERM/Ctrl-C.
    Run,
    /// Run every registered checker exactly once and exit.
    Tick,
    /// Write ~/.unikorn/config.toml with defaults if absent.
    ConfigInit,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::ConfigInit => {
            config::init_config()?;
        }
        Command::Tick => {
            let cfg = config::load_config()?;
            let checkers = build_checkers(&cfg.data_dir);
            scheduler::run_once(&checkers, &CancellationToken::new()).await;
        }
        Command::Run => {
            let cfg = config::load_config()?;
            let checkers = build_checkers(&cfg.data_dir);
            let cancel = CancellationToken::new();

            let shutdown_cancel = cancel.clone();
            tokio::spawn(async move {
                wait_for_shutdown_signal().await;
                info!("received shutdown signal");
                shutdown_cancel.cancel();
            });

            scheduler::run(Duration::from_secs(cfg.poll_period_secs), checkers, cancel).await;
        }
    }

    Ok(())
}

fn build_checkers(data_dir: &std::path::Path) -> Vec<Box<dyn TickRunner>> {
    let clock: Arc<dyn unikorn_core::Clock> = Arc::new(UtcClock);

    let control_plane_checker: UpgradeChecker<ControlPlane, _, _> = UpgradeChecker::new(
        FileStore::new(data_dir, "control-plane-bundles.json"),
        FileStore::new(data_dir, "control-planes.json"),
        clock.clone(),
    );

    let cluster_checker: UpgradeChecker<KubernetesCluster, _, _> = UpgradeChecker::new(
        FileStore::new(data_dir, "kubernetes-cluster-bundles.json"),
        FileStore::new(data_dir, "kubernetes-clusters.json"),
        clock,
    );

    // Registration order: control planes before the clusters they host, so an
    // operator reading logs sees the parent resolved first.
    vec![
        Box::new(control_plane_checker) as Box<dyn TickRunner>,
        Box::new(cluster_checker) as Box<dyn TickRunner>,
    ]
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).expect("install SIGTERM handler");
    let mut interrupt = signal(SignalKind::interrupt()).expect("install SIGINT handler");

    tokio::select! {
        _ = terminate.recv() => {}
        _ = interrupt.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

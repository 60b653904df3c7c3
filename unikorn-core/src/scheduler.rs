//! Root scheduling loop: ticks on a configurable period,
//! invoking every registered checker sequentially.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::CheckerError;

/// Object-safe wrapper around `UpgradeChecker<R, BS, RS>` so the root loop
/// can hold a `Vec<Box<dyn TickRunner>>` across different resource kinds.
/// `UpgradeChecker::check` can't be called through a trait object directly
/// because it's generic over two store types; this is the seam.
#[async_trait::async_trait]
pub trait TickRunner: Send + Sync {
    /// A short name for log context (e.g. "control-plane", "kubernetes-cluster").
    fn name(&self) -> &'static str;
    async fn check(&self, cancel: &CancellationToken) -> Result<(), CheckerError>;
}

/// Run checkers on a fixed period until `cancel` fires. Checkers run in
/// registration order; a failure in one is logged and does not prevent the
/// next from running, nor does it stop the loop.
pub async fn run(poll_period: Duration, checkers: Vec<Box<dyn TickRunner>>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                return;
            }
            _ = tokio::time::sleep(poll_period) => {}
        }

        for checker in &checkers {
            if cancel.is_cancelled() {
                return;
            }
            if let Err(e) = checker.check(&cancel).await {
                error!(checker = checker.name(), error = %e, "tick failed");
            }
        }
    }
}

/// Run every checker exactly once, in registration order. Used by the
/// `tick` CLI subcommand and by tests that don't want the sleep loop.
pub async fn run_once(checkers: &[Box<dyn TickRunner>], cancel: &CancellationToken) {
    for checker in checkers {
        if let Err(e) = checker.check(cancel).await {
            error!(checker = checker.name(), error = %e, "tick failed");
        }
    }
}

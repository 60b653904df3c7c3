//! The resource store: the one external collaborator the scheduler
//! mutates. Production implementations (etcd-backed Kubernetes API) live
//! outside this crate; `unikorn-store` ships a file-backed one and this
//! crate ships an in-memory one for tests.

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Failure modes a store call can surface. Both are "expected" outcomes the
/// checker treats as tick-aborting but not fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is temporarily unavailable: {0}")]
    Transient(String),
    #[error("optimistic concurrency conflict")]
    Conflict,
}

/// A typed client over one resource kind.
#[async_trait::async_trait]
pub trait ResourceStore<T>: Send + Sync {
    /// A consistent-enough snapshot of every resource of this kind.
    async fn list(&self, cancel: &CancellationToken) -> Result<Vec<T>, StoreError>;

    /// Persist a mutated resource. Conflicts are an expected outcome the
    /// caller surfaces to the next tick rather than retrying in-place.
    async fn update(&self, resource: &T, cancel: &CancellationToken) -> Result<(), StoreError>;
}

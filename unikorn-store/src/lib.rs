//! Concrete `unikorn_core::store::ResourceStore` implementations: a
//! JSON-file-backed store for production and an in-memory one for tests.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use unikorn_core::{ApplicationBundle, ControlPlane, KubernetesCluster};

/// Identifies a record for optimistic-concurrency compare-and-swap. Kept out
/// of `unikorn-core` because only store implementations need it; the
/// scheduler itself never compares resources by key.
pub trait Keyed {
    fn store_key(&self) -> String;
}

impl Keyed for ApplicationBundle {
    fn store_key(&self) -> String {
        self.name.clone()
    }
}

impl Keyed for ControlPlane {
    fn store_key(&self) -> String {
        self.name.clone()
    }
}

impl Keyed for KubernetesCluster {
    fn store_key(&self) -> String {
        self.name.clone()
    }
}

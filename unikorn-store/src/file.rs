//! JSON-file-backed `ResourceStore`: one file per resource kind under a
//! configurable data directory, with a `resource_version` counter per
//! record giving optimistic-concurrency semantics without a cluster.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use unikorn_core::{ResourceStore, StoreError};

use crate::Keyed;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    resource_version: u64,
    data: T,
}

/// A `ResourceStore<T>` backed by a single JSON file holding a
/// `Vec<Envelope<T>>`. `observed` tracks the version each key had the last
/// time this process called [`list`](ResourceStore::list); `update` rejects
/// with [`StoreError::Conflict`] if the on-disk version has since moved.
pub struct FileStore<T> {
    path: PathBuf,
    observed: Mutex<HashMap<String, u64>>,
    _item: PhantomData<T>,
}

impl<T> FileStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Keyed + Send + Sync,
{
    pub fn new(data_dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(file_name),
            observed: Mutex::new(HashMap::new()),
            _item: PhantomData,
        }
    }

    async fn read_all(&self) -> Result<Vec<Envelope<T>>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Transient(format!("corrupt store file {}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Transient(format!("read {}: {e}", self.path.display()))),
        }
    }

    async fn write_all(&self, envelopes: &[Envelope<T>]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Transient(format!("create {}: {e}", parent.display())))?;
        }
        let bytes = serde_json::to_vec_pretty(envelopes)
            .map_err(|e| StoreError::Transient(format!("serialize {}: {e}", self.path.display())))?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| StoreError::Transient(format!("write {}: {e}", self.path.display())))
    }
}

#[async_trait::async_trait]
impl<T> ResourceStore<T> for FileStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Keyed + Send + Sync,
{
    async fn list(&self, cancel: &CancellationToken) -> Result<Vec<T>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Transient("cancelled".to_string()));
        }
        let envelopes = self.read_all().await?;
        let mut observed = self.observed.lock().expect("file store mutex poisoned");
        let mut out = Vec::with_capacity(envelopes.len());
        for envelope in &envelopes {
            observed.insert(envelope.data.store_key(), envelope.resource_version);
            out.push(envelope.data.clone());
        }
        Ok(out)
    }

    async fn update(&self, resource: &T, cancel: &CancellationToken) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Transient("cancelled".to_string()));
        }
        let key = resource.store_key();
        let observed_version = self.observed.lock().expect("file store mutex poisoned").get(&key).copied();

        let mut envelopes = self.read_all().await?;
        let existing = envelopes.iter().position(|e| e.data.store_key() == key);

        match existing {
            Some(idx) if Some(envelopes[idx].resource_version) != observed_version => {
                warn!(key = %key, "optimistic concurrency conflict");
                return Err(StoreError::Conflict);
            }
            Some(idx) => {
                envelopes[idx].resource_version += 1;
                envelopes[idx].data = resource.clone();
            }
            None => {
                envelopes.push(Envelope {
                    resource_version: 0,
                    data: resource.clone(),
                });
            }
        }

        self.write_all(&envelopes).await?;
        self.observed.lock().expect("file store mutex poisoned").insert(
            key,
            envelopes
                .iter()
                .find(|e| e.data.store_key() == resource.store_key())
                .map(|e| e.resource_version)
                .unwrap_or(0),
        );
        Ok(())
    }
}

//! In-memory `ResourceStore`, used by tests that want real optimistic
//! concurrency semantics without touching a filesystem.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use unikorn_core::{ResourceStore, StoreError};

use crate::Keyed;

struct Record<T> {
    version: u64,
    data: T,
}

/// Holds one versioned record per [`Keyed::store_key`]. `update` conflicts
/// if the record's current version doesn't match the version observed by
/// the most recent `list` call, mirroring what a real optimistic-concurrency
/// store rejects.
pub struct MemoryStore<T> {
    records: Mutex<HashMap<String, Record<T>>>,
    observed: Mutex<HashMap<String, u64>>,
}

impl<T: Clone + Keyed> MemoryStore<T> {
    pub fn new(items: Vec<T>) -> Self {
        let records = items
            .into_iter()
            .map(|item| (item.store_key(), Record { version: 0, data: item }))
            .collect();
        Self {
            records: Mutex::new(records),
            observed: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl<T> ResourceStore<T> for MemoryStore<T>
where
    T: Clone + Keyed + Send + Sync,
{
    async fn list(&self, _cancel: &CancellationToken) -> Result<Vec<T>, StoreError> {
        let records = self.records.lock().expect("memory store mutex poisoned");
        let mut observed = self.observed.lock().expect("memory store mutex poisoned");
        let mut out = Vec::with_capacity(records.len());
        for (key, record) in records.iter() {
            observed.insert(key.clone(), record.version);
            out.push(record.data.clone());
        }
        Ok(out)
    }

    async fn update(&self, resource: &T, _cancel: &CancellationToken) -> Result<(), StoreError> {
        let key = resource.store_key();
        let observed_version = self.observed.lock().expect("memory store mutex poisoned").get(&key).copied();

        let mut records = self.records.lock().expect("memory store mutex poisoned");
        match records.get(&key) {
            Some(current) if Some(current.version) != observed_version => Err(StoreError::Conflict),
            _ => {
                let next_version = records.get(&key).map(|r| r.version + 1).unwrap_or(0);
                records.insert(
                    key,
                    Record {
                        version: next_version,
                        data: resource.clone(),
                    },
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        key: String,
        value: u32,
    }

    impl Keyed for Item {
        fn store_key(&self) -> String {
            self.key.clone()
        }
    }

    #[tokio::test]
    async fn list_then_update_succeeds() {
        let store = MemoryStore::new(vec![Item { key: "a".into(), value: 1 }]);
        let cancel = CancellationToken::new();

        let items = store.list(&cancel).await.unwrap();
        let mut item = items[0].clone();
        item.value = 2;
        store.update(&item, &cancel).await.unwrap();

        let items = store.list(&cancel).await.unwrap();
        assert_eq!(items[0].value, 2);
    }

    #[tokio::test]
    async fn update_without_prior_list_conflicts() {
        let store = MemoryStore::new(vec![Item { key: "a".into(), value: 1 }]);
        let cancel = CancellationToken::new();

        let stale = Item { key: "a".into(), value: 99 };
        let err = store.update(&stale, &cancel).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn concurrent_update_after_list_conflicts_for_the_stale_writer() {
        let store = MemoryStore::new(vec![Item { key: "a".into(), value: 1 }]);
        let cancel = CancellationToken::new();

        let items = store.list(&cancel).await.unwrap();
        let mut first = items[0].clone();
        first.value = 2;
        store.update(&first, &cancel).await.unwrap();

        // Second writer observed the same original snapshot and now loses.
        let mut second = items[0].clone();
        second.value = 3;
        let err = store.update(&second, &cancel).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn new_key_inserts_without_conflict() {
        let store: MemoryStore<Item> = MemoryStore::new(vec![]);
        let cancel = CancellationToken::new();
        store.update(&Item { key: "new".into(), value: 1 }, &cancel).await.unwrap();
        let items = store.list(&cancel).await.unwrap();
        assert_eq!(items.len(), 1);
    }
}

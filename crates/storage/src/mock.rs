//! Mock content store
//!
//! Programmable in-memory store for tests:
//! - records every `put`/`delete` call
//! - can be told to fail puts whose name contains a marker

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::{ContentStore, StorageError, StoredObject};

#[derive(Clone, Default)]
pub struct MockContentStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    puts: Arc<RwLock<Vec<String>>>,
    deletes: Arc<RwLock<Vec<String>>>,
    fail_put_containing: Arc<RwLock<Option<String>>>,
    sequence: Arc<AtomicU64>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make puts fail when the object name contains `marker`.
    pub fn set_fail_put_containing(&self, marker: impl Into<String>) {
        *self.fail_put_containing.write().unwrap() = Some(marker.into());
    }

    /// Clear the programmed failure.
    pub fn clear_failures(&self) {
        *self.fail_put_containing.write().unwrap() = None;
    }

    /// Number of successful and failed put attempts so far.
    pub fn put_count(&self) -> usize {
        self.puts.read().unwrap().len()
    }

    /// Names passed to `put`, in call order.
    pub fn put_names(&self) -> Vec<String> {
        self.puts.read().unwrap().clone()
    }

    /// URLs passed to `delete`, in call order.
    pub fn deleted_urls(&self) -> Vec<String> {
        self.deletes.read().unwrap().clone()
    }

    /// Whether an object is currently held at `url`.
    pub fn contains(&self, url: &str) -> bool {
        self.objects.read().unwrap().contains_key(url)
    }
}

#[async_trait::async_trait]
impl ContentStore for MockContentStore {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<StoredObject, StorageError> {
        self.puts.write().unwrap().push(name.to_string());

        if let Some(marker) = self.fail_put_containing.read().unwrap().as_ref() {
            if name.contains(marker.as_str()) {
                return Err(StorageError::Response(format!(
                    "simulated failure storing {}",
                    name
                )));
            }
        }

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let url = format!("mock://objects/{}/{}", seq, name);
        let size = bytes.len() as i64;
        self.objects.write().unwrap().insert(url.clone(), bytes);

        Ok(StoredObject { url, size })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(url.to_string()))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        self.deletes.write().unwrap().push(url.to_string());
        match self.objects.write().unwrap().remove(url) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(url.to_string())),
        }
    }
}

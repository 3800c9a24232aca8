//! In-process object store.
//!
//! Keys are listed in insertion order rather than lexicographically, so tests
//! can state "first appearance" orderings directly. Overwriting a key keeps
//! its original position, like a real bucket keeps a key's identity.

use super::client::{ListPage, ObjectStore, ObjectSummary, StoreError};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

const DEFAULT_PAGE_SIZE: usize = 1000;

/// Lock ignoring poison; no critical section here can leave the data half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-memory bucket with configurable page size and failure injection.
///
/// Uses `Mutex` (not `RefCell`) so it is `Sync` and can be shared across the
/// event printer thread in tests.
pub struct MemoryStore {
    bucket: String,
    page_size: usize,
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    website_index: Mutex<Option<String>>,
    failing_gets: Mutex<HashSet<String>>,
    failing_puts: Mutex<HashSet<String>>,
    fail_listings: Mutex<bool>,
    list_requests: Mutex<usize>,
    put_requests: Mutex<usize>,
}

impl MemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            objects: Mutex::new(Vec::new()),
            website_index: Mutex::new(None),
            failing_gets: Mutex::new(HashSet::new()),
            failing_puts: Mutex::new(HashSet::new()),
            fail_listings: Mutex::new(false),
            list_requests: Mutex::new(0),
            put_requests: Mutex::new(0),
        }
    }

    /// Limit how many keys a single `list_page` call returns.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Store an object directly, bypassing request accounting.
    pub fn insert(&self, key: &str, body: Vec<u8>) {
        let mut objects = lock(&self.objects);
        match objects.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = body,
            None => objects.push((key.to_string(), body)),
        }
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.objects)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, body)| body.clone())
    }

    /// All keys in listing order.
    pub fn keys(&self) -> Vec<String> {
        lock(&self.objects)
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Index document set by the last `set_website_config` call.
    pub fn website_index(&self) -> Option<String> {
        lock(&self.website_index).clone()
    }

    /// Make every `get_object` for `key` fail with a transfer error.
    pub fn fail_get(&self, key: &str) {
        lock(&self.failing_gets).insert(key.to_string());
    }

    /// Make every `put_object` for `key` fail with a transfer error.
    pub fn fail_put(&self, key: &str) {
        lock(&self.failing_puts).insert(key.to_string());
    }

    pub fn fail_listings(&self, fail: bool) {
        *lock(&self.fail_listings) = fail;
    }

    pub fn list_requests(&self) -> usize {
        *lock(&self.list_requests)
    }

    pub fn put_requests(&self) -> usize {
        *lock(&self.put_requests)
    }
}

impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn list_page(
        &self,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        *lock(&self.list_requests) += 1;
        if *lock(&self.fail_listings) {
            return Err(StoreError::Transfer(format!(
                "listing {} refused",
                self.bucket
            )));
        }

        let start = match continuation {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::Transfer(format!("bad continuation token: {token}")))?,
            None => 0,
        };

        let objects = lock(&self.objects);
        let matching: Vec<ObjectSummary> = objects
            .iter()
            .filter(|(k, _)| prefix.is_none_or(|p| k.starts_with(p)))
            .map(|(k, body)| ObjectSummary {
                key: k.clone(),
                size: body.len() as u64,
            })
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let page = matching.get(start..end).unwrap_or_default().to_vec();
        let next_continuation = (end < matching.len()).then(|| end.to_string());

        Ok(ListPage {
            objects: page,
            next_continuation,
        })
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        if lock(&self.failing_gets).contains(key) {
            return Err(StoreError::Transfer(format!("get {key} refused")));
        }
        self.object(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put_object(&self, key: &str, body: Vec<u8>, _content_type: &str) -> Result<(), StoreError> {
        *lock(&self.put_requests) += 1;
        if lock(&self.failing_puts).contains(key) {
            return Err(StoreError::Transfer(format!("put {key} refused")));
        }
        self.insert(key, body);
        Ok(())
    }

    fn set_website_config(&self, index_document: &str) -> Result<(), StoreError> {
        *lock(&self.website_index) = Some(index_document.to_string());
        Ok(())
    }
}

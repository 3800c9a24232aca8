//! Shared test utilities for the album-site test suite.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let store = seeded_store(&["trip/a.jpg", "beach/c.jpg"]);
//! let staging = Staging::temporary().unwrap();
//! let report = SiteAssembler::new(&store, &staging, &test_options())
//!     .build_site()
//!     .unwrap();
//! ```

use crate::config::FailurePolicy;
use crate::site::SiteOptions;
use crate::store::{ListPage, MemoryStore, ObjectStore, StoreError};

// =========================================================================
// Stores
// =========================================================================

/// A `MemoryStore` for bucket `mybucket` holding `keys` in order.
///
/// Each object's body is its own key, so downloaded files can be traced back
/// to the key they came from.
pub fn seeded_store(keys: &[&str]) -> MemoryStore {
    let store = MemoryStore::new("mybucket");
    for key in keys {
        store.insert(key, key.as_bytes().to_vec());
    }
    store
}

/// Wraps a store and hides every key under `prefix` from prefixed listings.
///
/// Simulates an album deleted between album discovery and photo listing:
/// the album still shows up in the bucket-wide listing but has no photos.
pub struct HidingStore {
    pub inner: MemoryStore,
    prefix: String,
}

impl HidingStore {
    pub fn new(inner: MemoryStore, prefix: &str) -> Self {
        Self {
            inner,
            prefix: prefix.to_string(),
        }
    }
}

impl ObjectStore for HidingStore {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn list_page(
        &self,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        if prefix == Some(self.prefix.as_str()) {
            return Ok(ListPage::default());
        }
        self.inner.list_page(prefix, continuation)
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get_object(key)
    }

    fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.inner.put_object(key, body, content_type)
    }

    fn set_website_config(&self, index_document: &str) -> Result<(), StoreError> {
        self.inner.set_website_config(index_document)
    }
}

// =========================================================================
// Options
// =========================================================================

/// Skip policy, no deadline, `website.example.com`.
pub fn test_options() -> SiteOptions {
    SiteOptions {
        title: "Photo Albums".to_string(),
        website_domain: "website.example.com".to_string(),
        policy: FailurePolicy::Skip,
        deadline: None,
    }
}

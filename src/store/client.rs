//! The object store trait and its paginated listing iterator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("bucket does not exist: {0}")]
    NoSuchBucket(String),
    #[error("transfer failed: {0}")]
    Transfer(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry of a key listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
}

/// A single page of a listing, plus the token to fetch the next one.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectSummary>,
    /// `None` when this is the last page.
    pub next_continuation: Option<String>,
}

/// Operations the site pipeline needs from a bucket.
///
/// Implementations are bound to one bucket at construction time. All calls
/// block until the request completes; the pipeline is strictly sequential.
pub trait ObjectStore {
    /// Name of the bucket this store operates on.
    fn bucket(&self) -> &str;

    /// Fetch one page of keys, optionally restricted to `prefix`.
    fn list_page(
        &self,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Read a whole object.
    fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Write a whole object, replacing any existing object under `key`.
    fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError>;

    /// Configure static website hosting with the given index document.
    fn set_website_config(&self, index_document: &str) -> Result<(), StoreError>;
}

/// Iterate over every object under `prefix`, across all pages.
pub fn list_objects<'a, S>(store: &'a S, prefix: Option<&str>) -> ObjectListing<'a, S>
where
    S: ObjectStore + ?Sized,
{
    ObjectListing {
        store,
        prefix: prefix.map(str::to_string),
        buffer: Vec::new().into_iter(),
        continuation: None,
        done: false,
    }
}

/// Iterator returned by [`list_objects`].
///
/// Pages are fetched lazily. After an error the iterator is fused: it yields
/// the error once and then `None`.
pub struct ObjectListing<'a, S: ?Sized> {
    store: &'a S,
    prefix: Option<String>,
    buffer: std::vec::IntoIter<ObjectSummary>,
    continuation: Option<String>,
    done: bool,
}

impl<S: ObjectStore + ?Sized> Iterator for ObjectListing<'_, S> {
    type Item = Result<ObjectSummary, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(object) = self.buffer.next() {
                return Some(Ok(object));
            }
            if self.done {
                return None;
            }
            let page = match self
                .store
                .list_page(self.prefix.as_deref(), self.continuation.as_deref())
            {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            tracing::trace!(
                bucket = self.store.bucket(),
                objects = page.objects.len(),
                more = page.next_continuation.is_some(),
                "listed page"
            );
            self.continuation = page.next_continuation;
            self.done = self.continuation.is_none();
            self.buffer = page.objects.into_iter();
        }
    }
}

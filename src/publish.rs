//! Publishing files back into the bucket.
//!
//! Pages are uploaded at the bucket root under their file names, overwriting
//! whatever was there. A put replaces the whole object, so publishing the same
//! page twice leaves the bucket exactly as publishing it once.
//!
//! [`Publisher::enable_website`] is the last step of a build: it points the
//! bucket's website configuration at `index.html` and returns the public URL,
//! `https://<bucket>.<website-domain>`.

use crate::render;
use crate::store::{ObjectStore, StoreError};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Object name of the site index. Bucket website hosting serves it for `/`.
pub const INDEX_DOCUMENT: &str = "index.html";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload of {key} failed: {source}")]
    Upload { key: String, source: StoreError },
    #[error("enabling website hosting failed: {0}")]
    Website(StoreError),
}

/// Uploads files and configures website hosting for one bucket.
pub struct Publisher<'a, S: ?Sized> {
    store: &'a S,
    website_domain: String,
}

impl<'a, S: ObjectStore + ?Sized> Publisher<'a, S> {
    pub fn new(store: &'a S, website_domain: impl Into<String>) -> Self {
        Self {
            store,
            website_domain: website_domain.into(),
        }
    }

    /// Upload `local_path` as `remote_name`, replacing any existing object.
    pub fn publish_file(&self, local_path: &Path, remote_name: &str) -> Result<(), PublishError> {
        let body = fs::read(local_path)?;
        let size = body.len();
        self.store
            .put_object(remote_name, body, content_type(remote_name))
            .map_err(|source| PublishError::Upload {
                key: remote_name.to_string(),
                source,
            })?;
        tracing::info!(bucket = self.store.bucket(), key = remote_name, size, "published");
        Ok(())
    }

    /// Serve `index.html` as the bucket's default document and return the
    /// site URL.
    pub fn enable_website(&self) -> Result<String, PublishError> {
        self.store
            .set_website_config(INDEX_DOCUMENT)
            .map_err(PublishError::Website)?;
        let url = self.site_url();
        tracing::info!(url = %url, "website hosting enabled");
        Ok(url)
    }

    /// `https://<bucket>.<website-domain>`
    pub fn site_url(&self) -> String {
        format!("https://{}.{}", self.store.bucket(), self.website_domain)
    }

    /// Public URL of a page published at the bucket root.
    pub fn page_url(&self, page_name: &str) -> String {
        format!("{}/{}", self.site_url(), render::encode_path(page_name))
    }
}

/// Content type for an uploaded object, by extension.
pub fn content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

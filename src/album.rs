//! Album page building.
//!
//! For one album, downloads every photo into the staging directory and
//! renders the album's HTML page next to them:
//!
//! ```text
//! staging/
//! ├── trip-a.jpg       # trip/a.jpg, prefixed with the album name
//! ├── trip-b.jpeg      # trip/b.jpeg
//! ├── trip.html        # album page
//! ├── beach-c.jpg
//! └── beach.html
//! ```
//!
//! The album prefix keeps photos from different albums apart in the shared
//! flat directory. Nested keys (`trip/day1/a.jpg`) are flattened the same way
//! (`trip-day1-a.jpg`).

use crate::catalog::{CatalogError, photo_key};
use crate::publish::{INDEX_DOCUMENT, PublishError};
use crate::render;
use crate::site::{Deadline, SiteEvent};
use crate::store::{ObjectStore, StoreError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Why one album could not be published.
#[derive(Error, Debug)]
pub enum AlbumError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("staging directory unavailable: {0}")]
    StagingUnavailable(PathBuf),
    #[error("download of {key} failed: {source}")]
    Fetch { key: String, source: StoreError },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("album name {0:?} collides with the site index page")]
    ReservedName(String),
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Local file name of a downloaded photo: `<album>-<filename>`, flattened.
pub fn staged_photo_name(album: &str, filename: &str) -> String {
    format!("{album}-{}", filename.replace('/', "-"))
}

/// File name of an album's page, locally and in the bucket.
pub fn album_page_name(album: &str) -> String {
    format!("{album}.html")
}

/// Download one object to `dest`.
pub fn fetch_photo<S>(store: &S, key: &str, dest: &Path) -> Result<u64, AlbumError>
where
    S: ObjectStore + ?Sized,
{
    let body = store.get_object(key).map_err(|source| AlbumError::Fetch {
        key: key.to_string(),
        source,
    })?;
    let size = body.len() as u64;
    write_staged(dest, &body)?;
    Ok(size)
}

fn write_staged(path: &Path, contents: &[u8]) -> Result<(), AlbumError> {
    fs::write(path, contents).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            AlbumError::StagingUnavailable(path.parent().unwrap_or(path).to_path_buf())
        }
        _ => AlbumError::Io(e),
    })
}

/// Fetches an album's photos and renders its page into a staging directory.
pub struct AlbumPageBuilder<'a, S: ?Sized> {
    store: &'a S,
    staging: &'a Path,
    deadline: Deadline,
    events: Option<&'a Sender<SiteEvent>>,
}

impl<'a, S: ObjectStore + ?Sized> AlbumPageBuilder<'a, S> {
    pub fn new(store: &'a S, staging: &'a Path) -> Self {
        Self {
            store,
            staging,
            deadline: Deadline::none(),
            events: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_events(mut self, events: Option<&'a Sender<SiteEvent>>) -> Self {
        self.events = events;
        self
    }

    /// Download `photos` and write `<staging>/<album>.html`, returning its path.
    ///
    /// The staging directory must already exist; it is never created here.
    pub fn build(&self, album: &str, photos: &[String]) -> Result<PathBuf, AlbumError> {
        if album_page_name(album) == INDEX_DOCUMENT {
            return Err(AlbumError::ReservedName(album.to_string()));
        }
        if !self.staging.is_dir() {
            return Err(AlbumError::StagingUnavailable(self.staging.to_path_buf()));
        }

        for photo in photos {
            if self.deadline.expired() {
                return Err(AlbumError::DeadlineExceeded);
            }
            let key = photo_key(album, photo);
            let dest = self.staging.join(staged_photo_name(album, photo));
            let size = fetch_photo(self.store, &key, &dest)?;
            tracing::debug!(key = %key, size, dest = %dest.display(), "fetched photo");
            if let Some(tx) = self.events {
                tx.send(SiteEvent::PhotoFetched {
                    album: album.to_string(),
                    photo: photo.clone(),
                    size,
                })
                .ok();
            }
        }

        let page = render::render_album_page(album, photos);
        let page_path = self.staging.join(album_page_name(album));
        write_staged(&page_path, page.into_string().as_bytes())?;
        Ok(page_path)
    }
}

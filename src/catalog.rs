//! Album and photo discovery from object keys.
//!
//! The bucket has no album objects. An album is the first path segment of any
//! key that names a photo, so the inventory is derived fresh from a listing
//! every time:
//!
//! ```text
//! trip/a.jpg        → album "trip", photo "a.jpg"
//! trip/b.jpeg       → album "trip", photo "b.jpeg"
//! beach/c.JPG       → album "beach", photo "c.JPG"
//! beach/            → pseudo-directory, ignored
//! notes.txt         → no album
//! trip.html         → published page, no album
//! ```
//!
//! Both queries drain the paginated listing and report names in order of
//! first appearance, each name once.

use crate::store::{ObjectStore, StoreError, list_objects};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("album not found: {0}")]
    AlbumNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// An object key split into album and filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey<'a> {
    pub album: &'a str,
    pub filename: &'a str,
}

impl<'a> ObjectKey<'a> {
    /// Split `key` at its first `/`. Keys without one belong to no album.
    pub fn parse(key: &'a str) -> Option<Self> {
        let (album, filename) = key.split_once('/')?;
        if album.is_empty() {
            return None;
        }
        Some(Self { album, filename })
    }

    /// Keys ending in `/` stand for directories, not objects.
    pub fn is_pseudo_directory(&self) -> bool {
        self.filename.is_empty() || self.filename.ends_with('/')
    }

    pub fn is_photo(&self) -> bool {
        !self.is_pseudo_directory() && has_photo_extension(self.filename)
    }
}

/// Object key of `filename` inside `album`.
pub fn photo_key(album: &str, filename: &str) -> String {
    format!("{album}/{filename}")
}

/// Case-insensitive check for a `.jpg` / `.jpeg` extension.
pub fn has_photo_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| PHOTO_EXTENSIONS.contains(&ext.as_str()))
}

/// Insertion-ordered set of names.
#[derive(Default)]
struct OrderedNames {
    seen: HashSet<String>,
    names: Vec<String>,
}

impl OrderedNames {
    fn push(&mut self, name: &str) {
        if !self.seen.contains(name) {
            self.seen.insert(name.to_string());
            self.names.push(name.to_string());
        }
    }
}

/// Read-only view of the albums in a bucket.
pub struct Catalog<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> Catalog<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every album holding at least one photo, in first-appearance order.
    pub fn list_albums(&self) -> Result<Vec<String>, CatalogError> {
        let mut albums = OrderedNames::default();
        for object in list_objects(self.store, None) {
            let object = object?;
            if let Some(key) = ObjectKey::parse(&object.key)
                && key.is_photo()
            {
                albums.push(key.album);
            }
        }
        tracing::debug!(
            bucket = self.store.bucket(),
            albums = albums.names.len(),
            "listed albums"
        );
        Ok(albums.names)
    }

    /// Filenames stored under `<album>/`, in first-appearance order.
    ///
    /// Pseudo-directory keys are skipped. An album with nothing under it is
    /// reported as [`CatalogError::AlbumNotFound`].
    pub fn list_photos(&self, album: &str) -> Result<Vec<String>, CatalogError> {
        let prefix = photo_key(album, "");
        let mut photos = OrderedNames::default();
        for object in list_objects(self.store, Some(&prefix)) {
            let object = object?;
            let Some(filename) = object.key.strip_prefix(&prefix) else {
                continue;
            };
            if filename.is_empty() || filename.ends_with('/') {
                continue;
            }
            photos.push(filename);
        }

        if photos.names.is_empty() {
            return Err(CatalogError::AlbumNotFound(album.to_string()));
        }
        Ok(photos.names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::seeded_store;

    #[test]
    fn parse_splits_at_first_slash() {
        let key = ObjectKey::parse("trip/day1/a.jpg").unwrap();
        assert_eq!(key.album, "trip");
        assert_eq!(key.filename, "day1/a.jpg");
    }

    #[test]
    fn parse_rejects_root_keys() {
        assert!(ObjectKey::parse("index.html").is_none());
        assert!(ObjectKey::parse("/a.jpg").is_none());
    }

    #[test]
    fn pseudo_directories_are_not_photos() {
        assert!(ObjectKey::parse("trip/").unwrap().is_pseudo_directory());
        assert!(ObjectKey::parse("trip/day1/").unwrap().is_pseudo_directory());
        assert!(!ObjectKey::parse("trip/day1.jpg/").unwrap().is_photo());
    }

    #[test]
    fn photo_extensions_are_case_insensitive() {
        assert!(has_photo_extension("a.jpg"));
        assert!(has_photo_extension("b.JPEG"));
        assert!(!has_photo_extension("c.png"));
        assert!(!has_photo_extension("jpg"));
        assert!(!has_photo_extension("notes.txt"));
    }

    #[test]
    fn list_albums_in_first_appearance_order() {
        let store = seeded_store(&["trip/a.jpg", "trip/b.jpg", "beach/c.jpg"]);
        let albums = Catalog::new(&store).list_albums().unwrap();
        assert_eq!(albums, vec!["trip", "beach"]);
    }

    #[test]
    fn list_albums_ignores_non_photos() {
        let store = seeded_store(&[
            "index.html",
            "trip.html",
            "docs/readme.txt",
            "empty/",
            "trip/a.jpg",
            "root.jpg",
        ]);
        let albums = Catalog::new(&store).list_albums().unwrap();
        assert_eq!(albums, vec!["trip"]);
    }

    #[test]
    fn list_albums_has_no_duplicates_across_pages() {
        let store = seeded_store(&[
            "a/1.jpg", "b/1.jpg", "a/2.jpg", "c/1.jpeg", "b/2.jpg", "a/3.jpg",
        ])
        .with_page_size(2);
        let albums = Catalog::new(&store).list_albums().unwrap();
        assert_eq!(albums, vec!["a", "b", "c"]);
        assert_eq!(store.list_requests(), 3);
    }

    #[test]
    fn list_photos_strips_prefix_and_skips_directories() {
        let store = seeded_store(&["trip/", "trip/a.jpg", "trip/raw/", "trip/b.jpeg", "beach/c.jpg"]);
        let photos = Catalog::new(&store).list_photos("trip").unwrap();
        assert_eq!(photos, vec!["a.jpg", "b.jpeg"]);
    }

    #[test]
    fn list_photos_does_not_match_sibling_prefixes() {
        let store = seeded_store(&["trip/a.jpg", "trip2/b.jpg"]);
        let photos = Catalog::new(&store).list_photos("trip").unwrap();
        assert_eq!(photos, vec!["a.jpg"]);
    }

    #[test]
    fn list_photos_reads_every_page() {
        let keys: Vec<String> = (0..25).map(|i| format!("big/{i:03}.jpg")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let store = seeded_store(&refs).with_page_size(10);

        let photos = Catalog::new(&store).list_photos("big").unwrap();
        assert_eq!(photos.len(), 25);
        assert_eq!(photos.last().map(String::as_str), Some("024.jpg"));
    }

    #[test]
    fn list_photos_of_missing_album_is_not_found() {
        let store = seeded_store(&["trip/a.jpg"]);
        let err = Catalog::new(&store).list_photos("ghost").unwrap_err();
        assert!(matches!(err, CatalogError::AlbumNotFound(a) if a == "ghost"));
    }

    #[test]
    fn list_photos_of_directory_only_album_is_not_found() {
        let store = seeded_store(&["ghost/"]);
        let err = Catalog::new(&store).list_photos("ghost").unwrap_err();
        assert!(matches!(err, CatalogError::AlbumNotFound(_)));
    }

    #[test]
    fn store_failure_propagates() {
        let store = seeded_store(&["trip/a.jpg"]);
        store.fail_listings(true);
        let err = Catalog::new(&store).list_albums().unwrap_err();
        assert!(matches!(err, CatalogError::Store(StoreError::Transfer(_))));
    }
}

//! Site assembly and publication.
//!
//! Drives one complete build against a bucket:
//!
//! ```text
//! Enumerating      list albums (fatal on failure)
//! per album        list photos → fetch → render → publish <album>.html
//! IndexRendering   index.html linking every published album, in discovery order
//! IndexPublishing  upload index.html
//! WebsiteEnabling  set index document, return https://<bucket>.<domain>
//! ```
//!
//! Albums are processed strictly one after another: an album's photos are all
//! fetched and its page uploaded before the next album starts. Each album ends
//! in an explicit [`AlbumOutcome`]; the [`FailurePolicy`] decides whether a
//! failed album is skipped or ends the build.
//!
//! A [`Deadline`] bounds the whole run. It is checked before each album and
//! before each photo download, and once more before the index is published.
//! An expired deadline ends the build without publishing the index.

use crate::album::{AlbumError, AlbumPageBuilder, album_page_name};
use crate::catalog::{Catalog, CatalogError};
use crate::config::{self, FailurePolicy, SiteConfig};
use crate::publish::{INDEX_DOCUMENT, PublishError, Publisher};
use crate::render::{self, PageEntry};
use crate::staging::Staging;
use crate::store::ObjectStore;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("cannot enumerate albums: {0}")]
    Catalog(#[from] CatalogError),
    #[error("album {album} failed: {source}")]
    AlbumFailed { album: String, source: AlbumError },
    #[error("deadline exceeded before the site was published")]
    DeadlineExceeded,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Point in time after which a build stops starting new work.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(limit: Duration) -> Self {
        Self(Some(Instant::now() + limit))
    }

    pub fn from_limit(limit: Option<Duration>) -> Self {
        limit.map(Self::after).unwrap_or_default()
    }

    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// Progress notifications, sent as the build advances.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteEvent {
    AlbumsListed {
        albums: Vec<String>,
    },
    AlbumStarted {
        index: usize,
        album: String,
        photo_count: usize,
    },
    PhotoFetched {
        album: String,
        photo: String,
        size: u64,
    },
    AlbumPublished {
        index: usize,
        album: String,
        url: String,
    },
    AlbumFailed {
        index: usize,
        album: String,
        reason: String,
    },
    IndexPublished {
        url: String,
    },
    WebsiteEnabled {
        url: String,
    },
}

/// An album whose page made it into the bucket.
#[derive(Debug, Clone)]
pub struct PublishedAlbum {
    pub page_path: PathBuf,
    pub page_url: String,
    pub photo_count: usize,
}

/// How one album's fetch/render/publish went.
#[derive(Debug)]
pub struct AlbumOutcome {
    pub album: String,
    pub result: Result<PublishedAlbum, AlbumError>,
}

/// Rendered index plus the per-album outcomes that fed it.
#[derive(Debug)]
pub struct SiteAssembly {
    pub index_path: PathBuf,
    pub albums: Vec<AlbumOutcome>,
}

/// Result of a complete build.
#[derive(Debug)]
pub struct SiteReport {
    pub url: String,
    pub albums: Vec<AlbumOutcome>,
}

impl SiteReport {
    pub fn published(&self) -> impl Iterator<Item = (&str, &PublishedAlbum)> {
        self.albums
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|p| (o.album.as_str(), p)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &AlbumError)> {
        self.albums
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.album.as_str(), e)))
    }

    /// Serializable view, written by `build --report`.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            url: self.url.clone(),
            published: self
                .published()
                .map(|(album, p)| PublishedEntry {
                    album: album.to_string(),
                    url: p.page_url.clone(),
                    photos: p.photo_count,
                })
                .collect(),
            failed: self
                .failed()
                .map(|(album, e)| FailedEntry {
                    album: album.to_string(),
                    reason: e.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub url: String,
    pub published: Vec<PublishedEntry>,
    pub failed: Vec<FailedEntry>,
}

#[derive(Debug, Serialize)]
pub struct PublishedEntry {
    pub album: String,
    pub url: String,
    pub photos: usize,
}

#[derive(Debug, Serialize)]
pub struct FailedEntry {
    pub album: String,
    pub reason: String,
}

/// Settings for one build, resolved from [`SiteConfig`].
#[derive(Debug, Clone)]
pub struct SiteOptions {
    /// Title and heading of the index page.
    pub title: String,
    pub website_domain: String,
    pub policy: FailurePolicy,
    pub deadline: Option<Duration>,
}

impl SiteOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.website.title.clone(),
            website_domain: config::website_domain(config),
            policy: config.pipeline.on_album_error,
            deadline: config.pipeline.deadline(),
        }
    }
}

/// Builds and publishes the site for one bucket.
///
/// Works inside a [`Staging`] area, which is exclusive to one build for as
/// long as the assembler borrows it.
pub struct SiteAssembler<'a, S: ?Sized> {
    store: &'a S,
    staging: &'a Staging,
    options: &'a SiteOptions,
    events: Option<&'a Sender<SiteEvent>>,
}

impl<'a, S: ObjectStore + ?Sized> SiteAssembler<'a, S> {
    pub fn new(store: &'a S, staging: &'a Staging, options: &'a SiteOptions) -> Self {
        Self {
            store,
            staging,
            options,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Option<&'a Sender<SiteEvent>>) -> Self {
        self.events = events;
        self
    }

    fn emit(&self, event: SiteEvent) {
        if let Some(tx) = self.events {
            // A gone receiver only means nobody is watching.
            tx.send(event).ok();
        }
    }

    fn publisher(&self) -> Publisher<'a, S> {
        Publisher::new(self.store, self.options.website_domain.clone())
    }

    /// Publish every album page and render the index locally.
    ///
    /// Returns the path of the rendered `index.html`; it is not uploaded.
    pub fn assemble_site(&self) -> Result<SiteAssembly, SiteError> {
        self.assemble(Deadline::from_limit(self.options.deadline))
    }

    /// Run the full build: album pages, index, website hosting.
    ///
    /// The returned URL is produced once the index is published, whether or
    /// not every album succeeded.
    pub fn build_site(&self) -> Result<SiteReport, SiteError> {
        let deadline = Deadline::from_limit(self.options.deadline);
        let assembly = self.assemble(deadline)?;

        if deadline.expired() {
            return Err(SiteError::DeadlineExceeded);
        }
        let publisher = self.publisher();
        publisher.publish_file(&assembly.index_path, INDEX_DOCUMENT)?;
        self.emit(SiteEvent::IndexPublished {
            url: publisher.page_url(INDEX_DOCUMENT),
        });

        let url = publisher.enable_website()?;
        self.emit(SiteEvent::WebsiteEnabled { url: url.clone() });

        Ok(SiteReport {
            url,
            albums: assembly.albums,
        })
    }

    fn assemble(&self, deadline: Deadline) -> Result<SiteAssembly, SiteError> {
        let catalog = Catalog::new(self.store);
        let publisher = self.publisher();
        let builder = AlbumPageBuilder::new(self.store, self.staging.path())
            .with_deadline(deadline)
            .with_events(self.events);

        let albums = catalog.list_albums()?;
        info!(bucket = self.store.bucket(), count = albums.len(), "albums discovered");
        self.emit(SiteEvent::AlbumsListed {
            albums: albums.clone(),
        });

        let mut outcomes = Vec::with_capacity(albums.len());
        let mut links = Vec::with_capacity(albums.len());

        for (index, album) in albums.into_iter().enumerate() {
            if deadline.expired() {
                return Err(SiteError::DeadlineExceeded);
            }

            match self.publish_album(&catalog, &builder, &publisher, index, &album) {
                Ok(published) => {
                    links.push(PageEntry::linked(album.as_str(), published.page_url.as_str()));
                    self.emit(SiteEvent::AlbumPublished {
                        index,
                        album: album.clone(),
                        url: published.page_url.clone(),
                    });
                    outcomes.push(AlbumOutcome {
                        album,
                        result: Ok(published),
                    });
                }
                Err(AlbumError::DeadlineExceeded) => return Err(SiteError::DeadlineExceeded),
                Err(err) => {
                    warn!(album = %album, error = %err, "album failed");
                    self.emit(SiteEvent::AlbumFailed {
                        index,
                        album: album.clone(),
                        reason: err.to_string(),
                    });
                    if self.options.policy == FailurePolicy::Abort {
                        return Err(SiteError::AlbumFailed { album, source: err });
                    }
                    outcomes.push(AlbumOutcome {
                        album,
                        result: Err(err),
                    });
                }
            }
        }

        let index = render::render_index(&self.options.title, &links);
        let index_path = self.staging.path().join(INDEX_DOCUMENT);
        fs::write(&index_path, index.into_string())?;

        Ok(SiteAssembly {
            index_path,
            albums: outcomes,
        })
    }

    fn publish_album(
        &self,
        catalog: &Catalog<'_, S>,
        builder: &AlbumPageBuilder<'_, S>,
        publisher: &Publisher<'_, S>,
        index: usize,
        album: &str,
    ) -> Result<PublishedAlbum, AlbumError> {
        let photos = catalog.list_photos(album)?;
        self.emit(SiteEvent::AlbumStarted {
            index,
            album: album.to_string(),
            photo_count: photos.len(),
        });

        let page_path = builder.build(album, &photos)?;
        let page_name = album_page_name(album);
        publisher.publish_file(&page_path, &page_name)?;

        Ok(PublishedAlbum {
            page_path,
            page_url: publisher.page_url(&page_name),
            photo_count: photos.len(),
        })
    }
}

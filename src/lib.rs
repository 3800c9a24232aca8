//! # Album Site
//!
//! Publishes photo albums kept in an object-store bucket as a static website
//! served from that same bucket. The bucket is the data source: key prefixes
//! become albums, `.jpg`/`.jpeg` objects under a prefix are that album's photos.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Catalog   bucket keys  →  album names, photo names per album
//! 2. Album     photos       →  staging/<album>-<photo>, staging/<album>.html
//! 3. Site      album pages  →  bucket/<album>.html, bucket/index.html, website on
//! ```
//!
//! Each stage talks to the bucket only through the [`store::ObjectStore`] trait,
//! so the whole pipeline runs in tests against [`store::MemoryStore`] with no
//! network and no credentials.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | `ObjectStore` trait, lazy paginated listing, S3 backend, in-memory backend |
//! | [`catalog`] | Derives album names and per-album photo lists from bucket keys |
//! | [`render`] | Maud templates for album pages and the index |
//! | [`album`] | Stage 2: fetches an album's photos into staging and writes its page |
//! | [`publish`] | Uploads staged files, enables website hosting, builds public URLs |
//! | [`site`] | Stage 3: orchestrates every album, the index, and website enablement |
//! | [`staging`] | Per-run staging directory (locked or temporary) |
//! | [`config`] | `album-site.toml` loading, stock defaults, validation |
//! | [`output`] | CLI output formatting for listings, progress events, and reports |
//!
//! # Design Decisions
//!
//! ## One Failed Album Is Not a Failed Site
//!
//! Album failures are recorded in the [`site::SiteReport`] and the run goes on
//! with the remaining albums (`pipeline.on_album_error = "skip"`). Failures
//! that make every album impossible (bucket unreachable, staging unwritable,
//! deadline passed) abort the run. `"abort"` makes any album failure fatal.
//!
//! ## Blocking Facade Over the Async SDK
//!
//! The S3 backend owns a current-thread tokio runtime and blocks on each SDK
//! call. The pipeline itself is plain synchronous code, which keeps the trait
//! object-safe and the in-memory test backend trivial.
//!
//! ## Isolated Staging
//!
//! Staged files are named `<album>-<photo>`, so two runs sharing a directory
//! would clobber each other. A run either gets a fresh temporary directory or
//! takes a lock file in the configured one.

pub mod album;
pub mod catalog;
pub mod config;
pub mod output;
pub mod publish;
pub mod render;
pub mod site;
pub mod staging;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

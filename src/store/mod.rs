//! Object store access.
//!
//! The pipeline talks to the bucket through the [`ObjectStore`] trait, which
//! exposes exactly the four operations site generation needs: a single page
//! of a key listing, whole-object get and put, and the bucket's website
//! configuration. Everything about wire protocol and credentials stays inside
//! the implementation.
//!
//! | Implementation | Use |
//! |----------------|-----|
//! | [`S3Store`] | Any S3-compatible endpoint via `aws-sdk-s3` |
//! | [`MemoryStore`] | In-process bucket for tests and dry runs |
//!
//! Listings are paginated. Callers never call [`ObjectStore::list_page`] in a
//! loop themselves; they go through [`list_objects`], which follows
//! continuation tokens until the store reports no more pages.

mod client;
mod memory;
mod s3;

pub use client::{ListPage, ObjectListing, ObjectStore, ObjectSummary, StoreError, list_objects};
pub use memory::MemoryStore;
pub use s3::S3Store;

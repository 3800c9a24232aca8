//! End-to-end builds against the in-memory backend through the public API.

use album_site::album::fetch_photo;
use album_site::catalog::Catalog;
use album_site::config::FailurePolicy;
use album_site::publish::Publisher;
use album_site::site::{SiteAssembler, SiteError, SiteOptions};
use album_site::staging::Staging;
use album_site::store::{MemoryStore, ObjectStore};

fn options(policy: FailurePolicy) -> SiteOptions {
    SiteOptions {
        title: "Photo Albums".to_string(),
        website_domain: "website.example.com".to_string(),
        policy,
        deadline: None,
    }
}

fn bucket(keys: &[&str]) -> MemoryStore {
    let store = MemoryStore::new("mybucket").with_page_size(2);
    for key in keys {
        store.insert(key, format!("jpeg:{key}").into_bytes());
    }
    store
}

fn page(store: &MemoryStore, key: &str) -> String {
    String::from_utf8(store.object(key).expect("page uploaded")).unwrap()
}

#[test]
fn publishes_albums_across_listing_pages() {
    let store = bucket(&[
        "trip/a.jpg",
        "trip/b.JPEG",
        "beach/c.jpg",
        "beach/",
        "notes.txt",
        "city/d.jpg",
    ]);
    let staging = Staging::temporary().unwrap();
    let opts = options(FailurePolicy::Skip);

    let report = SiteAssembler::new(&store, &staging, &opts)
        .build_site()
        .unwrap();

    assert_eq!(report.url, "https://mybucket.website.example.com");
    let published: Vec<&str> = report.published().map(|(album, _)| album).collect();
    assert_eq!(published, vec!["trip", "beach", "city"]);
    assert_eq!(report.failed().count(), 0);

    let trip = page(&store, "trip.html");
    assert!(trip.contains(r#"href="trip/a.jpg""#));
    assert!(trip.contains(r#"href="trip/b.JPEG""#));

    let index = page(&store, "index.html");
    let trip_at = index.find("trip.html").unwrap();
    let beach_at = index.find("beach.html").unwrap();
    let city_at = index.find("city.html").unwrap();
    assert!(trip_at < beach_at && beach_at < city_at);

    assert_eq!(store.website_index().as_deref(), Some("index.html"));
    assert!(staging.path().join("trip-a.jpg").is_file());
}

#[test]
fn failed_photo_skips_only_its_album() {
    let store = bucket(&["trip/a.jpg", "beach/c.jpg"]);
    store.fail_get("trip/a.jpg");
    let staging = Staging::temporary().unwrap();
    let opts = options(FailurePolicy::Skip);

    let report = SiteAssembler::new(&store, &staging, &opts)
        .build_site()
        .unwrap();

    let failed: Vec<&str> = report.failed().map(|(album, _)| album).collect();
    assert_eq!(failed, vec!["trip"]);
    assert!(store.object("trip.html").is_none());

    let index = page(&store, "index.html");
    assert!(index.contains("beach.html"));
    assert!(!index.contains("trip.html"));
}

#[test]
fn abort_policy_stops_at_first_failed_album() {
    let store = bucket(&["trip/a.jpg", "beach/c.jpg"]);
    store.fail_get("trip/a.jpg");
    let staging = Staging::temporary().unwrap();
    let opts = options(FailurePolicy::Abort);

    let err = SiteAssembler::new(&store, &staging, &opts)
        .build_site()
        .unwrap_err();

    assert!(matches!(err, SiteError::AlbumFailed { ref album, .. } if album == "trip"));
    assert!(store.object("beach.html").is_none());
    assert!(store.object("index.html").is_none());
    assert!(store.website_index().is_none());
}

#[test]
fn unreachable_bucket_publishes_nothing() {
    let store = bucket(&["trip/a.jpg"]);
    store.fail_listings(true);
    let staging = Staging::temporary().unwrap();
    let opts = options(FailurePolicy::Skip);

    let err = SiteAssembler::new(&store, &staging, &opts)
        .build_site()
        .unwrap_err();

    assert!(matches!(err, SiteError::Catalog(_)));
    assert_eq!(store.put_requests(), 0);
}

#[test]
fn rebuild_overwrites_pages_in_place() {
    let store = bucket(&["trip/a.jpg"]);
    let opts = options(FailurePolicy::Skip);

    for _ in 0..2 {
        let staging = Staging::temporary().unwrap();
        SiteAssembler::new(&store, &staging, &opts)
            .build_site()
            .unwrap();
    }

    let pages: Vec<String> = store
        .keys()
        .into_iter()
        .filter(|k| k.ends_with(".html"))
        .collect();
    assert_eq!(pages, vec!["trip.html", "index.html"]);
    assert_eq!(store.bucket(), "mybucket");
}

const TRIP_PHOTOS: [(&str, &[u8]); 2] = [("a.jpg", b"first photo"), ("b.jpeg", b"second photo")];

#[test]
fn published_photos_download_with_their_names_and_bytes() {
    let store = MemoryStore::new("mybucket");
    let publisher = Publisher::new(&store, "website.example.com");
    let local = tempfile::TempDir::new().unwrap();
    for (name, bytes) in TRIP_PHOTOS {
        let path = local.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        publisher.publish_file(&path, &format!("trip/{name}")).unwrap();
    }

    let staging = Staging::temporary().unwrap();
    let opts = options(FailurePolicy::Skip);
    SiteAssembler::new(&store, &staging, &opts)
        .build_site()
        .unwrap();
    assert!(store.object("trip.html").is_some());

    let photos = Catalog::new(&store).list_photos("trip").unwrap();
    assert_eq!(photos, vec!["a.jpg", "b.jpeg"]);

    let downloads = tempfile::TempDir::new().unwrap();
    for (name, bytes) in TRIP_PHOTOS {
        let dest = downloads.path().join(name);
        let size = fetch_photo(&store, &format!("trip/{name}"), &dest).unwrap();
        assert_eq!(size, bytes.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), bytes);
    }
}

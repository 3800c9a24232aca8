//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (album, photo, page) leads with its positional index and name.
//! Object keys and URLs follow as secondary context, after `→` or on indented
//! lines, so the output reads as an inventory of the bucket.
//!
//! # Output Format
//!
//! ## Albums
//!
//! ```text
//! Albums
//! 001 trip
//! 002 beach
//! ```
//!
//! ## Build
//!
//! ```text
//! 2 albums
//! 001 trip (2 photos)
//!     a.jpg (1.2 MB)
//!     b.jpg (840.0 KB)
//!     → https://mybucket.website.example.com/trip.html
//! 002 ghost
//!     FAILED: album not found: ghost
//! Index → https://mybucket.website.example.com/index.html
//! Site → https://mybucket.website.example.com
//!
//! Published 1 album, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function returning `Vec<String>` for
//! testability and, where the CLI needs it, a `print_*` wrapper that writes to
//! stdout. Format functions are pure.

use crate::site::{SiteEvent, SiteReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count.
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Albums in discovery order.
pub fn format_albums(albums: &[String]) -> Vec<String> {
    let mut lines = vec!["Albums".to_string()];
    lines.extend(
        albums
            .iter()
            .enumerate()
            .map(|(i, album)| format!("{} {}", format_index(i + 1), album)),
    );
    if albums.is_empty() {
        lines.push("    (none)".to_string());
    }
    lines
}

/// Photos of one album in discovery order.
pub fn format_photos(album: &str, photos: &[String]) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", album, plural(photos.len(), "photo"))];
    lines.extend(
        photos
            .iter()
            .enumerate()
            .map(|(i, photo)| format!("    {} {}", format_index(i + 1), photo)),
    );
    lines
}

pub fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_site_event(event: &SiteEvent) -> Vec<String> {
    match event {
        SiteEvent::AlbumsListed { albums } => vec![plural(albums.len(), "album")],
        SiteEvent::AlbumStarted {
            index,
            album,
            photo_count,
        } => vec![format!(
            "{} {} ({})",
            format_index(index + 1),
            album,
            plural(*photo_count, "photo")
        )],
        SiteEvent::PhotoFetched { photo, size, .. } => {
            vec![format!("    {} ({})", photo, format_size(*size))]
        }
        SiteEvent::AlbumPublished { url, .. } => vec![format!("    \u{2192} {}", url)],
        SiteEvent::AlbumFailed {
            index,
            album,
            reason,
        } => vec![
            format!("{} {}", format_index(index + 1), album),
            format!("    FAILED: {}", reason),
        ],
        SiteEvent::IndexPublished { url } => vec![format!("Index \u{2192} {}", url)],
        SiteEvent::WebsiteEnabled { url } => vec![format!("Site \u{2192} {}", url)],
    }
}

/// Closing summary of a build.
pub fn format_site_report(report: &SiteReport) -> Vec<String> {
    let published = report.published().count();
    let failed: Vec<_> = report.failed().collect();

    let mut lines = vec![String::new()];
    if failed.is_empty() {
        lines.push(format!("Published {}", plural(published, "album")));
    } else {
        lines.push(format!(
            "Published {}, {} failed",
            plural(published, "album"),
            failed.len()
        ));
        for (album, err) in failed {
            lines.push(format!("    {}: {}", album, err));
        }
    }
    lines.push(report.url.clone());
    lines
}

// ============================================================================
// Tests
// ============================================================================

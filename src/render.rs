//! HTML rendering.
//!
//! Every page the site publishes has the same shape: a title, a heading, and an
//! ordered list of named entries that may link somewhere. Album pages list
//! photos; the index lists albums. Both go through [`render_page`].
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating, so
//! album and photo names are escaped on interpolation. Names that end up in
//! an `href` are additionally percent-encoded per path segment, since object
//! keys may contain `#`, `?`, `%` or spaces.

use maud::{DOCTYPE, Markup, html};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Bytes that cannot appear literally in one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Inline stylesheet shared by all pages. Pages are served straight from the
/// bucket, so there is no separate asset to keep in sync.
const CSS: &str = "\
body{font-family:system-ui,sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem;line-height:1.5}\
h1{font-weight:600}\
ol{padding-left:1.5rem}\
li{margin:.25rem 0}\
a{color:inherit}";

/// One line of a rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub name: String,
    pub link: Option<String>,
}

impl PageEntry {
    pub fn linked(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: Some(link.into()),
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: None,
        }
    }
}

/// Render a complete HTML document: `<title>`, `<h1>`, and an ordered list.
pub fn render_page(title: &str, heading: &str, entries: &[PageEntry]) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                h1 { (heading) }
                ol {
                    @for entry in entries {
                        li {
                            @match &entry.link {
                                Some(link) => {
                                    a href=(link) { (entry.name) }
                                }
                                None => {
                                    (entry.name)
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Album page: one entry per photo, linking to the photo's own object key.
///
/// The page is published at the bucket root as `<album>.html`, so the relative
/// link `<album>/<filename>` resolves to the original photo.
pub fn render_album_page(album: &str, photos: &[String]) -> Markup {
    let entries: Vec<PageEntry> = photos
        .iter()
        .map(|photo| PageEntry::linked(photo.as_str(), photo_link(album, photo)))
        .collect();
    render_page(album, album, &entries)
}

/// Site index: one linked entry per published album, in the given order.
pub fn render_index(title: &str, albums: &[PageEntry]) -> Markup {
    render_page(title, title, albums)
}

/// Relative URL of a photo from the bucket root.
pub fn photo_link(album: &str, photo: &str) -> String {
    encode_path(&format!("{album}/{photo}"))
}

/// Percent-encode each `/`-separated segment of `path`, keeping the slashes.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_includes_doctype_and_title() {
        let doc = render_page("Trip", "Trip", &[]).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Trip</title>"));
        assert!(doc.contains("<h1>Trip</h1>"));
    }

    #[test]
    fn entries_keep_order() {
        let entries = vec![PageEntry::plain("first"), PageEntry::plain("second")];
        let doc = render_page("t", "t", &entries).into_string();
        let first = doc.find("first").unwrap();
        let second = doc.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn linked_and_plain_entries() {
        let entries = vec![
            PageEntry::linked("trip", "https://b.example.com/trip.html"),
            PageEntry::plain("beach"),
        ];
        let doc = render_page("t", "t", &entries).into_string();
        assert!(doc.contains(r#"<a href="https://b.example.com/trip.html">trip</a>"#));
        assert!(doc.contains("<li>beach</li>"));
    }

    #[test]
    fn album_page_references_each_photo() {
        let photos = vec!["a.jpg".to_string(), "b.jpeg".to_string()];
        let doc = render_album_page("trip", &photos).into_string();
        assert!(doc.contains(r#"href="trip/a.jpg""#));
        assert!(doc.contains(r#"href="trip/b.jpeg""#));
        assert!(doc.contains(">a.jpg</a>"));
        assert!(doc.contains(">b.jpeg</a>"));
        assert_eq!(doc.matches("<li>").count(), 2);
    }

    #[test]
    fn links_are_percent_encoded_but_names_are_not() {
        let photos = vec!["pic?2.jpg".to_string(), "a b.jpg".to_string()];
        let doc = render_album_page("summer #1", &photos).into_string();
        assert!(doc.contains(r#"href="summer%20%231/pic%3F2.jpg""#));
        assert!(doc.contains(r#"href="summer%20%231/a%20b.jpg""#));
        assert!(doc.contains(">pic?2.jpg</a>"));
        assert!(doc.contains("<h1>summer #1</h1>"));
    }

    #[test]
    fn encode_path_keeps_separators() {
        assert_eq!(encode_path("50%/day 1/a.jpg"), "50%25/day%201/a.jpg");
        assert_eq!(encode_path("trip.html"), "trip.html");
        assert_eq!(encode_path("caf\u{e9}.html"), "caf%C3%A9.html");
    }

    #[test]
    fn index_uses_title_as_heading() {
        let doc = render_index("Photo Albums", &[]).into_string();
        assert!(doc.contains("<title>Photo Albums</title>"));
        assert!(doc.contains("<h1>Photo Albums</h1>"));
        assert!(doc.contains("<ol></ol>"));
    }

    #[test]
    fn names_are_escaped() {
        let photos = vec!["<script>alert('x')</script>.jpg".to_string()];
        let doc = render_album_page("a&b", &photos).into_string();
        assert!(!doc.contains("<script>alert"));
        assert!(doc.contains("&lt;script&gt;"));
        assert!(doc.contains("<h1>a&amp;b</h1>"));
    }
}

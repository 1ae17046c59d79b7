//! Source text segmenter.
//!
//! The transcribed text interleaves citation markers with passage bodies:
//!
//! ```text
//! I.1.1
//! At the same time that Antiochus, who was called Epiphanes,
//! had a quarrel with the sixth Ptolemy ...
//!
//! I.1.2
//! Now Antiochus was not satisfied ...
//! ```
//!
//! A marker is a line holding nothing but `TOKEN.N.N`, where the token is
//! uppercase letters or digits (`P` for the preface, `I`–`VII` for books).

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use parallels_shared::{CitationKey, TextIndex};

/// Matches a citation marker occupying a whole line.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[A-Z0-9]+\.[0-9]+\.[0-9]+[ \t]*$").expect("marker regex")
});

/// Split a document into citation key → passage text.
///
/// Text before the first marker is discarded. Each passage runs until the
/// next marker (or end of document), is trimmed, and has every newline
/// replaced with a single space.
#[instrument(skip_all, fields(bytes = content.len()))]
pub fn segment(content: &str) -> TextIndex {
    let normalized = content.replace("\r\n", "\n");
    let markers: Vec<_> = MARKER_RE.find_iter(&normalized).collect();

    if let Some(first) = markers.first() {
        if first.start() > 0 {
            debug!(preamble_bytes = first.start(), "discarding text before first marker");
        }
    }

    let mut index = TextIndex::new();
    for (i, marker) in markers.iter().enumerate() {
        let body_end = markers
            .get(i + 1)
            .map_or(normalized.len(), |next| next.start());
        let text = normalized[marker.end()..body_end].trim().replace('\n', " ");
        let key = CitationKey::from_marker(marker.as_str());

        if index.insert(key.clone(), text).is_some() {
            debug!(%key, "duplicate marker, keeping later passage");
        }
    }

    debug!(markers = markers.len(), passages = index.len(), "source text segmented");
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_markers_and_joins_lines() {
        let index = segment("\nI.1.1\nHello\nworld\n\nI.1.2\nFoo\n");
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("I.1.1"), Some("Hello world"));
        assert_eq!(index.get("I.1.2"), Some("Foo"));
    }

    #[test]
    fn discards_preamble() {
        let index = segment("THE WARS OF THE JEWS\nBook One\n\nP.1.1\nWhereas the war\n");
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("P.1.1"), Some("Whereas the war"));
    }

    #[test]
    fn marker_on_first_and_last_line() {
        let index = segment("I.1.1\nfirst\nVII.11.5");
        assert_eq!(index.get("I.1.1"), Some("first"));
        assert_eq!(index.get("VII.11.5"), Some(""));
    }

    #[test]
    fn each_newline_becomes_one_space() {
        let index = segment("\nII.1.1\nalpha\n\nbeta\n");
        assert_eq!(index.get("II.1.1"), Some("alpha  beta"));
    }

    #[test]
    fn ignores_markers_inside_prose() {
        let index = segment("\nI.1.1\nsee I.1.2 for more\n  I.1.2  \nnext\n");
        assert_eq!(index.get("I.1.1"), Some("see I.1.2 for more"));
        assert_eq!(index.get("I.1.2"), Some("next"));
    }

    #[test]
    fn rejects_lowercase_and_short_markers() {
        let index = segment("\ni.1.1\nlower\nI.1\nshort\n");
        assert!(index.is_empty());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let index = segment("\r\nI.1.1\r\nHello\r\nworld\r\n");
        assert_eq!(index.get("I.1.1"), Some("Hello world"));
    }

    #[test]
    fn later_duplicate_wins() {
        let index = segment("\nI.1.1\nold\nI.1.1\nnew\n");
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("I.1.1"), Some("new"));
    }

    #[test]
    fn no_markers_yields_empty_index() {
        assert!(segment("just some text\nwith no markers\n").is_empty());
        assert!(segment("").is_empty());
    }

    #[test]
    fn segments_fixture() {
        let content = std::fs::read_to_string("../../../fixtures/josephus.txt")
            .expect("read fixture");
        let index = segment(&content);

        assert_eq!(index.len(), 5);
        assert!(index.get("P.1.1").unwrap().starts_with("Whereas the war"));
        assert!(index.get("I.1.1").unwrap().starts_with("At the same time"));
        assert!(index.get("II.8.1").unwrap().contains("Coponius"));
        assert!(!index.get("VI.5.3").unwrap().contains('\n'));
        assert!(index.get("III.2.1").is_none());
    }
}

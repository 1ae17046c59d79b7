//! Joins the relation table against the text index.
//!
//! Each relation entry is re-keyed from its table form (`Wars 2.8.1`) to a
//! citation key (`II.8.1`) and resolved to passage text. Entries that cannot
//! be re-keyed are skipped individually; a key with no passage still yields
//! a record carrying [`NOT_FOUND_TEXT`].

use tracing::{debug, instrument, warn};

use parallels_shared::{
    BookNumeral, CitationKey, ParallelMap, ParallelRecord, RelationEntry, RelationTable,
    SourceWork, TextIndex, VerseRef,
};

/// Text used when a well-formed reference has no passage in the index.
pub const NOT_FOUND_TEXT: &str = "Text for this reference was not found.";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a relation entry produced no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceSkip {
    /// Only the Wars text is loaded; other works have nothing to resolve against.
    #[error("{0} references are not resolved")]
    UnresolvedSource(SourceWork),

    #[error("location '{0}' is not BOOK.CHAPTER.PARAGRAPH")]
    MalformedLocation(String),

    #[error("book '{0}' is neither a number nor a numeral")]
    MalformedBook(String),

    #[error("book {0} is outside I-VII")]
    UnmappedBook(u32),
}

/// Result of resolving one relation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A record was appended; `found` is false when the sentinel text was used.
    Emitted { found: bool },
    Skipped(ReferenceSkip),
}

/// A relation entry that produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedReference {
    pub verse: VerseRef,
    pub reference: String,
    pub reason: ReferenceSkip,
}

/// Per-entry accounting for one join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinReport {
    /// Records written to the output.
    pub emitted: usize,
    /// Emitted records that carry [`NOT_FOUND_TEXT`].
    pub not_found: usize,
    pub skipped: Vec<SkippedReference>,
}

impl JoinReport {
    /// Number of entries skipped because their source work is not resolved.
    pub fn unresolved(&self, source: SourceWork) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason == ReferenceSkip::UnresolvedSource(source))
            .count()
    }
}

/// Output of [`join`].
#[derive(Debug, Clone, Default)]
pub struct Joined {
    pub parallels: ParallelMap,
    pub report: JoinReport,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Re-key a relation entry as a citation key in the Wars text.
///
/// The book component may be an Arabic number (`2`) or already a numeral
/// (`II`); chapter and paragraph are copied verbatim.
pub fn citation_key(entry: &RelationEntry) -> Result<CitationKey, ReferenceSkip> {
    if entry.source != SourceWork::Wars {
        return Err(ReferenceSkip::UnresolvedSource(entry.source));
    }

    let parts: Vec<&str> = entry.location.split('.').collect();
    let [book, chapter, paragraph] = parts.as_slice() else {
        return Err(ReferenceSkip::MalformedLocation(entry.location.clone()));
    };

    let numeral = match book.parse::<u32>() {
        Ok(n) => BookNumeral::from_number(n).ok_or(ReferenceSkip::UnmappedBook(n))?,
        Err(_) => BookNumeral::from_roman(book)
            .ok_or_else(|| ReferenceSkip::MalformedBook((*book).to_string()))?,
    };

    Ok(CitationKey::new(numeral, chapter, paragraph))
}

/// Resolve one entry to a record. The `bool` is false when the passage was
/// missing and [`NOT_FOUND_TEXT`] was substituted.
pub fn resolve(
    entry: &RelationEntry,
    index: &TextIndex,
) -> Result<(ParallelRecord, bool), ReferenceSkip> {
    let key = citation_key(entry)?;
    let (text, found) = match index.get(key.as_str()) {
        Some(text) => (text.to_string(), true),
        None => (NOT_FOUND_TEXT.to_string(), false),
    };

    Ok((
        ParallelRecord {
            reference: entry.reference(),
            text,
        },
        found,
    ))
}

/// Resolve every entry of `table`, in table order.
///
/// Chapters and verses appear in the output only once a record has been
/// emitted for them, so a verse whose entries were all skipped is absent.
#[instrument(skip_all, fields(entries = table.len(), passages = index.len()))]
pub fn join(index: &TextIndex, table: &RelationTable) -> Joined {
    let mut joined = Joined::default();

    if index.is_empty() || table.is_empty() {
        warn!(
            passages = index.len(),
            entries = table.len(),
            "nothing to join, output will be empty"
        );
        return joined;
    }

    for (chapter, verse, entry) in table.iter() {
        let outcome = match resolve(entry, index) {
            Ok((record, found)) => {
                joined.parallels.push(chapter, verse, record);
                JoinOutcome::Emitted { found }
            }
            Err(reason) => JoinOutcome::Skipped(reason),
        };

        match outcome {
            JoinOutcome::Emitted { found } => {
                joined.report.emitted += 1;
                if !found {
                    debug!(chapter, verse, reference = %entry, "no passage for reference");
                    joined.report.not_found += 1;
                }
            }
            JoinOutcome::Skipped(reason) => {
                debug!(chapter, verse, reference = %entry, %reason, "skipping reference");
                joined.report.skipped.push(SkippedReference {
                    verse: VerseRef { chapter, verse },
                    reference: entry.reference(),
                    reason,
                });
            }
        }
    }

    let antiquities = joined.report.unresolved(SourceWork::Antiquities);
    if antiquities > 0 {
        warn!(
            count = antiquities,
            "Antiquities references have no source text and were left out"
        );
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wars(location: &str) -> RelationEntry {
        RelationEntry::new(SourceWork::Wars, location)
    }

    fn index(entries: &[(&str, &str)]) -> TextIndex {
        entries
            .iter()
            .map(|(k, v)| (CitationKey::from_marker(k), (*v).to_string()))
            .collect()
    }

    #[test]
    fn end_to_end_scenario() {
        let index = index(&[("I.2.3", "Sample passage.")]);
        let mut table = RelationTable::new();
        table.push(5, 1, wars("I.2.3"));

        let joined = join(&index, &table);
        let json = serde_json::to_value(&joined.parallels).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "5": { "1": [ { "ref": "Wars I.2.3", "text": "Sample passage." } ] }
            })
        );
        assert_eq!(joined.report.emitted, 1);
        assert!(joined.report.skipped.is_empty());
    }

    #[test]
    fn arabic_book_numbers_map_to_numerals() {
        let index = index(&[("II.8.1", "Coponius"), ("VII.1.1", "last book")]);
        let mut table = RelationTable::new();
        table.push(2, 2, wars("2.8.1"));
        table.push(2, 2, wars("7.1.1"));

        let joined = join(&index, &table);
        let texts: Vec<_> = joined.parallels.get(2, 2).unwrap().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["Coponius", "last book"]);
    }

    #[test]
    fn antiquities_entries_produce_no_records() {
        let index = index(&[("II.8.1", "Coponius")]);
        let mut table = RelationTable::new();
        table.push(2, 2, RelationEntry::new(SourceWork::Antiquities, "18.1.1"));
        table.push(2, 2, wars("2.8.1"));
        table.push(2, 2, RelationEntry::new(SourceWork::Antiquities, "2.8.1"));

        let joined = join(&index, &table);
        let records = joined.parallels.get(2, 2).unwrap();
        let wars_count = table
            .get(2, 2)
            .unwrap()
            .iter()
            .filter(|e| e.source == SourceWork::Wars)
            .count();
        assert_eq!(records.len(), wars_count);
        assert_eq!(records[0].reference, "Wars 2.8.1");
        assert_eq!(joined.report.unresolved(SourceWork::Antiquities), 2);
    }

    #[test]
    fn unmapped_book_is_skipped() {
        let index = index(&[("I.1.1", "text")]);
        let mut table = RelationTable::new();
        table.push(21, 25, wars("9.1.1"));

        let joined = join(&index, &table);
        assert!(joined.parallels.is_empty());
        assert!(joined.parallels.get(21, 25).is_none());
        assert_eq!(joined.report.skipped.len(), 1);
        assert_eq!(joined.report.skipped[0].reason, ReferenceSkip::UnmappedBook(9));
        assert_eq!(joined.report.skipped[0].verse, VerseRef { chapter: 21, verse: 25 });
    }

    #[test]
    fn malformed_locations_are_skipped() {
        for (location, reason) in [
            ("1.1", ReferenceSkip::MalformedLocation("1.1".into())),
            ("1.1.1.1", ReferenceSkip::MalformedLocation("1.1.1.1".into())),
            ("x.1.1", ReferenceSkip::MalformedBook("x".into())),
            ("-1.1.1", ReferenceSkip::MalformedBook("-1".into())),
            ("0.1.1", ReferenceSkip::UnmappedBook(0)),
            ("VIII.1.1", ReferenceSkip::MalformedBook("VIII".into())),
        ] {
            assert_eq!(citation_key(&wars(location)), Err(reason), "{location}");
        }
    }

    #[test]
    fn missing_passage_uses_sentinel() {
        let index = index(&[("I.1.1", "text")]);
        let (record, found) = resolve(&wars("3.2.1"), &index).unwrap();
        assert!(!found);
        assert_eq!(record.text, "Text for this reference was not found.");
        assert_eq!(record.reference, "Wars 3.2.1");
    }

    #[test]
    fn output_order_mirrors_table_order() {
        let index = index(&[("I.1.1", "a"), ("I.1.2", "b")]);
        let mut table = RelationTable::new();
        table.push(21, 11, wars("1.1.2"));
        table.push(1, 5, wars("1.1.1"));
        table.push(21, 2, wars("1.1.1"));

        let joined = join(&index, &table);
        let json = serde_json::to_string(&joined.parallels).unwrap();
        let pos = |needle: &str| json.find(needle).unwrap();
        assert!(pos("\"21\"") < pos("\"1\""));
        assert!(pos("\"11\"") < pos("\"2\""));
    }

    #[test]
    fn one_bad_reference_does_not_affect_others() {
        let index = index(&[("I.1.1", "a")]);
        let mut table = RelationTable::new();
        table.push(1, 1, wars("1.1"));
        table.push(1, 1, wars("1.1.1"));
        table.push(1, 1, wars("9.9.9"));
        table.push(1, 1, wars("1.1.9"));

        let joined = join(&index, &table);
        let refs: Vec<_> = joined.parallels.get(1, 1).unwrap().iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(refs, ["Wars 1.1.1", "Wars 1.1.9"]);
        assert_eq!(joined.report.emitted, 2);
        assert_eq!(joined.report.not_found, 1);
        assert_eq!(joined.report.skipped.len(), 2);
    }

    #[test]
    fn empty_inputs_join_to_nothing() {
        let mut table = RelationTable::new();
        table.push(1, 1, wars("1.1.1"));
        assert!(join(&TextIndex::new(), &table).parallels.is_empty());
        assert!(join(&index(&[("I.1.1", "a")]), &RelationTable::new()).parallels.is_empty());
    }
}

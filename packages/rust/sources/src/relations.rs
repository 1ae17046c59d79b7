//! Relation table parser.
//!
//! The table is a loosely delimited export: a header line, then one row per
//! cross-reference with whitespace-separated fields, optionally wrapped in
//! double quotes:
//!
//! ```text
//! "No." "Josephus" "Kind" "Theme" "Luke"
//! "1" "1.1.1" "event" "sedition" "1:5"
//! ```
//!
//! Only columns 1 (reference number), 2 (location in the source work) and
//! 5 (`chapter:verse` in the target work) are read.

use tracing::{debug, instrument};

use parallels_shared::{RelationEntry, RelationTable, SourceWork, VerseRef};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a data row was left out of the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowSkip {
    #[error("expected at least 5 fields, found {0}")]
    TooFewFields(usize),

    #[error("malformed verse location '{0}'")]
    BadVerseLocation(String),
}

/// Result of feeding one data row to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// A new entry was appended.
    Accepted,
    /// The same entry was already recorded for that verse.
    Duplicate,
    Skipped(RowSkip),
}

/// A skipped row and its 1-based line number in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: RowSkip,
}

/// Per-row accounting for one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableReport {
    /// Non-blank data rows seen (header excluded).
    pub rows: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub skipped: Vec<SkippedRow>,
}

impl TableReport {
    fn record(&mut self, line: usize, outcome: RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Accepted => self.accepted += 1,
            RowOutcome::Duplicate => self.duplicates += 1,
            RowOutcome::Skipped(reason) => {
                debug!(line, %reason, "skipping table row");
                self.skipped.push(SkippedRow { line, reason });
            }
        }
    }
}

/// A parsed relation table together with its row report.
#[derive(Debug, Clone, Default)]
pub struct TableParse {
    pub table: RelationTable,
    pub report: TableReport,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse the full table text. The first line is a header and is ignored.
#[instrument(skip_all, fields(bytes = content.len()))]
pub fn parse_relation_table(content: &str) -> TableParse {
    let mut parsed = TableParse::default();

    for (idx, line) in content.lines().enumerate().skip(1) {
        let cleaned = line.trim().replace('"', "");
        if cleaned.is_empty() {
            continue;
        }
        let outcome = add_row(&mut parsed.table, &cleaned);
        parsed.report.record(idx + 1, outcome);
    }

    debug!(
        rows = parsed.report.rows,
        accepted = parsed.report.accepted,
        duplicates = parsed.report.duplicates,
        skipped = parsed.report.skipped.len(),
        "relation table parsed"
    );

    parsed
}

/// Parse one cleaned data row and append its entry to `table`.
pub fn add_row(table: &mut RelationTable, row: &str) -> RowOutcome {
    let fields: Vec<&str> = row.split_whitespace().collect();

    let [source_ref_num, josephus_loc, _, _, luke_loc, ..] = fields.as_slice() else {
        return RowOutcome::Skipped(RowSkip::TooFewFields(fields.len()));
    };

    let Ok(VerseRef { chapter, verse }) = luke_loc.parse::<VerseRef>() else {
        return RowOutcome::Skipped(RowSkip::BadVerseLocation(luke_loc.to_string()));
    };

    let entry = RelationEntry::new(SourceWork::classify(source_ref_num), *josephus_loc);
    if table.insert_unique(chapter, verse, entry) {
        RowOutcome::Accepted
    } else {
        RowOutcome::Duplicate
    }
}

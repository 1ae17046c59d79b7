//! Input parsing for Parallels.
//!
//! Two independent stages, each a pure function over the file's text:
//! - [`segmenter`]: source text → [`TextIndex`]
//! - [`relations`]: cross-reference table → [`RelationTable`] plus a row report
//!
//! The `load_*` helpers read the file first. Any I/O failure comes back as
//! [`ParallelsError::Io`]; callers decide whether that aborts the run.
//!
//! [`TextIndex`]: parallels_shared::TextIndex
//! [`RelationTable`]: parallels_shared::RelationTable

pub mod relations;
pub mod segmenter;

use std::path::Path;

use parallels_shared::{ParallelsError, Result, TextIndex};
use tracing::{info, instrument};

pub use relations::{
    RowOutcome, RowSkip, SkippedRow, TableParse, TableReport, add_row, parse_relation_table,
};
pub use segmenter::segment;

/// Read a UTF-8 input file.
pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ParallelsError::io(path, e))
}

/// Read and segment the source text.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_text_index(path: &Path) -> Result<TextIndex> {
    let content = read_source(path)?;
    let index = segment(&content);
    info!(passages = index.len(), "source text indexed");
    Ok(index)
}

/// Read and parse the relation table.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_relation_table(path: &Path) -> Result<TableParse> {
    let content = read_source(path)?;
    let parsed = parse_relation_table(&content);
    info!(
        entries = parsed.table.len(),
        verses = parsed.table.verse_count(),
        skipped_rows = parsed.report.skipped.len(),
        "relation table loaded"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found_error() {
        let path = std::env::temp_dir().join(format!(
            "parallels-missing-{}.txt",
            uuid::Uuid::now_v7()
        ));
        let err = load_text_index(&path).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("parallels-missing-"));

        assert!(load_relation_table(&path).unwrap_err().is_not_found());
    }

    #[test]
    fn loads_fixtures() {
        let index = load_text_index(Path::new("../../../fixtures/josephus.txt")).unwrap();
        assert_eq!(index.len(), 5);

        let parsed =
            load_relation_table(Path::new("../../../fixtures/input_file_0.csv")).unwrap();
        assert_eq!(parsed.table.len(), 9);
    }

    #[test]
    fn non_utf8_file_is_an_io_error() {
        let path = std::env::temp_dir().join(format!(
            "parallels-binary-{}.txt",
            uuid::Uuid::now_v7()
        ));
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let err = load_text_index(&path).unwrap_err();
        assert!(matches!(err, ParallelsError::Io { .. }));
        assert!(!err.is_not_found());

        let _ = std::fs::remove_file(&path);
    }
}

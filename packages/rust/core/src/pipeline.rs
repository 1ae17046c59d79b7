//! End-to-end build pipeline: source text + relation table → parallels JSON.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use parallels_shared::{ParallelsError, PipelineConfig, Result};
use parallels_sources::TableReport;

use crate::join::{self, JoinReport};
use crate::writer::{self, WrittenOutput};

/// An input that could not be read. The run is aborted before joining.
#[derive(Debug)]
pub struct MissingInput {
    pub path: PathBuf,
    pub error: ParallelsError,
}

/// Statistics for a completed build.
#[derive(Debug)]
pub struct BuildSummary {
    /// Passages in the text index.
    pub passages: usize,
    pub table: TableReport,
    pub join: JoinReport,
    pub output: WrittenOutput,
    pub elapsed: Duration,
}

/// How a pipeline run ended.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Output was written.
    Built(BuildSummary),
    /// At least one input could not be read; nothing was written.
    Aborted { missing: Vec<MissingInput> },
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the run has finished, whichever way it ended.
    fn done(&self, outcome: &PipelineOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &PipelineOutcome) {}
}

/// Run the full build.
///
/// 1. Segment the source text
/// 2. Parse the relation table
/// 3. Join (skipped when either input is unreadable)
/// 4. Write the JSON output
///
/// Both inputs are always attempted so every missing file is reported.
/// Unreadable inputs produce [`PipelineOutcome::Aborted`], not an error;
/// `Err` is reserved for failures writing the output.
#[instrument(skip_all, fields(
    text = %config.text_path.display(),
    table = %config.table_path.display()
))]
pub fn run(config: &PipelineConfig, progress: &dyn ProgressReporter) -> Result<PipelineOutcome> {
    let start = Instant::now();
    let mut missing = Vec::new();

    // --- Phase 1: Source text ---
    progress.phase("Segmenting source text");
    let index = available(
        parallels_sources::load_text_index(&config.text_path),
        &config.text_path,
        &mut missing,
    );

    // --- Phase 2: Relation table ---
    progress.phase("Parsing relation table");
    let parsed = available(
        parallels_sources::load_relation_table(&config.table_path),
        &config.table_path,
        &mut missing,
    );

    let (Some(index), Some(parsed)) = (index, parsed) else {
        warn!(missing = missing.len(), "input unavailable, no output written");
        let outcome = PipelineOutcome::Aborted { missing };
        progress.done(&outcome);
        return Ok(outcome);
    };

    // --- Phase 3: Join ---
    progress.phase("Joining references");
    let joined = join::join(&index, &parsed.table);

    // --- Phase 4: Write ---
    progress.phase("Writing output");
    let output = writer::write_parallels(&config.output_path, &joined.parallels, config.pretty)?;

    let summary = BuildSummary {
        passages: index.len(),
        table: parsed.report,
        join: joined.report,
        output,
        elapsed: start.elapsed(),
    };

    info!(
        passages = summary.passages,
        rows = summary.table.rows,
        emitted = summary.join.emitted,
        not_found = summary.join.not_found,
        skipped = summary.join.skipped.len(),
        output = %summary.output.path.display(),
        elapsed_ms = summary.elapsed.as_millis(),
        "build complete"
    );

    let outcome = PipelineOutcome::Built(summary);
    progress.done(&outcome);
    Ok(outcome)
}

/// Turn a load failure into a recorded missing input.
fn available<T>(loaded: Result<T>, path: &Path, missing: &mut Vec<MissingInput>) -> Option<T> {
    match loaded {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read input");
            missing.push(MissingInput {
                path: path.to_path_buf(),
                error,
            });
            None
        }
    }
}

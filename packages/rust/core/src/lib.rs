//! Core pipeline orchestration and domain logic for Parallels.
//!
//! This crate joins the parsed inputs from `parallels-sources` into the
//! chapter → verse → records structure and writes it as JSON. The end-to-end
//! run lives in [`pipeline::run`].

pub mod join;
pub mod pipeline;
pub mod writer;

pub use join::{JoinOutcome, JoinReport, Joined, NOT_FOUND_TEXT, ReferenceSkip, SkippedReference};
pub use pipeline::{
    BuildSummary, MissingInput, PipelineOutcome, ProgressReporter, SilentProgress,
};
pub use writer::{WrittenOutput, write_parallels};

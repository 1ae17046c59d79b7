//! Shared types, error model, and configuration for Parallels.
//!
//! This crate is the foundation depended on by all other Parallels crates.
//! It provides:
//! - [`ParallelsError`]: the unified error type
//! - Domain types ([`TextIndex`], [`RelationTable`], [`ParallelMap`], [`VerseMap`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, InputsConfig, OutputConfig, PipelineConfig, init_config,
    load_config, load_config_from,
};
pub use error::{ParallelsError, Result};
pub use types::{
    BookNumeral, ChapterEntry, CitationKey, ParallelMap, ParallelRecord, RelationEntry,
    RelationTable, SourceWork, TextIndex, VerseEntry, VerseMap, VerseRef,
};

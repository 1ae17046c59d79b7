//! Parallels CLI: builds the verse-to-passage lookup JSON for the website.
//!
//! Reads the transcribed source text and the cross-reference table, joins
//! them, and writes `full_parallels.json`.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}

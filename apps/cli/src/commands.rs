//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use parallels_core::pipeline::{self, BuildSummary, PipelineOutcome, ProgressReporter};
use parallels_shared::{
    AppConfig, CONFIG_FILE_NAME, ParallelMap, PipelineConfig, VerseRef, init_config, load_config,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Parallels: cross-reference a verse table against a source text.
#[derive(Parser)]
#[command(
    name = "parallels",
    version,
    about = "Join a transcribed source text and a cross-reference table into a parallels JSON file.",
    long_about = None,
    args_conflicts_with_subcommands = true,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./parallels.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Build options when no subcommand is given.
    #[command(flatten)]
    pub build: BuildArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Input/output overrides for a build.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Source text with citation markers.
    #[arg(long)]
    pub text: Option<PathBuf>,

    /// Cross-reference table.
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Output JSON path.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl BuildArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(text) = &self.text {
            config.text_path = text.clone();
        }
        if let Some(table) = &self.table {
            config.table_path = table.clone();
        }
        if let Some(out) = &self.out {
            config.output_path = out.clone();
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build the parallels JSON (the default).
    Build(BuildArgs),

    /// Print the parallels recorded for one verse.
    Show {
        /// Verse as CHAPTER:VERSE, e.g. 3:1.
        verse: String,

        /// Parallels JSON to read (defaults to the configured output path).
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default parallels.toml into the working directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout is
/// reserved for status output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "parallels=info",
        1 => "parallels=debug",
        _ => "parallels=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        None => cmd_build(config_path, &cli.build),
        Some(Command::Build(args)) => cmd_build(config_path, &args),
        Some(Command::Show { verse, file }) => cmd_show(config_path, &verse, file.as_deref()),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(config_path: Option<&Path>, args: &BuildArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let mut pipeline_config = PipelineConfig::from(&config);
    args.apply(&mut pipeline_config);

    info!(
        text = %pipeline_config.text_path.display(),
        table = %pipeline_config.table_path.display(),
        out = %pipeline_config.output_path.display(),
        "building parallels"
    );

    let reporter = CliProgress::new();
    let outcome = pipeline::run(&pipeline_config, &reporter)?;

    match outcome {
        PipelineOutcome::Built(summary) => {
            println!(
                "Successfully created '{}'. You can now use this file in your website.",
                summary.output.path.display()
            );
            print_summary(&summary);
        }
        PipelineOutcome::Aborted { missing } => {
            for input in missing {
                if input.error.is_not_found() {
                    println!("Error: The file '{}' was not found.", input.path.display());
                } else {
                    println!(
                        "Error: The file '{}' could not be read: {}",
                        input.path.display(),
                        input.error
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &BuildSummary) {
    println!();
    println!("  Passages:   {}", summary.passages);
    println!(
        "  Rows:       {} accepted, {} duplicate, {} skipped",
        summary.table.accepted,
        summary.table.duplicates,
        summary.table.skipped.len()
    );
    println!(
        "  Records:    {} ({} without text)",
        summary.join.emitted, summary.join.not_found
    );
    println!("  Skipped:    {} references", summary.join.skipped.len());
    println!("  Size:       {} bytes", summary.output.size_bytes);
    println!("  SHA-256:    {}", summary.output.sha256);
    println!("  Time:       {:.3}s", summary.elapsed.as_secs_f64());
    println!();
}

fn cmd_show(config_path: Option<&Path>, verse: &str, file: Option<&Path>) -> Result<()> {
    let verse_ref: VerseRef = verse.parse()?;

    let path = match file {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(load_config(config_path)?.output.path),
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
    let parallels: ParallelMap = serde_json::from_str(&content)
        .map_err(|e| eyre!("'{}' is not a parallels file: {e}", path.display()))?;

    match parallels.get(verse_ref.chapter, verse_ref.verse) {
        Some(records) if !records.is_empty() => {
            println!("Parallels for {verse_ref}:");
            for record in records {
                println!();
                println!("  {}", record.reference);
                println!("  {}", record.text);
            }
        }
        _ => println!("No parallels for {verse_ref}."),
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    if cwd.join(CONFIG_FILE_NAME).exists() {
        return Err(eyre!(
            "{CONFIG_FILE_NAME} already exists in {}",
            cwd.display()
        ));
    }
    let path = init_config(&cwd)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &PipelineOutcome) {
        self.spinner.finish_and_clear();
    }
}

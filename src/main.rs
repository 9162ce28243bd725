//! pmc-harvest main entry point
//!
//! This is the command-line interface for the pmc-harvest article harvester.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pmc_harvest::config::{load_or_default, Config};
use pmc_harvest::harvest::run_batch;
use pmc_harvest::ident::collect_ids;
use pmc_harvest::output::{rebuild_index, rewrap_directory};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// pmc-harvest: fetch, extract and archive article pages
///
/// Each article is stored as raw markup, a wrapped plain-text rendition and
/// one line of an append-only JSON record log.
#[derive(Parser, Debug)]
#[command(name = "pmc-harvest")]
#[command(version)]
#[command(about = "Fetch, extract and archive article pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest articles by identifier
    ///
    /// Pass identifiers directly, or a single path to a file with one
    /// identifier per line.
    Pull {
        /// Identifiers (e.g. PMC1234567) or one id-list file
        #[arg(value_name = "IDS")]
        ids: Vec<String>,

        /// Override the configured wrap width
        #[arg(short, long, value_parser = parse_width)]
        width: Option<usize>,
    },

    /// Rebuild the CSV index from the text artifacts
    Index,

    /// Re-wrap existing text artifacts at a new width
    Rewrap {
        /// Target width (defaults to the configured wrap width)
        #[arg(short, long, value_parser = parse_width)]
        width: Option<usize>,

        /// Overwrite the artifacts instead of writing <id>.wrapped.txt
        #[arg(long)]
        inplace: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid default configuration".to_string(),
    })?;
    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path.display());
    }

    match cli.command {
        Command::Pull { ids, width } => {
            if let Some(width) = width {
                config.output.wrap_width = width;
            }
            handle_pull(config, ids).await
        }
        Command::Index => handle_index(&config),
        Command::Rewrap { width, inplace } => {
            handle_rewrap(&config, width.unwrap_or(config.output.wrap_width), inplace)
        }
    }
}

/// Parses a wrap width, which must be at least 1
fn parse_width(value: &str) -> Result<usize, String> {
    let width: usize = value
        .parse()
        .map_err(|_| format!("'{}' is not a valid width", value))?;
    if width == 0 {
        return Err("width must be at least 1".to_string());
    }
    Ok(width)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pmc_harvest=info,warn"),
            1 => EnvFilter::new("pmc_harvest=debug,info"),
            2 => EnvFilter::new("pmc_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `pull`: harvests the given identifiers
async fn handle_pull(config: Config, args: Vec<String>) -> anyhow::Result<ExitCode> {
    let Some(ids) = collect_ids(args).context("Failed to read id list")? else {
        eprintln!("Usage: pmc-harvest pull PMC12345 [PMC...]  OR  pmc-harvest pull ids.txt");
        return Ok(ExitCode::FAILURE);
    };
    tracing::info!("Harvesting {} identifiers", ids.len());

    let root = config.output.root.clone();
    let summary = run_batch(config, ids.as_slice())
        .await
        .with_context(|| format!("Failed to prepare output under {}", root.display()))?;

    println!(
        "\nDone: {} harvested, {} failed, {} skipped",
        summary.succeeded.len(),
        summary.failed.len(),
        summary.skipped.len()
    );

    Ok(ExitCode::SUCCESS)
}

/// Handles `index`: rebuilds the CSV summary
fn handle_index(config: &Config) -> anyhow::Result<ExitCode> {
    let rows = rebuild_index(config).with_context(|| {
        format!("Failed to write {}", config.output.index_path().display())
    })?;
    println!(
        "✓ Indexed {} articles → {}",
        rows,
        config.output.index_path().display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Handles `rewrap`: reflows the text artifacts
fn handle_rewrap(
    config: &Config,
    width: usize,
    inplace: bool,
) -> anyhow::Result<ExitCode> {
    let parsed_dir = config.output.parsed_dir();
    let summary = rewrap_directory(&parsed_dir, &config.source.id_prefix, width, inplace)
        .with_context(|| format!("Failed to rewrap {}", parsed_dir.display()))?;

    println!(
        "Wrapped {} files at width={}. Inplace={}",
        summary.rewritten, width, inplace
    );
    if !summary.skipped.is_empty() {
        println!("Skipped {} files without the standard layout", summary.skipped.len());
    }

    Ok(ExitCode::SUCCESS)
}

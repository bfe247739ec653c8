//! FactCast CLI
//!
//! Results are written to stdout as JSON; logs go to stderr.

mod wiring;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use factcast_core::{Claim, Source, StanceWeights, Verdict, VerdictAggregator};
use factcast_runtime::{CancellationToken, FactCheckOrchestrator, LlmUsage, RuntimeConfig};

use wiring::{build_orchestrator, ProvidersFile};

#[derive(Parser)]
#[command(name = "factcast")]
#[command(about = "Detect claims in text and check them against retrieved sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Runtime configuration (YAML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and check claims in text
    Check {
        /// Text to check; read from --file or stdin when omitted
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Providers file (JSON) naming the classifier, generator and search backends
        #[arg(short, long)]
        providers: PathBuf,

        /// Treat the whole input as one claim and skip detection
        #[arg(long)]
        single_claim: bool,
    },

    /// Compute a verdict from a JSON array of sources, offline
    Aggregate {
        /// Sources file; stdin when omitted
        sources: Option<PathBuf>,
    },

    /// Print the effective configuration as YAML
    Config,
}

#[derive(Serialize)]
struct CheckReport {
    results: Vec<factcast_core::FactCheckResult>,
    cancelled: bool,
    usage: LlmUsage,
}

#[derive(Serialize)]
struct AggregateReport {
    verdict: Verdict,
    weights: StanceWeights,
    source_count: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            text,
            file,
            providers,
            single_claim,
        } => {
            let input = read_input(text, file.as_deref())?;
            let providers = ProvidersFile::load(&providers)?;
            let orchestrator = build_orchestrator(config, &providers)?;
            let report = cmd_check(&orchestrator, &input, single_claim).await?;
            print_json(&report)
        }
        Commands::Aggregate { sources } => {
            let json = match sources {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => read_stdin()?,
            };
            print_json(&cmd_aggregate(&config, &json)?)
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(RuntimeConfig::default()),
    }
}

fn read_input(text: Option<String>, file: Option<&Path>) -> Result<String> {
    let input = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => read_stdin()?,
    };

    if input.trim().is_empty() {
        bail!("no input text");
    }
    Ok(input)
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

async fn cmd_check(
    orchestrator: &FactCheckOrchestrator,
    input: &str,
    single_claim: bool,
) -> Result<CheckReport> {
    if single_claim {
        let result = orchestrator
            .check_claim(Claim::new(input.trim(), 1.0))
            .await;
        return Ok(CheckReport {
            results: vec![result],
            cancelled: false,
            usage: orchestrator.usage(),
        });
    }

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with completed claims");
            on_interrupt.cancel();
        }
    });

    let outcome = orchestrator.process_with_cancellation(input, &token).await?;
    tracing::info!(
        results = outcome.results.len(),
        flagged = outcome.results.iter().filter(|r| r.flagged).count(),
        "Check complete"
    );

    Ok(CheckReport {
        results: outcome.results,
        cancelled: outcome.cancelled,
        usage: orchestrator.usage(),
    })
}

fn cmd_aggregate(config: &RuntimeConfig, json: &str) -> Result<AggregateReport> {
    let sources: Vec<Source> = serde_json::from_str(json).context("invalid sources JSON")?;

    let aggregator = VerdictAggregator::new(config.pipeline.aggregation.clone());
    Ok(AggregateReport {
        verdict: aggregator.aggregate(&sources),
        weights: StanceWeights::from_sources(&sources),
        source_count: sources.len(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! plumewatch - groundwater contaminant transport and risk analysis
//!
//! Reads one analysis request as JSON, runs the full pipeline and prints the
//! result as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a request with the default config search order
//! plumewatch --input request.json --pretty
//!
//! # Explicit config file and a wall-clock budget per transport run
//! plumewatch --input request.json --config site.toml --timeout-secs 600
//!
//! # Show the effective configuration
//! plumewatch --print-config
//! ```
//!
//! # Environment Variables
//!
//! - `PLUMEWATCH_CONFIG`: Path to a TOML config (used when `--config` is absent)
//! - `RUST_LOG`: Logging level (default: info)

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use plumewatch::{analyze_async, AnalysisConfig, AnalysisRequest, PollutionAnalyzer};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "plumewatch")]
#[command(about = "Groundwater contaminant transport and pollution risk analysis")]
#[command(version)]
struct CliArgs {
    /// Analysis request JSON file ("-" reads stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// TOML config file (overrides PLUMEWATCH_CONFIG and ./plumewatch.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Wall-clock budget per transport run, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Pretty-print the result JSON
    #[arg(long)]
    pretty: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &CliArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::load().context("loading config from the search path")?,
    };
    if let Some(secs) = args.timeout_secs {
        config.simulation.timeout_secs = Some(secs);
    }
    Ok(config)
}

fn read_request(path: &Path) -> Result<AnalysisRequest> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading request {}", path.display()))?
    };
    serde_json::from_str(&raw).context("parsing analysis request JSON")
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(&args)?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .context("--input is required (use --print-config to inspect configuration)")?;
    let request = read_request(input)?;

    let analyzer = Arc::new(PollutionAnalyzer::new(config).context("initializing analyzer")?);

    // Graceful cancellation via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, cancelling analysis");
            shutdown_token.cancel();
        }
    });

    let result = match analyze_async(analyzer, request, cancel_token).await {
        Ok(result) => result,
        Err(e) => {
            error!(status = e.status(), error = %e, "Analysis failed");
            return Err(e.into());
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

//! Batch issuer worker
//!
//! Takes an assembled batch commitment and drives it onto the ledger's
//! commitment registry through the fee-escalation engine. Queue consumption
//! and artifact storage are upstream collaborators; this binary covers the
//! issuing stage, plus a simulation harness for rehearsing it against an
//! in-process ledger.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use batch_issuer::config::Config;
use batch_issuer::contract::RegistryBinding;
use batch_issuer::issuer::{IssueBatch, WEI_PER_GWEI};
use batch_issuer::ledger::sim::{ConfirmOutcome, SimLedger};
use batch_issuer::metrics::Metrics;
use batch_issuer::types::{Batch, Mode};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Operating mode (simulation or production)
    #[arg(short, long, default_value = "simulation")]
    mode: String,

    /// Path to the batch manifest (JSON with merkle_root and document_count)
    #[arg(short, long)]
    batch: String,

    /// Simulated network fee rate in gwei (simulation mode)
    #[arg(long, default_value = "30")]
    sim_fee_rate_gwei: u64,

    /// Confirmation timeouts to inject before success (simulation mode)
    #[arg(long, default_value = "0")]
    sim_timeouts: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("🚀 Starting batch issuer worker");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    info!("📋 Loading configuration from: {}", args.config);
    let config = Config::from_file_with_env(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;

    let mode = match args.mode.as_str() {
        "production" => Mode::Production,
        "simulation" => Mode::Simulation,
        other => {
            warn!("Unknown mode '{}', defaulting to simulation", other);
            Mode::Simulation
        }
    };
    info!("🎯 Operating mode: {:?}", mode);

    if mode == Mode::Production {
        anyhow::bail!(
            "production mode requires embedding the engine with a real ledger client; \
             this binary ships the simulation harness only"
        );
    }

    let manifest = std::fs::read_to_string(&args.batch)
        .with_context(|| format!("Failed to read batch manifest {}", args.batch))?;
    let mut batch: Batch =
        serde_json::from_str(&manifest).context("Failed to parse batch manifest")?;
    info!(
        merkle_root = %batch.merkle_root,
        document_count = batch.document_count,
        created_at = %batch.created_at,
        "Batch loaded"
    );

    let ledger = Arc::new(SimLedger::new(
        u128::from(args.sim_fee_rate_gwei) * WEI_PER_GWEI,
    ));
    if args.sim_timeouts > 0 {
        ledger.plan_confirmations((0..args.sim_timeouts).map(|_| ConfirmOutcome::Timeout));
    }

    let metrics = Arc::new(Metrics::new().context("Failed to initialize metrics")?);
    let registry = RegistryBinding::new(config.registry.address.clone());
    let mut engine = IssueBatch::new(ledger, registry, config.issuer.clone(), metrics.clone());

    let outcome = engine.run(&mut batch).await;

    if config.monitoring.enable_metrics {
        info!("📊 Run metrics:\n{}", metrics.export_text()?);
    }

    match outcome {
        Ok(()) => {
            info!("✅ Batch issued successfully");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, issued = ?batch.issued, "Batch issuing failed");
            Err(err.into())
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

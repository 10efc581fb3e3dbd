use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use overtime_ledger::api::{create_router, AppState};
use overtime_ledger::config::{ConfigLoader, PipelineConfig};
use overtime_ledger::io::{
    run_batch, CsvLedgerWriter, JurisdictionFile, PayRateFile, TimesheetDirectory,
};
use overtime_ledger::models::PayRate;

/// Turn weekly timesheet exports into a payroll transaction ledger
#[derive(Parser)]
#[command(name = "overtime-ledger", version)]
#[command(about = "Allocate overtime and double-time and export a payroll ledger", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a directory of timesheets into a ledger file
    Run {
        /// Directory holding the weekly .csv and .xlsx timesheet exports
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the <YYYYMMDD>_merge.csv ledger is written to
        #[arg(short, long)]
        output: PathBuf,

        /// Job-to-state lookup (COMPANYNO, JOB, SUB, STATE)
        #[arg(short, long)]
        jurisdictions: PathBuf,

        /// Pay-rate lookup (COMPANYNO, EMPLOYEENO, RATE)
        #[arg(short, long)]
        pay_rates: Option<PathBuf>,

        /// Directory with thresholds.yaml, translations.yaml and export.yaml
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
    /// Serve the ledger pipeline over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,

        /// Directory with thresholds.yaml, translations.yaml and export.yaml
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();

    debug!("overtime-ledger started with verbosity level: {}", verbose);
}

fn load_config(dir: Option<&Path>) -> Result<PipelineConfig> {
    match dir {
        Some(dir) => {
            let loader = ConfigLoader::load(dir)
                .with_context(|| format!("Failed to load configuration from {}", dir.display()))?;
            Ok(loader.into_config())
        }
        None => {
            debug!("No configuration directory given, using built-in defaults");
            Ok(PipelineConfig::default())
        }
    }
}

fn run(
    input: PathBuf,
    output: PathBuf,
    jurisdictions: PathBuf,
    pay_rates: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let timesheets = TimesheetDirectory::new(input);
    let lookup = JurisdictionFile::new(jurisdictions);
    let sink = CsvLedgerWriter::new(output);

    let outcome = match pay_rates {
        Some(path) => run_batch(&timesheets, &lookup, &PayRateFile::new(path), &sink, &config),
        None => run_batch(&timesheets, &lookup, &Vec::<PayRate>::new(), &sink, &config),
    }
    .context("Batch run failed")?;

    for warning in &outcome.batch.audit_trace.warnings {
        warn!(code = %warning.code, severity = %warning.severity, "{}", warning.message);
    }
    info!(
        path = %outcome.ledger_path.display(),
        rows = outcome.batch.totals.row_count,
        regular_hours = %outcome.batch.totals.regular_hours,
        overtime_hours = %outcome.batch.totals.overtime_hours,
        double_time_hours = %outcome.batch.totals.double_time_hours,
        "Ledger exported"
    );
    Ok(())
}

async fn serve(addr: SocketAddr, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let router = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Server terminated unexpectedly")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            output,
            jurisdictions,
            pay_rates,
            config,
        } => run(input, output, jurisdictions, pay_rates, config),
        Commands::Serve { addr, config } => serve(addr, config).await,
    }
}

//! barsim CLI: run and validate backtest configs.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file
//! - `check`: validate a config and print its run id

mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use barsim_runner::{run_from_config, DataConfig, RunConfig, RunReport};
use clap::{Parser, Subcommand};

use logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "barsim", about = "barsim: event-driven bar-by-bar backtester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// CSV bars file, overriding the config's data section.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Print the full report as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Log per-bar activity.
        #[arg(long, short, default_value_t = false)]
        verbose: bool,

        /// Log output format.
        #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
        log_format: LogFormat,
    },
    /// Validate a config file and print its run id.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            json,
            verbose,
            log_format,
        } => run_cmd(config, data, json, verbose, log_format),
        Commands::Check { config } => check_cmd(config),
    }
}

fn run_cmd(
    config_path: PathBuf,
    data: Option<PathBuf>,
    json: bool,
    verbose: bool,
    log_format: LogFormat,
) -> Result<()> {
    let mut config = RunConfig::from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(path) = data {
        config.data = DataConfig::Csv { path };
    }

    let level = if verbose || config.verbose { "debug" } else { "info" };
    init_logging(level, log_format)?;
    tracing::info!(config = %config_path.display(), "starting run");

    let report = run_from_config(&config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn check_cmd(config_path: PathBuf) -> Result<()> {
    let config = RunConfig::from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    println!("OK {}", config.run_id());
    Ok(())
}

fn print_summary(report: &RunReport) {
    let s = &report.summary;
    println!();
    println!("=== Backtest Result ===");
    println!("Run:            {}", report.run_id);
    println!("Bars:           {}", s.bars_processed);
    println!("Signals:        {}", s.signals);
    println!(
        "Orders:         {} ({} rejected, {} pending at end)",
        s.orders_submitted, s.orders_rejected, s.pending_at_end
    );
    println!("Fills:          {} ({} zero)", s.fills_executed, s.zero_fills);
    println!();
    println!("--- Account ---");
    println!("Initial:        {:.2}", report.initial_capital);
    println!("Cash:           {:.2}", report.ending_cash);
    println!("Book Value:     {:.2}", report.book_value());
    println!("Realized P&L:   {:.2}", report.realized_pnl);
    println!("Commission:     {:.2}", report.total_commission);
    if !report.positions.is_empty() {
        println!();
        println!("--- Open Positions ---");
        for pos in &report.positions {
            println!("{:<8} {:>10.0} @ {:.2}", pos.ticker, pos.quantity, pos.avg_price);
        }
    }
}

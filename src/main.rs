//! arb_lab — pairs-trading backtests and the todo/restaurant HTTP service.
//!
//!   backtest : synthetic universe → Engle–Granger selection → z-score portfolio
//!   quick    : two-stock full-sample z-score script
//!   serve    : todo CRUD + restaurant table over HTTP

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use arb_lab::logging;
use arb_lab::server::{self, AppState, ServerConfig};
use arb_lab::statarb::quick::{run_quick, QuickConfig};
use arb_lab::statarb::{render_metrics, run_full_backtest, BacktestParams};

#[derive(Parser, Debug)]
#[command(name = "arb_lab", version, about = "Pairs-trading lab and todo/restaurant API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the synthetic-universe pairs backtest
    Backtest(BacktestArgs),
    /// Run the two-stock z-score script
    Quick(QuickArgs),
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct BacktestArgs {
    #[arg(long, env = "ARB_N_STOCKS", default_value_t = 20)]
    n_stocks: usize,
    #[arg(long, env = "ARB_N_DAYS", default_value_t = 1000)]
    n_days: usize,
    #[arg(long, env = "ARB_N_COINT_PAIRS", default_value_t = 5)]
    n_cointegrated_pairs: usize,
    #[arg(long, env = "ARB_TRAIN_RATIO", default_value_t = 0.7)]
    train_ratio: f64,
    #[arg(long, env = "ARB_SEED", default_value_t = 42)]
    seed: u64,
    #[arg(long, env = "ARB_ENTRY_Z", default_value_t = 2.0)]
    entry_threshold: f64,
    #[arg(long, env = "ARB_EXIT_Z", default_value_t = 0.5)]
    exit_threshold: f64,
    #[arg(long, env = "ARB_MAX_PAIRS", default_value_t = 5)]
    max_pairs: usize,
    /// Write the full report as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct QuickArgs {
    #[arg(long, env = "ARB_QUICK_DAYS", default_value_t = 252)]
    num_days: usize,
    #[arg(long, env = "ARB_QUICK_ENTRY_Z", default_value_t = 1.5)]
    entry: f64,
    #[arg(long, env = "ARB_QUICK_EXIT_Z", default_value_t = 0.5)]
    exit: f64,
    #[arg(long, env = "ARB_QUICK_SEED", default_value_t = 42)]
    seed: u64,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "ARB_LAB_HOST")]
    host: Option<String>,
    #[arg(long, env = "ARB_LAB_PORT")]
    port: Option<u16>,
}

fn backtest(args: BacktestArgs) -> anyhow::Result<()> {
    // env-only knobs (half-life bounds, stop, lookback, ...) come from from_env
    let mut params = BacktestParams::from_env();
    params.generator.n_stocks = args.n_stocks;
    params.generator.n_days = args.n_days;
    params.generator.n_cointegrated_pairs = args.n_cointegrated_pairs;
    params.generator.seed = Some(args.seed);
    params.train_ratio = args.train_ratio;
    params.strategy.entry_threshold = args.entry_threshold;
    params.strategy.exit_threshold = args.exit_threshold;
    params.portfolio.max_pairs = args.max_pairs;

    info!("═══════════════════════════════════════════════════");
    info!("  arb_lab — Statistical Arbitrage Backtest");
    info!("═══════════════════════════════════════════════════");
    info!(
        "  stocks={} days={} planted_pairs={} train_ratio={} seed={}",
        args.n_stocks, args.n_days, args.n_cointegrated_pairs, args.train_ratio, args.seed
    );
    info!(
        "  entry_z={} exit_z={} stop_z={} lookback={} max_pairs={}",
        params.strategy.entry_threshold,
        params.strategy.exit_threshold,
        params.strategy.stop_loss_threshold,
        params.strategy.lookback_period,
        params.portfolio.max_pairs,
    );

    let report = run_full_backtest(params).context("backtest failed")?;
    println!("{}", render_metrics(&report.metrics));

    if let Some(path) = args.output {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        info!("💾 Report written to {}", path.display());
    }
    Ok(())
}

fn quick(args: QuickArgs) -> anyhow::Result<()> {
    let cfg = QuickConfig {
        num_days: args.num_days,
        entry: args.entry,
        exit: args.exit,
        seed: Some(args.seed),
        ..Default::default()
    };
    let run = run_quick(&cfg).context("quick run failed")?;
    println!("{}", run.metrics);
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut cfg = ServerConfig::from_env();
    if let Some(host) = args.host {
        cfg.host = host;
    }
    if let Some(port) = args.port {
        cfg.port = port;
    }
    info!("🚀 arb_lab server starting on {}", cfg.bind_addr());
    server::serve(&cfg, AppState::default()).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init("arb_lab");

    match cli.command {
        Command::Backtest(args) => backtest(args),
        Command::Quick(args) => quick(args),
        Command::Serve(args) => serve(args).await,
    }
}

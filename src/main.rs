//! Command-line entry point: load a tick CSV, run the news-momentum
//! backtest, print the trade log, and export it.

use algo_catalyst::backtest::{render_trade_log, write_trades_csv, write_trades_json};
use algo_catalyst::{
    BacktestConfig, Backtester, NewsMomentumConfig, NewsMomentumStrategy, RegimeClassifier,
    RegimeConfig,
};
use anyhow::Context;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "algo-catalyst",
    about = "Event-driven backtester for news-catalyst momentum strategies"
)]
struct Cli {
    /// Tick data CSV (Timestamp,Price,Volume,Bid_Size,Ask_Size)
    #[arg(default_value = "data/tick_data.csv")]
    csv_path: PathBuf,

    /// Symbol the tick data belongs to
    #[arg(default_value = "TICKER")]
    symbol: String,

    /// Signal-to-fill latency in milliseconds
    #[arg(long, default_value_t = 200.0)]
    latency_ms: f64,

    /// Where to write the trade log CSV
    #[arg(long, default_value = "trades.csv")]
    output: PathBuf,

    /// Optional JSON trade log artifact
    #[arg(long)]
    json_output: Option<PathBuf>,

    /// Subtract round-trip commission from trade PnL
    #[arg(long)]
    net_of_commission: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = BacktestConfig {
        latency_ms: cli.latency_ms,
        net_of_commission: cli.net_of_commission,
        ..BacktestConfig::default()
    };
    let mut backtester = Backtester::new(config);

    backtester
        .load_tick_data(&cli.csv_path, &cli.symbol)
        .with_context(|| format!("failed to load tick data from {}", cli.csv_path.display()))?;

    let classifier = Rc::new(RefCell::new(RegimeClassifier::new(RegimeConfig::default())));
    let symbol_id = backtester.intern_symbol(&cli.symbol);
    let strategy =
        NewsMomentumStrategy::with_config(symbol_id, classifier, NewsMomentumConfig::default());
    backtester.register_strategy(&cli.symbol, Box::new(strategy));

    backtester.run();

    print!("{}", render_trade_log(backtester.trade_log()));
    println!();
    println!("PERFORMANCE SUMMARY");
    println!("Total Trades: {}", backtester.num_trades());
    println!("Total PnL: ${:.2}", backtester.total_pnl());

    write_trades_csv(&cli.output, backtester.trade_log())
        .with_context(|| format!("failed to export trade log to {}", cli.output.display()))?;
    info!(trades = backtester.num_trades(), path = %cli.output.display(), "trade log exported");

    if let Some(json_path) = &cli.json_output {
        write_trades_json(json_path, backtester.trade_log())
            .with_context(|| format!("failed to export trade log to {}", json_path.display()))?;
    }

    Ok(())
}

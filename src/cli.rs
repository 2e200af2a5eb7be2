//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestReport, Backtester, Prediction};
use crate::domain::config::{build_backtest_config, build_risk_limits, build_strategy};
use crate::domain::error::SignalsimError;
use crate::domain::risk::RiskManager;
use crate::domain::rolling::{sample_std, simple_returns};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "signalsim", about = "Signal-driven trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and print the summary
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        /// Directory of {symbol}.csv files; overrides [data] path
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Size entries through the risk manager instead of a fixed fraction
        #[arg(long)]
        managed: bool,
        /// Assumed signal confidence for managed sizing
        #[arg(long)]
        confidence: Option<f64>,
        /// Also print the trade log as CSV
        #[arg(long)]
        trades: bool,
    },
    /// Print the position series a strategy generates
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List the symbols available in the data directory
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            symbol,
            data_dir,
            managed,
            confidence,
            trades,
        } => run_backtest(&config, &symbol, data_dir, managed, confidence, trades),
        Command::Signals {
            config,
            symbol,
            data_dir,
        } => run_signals(&config, &symbol, data_dir),
        Command::Symbols { config, data_dir } => run_symbols(&config, data_dir),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn data_port(adapter: &FileConfigAdapter, data_dir: Option<PathBuf>) -> CsvAdapter {
    let base = data_dir.unwrap_or_else(|| {
        adapter
            .get_string("data", "path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"))
    });
    CsvAdapter::new(base)
}

fn load_bars(
    adapter: &FileConfigAdapter,
    symbol: &str,
    data_dir: Option<PathBuf>,
) -> Result<crate::domain::ohlcv::BarSeries, SignalsimError> {
    data_port(adapter, data_dir).load_bars(symbol)
}

fn run_backtest(
    config_path: &PathBuf,
    symbol: &str,
    data_dir: Option<PathBuf>,
    managed: bool,
    confidence: Option<f64>,
    trades: bool,
) -> Result<(), SignalsimError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;

    let strategy = build_strategy(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;

    let series = load_bars(&adapter, symbol, data_dir)?;
    eprintln!("Loaded {} bars for {}", series.len(), symbol);

    let positions = strategy.generate(&series)?;
    let backtester = Backtester::new(bt_config);

    let report = if managed {
        let limits = build_risk_limits(&adapter)?;
        let initial = backtester.config().initial_capital;
        let mut risk = RiskManager::new(limits, initial);

        let returns = simple_returns(&series.closes());
        let volatility = sample_std(&returns[1..]);
        let confidence =
            confidence.unwrap_or_else(|| adapter.get_double("risk", "confidence", 0.6));
        let confidences = vec![confidence; series.len()];
        let predictions: Vec<Prediction> = positions
            .iter()
            .map(|p| {
                if p.is_long() {
                    Prediction::Up
                } else {
                    Prediction::Down
                }
            })
            .collect();

        backtester.run_managed(&series, &predictions, &confidences, volatility, &mut risk)?
    } else {
        backtester.run_positions(&series, &positions)?
    };

    print_summary(strategy.name(), series.len(), &report);
    if trades {
        print_trades(&report);
    }
    Ok(())
}

fn print_summary(strategy: &str, bars: usize, report: &BacktestReport) {
    let s = &report.summary;
    println!("Strategy:          {strategy}");
    println!("Bars:              {bars}");
    println!("Total trades:      {}", s.total_trades);
    println!("Profitable trades: {}", s.profitable_trades);
    println!("Win rate:          {:.1}%", s.win_rate * 100.0);
    println!("Average return:    {:.2}%", s.avg_return * 100.0);
    println!("Max drawdown:      {:.2}%", s.max_drawdown * 100.0);
    println!("Final capital:     {:.2}", s.final_capital);
    println!("Total return:      {:.2}%", s.total_return * 100.0);
}

fn print_trades(report: &BacktestReport) {
    println!("entry_date,exit_date,entry_price,exit_price,shares,pnl,return_pct");
    for t in &report.trades {
        println!(
            "{},{},{:.4},{:.4},{:.4},{:.2},{:.4}",
            t.entry_date, t.exit_date, t.entry_price, t.exit_price, t.shares, t.pnl, t.return_pct
        );
    }
}

fn run_signals(
    config_path: &PathBuf,
    symbol: &str,
    data_dir: Option<PathBuf>,
) -> Result<(), SignalsimError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let strategy = build_strategy(&adapter)?;
    let series = load_bars(&adapter, symbol, data_dir)?;
    let positions = strategy.generate(&series)?;

    println!("date,close,position");
    for (bar, position) in series.bars().iter().zip(&positions) {
        println!("{},{},{}", bar.date, bar.close, position.signum());
    }
    Ok(())
}

fn run_symbols(config_path: &PathBuf, data_dir: Option<PathBuf>) -> Result<(), SignalsimError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    for symbol in data_port(&adapter, data_dir).list_symbols()? {
        println!("{symbol}");
    }
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), SignalsimError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let strategy = build_strategy(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;
    let limits = build_risk_limits(&adapter)?;

    println!("config ok");
    println!(
        "strategy: {} (minimum {} bars)",
        strategy.name(),
        strategy.min_bars()
    );
    println!(
        "backtest: capital {:.2}, position {:.0}%, stop {:.1}%, take {:.1}%",
        bt_config.initial_capital,
        bt_config.position_size * 100.0,
        bt_config.stop_loss * 100.0,
        bt_config.take_profit * 100.0
    );
    println!(
        "risk: max position {:.0}%, max drawdown {:.0}%, min confidence {:.2}",
        limits.max_position_size * 100.0,
        limits.max_drawdown * 100.0,
        limits.min_confidence
    );
    Ok(())
}

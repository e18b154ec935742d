use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pozole::prelude::*;
use prettytable::{Cell, Row, Table};
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pozole")]
#[command(about = "A Rust-based signal-replay backtesting engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a backtest from command-line flags
    Run {
        //path to the raw event-value csv (date-indexed, one column per stock)
        #[arg(long)]
        events: PathBuf,

        //path to the closing-price csv (same shape as the event file)
        #[arg(long)]
        prices: PathBuf,

        //optional benchmark return csv (date,return)
        #[arg(long)]
        benchmark: Option<PathBuf>,

        //signal threshold: above buys, below sells
        #[arg(long, default_value = "50.0")]
        threshold: f64,

        //buy-side fee rate on trade notional
        #[arg(long, default_value = "0.000855")]
        buy_fee: f64,

        //sell-side fee rate on trade notional
        #[arg(long, default_value = "0.003705")]
        sell_fee: f64,

        //fixed quantity per signalled trade
        #[arg(long, default_value = "1.0")]
        qty: f64,

        //what to do with a sell signal backed by no position (skip, fail)
        #[arg(long, default_value = "skip")]
        on_insufficient: String,

        //per-trade risk-free rate for the sharpe ratio
        #[arg(long, default_value = "0.0")]
        risk_free: f64,

        //output path for the trade log csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,

        //output path for the benchmark comparison csv
        #[arg(long)]
        output_comparison_csv: Option<PathBuf>,
    },

    //run a backtest from a json configuration file
    RunConfig {
        //path to the configuration json
        #[arg(long)]
        config: PathBuf,
    },

    //inspect price behavior around one event date
    Analyze {
        //path to the closing-price csv
        #[arg(long)]
        prices: PathBuf,

        //instrument column to analyze
        #[arg(long)]
        stock: String,

        //event date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        //window size in rows on each side of the event
        #[arg(long, default_value = "5")]
        days: usize,
    },

    //sweep the signal threshold over a range, one independent run each
    Sweep {
        //path to the raw event-value csv
        #[arg(long)]
        events: PathBuf,

        //path to the closing-price csv
        #[arg(long)]
        prices: PathBuf,

        //first threshold in the sweep
        #[arg(long)]
        from: f64,

        //last threshold in the sweep (inclusive)
        #[arg(long)]
        to: f64,

        //threshold step
        #[arg(long, default_value = "5.0")]
        step: f64,

        //buy-side fee rate on trade notional
        #[arg(long, default_value = "0.000855")]
        buy_fee: f64,

        //sell-side fee rate on trade notional
        #[arg(long, default_value = "0.003705")]
        sell_fee: f64,

        //fixed quantity per signalled trade
        #[arg(long, default_value = "1.0")]
        qty: f64,

        //per-trade risk-free rate for the sharpe ratio
        #[arg(long, default_value = "0.0")]
        risk_free: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            events,
            prices,
            benchmark,
            threshold,
            buy_fee,
            sell_fee,
            qty,
            on_insufficient,
            risk_free,
            output_trades_csv,
            output_comparison_csv,
        } => {
            let on_insufficient_position = PositionPolicy::parse(&on_insufficient)
                .ok_or_else(|| anyhow::anyhow!("Unknown position policy: {}", on_insufficient))?;

            let config = BacktestConfiguration {
                events_path: events,
                prices_path: prices,
                benchmark_path: benchmark,
                threshold,
                buy_fee_rate: buy_fee,
                sell_fee_rate: sell_fee,
                trade_quantity: qty,
                on_insufficient_position,
                risk_free_rate: risk_free,
                output_trades_csv,
                output_comparison_csv,
            };

            run_backtest(&config)?;
        }
        Commands::RunConfig { config } => {
            let config = BacktestConfiguration::from_json_file(&config)
                .context(format!("Failed to load configuration from {:?}", config))?;
            run_backtest(&config)?;
        }
        Commands::Analyze {
            prices,
            stock,
            date,
            days,
        } => {
            run_analyze(prices, &stock, &date, days)?;
        }
        Commands::Sweep {
            events,
            prices,
            from,
            to,
            step,
            buy_fee,
            sell_fee,
            qty,
            risk_free,
        } => {
            run_sweep(
                events, prices, from, to, step, buy_fee, sell_fee, qty, risk_free,
            )?;
        }
    }

    Ok(())
}

fn run_backtest(config: &BacktestConfiguration) -> Result<()> {
    println!("Pozole Signal Replay Backtester");
    println!("===============================\n");

    //load data
    println!("Loading events from {:?}...", config.events_path);
    let raw = load_raw_csv(&config.events_path)?;

    println!("Loading prices from {:?}...", config.prices_path);
    let prices = load_price_csv(&config.prices_path)?;

    let benchmark = match &config.benchmark_path {
        Some(path) => {
            println!("Loading benchmark from {:?}...", path);
            Some(load_benchmark_csv(path)?)
        }
        None => None,
    };

    //label the raw events
    let policy = ThresholdPolicy::new(config.threshold);
    let signals = SignalMatrix::from_raw(&raw, &policy)?;

    println!(
        "Loaded {} event rows over {} instruments\n",
        raw.dates().len(),
        raw.columns().len()
    );
    println!("Threshold: {}", config.threshold);
    println!(
        "Fees: {} buy / {} sell",
        config.buy_fee_rate, config.sell_fee_rate
    );
    println!("Quantity: {} per trade\n", config.trade_quantity);

    //execute
    println!("Running backtest...\n");
    let fees = FeeModel::new(config.buy_fee_rate, config.sell_fee_rate)?;
    let engine = TradeEngine::new(
        &signals,
        &prices,
        fees,
        config.trade_quantity,
        config.on_insufficient_position,
    )?;
    let outcome = engine.execute()?;

    println!("Executed {} trades", outcome.trades.len());
    if !outcome.ledger.is_empty() {
        println!("Open positions at end of run:");
        for (stock_code, position) in outcome.ledger.iter() {
            println!(
                "  {}: {} @ {:.4}",
                stock_code, position.quantity, position.average_cost
            );
        }
    }
    println!();

    //metrics
    let calculator = match &benchmark {
        Some(series) => MetricsCalculator::with_benchmark(&outcome.trades, series),
        None => MetricsCalculator::new(&outcome.trades),
    };

    println!("Backtest Results");
    println!("================\n");
    let report = calculator.calculate_all_metrics(config.risk_free_rate);
    report.pretty_print_table();

    //save outputs if requested
    if let Some(trades_path) = &config.output_trades_csv {
        save_trades_csv(&outcome.trades, trades_path)?;
        println!("\nTrade log saved to {:?}", trades_path);
    }

    if let Some(comparison_path) = &config.output_comparison_csv {
        save_comparison_csv(&calculator.benchmark_cumulative_comparison(), comparison_path)?;
        println!("Comparison series saved to {:?}", comparison_path);
    }

    Ok(())
}

fn run_analyze(prices_path: PathBuf, stock: &str, date: &str, days: usize) -> Result<()> {
    let event_date: chrono::NaiveDate = date
        .parse()
        .context(format!("Failed to parse event date '{}'", date))?;

    let prices = load_price_csv(&prices_path)?;
    let analyzer = EventAnalyzer::new(&prices);

    println!("Event window for {} around {}\n", stock, event_date);

    match analyzer.pre_post_returns(stock, event_date, days) {
        Some(window) => {
            println!("Pre-event return  ({} rows): {:.4}", days, window.pre_return);
            println!("Post-event return ({} rows): {:.4}", days, window.post_return);
        }
        None => println!("Pre/post returns: insufficient data"),
    }

    match analyzer.volatility(stock, event_date, days) {
        Some(volatility) => println!("Window volatility: {:.4}", volatility),
        None => println!("Window volatility: insufficient data"),
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_sweep(
    events: PathBuf,
    prices_path: PathBuf,
    from: f64,
    to: f64,
    step: f64,
    buy_fee: f64,
    sell_fee: f64,
    qty: f64,
    risk_free: f64,
) -> Result<()> {
    if step <= 0.0 {
        anyhow::bail!("Sweep step must be positive, got {}", step);
    }

    println!("Pozole Threshold Sweep");
    println!("======================\n");

    let raw = load_raw_csv(&events)?;
    let prices = load_price_csv(&prices_path)?;
    let fees = FeeModel::new(buy_fee, sell_fee)?;

    let mut thresholds = Vec::new();
    let mut threshold = from;
    while threshold <= to + 1e-9 {
        thresholds.push(threshold);
        threshold += step;
    }

    println!(
        "Sweeping {} thresholds from {} to {}\n",
        thresholds.len(),
        from,
        to
    );

    //each run owns its engine and ledger, so runs are independent
    let results: Result<Vec<_>> = thresholds
        .par_iter()
        .map(|&threshold| -> Result<(f64, usize, MetricsReport)> {
            let policy = ThresholdPolicy::new(threshold);
            let signals = SignalMatrix::from_raw(&raw, &policy)?;
            let engine =
                TradeEngine::new(&signals, &prices, fees, qty, PositionPolicy::Skip)?;
            let outcome = engine.execute()?;
            let report = MetricsCalculator::new(&outcome.trades).calculate_all_metrics(risk_free);
            Ok((threshold, outcome.trades.len(), report))
        })
        .collect();
    let results = results?;

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Threshold"),
        Cell::new("Trades"),
        Cell::new("PnL"),
        Cell::new("Sharpe Ratio"),
        Cell::new("CAGR"),
        Cell::new("MDD"),
    ]));

    for (threshold, num_trades, report) in results {
        table.add_row(Row::new(vec![
            Cell::new(&format!("{}", threshold)),
            Cell::new(&format!("{}", num_trades)),
            Cell::new(&format!("{:.4}", report.pnl)),
            Cell::new(&format!("{:.3}", report.sharpe_ratio)),
            Cell::new(&format!("{:.4}", report.cagr)),
            Cell::new(&format!("{:.4}", report.max_drawdown)),
        ]));
    }

    table.printstd();
    Ok(())
}

fn save_trades_csv(trades: &[TradeRecord], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "date,stock_code,action,amount,price,fee,pnl")?;

    for trade in trades {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            trade.date, trade.stock_code, trade.action, trade.amount, trade.price, trade.fee,
            trade.pnl
        )?;
    }

    Ok(())
}

fn save_comparison_csv(comparison: &[ComparisonPoint], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "date,strategy,benchmark,excess")?;

    for point in comparison {
        writeln!(
            file,
            "{},{},{},{}",
            point.date, point.strategy, point.benchmark, point.excess
        )?;
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use runner::output::{print_report, write_prices, write_summary};
use runner::{CommonArgs, init_tracing, load_history, run_sma_cross};
use sweep::{ConsoleSink, ExecutionMode};

/// Sweeps SMA cross windows (short = low, long = high) and replays the winner.
#[derive(Parser, Debug)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long)]
    low_bot: Option<usize>,
    #[arg(long)]
    low_top: Option<usize>,
    #[arg(long)]
    high_bot: Option<usize>,
    #[arg(long)]
    high_top: Option<usize>,
    /// Near-best band, percent of the current best
    #[arg(long)]
    tolerance_pct: Option<f64>,
    /// Backtest each inner row on all cores
    #[arg(long, default_value_t = false)]
    parallel: bool,
    /// CSV of new-best / near-best events
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut cfg = args.common.load_config()?;
    let grid = &mut cfg.grid;
    grid.low_bot = args.low_bot.unwrap_or(grid.low_bot);
    grid.low_top = args.low_top.unwrap_or(grid.low_top);
    grid.high_bot = args.high_bot.unwrap_or(grid.high_bot);
    grid.high_top = args.high_top.unwrap_or(grid.high_top);
    if let Some(t) = args.tolerance_pct {
        cfg.sweep.tolerance_pct = t;
    }
    if args.parallel {
        cfg.sweep.execution = ExecutionMode::Parallel;
    }

    let history = load_history(&cfg, args.common.refresh).await?;
    println!("Loaded bars: {} ({})", history.len(), history.symbols().join(","));

    let run = run_sma_cross(&cfg, &history, &mut ConsoleSink)?;
    let stats = &run.outcome.stats;
    println!(
        "Evaluated: {}  New best: {}  Near best: {}  Skipped: {}  Missing metric: {}",
        stats.evaluated, stats.new_best, stats.near_best, stats.skipped, stats.missing_metrics
    );

    if let Some(path) = &args.summary_out {
        write_summary(path, &run.outcome.events)?;
        println!("Summary written to {}", path.display());
    }

    let (Some(best), Some(report)) = (run.outcome.best, run.report) else {
        println!(
            "No window pair beat the baseline of {}%",
            run.outcome.best_metric
        );
        return Ok(());
    };

    println!(
        "Best: -SMA Low: {}  -SMA High: {}  -Best Percentage: {}",
        best.low, best.high, run.outcome.best_metric
    );
    println!();
    print_report(&report);

    if let Some(path) = &args.common.prices_out {
        write_prices(path, &report)?;
        println!("Prices written to {}", path.display());
    }

    Ok(())
}

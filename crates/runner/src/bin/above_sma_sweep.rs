use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use runner::output::{print_report, write_prices, write_summary};
use runner::{CommonArgs, init_tracing, load_history, run_above_sma};
use sweep::{ConsoleSink, ExecutionMode};

/// Sweeps the SMA window of the weekly price-above-SMA rotation and replays
/// the winner.
#[derive(Parser, Debug)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long)]
    bot: Option<usize>,
    #[arg(long)]
    top: Option<usize>,
    /// Near-best band, percent of the current best
    #[arg(long)]
    tolerance_pct: Option<f64>,
    /// Backtest the whole range on all cores
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
    cfg.line.bot = args.bot.unwrap_or(cfg.line.bot);
    cfg.line.top = args.top.unwrap_or(cfg.line.top);
    if let Some(t) = args.tolerance_pct {
        cfg.sweep.tolerance_pct = t;
    }
    if args.parallel {
        cfg.sweep.execution = ExecutionMode::Parallel;
    }

    let history = load_history(&cfg, args.common.refresh).await?;
    println!("Loaded bars: {} ({})", history.len(), history.symbols().join(","));

    let run = run_above_sma(&cfg, &history, &mut ConsoleSink)?;
    let stats = &run.outcome.stats;
    println!(
        "Evaluated: {}  New best: {}  Near best: {}  Missing metric: {}",
        stats.evaluated, stats.new_best, stats.near_best, stats.missing_metrics
    );

    if let Some(path) = &args.summary_out {
        write_summary(path, &run.outcome.events)?;
        println!("Summary written to {}", path.display());
    }

    let (Some(best), Some(report)) = (run.outcome.best, run.report) else {
        println!("No window beat the baseline of {}%", run.outcome.best_metric);
        return Ok(());
    };

    println!(
        "Best: -SMA Value: {}  -Best Percentage: {}",
        best.0, run.outcome.best_metric
    );
    println!();
    print_report(&report);

    if let Some(path) = &args.common.prices_out {
        write_prices(path, &report)?;
        println!("Prices written to {}", path.display());
    }

    Ok(())
}

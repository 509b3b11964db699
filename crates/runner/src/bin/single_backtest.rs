use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use runner::output::{print_report, write_prices};
use runner::{CommonArgs, init_tracing, load_history, run_strategy};
use strategy::{above_sma, ma_cross};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum StrategyKind {
    MaCross,
    AboveSma,
}

/// Single backtest of one strategy with fixed windows.
#[derive(Parser, Debug)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long, value_enum, default_value = "ma-cross")]
    strategy: StrategyKind,
    /// ma-cross short window
    #[arg(long, default_value_t = 10)]
    short: usize,
    /// ma-cross long window
    #[arg(long, default_value_t = 50)]
    long: usize,
    /// above-sma window
    #[arg(long, default_value_t = 50)]
    sma: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.short == 0 || args.long == 0 || args.sma == 0 {
        bail!("windows must be positive");
    }

    let cfg = args.common.load_config()?;
    let history = load_history(&cfg, args.common.refresh).await?;
    println!("Loaded bars: {} ({})", history.len(), history.symbols().join(","));

    let spec = match args.strategy {
        StrategyKind::MaCross => ma_cross(&history, args.short, args.long),
        StrategyKind::AboveSma => above_sma(&history, args.sma),
    };

    let report = run_strategy(&cfg, &history, &spec)?;
    print_report(&report);

    if let Some(path) = &args.common.prices_out {
        write_prices(path, &report)?;
        println!("Prices written to {}", path.display());
    }

    Ok(())
}

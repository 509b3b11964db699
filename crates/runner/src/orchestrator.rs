use anyhow::{Context, Result};
use backtest::{BacktestReport, Engine, SimEngine};
use bybit::{BybitRest, load_or_fetch};
use strategy::StrategySpec;
use sweep::{
    AboveSmaBuilder, CrossWindows, EngineEvaluator, MaCrossBuilder, ReportSink, SearchOutcome,
    StrategyBuilder, Window, above_sma_optimal_value, sma_cross_optimal_values,
};
use tracing::info;
use types::PriceHistory;

use crate::cli::range_ms;
use crate::config::RunConfig;

/// A finished sweep plus the full backtest of its winner.
#[derive(Debug)]
pub struct SweepRun<C> {
    pub outcome: SearchOutcome<C>,
    /// `None` when nothing beat the baseline.
    pub report: Option<BacktestReport>,
}

pub async fn load_history(cfg: &RunConfig, refresh: bool) -> Result<PriceHistory> {
    let (start_ms, end_ms) = range_ms(cfg)?;
    let history = load_or_fetch(
        &BybitRest::new(),
        cfg.category.into(),
        &cfg.symbols,
        &cfg.interval,
        start_ms,
        end_ms,
        &cfg.cache,
        refresh,
    )
    .await?;

    if history.len() < 2 {
        anyhow::bail!("not enough bars: {}", history.len());
    }
    Ok(history)
}

fn engine(cfg: &RunConfig) -> SimEngine {
    SimEngine {
        initial_capital: cfg.initial_capital,
        exec: cfg.execution,
    }
}

fn replay<C, B>(
    cfg: &RunConfig,
    history: &PriceHistory,
    builder: &B,
    best: Option<&C>,
) -> Result<Option<BacktestReport>>
where
    C: std::fmt::Display,
    B: StrategyBuilder<C>,
{
    let Some(best) = best else {
        return Ok(None);
    };
    let report = run_strategy(cfg, history, &builder.build(best, history))
        .with_context(|| format!("final run of {} failed", best))?;
    Ok(Some(report))
}

pub fn run_strategy(
    cfg: &RunConfig,
    history: &PriceHistory,
    spec: &StrategySpec,
) -> Result<BacktestReport> {
    let report = engine(cfg).run(spec, history)?;
    info!(strategy = %spec.name, total_return = ?report.total_return_pct(), "backtest finished");
    Ok(report)
}

pub fn run_sma_cross<R>(
    cfg: &RunConfig,
    history: &PriceHistory,
    sink: &mut R,
) -> Result<SweepRun<CrossWindows>>
where
    R: ReportSink<CrossWindows> + ?Sized,
{
    let evaluator = EngineEvaluator::new(engine(cfg), MaCrossBuilder, history, cfg.sweep.metric_source);
    let outcome = sma_cross_optimal_values(&evaluator, cfg.grid, &cfg.sweep, sink)?;
    let report = replay(cfg, history, &MaCrossBuilder, outcome.best.as_ref())?;
    Ok(SweepRun { outcome, report })
}

pub fn run_above_sma<R>(
    cfg: &RunConfig,
    history: &PriceHistory,
    sink: &mut R,
) -> Result<SweepRun<Window>>
where
    R: ReportSink<Window> + ?Sized,
{
    let evaluator =
        EngineEvaluator::new(engine(cfg), AboveSmaBuilder, history, cfg.sweep.metric_source);
    let outcome = above_sma_optimal_value(&evaluator, cfg.line, &cfg.sweep, sink)?;
    let report = replay(cfg, history, &AboveSmaBuilder, outcome.best.as_ref())?;
    Ok(SweepRun { outcome, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep::{CollectingSink, GridBounds, LineBounds, ReportEvent};
    use types::{Price, TimestampMs};

    fn history() -> PriceHistory {
        // 2014-01-01, daily
        let start = 1_388_534_400_000;
        let closes: Vec<Price> = (0..160)
            .map(|i| {
                let t = i as f64;
                Price(100.0 + t * 0.6 + 6.0 * (t / 6.0).sin())
            })
            .collect();
        PriceHistory::single(
            "BTCUSDT",
            (0..160).map(|d| TimestampMs(start + d * crate::cli::DAY_MS)).collect(),
            closes,
        )
        .unwrap()
    }

    fn small_cfg() -> RunConfig {
        RunConfig {
            grid: GridBounds {
                low_bot: 2,
                low_top: 8,
                high_bot: 5,
                high_top: 30,
            },
            line: LineBounds { bot: 2, top: 30 },
            ..RunConfig::default()
        }
    }

    #[test]
    fn cross_sweep_replays_its_winner() {
        let h = history();
        let mut sink = CollectingSink::default();
        let run = run_sma_cross(&small_cfg(), &h, &mut sink).unwrap();

        assert_eq!(sink.events, run.outcome.events);
        match (&run.outcome.best, &run.report) {
            (Some(best), Some(report)) => {
                assert!(best.low < best.high);
                let replayed = report.total_return_pct().unwrap();
                assert_eq!(replayed, run.outcome.best_metric);
                assert_eq!(
                    sink.events.iter().rev().find_map(|e| match e {
                        ReportEvent::NewBest { candidate, .. } => Some(*candidate),
                        _ => None,
                    }),
                    Some(*best)
                );
            }
            (None, None) => assert_eq!(run.outcome.best_metric, 1.0),
            other => panic!("winner and replay disagree: {:?}", other),
        }
    }

    #[test]
    fn line_sweep_on_trend_beats_baseline() {
        let h = history();
        let run = run_above_sma(&small_cfg(), &h, &mut sweep::NullSink).unwrap();

        let best = run.outcome.best.expect("rising series should beat 1%");
        let report = run.report.unwrap();
        assert_eq!(report.total_return_pct(), Some(run.outcome.best_metric));
        assert!(best.0 >= 2 && best.0 < 30);
    }
}

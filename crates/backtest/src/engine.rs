use execution::ExecutionModel;
use strategy::{Schedule, StrategySpec};
use tracing::trace;
use types::{PriceHistory, TimestampMs};

use crate::report::BacktestReport;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EngineError {
    #[error("cannot backtest an empty price history")]
    EmptyHistory,
    #[error("strategy {name} has {got_rows} target rows, history has {expected_rows}")]
    RowMismatch {
        name: String,
        expected_rows: usize,
        got_rows: usize,
    },
    #[error("strategy {name} row {row} has {got} weights, history has {expected} symbols")]
    WidthMismatch {
        name: String,
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("non-positive or non-finite close for {symbol} at row {row}")]
    InvalidPrice { symbol: String, row: usize },
    #[error("initial capital must be positive, got {0}")]
    InvalidCapital(f64),
}

/// Runs one strategy over one price history.
///
/// Implementations must be deterministic: the same spec and history always
/// produce the same report.
pub trait Engine {
    fn run(&self, spec: &StrategySpec, history: &PriceHistory) -> Result<BacktestReport, EngineError>;
}

/// Target-weight simulator.
///
/// On every bar where the strategy schedule fires, each position is moved to
/// `weight * equity / close` units, paying the execution model's costs.
/// Equity is marked at the close of every bar and rebased to 100.
#[derive(Debug, Copy, Clone)]
pub struct SimEngine {
    pub initial_capital: f64,
    pub exec: ExecutionModel,
}

impl Default for SimEngine {
    fn default() -> Self {
        Self {
            initial_capital: 1_000_000.0,
            exec: ExecutionModel::frictionless(),
        }
    }
}

impl SimEngine {
    fn validate(&self, spec: &StrategySpec, history: &PriceHistory) -> Result<(), EngineError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(EngineError::InvalidCapital(self.initial_capital));
        }
        if history.is_empty() {
            return Err(EngineError::EmptyHistory);
        }
        if spec.rows() != history.len() {
            return Err(EngineError::RowMismatch {
                name: spec.name.clone(),
                expected_rows: history.len(),
                got_rows: spec.rows(),
            });
        }
        if let Some((row, t)) = spec
            .targets
            .iter()
            .enumerate()
            .find(|(_, t)| t.len() != history.width())
        {
            return Err(EngineError::WidthMismatch {
                name: spec.name.clone(),
                row,
                expected: history.width(),
                got: t.len(),
            });
        }
        for (idx, symbol) in history.symbols().iter().enumerate() {
            if let Some(row) = history
                .column(idx)
                .iter()
                .position(|p| !(p.0.is_finite() && p.0 > 0.0))
            {
                return Err(EngineError::InvalidPrice {
                    symbol: symbol.clone(),
                    row,
                });
            }
        }
        Ok(())
    }
}

fn rebalance_due(schedule: Schedule, row: usize, ts: TimestampMs, prev: Option<TimestampMs>) -> bool {
    match schedule {
        Schedule::EveryBar => true,
        Schedule::Weekly => match prev {
            None => row == 0,
            Some(p) => p.iso_week() != ts.iso_week(),
        },
    }
}

impl Engine for SimEngine {
    fn run(&self, spec: &StrategySpec, history: &PriceHistory) -> Result<BacktestReport, EngineError> {
        self.validate(spec, history)?;

        let width = history.width();
        let mut cash = self.initial_capital;
        let mut qty = vec![0.0_f64; width];
        let mut prices = Vec::with_capacity(history.len());
        let mut prev_ts: Option<TimestampMs> = None;

        let mark = |cash: f64, qty: &[f64], row: usize| -> f64 {
            cash + qty
                .iter()
                .enumerate()
                .map(|(i, q)| q * history.close(row, i).0)
                .sum::<f64>()
        };

        for (row, &ts) in history.timestamps().iter().enumerate() {
            if rebalance_due(spec.schedule, row, ts, prev_ts) {
                // wiped-out account can only go flat
                let equity = mark(cash, &qty, row).max(0.0);

                for (i, held) in qty.iter_mut().enumerate() {
                    let close = history.close(row, i);
                    let target = spec.targets[row][i] * equity / close.0;
                    cash += self.exec.cash_delta(target - *held, close);
                    *held = target;
                }
                trace!(row, equity, "rebalanced");
            }

            prices.push(mark(cash, &qty, row) / self.initial_capital * 100.0);
            prev_ts = Some(ts);
        }

        Ok(BacktestReport::new(
            spec.name.clone(),
            history.timestamps().to_vec(),
            prices,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Price, Weight};

    const DAY: i64 = 24 * 60 * 60 * 1000;
    // Monday 2014-01-06
    const MONDAY: i64 = 1_388_966_400_000;

    fn history(closes: &[f64]) -> PriceHistory {
        PriceHistory::single(
            "ETHUSDT",
            (0..closes.len() as i64).map(|d| TimestampMs(MONDAY + d * DAY)).collect(),
            closes.iter().copied().map(Price).collect(),
        )
        .unwrap()
    }

    fn constant(weight: Weight, rows: usize, schedule: Schedule) -> StrategySpec {
        StrategySpec {
            name: "const".into(),
            schedule,
            targets: vec![vec![weight]; rows],
        }
    }

    #[test]
    fn fully_long_tracks_the_underlying() {
        let h = history(&[10.0, 11.0, 12.0]);
        let report = SimEngine::default()
            .run(&constant(Weight::LONG, 3, Schedule::EveryBar), &h)
            .unwrap();

        assert_eq!(report.prices.len(), 3);
        assert!((report.prices[2] - 120.0).abs() < 1e-9);
        assert!((report.total_return_pct().unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn short_profits_from_decline() {
        let h = history(&[10.0, 9.0, 8.0]);
        let report = SimEngine::default()
            .run(&constant(Weight::SHORT, 3, Schedule::EveryBar), &h)
            .unwrap();

        assert!(report.total_return_pct().unwrap() > 0.0);
    }

    #[test]
    fn flat_strategy_keeps_capital() {
        let h = history(&[10.0, 20.0, 5.0]);
        let report = SimEngine::default()
            .run(&constant(Weight::FLAT, 3, Schedule::EveryBar), &h)
            .unwrap();

        assert_eq!(report.total_return_pct(), Some(0.0));
    }

    #[test]
    fn weekly_schedule_ignores_mid_week_targets() {
        // Mon..Sun flat, goes long only from Tuesday on; weekly never picks it up
        let h = history(&[10.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let mut spec = constant(Weight::LONG, 7, Schedule::Weekly);
        spec.targets[0] = vec![Weight::FLAT];

        let report = SimEngine::default().run(&spec, &h).unwrap();
        assert_eq!(report.total_return_pct(), Some(0.0));

        // next Monday the long target applies
        let h = history(&[10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 20.0]);
        let mut spec = constant(Weight::LONG, 9, Schedule::Weekly);
        spec.targets[0] = vec![Weight::FLAT];
        let report = SimEngine::default().run(&spec, &h).unwrap();
        assert!((report.total_return_pct().unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn fees_drag_returns() {
        let h = history(&[10.0, 11.0, 12.0]);
        let engine = SimEngine {
            initial_capital: 1_000_000.0,
            exec: ExecutionModel {
                fee_bps: 10.0,
                spread_bps: 0.0,
                slippage_bps: 0.0,
            },
        };
        let report = engine
            .run(&constant(Weight::LONG, 3, Schedule::EveryBar), &h)
            .unwrap();

        assert!(report.total_return_pct().unwrap() < 20.0);
    }

    #[test]
    fn rejects_mismatched_and_invalid_inputs() {
        let h = history(&[10.0, 11.0]);
        let engine = SimEngine::default();

        assert!(matches!(
            engine.run(&constant(Weight::LONG, 3, Schedule::EveryBar), &h),
            Err(EngineError::RowMismatch { .. })
        ));

        let bad = history(&[10.0, 0.0]);
        assert_eq!(
            engine.run(&constant(Weight::LONG, 2, Schedule::EveryBar), &bad),
            Err(EngineError::InvalidPrice {
                symbol: "ETHUSDT".into(),
                row: 1
            })
        );

        let empty = PriceHistory::single("ETHUSDT", vec![], vec![]).unwrap();
        assert_eq!(
            engine.run(&constant(Weight::LONG, 0, Schedule::EveryBar), &empty),
            Err(EngineError::EmptyHistory)
        );
    }
}

use backtest::{BacktestReport, Engine};
use serde::Deserialize;
use strategy::{StrategySpec, above_sma, ma_cross};
use tracing::trace;
use types::PriceHistory;

use crate::candidate::{CrossWindows, Window};
use crate::error::EvalError;
use crate::scrape::scrape_total_return;

/// Result of reading the metric off one backtest.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MetricReading {
    /// Total return, percent.
    Reported(f64),
    /// The report had no usable total return.
    Missing,
}

impl MetricReading {
    pub fn value_or(self, fallback: f64) -> f64 {
        match self {
            MetricReading::Reported(v) => v,
            MetricReading::Missing => fallback,
        }
    }
}

/// Where the total return is taken from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    /// `BacktestReport::total_return_pct`.
    #[default]
    Structured,
    /// Render the report and scrape its `Total Return` line.
    ReportText,
}

/// Turns a candidate into a metric. Must be deterministic.
pub trait Evaluator<C> {
    fn evaluate(&self, candidate: &C) -> Result<MetricReading, EvalError>;
}

impl<C, F> Evaluator<C> for F
where
    F: Fn(&C) -> Result<MetricReading, EvalError>,
{
    fn evaluate(&self, candidate: &C) -> Result<MetricReading, EvalError> {
        self(candidate)
    }
}

/// Builds the strategy a candidate stands for.
pub trait StrategyBuilder<C> {
    fn build(&self, candidate: &C, history: &PriceHistory) -> StrategySpec;
}

/// `low`/`high` → `ma_cross(short = low, long = high)`.
#[derive(Debug, Default, Copy, Clone)]
pub struct MaCrossBuilder;

impl StrategyBuilder<CrossWindows> for MaCrossBuilder {
    fn build(&self, candidate: &CrossWindows, history: &PriceHistory) -> StrategySpec {
        ma_cross(history, candidate.low, candidate.high)
    }
}

/// `value` → `above_sma(sma_per = value)`.
#[derive(Debug, Default, Copy, Clone)]
pub struct AboveSmaBuilder;

impl StrategyBuilder<Window> for AboveSmaBuilder {
    fn build(&self, candidate: &Window, history: &PriceHistory) -> StrategySpec {
        above_sma(history, candidate.0)
    }
}

/// Builds the candidate's strategy, backtests it and reads the total return.
pub struct EngineEvaluator<'a, E, B> {
    pub engine: E,
    pub builder: B,
    pub history: &'a PriceHistory,
    pub source: MetricSource,
}

impl<'a, E, B> EngineEvaluator<'a, E, B> {
    pub fn new(engine: E, builder: B, history: &'a PriceHistory, source: MetricSource) -> Self {
        Self {
            engine,
            builder,
            history,
            source,
        }
    }
}

pub fn extract_metric(report: &BacktestReport, source: MetricSource) -> MetricReading {
    match source {
        MetricSource::Structured => match report.total_return_pct() {
            Some(v) => MetricReading::Reported(v),
            None => MetricReading::Missing,
        },
        MetricSource::ReportText => scrape_total_return(&report.to_string()),
    }
}

impl<C, E, B> Evaluator<C> for EngineEvaluator<'_, E, B>
where
    C: std::fmt::Display,
    E: Engine,
    B: StrategyBuilder<C>,
{
    fn evaluate(&self, candidate: &C) -> Result<MetricReading, EvalError> {
        let spec = self.builder.build(candidate, self.history);
        let report = self.engine.run(&spec, self.history)?;
        let reading = extract_metric(&report, self.source);
        trace!(%candidate, ?reading, "backtest finished");
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backtest::SimEngine;
    use types::{Price, TimestampMs};

    const DAY: i64 = 24 * 60 * 60 * 1000;

    fn history(closes: &[f64]) -> PriceHistory {
        PriceHistory::single(
            "BTCUSDT",
            (0..closes.len() as i64).map(|d| TimestampMs(d * DAY)).collect(),
            closes.iter().copied().map(Price).collect(),
        )
        .unwrap()
    }

    fn zigzag() -> Vec<f64> {
        (0..120)
            .map(|i| 100.0 + 10.0 * ((i as f64) / 7.0).sin() + i as f64 * 0.2)
            .collect()
    }

    #[test]
    fn structured_and_text_readings_agree() {
        let h = history(&zigzag());
        let c = CrossWindows { low: 3, high: 11 };

        let structured = EngineEvaluator::new(
            SimEngine::default(),
            MaCrossBuilder,
            &h,
            MetricSource::Structured,
        );
        let text = EngineEvaluator::new(
            SimEngine::default(),
            MaCrossBuilder,
            &h,
            MetricSource::ReportText,
        );

        let MetricReading::Reported(a) = structured.evaluate(&c).unwrap() else {
            panic!("structured metric missing");
        };
        let MetricReading::Reported(b) = text.evaluate(&c).unwrap() else {
            panic!("scraped metric missing");
        };
        // text is rounded to two decimals
        assert!((a - b).abs() <= 0.005 + 1e-9, "{a} vs {b}");
    }

    #[test]
    fn evaluation_is_deterministic() {
        let h = history(&zigzag());
        let ev = EngineEvaluator::new(
            SimEngine::default(),
            AboveSmaBuilder,
            &h,
            MetricSource::Structured,
        );
        assert_eq!(ev.evaluate(&Window(10)).unwrap(), ev.evaluate(&Window(10)).unwrap());
    }

    #[test]
    fn engine_errors_surface() {
        let h = history(&[100.0, 101.0]);
        let ev = EngineEvaluator::new(
            SimEngine {
                initial_capital: 0.0,
                ..SimEngine::default()
            },
            AboveSmaBuilder,
            &h,
            MetricSource::Structured,
        );
        assert!(matches!(ev.evaluate(&Window(2)), Err(EvalError::Engine(_))));
    }

    #[test]
    fn closures_are_evaluators() {
        let f = |w: &Window| -> Result<MetricReading, EvalError> {
            Ok(MetricReading::Reported(w.0 as f64))
        };
        assert_eq!(f.evaluate(&Window(7)).unwrap(), MetricReading::Reported(7.0));
        assert_eq!(MetricReading::Missing.value_or(0.0), 0.0);
    }
}

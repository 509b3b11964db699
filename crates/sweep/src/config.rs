use serde::Deserialize;

use crate::error::SearchError;
use crate::evaluator::MetricSource;

/// How candidate evaluations are scheduled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One backtest at a time, in enumeration order.
    #[default]
    Sequential,
    /// Backtests of the rest of the current inner row run on the rayon pool;
    /// classification still folds over them in enumeration order.
    Parallel,
}

/// Search policy knobs. Defaults reproduce the historical sweep behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Near-best band width, percent of the current best.
    pub tolerance_pct: f64,
    /// Starting value of the best metric. Nothing at or below it can win.
    pub baseline_metric: f64,
    /// Inner values jumped over after a far-from-best result (2D only, 0 disables).
    pub skip_distance: usize,
    /// Metric used when a report carries no total return.
    pub missing_metric_value: f64,
    pub metric_source: MetricSource,
    pub execution: ExecutionMode,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            tolerance_pct: 4.0,
            baseline_metric: 1.0,
            skip_distance: 5,
            missing_metric_value: 0.0,
            metric_source: MetricSource::Structured,
            execution: ExecutionMode::Sequential,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.baseline_metric.is_finite() && self.baseline_metric > 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "baseline_metric must be positive, got {}",
                self.baseline_metric
            )));
        }
        if !(self.tolerance_pct.is_finite() && self.tolerance_pct >= 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "tolerance_pct must be >= 0, got {}",
                self.tolerance_pct
            )));
        }
        if !self.missing_metric_value.is_finite() {
            return Err(SearchError::InvalidConfig(
                "missing_metric_value must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn band(&self) -> ToleranceBand {
        ToleranceBand::new(self.tolerance_pct)
    }
}

/// "Near-best" test against whatever the best is at comparison time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ToleranceBand {
    tolerance_pct: f64,
}

impl ToleranceBand {
    pub fn new(tolerance_pct: f64) -> Self {
        Self { tolerance_pct }
    }

    pub fn contains(self, metric: f64, best: f64) -> bool {
        metric / best > 1.0 - self.tolerance_pct / 100.0
    }

    /// How far below `best` the metric is, in percent of `best`.
    pub fn distance_pct(metric: f64, best: f64) -> f64 {
        100.0 - (metric / best) * 100.0
    }
}

/// Bounds of the two-dimensional sweep, half-open on both axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct GridBounds {
    pub low_bot: usize,
    pub low_top: usize,
    pub high_bot: usize,
    pub high_top: usize,
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            low_bot: 10,
            low_top: 100,
            high_bot: 20,
            high_top: 225,
        }
    }
}

/// Bounds of the one-dimensional sweep, `[bot, top)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct LineBounds {
    pub bot: usize,
    pub top: usize,
}

impl Default for LineBounds {
    fn default() -> Self {
        Self { bot: 5, top: 225 }
    }
}

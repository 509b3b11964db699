use std::fmt;

use types::{Percent, TimestampMs};

use crate::monthly::{MonthlyTable, monthly_returns};
use crate::stats::Stats;

const MS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0 * 1000.0;
const LABEL_WIDTH: usize = 21;

/// Result of one backtest run.
///
/// `prices` is the equity trajectory rebased to 100, one point per bar.
/// The `Display` rendering is a plain-text stats table; its
/// `Total Return   12.34%` line is what legacy report scrapers read.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub name: String,
    pub timestamps: Vec<TimestampMs>,
    pub prices: Vec<f64>,
    stats: Stats,
}

impl BacktestReport {
    pub fn new(name: String, timestamps: Vec<TimestampMs>, prices: Vec<f64>) -> Self {
        let years = match (timestamps.first(), timestamps.last()) {
            (Some(a), Some(b)) => (b.0 - a.0) as f64 / MS_PER_YEAR,
            _ => 0.0,
        };
        let stats = Stats::compute(&prices, years);
        Self {
            name,
            timestamps,
            prices,
            stats,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Total return in percent, `None` when the trajectory degenerated
    /// (NaN / infinite equity).
    pub fn total_return_pct(&self) -> Option<f64> {
        let pct = Percent::from_fraction(self.stats.total_return).0;
        pct.is_finite().then_some(pct)
    }

    pub fn monthly_returns(&self) -> MonthlyTable {
        MonthlyTable::new(monthly_returns(&self.timestamps, &self.prices))
    }
}

fn pct(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => Percent::from_fraction(x).to_string(),
        _ => "-".to_string(),
    }
}

fn num(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{:.2}", x),
        _ => "-".to_string(),
    }
}

impl fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = LABEL_WIDTH;
        let start = self.timestamps.first().map(|t| t.to_string()).unwrap_or_default();
        let end = self.timestamps.last().map(|t| t.to_string()).unwrap_or_default();
        let s = &self.stats;

        writeln!(f, "{:<w$}{}", "Stat", self.name)?;
        writeln!(f, "{:<w$}{}", "-".repeat(w - 2), "-".repeat(self.name.len().max(10)))?;
        writeln!(f, "{:<w$}{}", "Start", start)?;
        writeln!(f, "{:<w$}{}", "End", end)?;
        writeln!(f, "{:<w$}{}", "Risk-free rate", Percent(0.0))?;
        writeln!(f)?;
        writeln!(f, "{:<w$}{}", "Total Return", pct(Some(s.total_return)))?;
        writeln!(f, "{:<w$}{}", "Daily Sharpe", num(s.daily_sharpe))?;
        writeln!(f, "{:<w$}{}", "Daily Vol", pct(s.daily_vol))?;
        writeln!(f, "{:<w$}{}", "CAGR", pct(s.cagr))?;
        writeln!(f, "{:<w$}{}", "Max Drawdown", pct(Some(s.max_drawdown)))?;
        writeln!(f, "{:<w$}{}", "Best Day", pct(s.best_day))?;
        writeln!(f, "{:<w$}{}", "Worst Day", pct(s.worst_day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 24 * 60 * 60 * 1000;

    fn report(prices: &[f64]) -> BacktestReport {
        BacktestReport::new(
            "ma_cross".into(),
            (0..prices.len() as i64).map(|d| TimestampMs(d * DAY)).collect(),
            prices.to_vec(),
        )
    }

    #[test]
    fn renders_total_return_line_with_percent_token() {
        let text = report(&[100.0, 105.0, 112.5]).to_string();
        let line = text.lines().find(|l| l.contains("Total Return")).unwrap();
        let tokens: Vec<&str> = line.split_whitespace().collect();

        assert_eq!(tokens, vec!["Total", "Return", "12.50%"]);
    }

    #[test]
    fn renders_header_and_dates() {
        let text = report(&[100.0, 99.0]).to_string();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("Stat"));
        assert!(text.contains("Start                1970-01-01"));
        assert!(text.contains("End                  1970-01-02"));
        assert!(text.contains("Max Drawdown         -1.00%"));
    }

    #[test]
    fn degenerate_trajectory_has_no_structured_return() {
        let r = report(&[100.0, f64::NAN]);
        assert_eq!(r.total_return_pct(), None);
        assert!(r.to_string().contains("Total Return         -"));
    }
}

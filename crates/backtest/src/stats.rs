const TRADING_DAYS: f64 = 252.0;

/// Summary statistics of one equity trajectory (fractions, not percents).
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total_return: f64,
    pub cagr: Option<f64>,
    pub max_drawdown: f64,
    pub daily_sharpe: Option<f64>,
    pub daily_vol: Option<f64>,
    pub best_day: Option<f64>,
    pub worst_day: Option<f64>,
}

impl Stats {
    /// `prices` is rebased to 100 at the start; `years` is the calendar span.
    pub fn compute(prices: &[f64], years: f64) -> Self {
        let first = prices.first().copied().unwrap_or(100.0);
        let last = prices.last().copied().unwrap_or(100.0);
        let total_return = last / 100.0 - 1.0;

        let cagr = if years > 0.0 && last > 0.0 {
            Some((last / 100.0).powf(1.0 / years) - 1.0)
        } else {
            None
        };

        let mut peak = first;
        let mut max_drawdown = 0.0_f64;
        for &p in prices {
            peak = peak.max(p);
            if peak > 0.0 {
                max_drawdown = max_drawdown.min(p / peak - 1.0);
            }
        }

        let returns: Vec<f64> = prices
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| w[1] / w[0] - 1.0)
            .collect();

        let best_day = returns.iter().copied().reduce(f64::max);
        let worst_day = returns.iter().copied().reduce(f64::min);

        let (daily_sharpe, daily_vol) = if returns.len() >= 2 {
            let n = returns.len() as f64;
            let mean = returns.iter().sum::<f64>() / n;
            let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            let std = var.sqrt();
            let vol = Some(std * TRADING_DAYS.sqrt());
            if std > 0.0 {
                (Some(mean / std * TRADING_DAYS.sqrt()), vol)
            } else {
                (None, vol)
            }
        } else {
            (None, None)
        };

        Self {
            total_return,
            cagr,
            max_drawdown,
            daily_sharpe,
            daily_vol,
            best_day,
            worst_day,
        }
    }
}

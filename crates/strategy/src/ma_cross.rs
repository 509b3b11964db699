use indicators::sma_column;
use types::{PriceHistory, Weight};

use crate::spec::{Schedule, StrategySpec};

/// Целевой вес для одного бара SMA-кросса
pub fn cross_weight(short: Option<f64>, long: Option<f64>) -> Weight {
    match (short, long) {
        (Some(s), Some(l)) if s > l => Weight::LONG,
        (Some(_), Some(_)) => Weight::SHORT,
        // длинная SMA ещё не прогрелась, вне рынка
        _ => Weight::FLAT,
    }
}

/// SMA cross: long when the short SMA is above the long SMA, short otherwise,
/// flat until the long SMA is defined. Rebalances on every bar.
pub fn ma_cross(history: &PriceHistory, short_ma: usize, long_ma: usize) -> StrategySpec {
    let mut targets = vec![Vec::with_capacity(history.width()); history.len()];

    for symbol_idx in 0..history.width() {
        let short = sma_column(history, symbol_idx, short_ma);
        let long = sma_column(history, symbol_idx, long_ma);

        for (row, target) in targets.iter_mut().enumerate() {
            target.push(cross_weight(
                short[row].map(|p| p.0),
                long[row].map(|p| p.0),
            ));
        }
    }

    StrategySpec {
        name: "ma_cross".to_string(),
        schedule: Schedule::EveryBar,
        targets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Price, TimestampMs};

    fn history(closes: &[f64]) -> PriceHistory {
        PriceHistory::single(
            "ETHUSDT",
            (0..closes.len() as i64).map(TimestampMs).collect(),
            closes.iter().copied().map(Price).collect(),
        )
        .unwrap()
    }

    #[test]
    fn flat_until_long_sma_defined() {
        let spec = ma_cross(&history(&[1.0, 2.0, 3.0, 4.0]), 1, 3);
        assert_eq!(spec.targets[0], vec![Weight::FLAT]);
        assert_eq!(spec.targets[1], vec![Weight::FLAT]);
        assert_eq!(spec.schedule, Schedule::EveryBar);
    }

    #[test]
    fn long_on_uptrend_short_on_downtrend() {
        let up = ma_cross(&history(&[1.0, 2.0, 3.0, 4.0]), 1, 3);
        assert_eq!(up.targets[3], vec![Weight::LONG]);

        let down = ma_cross(&history(&[4.0, 3.0, 2.0, 1.0]), 1, 3);
        assert_eq!(down.targets[3], vec![Weight::SHORT]);
    }

    #[test]
    fn equal_smas_count_as_short() {
        assert_eq!(cross_weight(Some(2.0), Some(2.0)), Weight::SHORT);
        assert_eq!(cross_weight(None, Some(2.0)), Weight::FLAT);
    }
}

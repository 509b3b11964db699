use indicators::sma_column;
use types::{PriceHistory, Weight};

use crate::spec::{Schedule, StrategySpec};

/// Weekly: select the symbols trading above their SMA and weigh them equally.
/// Symbols below (or without) an SMA get zero weight.
pub fn above_sma(history: &PriceHistory, sma_per: usize) -> StrategySpec {
    let smas: Vec<_> = (0..history.width())
        .map(|idx| sma_column(history, idx, sma_per))
        .collect();

    let mut targets = Vec::with_capacity(history.len());
    for row in 0..history.len() {
        let selected: Vec<bool> = smas
            .iter()
            .enumerate()
            .map(|(idx, sma)| match sma[row] {
                Some(avg) => history.close(row, idx).0 > avg.0,
                None => false,
            })
            .collect();

        let n = selected.iter().filter(|s| **s).count();
        let w = if n > 0 { 1.0 / n as f64 } else { 0.0 };

        targets.push(
            selected
                .into_iter()
                .map(|s| if s { Weight(w) } else { Weight::FLAT })
                .collect(),
        );
    }

    StrategySpec {
        name: "above_sma".to_string(),
        schedule: Schedule::Weekly,
        targets,
    }
}

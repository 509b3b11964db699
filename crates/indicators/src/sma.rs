use types::{Price, PriceHistory};

/// Простая скользящая средняя по окну `window`.
///
/// Первые `window - 1` значений не определены (`None`), как и весь ряд при
/// `window == 0` или когда данных меньше окна.
pub fn rolling_mean(values: &[Price], window: usize) -> Vec<Option<Price>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut sum: f64 = values[..window].iter().map(|p| p.0).sum();
    out[window - 1] = Some(Price(sum / window as f64));

    for i in window..values.len() {
        sum += values[i].0 - values[i - window].0;
        out[i] = Some(Price(sum / window as f64));
    }

    out
}

/// SMA для одной колонки истории.
pub fn sma_column(history: &PriceHistory, symbol_idx: usize, window: usize) -> Vec<Option<Price>> {
    rolling_mean(history.column(symbol_idx), window)
}

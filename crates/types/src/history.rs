use crate::units::{Price, TimestampMs};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HistoryError {
    #[error("price history needs at least one symbol")]
    NoSymbols,
    #[error("symbol {symbol} has {got} closes, expected {expected}")]
    LengthMismatch {
        symbol: String,
        expected: usize,
        got: usize,
    },
    #[error("timestamps must be strictly increasing (row {row})")]
    Unordered { row: usize },
}

/// Close-price table: one column per symbol, rows aligned on `timestamps`.
///
/// This is the input every strategy builder and backtest run works against.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    symbols: Vec<String>,
    timestamps: Vec<TimestampMs>,
    closes: Vec<Vec<Price>>,
}

impl PriceHistory {
    pub fn new(
        symbols: Vec<String>,
        timestamps: Vec<TimestampMs>,
        closes: Vec<Vec<Price>>,
    ) -> Result<Self, HistoryError> {
        if symbols.is_empty() || symbols.len() != closes.len() {
            return Err(HistoryError::NoSymbols);
        }

        for (symbol, column) in symbols.iter().zip(&closes) {
            if column.len() != timestamps.len() {
                return Err(HistoryError::LengthMismatch {
                    symbol: symbol.clone(),
                    expected: timestamps.len(),
                    got: column.len(),
                });
            }
        }

        if let Some(row) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(HistoryError::Unordered { row: row + 1 });
        }

        Ok(Self {
            symbols,
            timestamps,
            closes,
        })
    }

    /// Single-symbol shortcut.
    pub fn single(
        symbol: impl Into<String>,
        timestamps: Vec<TimestampMs>,
        closes: Vec<Price>,
    ) -> Result<Self, HistoryError> {
        Self::new(vec![symbol.into()], timestamps, vec![closes])
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn timestamps(&self) -> &[TimestampMs] {
        &self.timestamps
    }

    /// Closes of one symbol, in time order.
    pub fn column(&self, symbol_idx: usize) -> &[Price] {
        &self.closes[symbol_idx]
    }

    pub fn close(&self, row: usize, symbol_idx: usize) -> Price {
        self.closes[symbol_idx][row]
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn width(&self) -> usize {
        self.symbols.len()
    }
}

use serde::Deserialize;
use types::{Bps, Price};

/// Cost model applied when the backtest moves a position towards its target.
///
/// Fills are taken at mid ± (half spread + slippage); the fee is charged on
/// the filled notional. All zeros = frictionless fills at the close.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExecutionModel {
    pub fee_bps: f64,
    pub spread_bps: f64,
    pub slippage_bps: f64,
}

impl Default for ExecutionModel {
    fn default() -> Self {
        Self::frictionless()
    }
}

impl ExecutionModel {
    pub fn frictionless() -> Self {
        Self {
            fee_bps: 0.0,
            spread_bps: 0.0,
            slippage_bps: 0.0,
        }
    }

    fn adverse_fraction(self) -> f64 {
        Bps(self.spread_bps).as_fraction() / 2.0 + Bps(self.slippage_bps).as_fraction()
    }

    pub fn buy_fill_price(self, mid: Price) -> Price {
        Price(mid.0 * (1.0 + self.adverse_fraction()))
    }

    pub fn sell_fill_price(self, mid: Price) -> Price {
        Price(mid.0 * (1.0 - self.adverse_fraction()))
    }

    /// Cash change for trading `delta_qty` units at `mid`.
    ///
    /// Positive `delta_qty` buys (cash goes down), negative sells or opens a
    /// short (cash goes up). Fees always reduce cash.
    pub fn cash_delta(self, delta_qty: f64, mid: Price) -> f64 {
        if delta_qty == 0.0 || mid.0 <= 0.0 {
            return 0.0;
        }
        let fee = Bps(self.fee_bps).as_fraction();

        if delta_qty > 0.0 {
            let notional = delta_qty * self.buy_fill_price(mid).0;
            -(notional * (1.0 + fee))
        } else {
            let notional = -delta_qty * self.sell_fill_price(mid).0;
            notional * (1.0 - fee)
        }
    }
}

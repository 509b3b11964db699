pub mod history;
pub mod units;

pub use history::{HistoryError, PriceHistory};
pub use units::{Bps, Percent, Price, TimestampMs, Weight};

pub mod sma;

pub use sma::{rolling_mean, sma_column};

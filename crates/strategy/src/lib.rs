pub mod above_sma;
pub mod ma_cross;
pub mod spec;

pub use above_sma::above_sma;
pub use ma_cross::ma_cross;
pub use spec::{Schedule, StrategySpec};

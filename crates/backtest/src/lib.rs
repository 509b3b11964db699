pub mod engine;
pub mod monthly;
pub mod report;
pub mod stats;

pub use engine::{Engine, EngineError, SimEngine};
pub use monthly::{MonthlyReturn, MonthlyTable};
pub use report::BacktestReport;
pub use stats::Stats;

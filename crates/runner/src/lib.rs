pub mod cli;
pub mod config;
pub mod orchestrator;
pub mod output;

pub use cli::{CommonArgs, date_to_ms, init_tracing};
pub use config::{MarketCategory, RunConfig};
pub use orchestrator::{SweepRun, load_history, run_above_sma, run_sma_cross, run_strategy};

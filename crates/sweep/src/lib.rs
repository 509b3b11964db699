pub mod candidate;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod evaluator;
pub mod event;
pub mod reporter;
pub mod scrape;
pub mod search;

pub use candidate::{CrossWindows, Window};
pub use config::{ExecutionMode, GridBounds, LineBounds, SweepConfig, ToleranceBand};
pub use enumerator::{CandidateSource, GridEnumerator, LineEnumerator};
pub use error::{EvalError, SearchError};
pub use evaluator::{
    AboveSmaBuilder, EngineEvaluator, Evaluator, MaCrossBuilder, MetricReading, MetricSource,
    StrategyBuilder,
};
pub use event::{Classification, ReportEvent};
pub use reporter::{CollectingSink, ConsoleSink, NullSink, ReportSink, ReportTemplate};
pub use scrape::scrape_total_return;
pub use search::{
    SearchOutcome, SearchStats, above_sma_optimal_value, run_search, sma_cross_optimal_values,
};

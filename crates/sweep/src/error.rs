use backtest::EngineError;
use state_machine::SearchTransitionError;

/// Failure of a single candidate evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid sweep config: {0}")]
    InvalidConfig(String),
    /// Raised for the first failing candidate; the search does not continue.
    #[error("evaluating {candidate} failed")]
    Evaluation {
        candidate: String,
        #[source]
        source: EvalError,
    },
    #[error("illegal search lifecycle transition: {0:?}")]
    Lifecycle(SearchTransitionError),
}

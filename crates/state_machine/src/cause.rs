#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchCause {
    // Search lifecycle
    Started,
    CandidateEvaluated,

    // Termination
    Exhausted,
    EvaluationFailed,
}

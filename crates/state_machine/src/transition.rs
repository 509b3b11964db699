use crate::cause::SearchCause;
use crate::state::SearchPhase;

#[derive(Debug, PartialEq, Eq)]
pub enum SearchTransitionError {
    IllegalTransition {
        from: SearchPhase,
        cause: SearchCause,
    },
}

pub fn search_transition(
    phase: SearchPhase,
    cause: SearchCause,
) -> Result<SearchPhase, SearchTransitionError> {
    let next = match (phase, cause) {
        // --- Init -----------------------------------------------------------
        (SearchPhase::Init, SearchCause::Started) => SearchPhase::Scanning,

        // --- Scanning -------------------------------------------------------
        (SearchPhase::Scanning, SearchCause::CandidateEvaluated) => SearchPhase::Scanning,
        (SearchPhase::Scanning, SearchCause::Exhausted) => SearchPhase::Done,
        (SearchPhase::Scanning, SearchCause::EvaluationFailed) => SearchPhase::Done,

        // --- Illegal --------------------------------------------------------
        _ => return Err(SearchTransitionError::IllegalTransition { from: phase, cause }),
    };

    Ok(next)
}

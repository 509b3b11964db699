pub mod cause;
pub mod state;
pub mod transition;

pub use cause::SearchCause;
pub use state::SearchPhase;
pub use transition::{SearchTransitionError, search_transition};

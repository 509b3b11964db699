use std::collections::VecDeque;
use std::fmt::Display;

use rayon::prelude::*;
use state_machine::{SearchCause, SearchPhase, search_transition};
use tracing::{debug, info, warn};

use crate::candidate::{CrossWindows, Window};
use crate::config::{ExecutionMode, GridBounds, LineBounds, SweepConfig};
use crate::enumerator::{CandidateSource, GridEnumerator, LineEnumerator};
use crate::error::{EvalError, SearchError};
use crate::evaluator::{Evaluator, MetricReading};
use crate::event::{Classification, ReportEvent, classify};
use crate::reporter::ReportSink;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchStats {
    pub evaluated: usize,
    pub new_best: usize,
    pub near_best: usize,
    /// Inner values jumped over, not evaluated.
    pub skipped: usize,
    pub missing_metrics: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<C> {
    /// `None` when nothing beat the baseline.
    pub best: Option<C>,
    pub best_metric: f64,
    pub events: Vec<ReportEvent<C>>,
    pub stats: SearchStats,
}

struct Lifecycle {
    phase: SearchPhase,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            phase: SearchPhase::Init,
        }
    }

    fn advance(&mut self, cause: SearchCause) -> Result<(), SearchError> {
        self.phase = search_transition(self.phase, cause).map_err(SearchError::Lifecycle)?;
        Ok(())
    }
}

/// Metric lookups for the search loop.
///
/// In parallel mode a miss evaluates the candidate together with the rest of
/// its inner row on the rayon pool and parks the results; later lookups pop
/// parked results in order, dropping the ones a skip jumped over.
struct Prefetch<C> {
    mode: ExecutionMode,
    parked: VecDeque<(C, Result<MetricReading, EvalError>)>,
}

impl<C> Prefetch<C>
where
    C: Clone + PartialEq + Send + Sync,
{
    fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            parked: VecDeque::new(),
        }
    }

    fn fetch<S, E>(
        &mut self,
        candidate: &C,
        source: &S,
        evaluator: &E,
    ) -> Result<MetricReading, EvalError>
    where
        S: CandidateSource<Candidate = C>,
        E: Evaluator<C> + Sync,
    {
        if self.mode == ExecutionMode::Sequential {
            return evaluator.evaluate(candidate);
        }

        while let Some((parked, result)) = self.parked.pop_front() {
            if parked == *candidate {
                return result;
            }
        }

        let mut batch = Vec::with_capacity(1);
        batch.push(candidate.clone());
        batch.extend(source.lookahead());

        let results: Vec<(C, Result<MetricReading, EvalError>)> = batch
            .into_par_iter()
            .map(|c| {
                let result = evaluator.evaluate(&c);
                (c, result)
            })
            .collect();
        self.parked = results.into();

        match self.parked.pop_front() {
            Some((_, result)) => result,
            None => evaluator.evaluate(candidate),
        }
    }
}

/// Ordered fold over `source`: track the best metric, report new and near
/// bests, and prune the inner dimension after far-from-best results.
pub fn run_search<S, E, R>(
    mut source: S,
    evaluator: &E,
    config: &SweepConfig,
    sink: &mut R,
) -> Result<SearchOutcome<S::Candidate>, SearchError>
where
    S: CandidateSource,
    S::Candidate: Clone + PartialEq + Send + Sync + Display,
    E: Evaluator<S::Candidate> + Sync,
    R: ReportSink<S::Candidate> + ?Sized,
{
    config.validate()?;
    let band = config.band();

    let mut lifecycle = Lifecycle::new();
    lifecycle.advance(SearchCause::Started)?;

    let mut prefetch = Prefetch::new(config.execution);
    let mut best: Option<S::Candidate> = None;
    let mut best_metric = config.baseline_metric;
    let mut events = Vec::new();
    let mut stats = SearchStats::default();

    while let Some(candidate) = source.next_candidate() {
        let reading = match prefetch.fetch(&candidate, &source, evaluator) {
            Ok(reading) => reading,
            Err(err) => {
                lifecycle.advance(SearchCause::EvaluationFailed)?;
                return Err(SearchError::Evaluation {
                    candidate: candidate.to_string(),
                    source: err,
                });
            }
        };
        lifecycle.advance(SearchCause::CandidateEvaluated)?;
        stats.evaluated += 1;

        if reading == MetricReading::Missing {
            stats.missing_metrics += 1;
            warn!(
                %candidate,
                fallback = config.missing_metric_value,
                "no total return in report"
            );
        }
        let metric = reading.value_or(config.missing_metric_value);
        debug!(%candidate, metric, best_metric, "candidate evaluated");

        let event = match classify(metric, best_metric, band) {
            Classification::NewBest => {
                best_metric = metric;
                best = Some(candidate.clone());
                stats.new_best += 1;
                Some(ReportEvent::NewBest { candidate, metric })
            }
            Classification::NearBest { distance } => {
                stats.near_best += 1;
                Some(ReportEvent::NearBest {
                    candidate,
                    metric,
                    best_metric,
                    distance_from_best: distance,
                })
            }
            Classification::Far => {
                let skip = config.skip_distance;
                if let Some((inner, top)) = source.inner_cursor() {
                    if skip > 0 && inner.saturating_add(skip) < top {
                        source.skip_inner(skip);
                        stats.skipped += skip;
                    }
                }
                None
            }
        };

        if let Some(event) = event {
            sink.on_event(&event);
            events.push(event);
        }
    }

    lifecycle.advance(SearchCause::Exhausted)?;

    match &best {
        Some(b) => info!(best = %b, best_metric, ?stats, "search finished"),
        None => info!(best_metric, ?stats, "search finished, baseline never beaten"),
    }

    Ok(SearchOutcome {
        best,
        best_metric,
        events,
        stats,
    })
}

/// Two-window SMA cross sweep with inner-dimension pruning.
pub fn sma_cross_optimal_values<E, R>(
    evaluator: &E,
    bounds: GridBounds,
    config: &SweepConfig,
    sink: &mut R,
) -> Result<SearchOutcome<CrossWindows>, SearchError>
where
    E: Evaluator<CrossWindows> + Sync,
    R: ReportSink<CrossWindows> + ?Sized,
{
    info!(?bounds, ?config, "starting sma cross sweep");
    run_search(GridEnumerator::new(bounds), evaluator, config, sink)
}

/// Single-window price-above-SMA sweep. Never skips.
pub fn above_sma_optimal_value<E, R>(
    evaluator: &E,
    bounds: LineBounds,
    config: &SweepConfig,
    sink: &mut R,
) -> Result<SearchOutcome<Window>, SearchError>
where
    E: Evaluator<Window> + Sync,
    R: ReportSink<Window> + ?Sized,
{
    info!(?bounds, ?config, "starting above sma sweep");
    run_search(LineEnumerator::new(bounds), evaluator, config, sink)
}

use crate::config::ToleranceBand;

/// Something worth telling the user about while the search runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent<C> {
    NewBest {
        candidate: C,
        metric: f64,
    },
    /// `best_metric` is the best at the time of comparison, which may later
    /// be beaten.
    NearBest {
        candidate: C,
        metric: f64,
        best_metric: f64,
        distance_from_best: f64,
    },
}

impl<C> ReportEvent<C> {
    pub fn candidate(&self) -> &C {
        match self {
            ReportEvent::NewBest { candidate, .. } | ReportEvent::NearBest { candidate, .. } => {
                candidate
            }
        }
    }

    pub fn metric(&self) -> f64 {
        match self {
            ReportEvent::NewBest { metric, .. } | ReportEvent::NearBest { metric, .. } => *metric,
        }
    }
}

/// Where one metric lands relative to the current best.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Classification {
    NewBest,
    NearBest { distance: f64 },
    Far,
}

/// Strictly greater wins, ties are not new bests. Otherwise the band decides.
pub fn classify(metric: f64, best: f64, band: ToleranceBand) -> Classification {
    if metric > best {
        Classification::NewBest
    } else if band.contains(metric, best) {
        Classification::NearBest {
            distance: ToleranceBand::distance_pct(metric, best),
        }
    } else {
        Classification::Far
    }
}

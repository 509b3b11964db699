use crate::candidate::{CrossWindows, Window};
use crate::config::{GridBounds, LineBounds};

/// Ordered, deterministic stream of search candidates.
pub trait CandidateSource {
    type Candidate;

    fn next_candidate(&mut self) -> Option<Self::Candidate>;

    /// Last yielded inner value and the exclusive inner upper bound.
    /// `None` when the sweep has no skippable inner dimension.
    fn inner_cursor(&self) -> Option<(usize, usize)>;

    /// Discard the next `k` inner values without yielding them.
    fn skip_inner(&mut self, k: usize);

    /// Candidates still to come in the current inner row, in order,
    /// assuming no further skips. Does not advance the source.
    fn lookahead(&self) -> Vec<Self::Candidate>;
}

/// `low` in `[low_bot, low_top)`, `high` in `[high_bot, high_top)`, both
/// ascending, yielding only `low < high`.
#[derive(Debug, Clone)]
pub struct GridEnumerator {
    bounds: GridBounds,
    low: usize,
    /// next inner value to examine
    high: usize,
    /// last inner value handed out
    last_high: Option<usize>,
}

impl GridEnumerator {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            low: bounds.low_bot,
            high: bounds.high_bot,
            last_high: None,
        }
    }
}

impl CandidateSource for GridEnumerator {
    type Candidate = CrossWindows;

    fn next_candidate(&mut self) -> Option<CrossWindows> {
        while self.low < self.bounds.low_top {
            while self.high < self.bounds.high_top {
                let high = self.high;
                self.high += 1;
                if self.low < high {
                    self.last_high = Some(high);
                    return Some(CrossWindows {
                        low: self.low,
                        high,
                    });
                }
            }
            self.low += 1;
            self.high = self.bounds.high_bot;
            self.last_high = None;
        }
        None
    }

    fn inner_cursor(&self) -> Option<(usize, usize)> {
        self.last_high.map(|h| (h, self.bounds.high_top))
    }

    fn skip_inner(&mut self, k: usize) {
        self.high = self.high.saturating_add(k);
    }

    fn lookahead(&self) -> Vec<CrossWindows> {
        let mut probe = self.clone();
        let mut out = Vec::new();
        while let Some(c) = probe.next_candidate() {
            if c.low != self.low {
                break;
            }
            out.push(c);
        }
        out
    }
}

/// `value` in `[bot, top)` ascending.
///
/// Unlike [`GridEnumerator`] this sweep never prunes: `inner_cursor` is always
/// `None` and `skip_inner` does nothing.
#[derive(Debug, Clone)]
pub struct LineEnumerator {
    next: usize,
    top: usize,
}

impl LineEnumerator {
    pub fn new(bounds: LineBounds) -> Self {
        Self {
            next: bounds.bot,
            top: bounds.top,
        }
    }
}

impl CandidateSource for LineEnumerator {
    type Candidate = Window;

    fn next_candidate(&mut self) -> Option<Window> {
        if self.next >= self.top {
            return None;
        }
        let value = self.next;
        self.next += 1;
        Some(Window(value))
    }

    fn inner_cursor(&self) -> Option<(usize, usize)> {
        None
    }

    fn skip_inner(&mut self, _k: usize) {}

    fn lookahead(&self) -> Vec<Window> {
        (self.next..self.top).map(Window).collect()
    }
}

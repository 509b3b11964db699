use std::fmt;

/// Two-window candidate for the SMA cross sweep. Evaluated candidates always
/// have `low < high`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CrossWindows {
    pub low: usize,
    pub high: usize,
}

/// Single-window candidate for the price-above-SMA sweep.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Window(pub usize);

impl fmt::Display for CrossWindows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sma {}/{}", self.low, self.high)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sma {}", self.0)
    }
}

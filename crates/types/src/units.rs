//! Unit types shared by the whole workspace.
//!
//! Цель:
//! - запретить "голые" f64 там, где важна единица измерения
//! - не путать цену, вес в портфеле и проценты доходности

use std::fmt;
use std::ops::Mul;

use chrono::{DateTime, Datelike, Utc};

/// Цена закрытия инструмента
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Price(pub f64);

/// Целевой вес инструмента в портфеле (1.0 = 100% long, -1.0 = 100% short)
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Weight(pub f64);

/// Проценты (12.5 = 12.5%)
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Percent(pub f64);

/// Базисные пункты (1 bps = 0.01%)
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Bps(pub f64);

/// Время в миллисекундах (unix epoch)
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampMs(pub i64);

//
// --- Conversions & helpers --------------------------------------------------
//

impl Bps {
    /// bps → доля (10 bps = 0.001)
    pub fn as_fraction(self) -> f64 {
        self.0.max(0.0) / 10_000.0
    }
}

impl Percent {
    /// Доля → проценты (0.125 → 12.5%)
    pub fn from_fraction(fraction: f64) -> Self {
        Percent(fraction * 100.0)
    }

    pub fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl Weight {
    pub const FLAT: Weight = Weight(0.0);
    pub const LONG: Weight = Weight(1.0);
    pub const SHORT: Weight = Weight(-1.0);
}

impl TimestampMs {
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.0)
    }

    /// (год, ISO-неделя); used for weekly rebalance schedules
    pub fn iso_week(self) -> Option<(i32, u32)> {
        self.to_datetime().map(|dt| {
            let w = dt.iso_week();
            (w.year(), w.week())
        })
    }

    /// (год, месяц 1..=12)
    pub fn year_month(self) -> Option<(i32, u32)> {
        self.to_datetime().map(|dt| (dt.year(), dt.month()))
    }
}

//
// --- Arithmetic (строго минимально) -----------------------------------------
//

impl Mul<f64> for Weight {
    type Output = f64;
    fn mul(self, equity: f64) -> f64 {
        self.0 * equity
    }
}

//
// --- Display (для логов / отчётов) ------------------------------------------
//

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} bps", self.0)
    }
}

impl fmt::Display for TimestampMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_renders_with_two_decimals() {
        assert_eq!(Percent(12.346).to_string(), "12.35%");
        assert_eq!(Percent::from_fraction(-0.5).to_string(), "-50.00%");
    }

    #[test]
    fn bps_never_turns_negative() {
        assert_eq!(Bps(10.0).as_fraction(), 0.001);
        assert_eq!(Bps(-3.0).as_fraction(), 0.0);
    }

    #[test]
    fn timestamp_renders_as_date() {
        // 2014-01-02T00:00:00Z
        let ts = TimestampMs(1_388_620_800_000);
        assert_eq!(ts.to_string(), "2014-01-02");
        assert_eq!(ts.year_month(), Some((2014, 1)));
        assert_eq!(ts.iso_week(), Some((2014, 1)));
    }
}

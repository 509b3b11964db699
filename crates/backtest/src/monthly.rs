use std::fmt;

use types::TimestampMs;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    /// Доля (0.05 = +5%)
    pub ret: f64,
}

/// Month-over-month returns of a trajectory rebased to 100.
///
/// Each month closes at its last bar; the first month is measured from 100.
pub fn monthly_returns(timestamps: &[TimestampMs], prices: &[f64]) -> Vec<MonthlyReturn> {
    let mut out: Vec<MonthlyReturn> = Vec::new();
    let mut base = 100.0;
    let mut current: Option<((i32, u32), f64)> = None;

    for (ts, &p) in timestamps.iter().zip(prices) {
        let Some(ym) = ts.year_month() else {
            continue;
        };

        match current {
            Some((cur, last)) if cur != ym => {
                out.push(MonthlyReturn {
                    year: cur.0,
                    month: cur.1,
                    ret: last / base - 1.0,
                });
                base = last;
                current = Some((ym, p));
            }
            _ => current = Some((ym, p)),
        }
    }

    if let Some(((year, month), last)) = current {
        out.push(MonthlyReturn {
            year,
            month,
            ret: last / base - 1.0,
        });
    }

    out
}

/// Year × month grid with a compounded YTD column.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTable {
    pub rows: Vec<MonthlyReturn>,
}

impl MonthlyTable {
    pub fn new(rows: Vec<MonthlyReturn>) -> Self {
        Self { rows }
    }

    /// Compounded return of every month of `year` present in the table.
    pub fn ytd(&self, year: i32) -> f64 {
        self.rows
            .iter()
            .filter(|r| r.year == year)
            .fold(1.0, |acc, r| acc * (1.0 + r.ret))
            - 1.0
    }
}

impl fmt::Display for MonthlyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Monthly Returns (%)")?;
        write!(f, "{:>6}", "Year")?;
        for m in MONTHS {
            write!(f, "{:>8}", m)?;
        }
        writeln!(f, "{:>8}", "YTD")?;

        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        years.dedup();

        for year in years {
            write!(f, "{:>6}", year)?;
            for month in 1..=12 {
                match self.rows.iter().find(|r| r.year == year && r.month == month) {
                    Some(r) => write!(f, "{:>8.2}", r.ret * 100.0)?,
                    None => write!(f, "{:>8}", "")?,
                }
            }
            writeln!(f, "{:>8.2}", self.ytd(year) * 100.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2014-01-30, 2014-01-31, 2014-02-03, 2014-02-28
    const TS: [i64; 4] = [
        1_391_040_000_000,
        1_391_126_400_000,
        1_391_385_600_000,
        1_393_545_600_000,
    ];

    fn ts() -> Vec<TimestampMs> {
        TS.iter().copied().map(TimestampMs).collect()
    }

    #[test]
    fn month_closes_on_last_bar() {
        let rows = monthly_returns(&ts(), &[101.0, 110.0, 120.0, 121.0]);
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].year, rows[0].month), (2014, 1));
        assert!((rows[0].ret - 0.10).abs() < 1e-12);
        assert!((rows[1].ret - 0.10).abs() < 1e-12);
    }

    #[test]
    fn ytd_compounds_months() {
        let table = MonthlyTable::new(monthly_returns(&ts(), &[101.0, 110.0, 120.0, 121.0]));
        assert!((table.ytd(2014) - 0.21).abs() < 1e-12);

        let text = table.to_string();
        assert!(text.contains("2014"));
        assert!(text.contains("10.00"));
        assert!(text.contains("21.00"));
    }
}

use std::fmt::Display;
use std::path::Path;

use anyhow::Result;
use backtest::BacktestReport;
use serde::Serialize;
use sweep::ReportEvent;

#[derive(Debug, Serialize)]
struct SummaryRow {
    seq: usize,
    kind: &'static str,
    candidate: String,
    metric: f64,
    best_metric: f64,
    distance_from_best_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PriceRow {
    date: String,
    ts: i64,
    price: f64,
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(csv::Writer::from_path(path)?)
}

/// Event log of a sweep, in emission order.
pub fn write_summary<C: Display>(path: &Path, events: &[ReportEvent<C>]) -> Result<()> {
    let mut wtr = writer(path)?;
    for (seq, e) in events.iter().enumerate() {
        let row = match e {
            ReportEvent::NewBest { candidate, metric } => SummaryRow {
                seq,
                kind: "new_best",
                candidate: candidate.to_string(),
                metric: *metric,
                best_metric: *metric,
                distance_from_best_pct: None,
            },
            ReportEvent::NearBest {
                candidate,
                metric,
                best_metric,
                distance_from_best,
            } => SummaryRow {
                seq,
                kind: "near_best",
                candidate: candidate.to_string(),
                metric: *metric,
                best_metric: *best_metric,
                distance_from_best_pct: Some(*distance_from_best),
            },
        };
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Equity trajectory (rebased to 100) of one run.
pub fn write_prices(path: &Path, report: &BacktestReport) -> Result<()> {
    let mut wtr = writer(path)?;
    for (ts, price) in report.timestamps.iter().zip(&report.prices) {
        wtr.serialize(PriceRow {
            date: ts.to_string(),
            ts: ts.0,
            price: *price,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_report(report: &BacktestReport) {
    println!("{}", report);
    println!();
    println!("{}", report.monthly_returns());
}

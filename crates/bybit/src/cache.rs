//! Price cache on disk: `ts,<SYMBOL>,<SYMBOL>...`, one row per bar.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use types::{Price, PriceHistory, TimestampMs};

use crate::rest::{BybitRest, Category, Kline, download_range};

pub fn read_cache(path: &Path) -> Result<PriceHistory> {
    let mut rdr = csv::Reader::from_path(path)?;

    let headers = rdr.headers()?.clone();
    let mut cols = headers.iter();
    if cols.next() != Some("ts") {
        bail!("{}: first column must be ts", path.display());
    }
    let symbols: Vec<String> = cols.map(str::to_string).collect();

    let mut timestamps = Vec::new();
    let mut closes: Vec<Vec<Price>> = vec![Vec::new(); symbols.len()];

    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let ts: i64 = record
            .get(0)
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("bad ts on row {}", line + 1))?;
        timestamps.push(TimestampMs(ts));

        for (idx, column) in closes.iter_mut().enumerate() {
            let close: f64 = record
                .get(idx + 1)
                .unwrap_or_default()
                .parse()
                .with_context(|| format!("bad close for {} on row {}", symbols[idx], line + 1))?;
            column.push(Price(close));
        }
    }

    Ok(PriceHistory::new(symbols, timestamps, closes)?)
}

pub fn write_cache(path: &Path, history: &PriceHistory) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["ts".to_string()];
    header.extend(history.symbols().iter().cloned());
    wtr.write_record(&header)?;

    for (row, ts) in history.timestamps().iter().enumerate() {
        let mut record = vec![ts.0.to_string()];
        for idx in 0..history.width() {
            record.push(history.close(row, idx).0.to_string());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Keeps only the bars every symbol has.
pub fn align(series: Vec<(String, Vec<Kline>)>) -> Result<PriceHistory> {
    let mut by_ts: BTreeMap<TimestampMs, Vec<Option<Price>>> = BTreeMap::new();
    let width = series.len();

    for (idx, (_, klines)) in series.iter().enumerate() {
        for k in klines {
            by_ts.entry(k.ts).or_insert_with(|| vec![None; width])[idx] = Some(k.close);
        }
    }

    let mut timestamps = Vec::new();
    let mut closes: Vec<Vec<Price>> = vec![Vec::new(); width];
    for (ts, row) in by_ts {
        if row.iter().any(Option::is_none) {
            continue;
        }
        timestamps.push(ts);
        for (column, close) in closes.iter_mut().zip(row.into_iter().flatten()) {
            column.push(close);
        }
    }

    let symbols = series.into_iter().map(|(s, _)| s).collect();
    Ok(PriceHistory::new(symbols, timestamps, closes)?)
}

/// Reads `path` when it holds exactly `symbols`, otherwise downloads
/// `[start_ms, end_ms]` for each symbol, aligns them and rewrites the cache.
#[allow(clippy::too_many_arguments)]
pub async fn load_or_fetch(
    api: &BybitRest,
    category: Category,
    symbols: &[String],
    interval: &str,
    start_ms: i64,
    end_ms: i64,
    path: &Path,
    refresh: bool,
) -> Result<PriceHistory> {
    if !refresh && path.exists() {
        let cached = read_cache(path).context("read cache failed")?;
        if cached.symbols() == symbols {
            info!(path = %path.display(), bars = cached.len(), "price history from cache");
            return Ok(cached);
        }
        warn!(
            path = %path.display(),
            cached = ?cached.symbols(),
            wanted = ?symbols,
            "cache holds other symbols, refetching"
        );
    }

    let mut series = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let klines = download_range(api, category, symbol, interval, start_ms, end_ms)
            .await
            .with_context(|| format!("download range failed for {}", symbol))?;
        info!(symbol = %symbol, bars = klines.len(), "downloaded");
        series.push((symbol.clone(), klines));
    }

    let history = align(series)?;
    write_cache(path, &history).context("write cache failed")?;
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kl(ts: i64, close: f64) -> Kline {
        Kline {
            ts: TimestampMs(ts),
            close: Price(close),
        }
    }

    #[test]
    fn align_keeps_common_bars_only() {
        let h = align(vec![
            ("BTCUSDT".into(), vec![kl(1, 10.0), kl(2, 11.0), kl(3, 12.0)]),
            ("ETHUSDT".into(), vec![kl(2, 1.0), kl(3, 1.5), kl(4, 2.0)]),
        ])
        .unwrap();

        assert_eq!(h.timestamps(), &[TimestampMs(2), TimestampMs(3)]);
        assert_eq!(h.column(0), &[Price(11.0), Price(12.0)]);
        assert_eq!(h.column(1), &[Price(1.0), Price(1.5)]);
    }

    #[test]
    fn cache_survives_a_write_read_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prices.csv");
        let h = align(vec![
            ("BTCUSDT".into(), vec![kl(1_000, 100.25), kl(2_000, 101.5)]),
            ("ETHUSDT".into(), vec![kl(1_000, 3.0), kl(2_000, 3.125)]),
        ])
        .unwrap();

        write_cache(&path, &h).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ts,BTCUSDT,ETHUSDT\n1000,100.25,3\n"));

        assert_eq!(read_cache(&path).unwrap(), h);
    }

    #[test]
    fn rejects_cache_without_ts_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "time,BTCUSDT\n1,2\n").unwrap();
        assert!(read_cache(&path).is_err());
    }

    #[test]
    fn rejects_garbled_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "ts,BTCUSDT\n1,abc\n").unwrap();
        assert!(read_cache(&path).is_err());
    }

    #[tokio::test]
    async fn cached_history_is_used_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "ts,BTCUSDT\n1000,10\n2000,11\n").unwrap();

        let h = load_or_fetch(
            &BybitRest::new(),
            Category::Spot,
            &["BTCUSDT".to_string()],
            "D",
            0,
            3_000,
            &path,
            false,
        )
        .await
        .unwrap();

        assert_eq!(h.len(), 2);
        assert_eq!(h.close(1, 0), Price(11.0));
    }
}

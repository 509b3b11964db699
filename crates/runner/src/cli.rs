use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;

use crate::config::RunConfig;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runner=info,sweep=info,bybit=info".into()),
        )
        .init();
}

/// Midnight UTC of `YYYY-MM-DD`, in ms.
pub fn date_to_ms(date: &str) -> Result<i64> {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("bad date: {}", date))?;
    let dt = Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN));
    Ok(dt.timestamp_millis())
}

pub fn parse_list(s: &str, name: &str) -> Result<Vec<String>> {
    let out: Vec<String> = s
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_ascii_uppercase)
        .collect();
    if out.is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    Ok(out)
}

/// Data and output flags shared by every binary.
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// TOML file with a `RunConfig`; flags below win over it
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Comma-separated, e.g. BTCUSDT,ETHUSDT
    #[arg(long)]
    pub symbols: Option<String>,
    #[arg(long)]
    pub interval: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub cache: Option<PathBuf>,
    /// Ignore the cache and download again
    #[arg(long, default_value_t = false)]
    pub refresh: bool,
    #[arg(long)]
    pub initial_capital: Option<f64>,
    #[arg(long)]
    pub fee_bps: Option<f64>,
    #[arg(long)]
    pub spread_bps: Option<f64>,
    #[arg(long)]
    pub slippage_bps: Option<f64>,
    /// Equity trajectory of the final run, CSV
    #[arg(long)]
    pub prices_out: Option<PathBuf>,
}

impl CommonArgs {
    pub fn load_config(&self) -> Result<RunConfig> {
        let mut cfg = RunConfig::load(self.config.as_deref())?;
        self.apply(&mut cfg)?;
        Ok(cfg)
    }

    pub fn apply(&self, cfg: &mut RunConfig) -> Result<()> {
        if let Some(s) = &self.symbols {
            cfg.symbols = parse_list(s, "symbols")?;
        }
        if let Some(v) = &self.interval {
            cfg.interval = v.clone();
        }
        if let Some(v) = &self.start {
            cfg.start = v.clone();
        }
        if let Some(v) = &self.end {
            cfg.end = Some(v.clone());
        }
        if let Some(v) = &self.cache {
            cfg.cache = v.clone();
        }
        if let Some(v) = self.initial_capital {
            cfg.initial_capital = v;
        }
        if let Some(v) = self.fee_bps {
            cfg.execution.fee_bps = v;
        }
        if let Some(v) = self.spread_bps {
            cfg.execution.spread_bps = v;
        }
        if let Some(v) = self.slippage_bps {
            cfg.execution.slippage_bps = v;
        }
        Ok(())
    }
}

/// `[start, end]` of the configured range in ms, end inclusive to the last
/// millisecond of its day.
pub fn range_ms(cfg: &RunConfig) -> Result<(i64, i64)> {
    let start = date_to_ms(&cfg.start)?;
    let end = match &cfg.end {
        Some(d) => date_to_ms(d)? + DAY_MS - 1,
        None => Utc::now().timestamp_millis(),
    };
    if end <= start {
        anyhow::bail!("end {} is not after start {}", end, start);
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn date_is_utc_midnight() {
        assert_eq!(date_to_ms("2014-01-01").unwrap(), 1_388_534_400_000);
        assert!(date_to_ms("2014-13-01").is_err());
    }

    #[test]
    fn symbol_list_is_trimmed_and_uppercased() {
        assert_eq!(
            parse_list(" btcusdt, ETHUSDT ,", "symbols").unwrap(),
            vec!["BTCUSDT", "ETHUSDT"]
        );
        assert!(parse_list(" , ", "symbols").is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "x",
            "--symbols",
            "ethusdt",
            "--end",
            "2020-01-31",
            "--fee-bps",
            "7.5",
        ])
        .unwrap();
        let cfg = cli.common.load_config().unwrap();

        assert_eq!(cfg.symbols, vec!["ETHUSDT"]);
        assert_eq!(cfg.end.as_deref(), Some("2020-01-31"));
        assert_eq!(cfg.execution.fee_bps, 7.5);
        assert_eq!(cfg.start, "2014-01-01");
    }

    #[test]
    fn range_end_covers_whole_day() {
        let cfg = RunConfig {
            start: "2020-01-01".into(),
            end: Some("2020-01-02".into()),
            ..RunConfig::default()
        };
        let (start, end) = range_ms(&cfg).unwrap();
        assert_eq!(end - start, 2 * DAY_MS - 1);

        let backwards = RunConfig {
            start: "2020-01-02".into(),
            end: Some("2020-01-01".into()),
            ..RunConfig::default()
        };
        assert!(range_ms(&backwards).is_err());
    }
}

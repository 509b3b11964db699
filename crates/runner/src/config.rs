use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use execution::ExecutionModel;
use serde::Deserialize;
use sweep::{GridBounds, LineBounds, SweepConfig};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCategory {
    #[default]
    Spot,
    Linear,
}

impl From<MarketCategory> for bybit::Category {
    fn from(c: MarketCategory) -> Self {
        match c {
            MarketCategory::Spot => bybit::Category::Spot,
            MarketCategory::Linear => bybit::Category::Linear,
        }
    }
}

/// Everything one sweep or backtest run needs. Loaded from TOML, then
/// overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub symbols: Vec<String>,
    pub category: MarketCategory,
    pub interval: String,
    /// `YYYY-MM-DD`
    pub start: String,
    /// `YYYY-MM-DD`, today when unset
    pub end: Option<String>,
    pub cache: PathBuf,
    pub initial_capital: f64,
    pub execution: ExecutionModel,
    pub grid: GridBounds,
    pub line: LineBounds,
    pub sweep: SweepConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string()],
            category: MarketCategory::Spot,
            interval: "D".to_string(),
            start: "2014-01-01".to_string(),
            end: None,
            cache: PathBuf::from("data/price_history.csv"),
            initial_capital: 1_000_000.0,
            execution: ExecutionModel::default(),
            grid: GridBounds::default(),
            line: LineBounds::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parse config {}", path.display()))
    }
}

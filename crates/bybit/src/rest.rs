use anyhow::bail;
use serde::Deserialize;
use tracing::debug;
use types::{Price, TimestampMs};

/// Рынок Bybit v5
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Category {
    Spot,
    Linear,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Spot => "spot",
            Category::Linear => "linear",
        }
    }
}

/// Одна свеча, из которой нам нужна только цена закрытия
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Kline {
    pub ts: TimestampMs,
    pub close: Price,
}

#[derive(Clone)]
pub struct BybitRest {
    client: reqwest::Client,
    base: String,
}

impl Default for BybitRest {
    fn default() -> Self {
        Self::new()
    }
}

impl BybitRest {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base: "https://api.bybit.com".to_string(),
        }
    }

    pub async fn get_klines(
        &self,
        category: Category,
        symbol: &str,
        interval: &str, // "60","240","D","W"...
        start_ms: i64,
        end_ms: i64,
        limit: u16, // 1..=1000
    ) -> anyhow::Result<Vec<Kline>> {
        let url = format!("{}/v5/market/kline", self.base);

        let resp: KlineResp = self
            .client
            .get(url)
            .query(&[
                ("category", category.as_str()),
                ("symbol", symbol),
                ("interval", interval),
                ("start", &start_ms.to_string()),
                ("end", &end_ms.to_string()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.ret_code != 0 {
            bail!("bybit kline {}: {} ({})", symbol, resp.ret_msg, resp.ret_code);
        }

        parse_rows(resp.result.list)
    }
}

/// Bybit отдаёт `[start, open, high, low, close, volume, turnover]` строками,
/// новые свечи первыми.
fn parse_rows(list: Vec<Vec<String>>) -> anyhow::Result<Vec<Kline>> {
    let mut out = Vec::with_capacity(list.len());
    for row in list.into_iter().rev() {
        let (Some(ts), Some(close)) = (row.first(), row.get(4)) else {
            bail!("short kline row: {:?}", row);
        };
        out.push(Kline {
            ts: TimestampMs(ts.parse()?),
            close: Price(close.parse()?),
        });
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct KlineResp {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg")]
    ret_msg: String,
    result: KlineResult,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<String>>,
}

/// Pages backwards from `end_ms` until `start_ms` is covered.
pub async fn download_range(
    api: &BybitRest,
    category: Category,
    symbol: &str,
    interval: &str,
    start_ms: i64,
    end_ms: i64,
) -> anyhow::Result<Vec<Kline>> {
    let mut all: Vec<Kline> = Vec::new();
    let mut cursor_end = end_ms;

    // 1000: максимум на страницу
    let limit = 1000u16;

    while cursor_end > start_ms {
        let page = api
            .get_klines(category, symbol, interval, start_ms, cursor_end, limit)
            .await?;
        let Some(first) = page.first() else {
            break;
        };

        // идём назад, не цепляя ту же первую свечу
        cursor_end = first.ts.0 - 1;
        debug!(symbol, rows = page.len(), cursor_end, "kline page");
        all.extend(page);

        tokio::time::sleep(std::time::Duration::from_millis(120)).await;
    }

    all.sort_by_key(|k| k.ts);
    all.dedup_by_key(|k| k.ts);
    all.retain(|k| k.ts.0 >= start_ms && k.ts.0 <= end_ms);

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ts: i64, close: &str) -> Vec<String> {
        vec![
            ts.to_string(),
            "1".into(),
            "2".into(),
            "0.5".into(),
            close.into(),
            "10".into(),
            "10".into(),
        ]
    }

    #[test]
    fn rows_come_back_oldest_first() {
        let out = parse_rows(vec![row(2_000, "11.5"), row(1_000, "10")]).unwrap();
        assert_eq!(
            out,
            vec![
                Kline {
                    ts: TimestampMs(1_000),
                    close: Price(10.0)
                },
                Kline {
                    ts: TimestampMs(2_000),
                    close: Price(11.5)
                },
            ]
        );
    }

    #[test]
    fn short_or_garbled_rows_are_errors() {
        assert!(parse_rows(vec![vec!["1000".into(), "1".into()]]).is_err());
        assert!(parse_rows(vec![row(1_000, "abc")]).is_err());
    }

    #[test]
    fn decodes_v5_envelope() {
        let body = r#"{"retCode":0,"retMsg":"OK","result":{"symbol":"BTCUSDT","category":"spot","list":[["1000","1","2","0.5","10","5","50"]]}}"#;
        let resp: KlineResp = serde_json::from_str(body).unwrap();
        assert_eq!(resp.ret_code, 0);
        assert_eq!(resp.result.list.len(), 1);
    }
}

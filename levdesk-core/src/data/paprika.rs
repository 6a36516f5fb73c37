//! CoinPaprika data provider — primary source for spot prices and history.
//!
//! Uses the public `/v1/tickers` endpoint for ranked spot prices and
//! `/v1/tickers/{id}/historical` for the daily lookback series. No API key;
//! the free tier is rate-limited, which surfaces as an HTTP 402/429 status
//! error and trips the fallback chain.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::provider::{PriceError, PricePoint, PriceProvider};
use crate::domain::{CoinInfo, CoinMap};

/// Request timeout. One slow call must not hang the whole view.
const TIMEOUT_SECS: u64 = 5;

const BASE_URL: &str = "https://api.coinpaprika.com/v1";

/// `/v1/tickers` response entry (fields we use).
#[derive(Debug, Deserialize)]
struct TickerEntry {
    id: String,
    symbol: String,
    rank: Option<u32>,
    quotes: Quotes,
}

#[derive(Debug, Deserialize)]
struct Quotes {
    #[serde(rename = "USD")]
    usd: UsdQuote,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    price: f64,
}

/// `/v1/tickers/{id}/historical` response entry.
#[derive(Debug, Deserialize)]
struct HistoricalEntry {
    timestamp: String,
    price: f64,
}

/// CoinPaprika provider with a short-timeout blocking client.
pub struct PaprikaProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl PaprikaProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at a different base URL (tests use a local stub).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, PriceError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| PriceError::from_reqwest(e, TIMEOUT_SECS))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PriceError::Status {
                status: status.as_u16(),
            });
        }

        resp.json::<T>()
            .map_err(|e| PriceError::from_reqwest(e, TIMEOUT_SECS))
    }

    fn parse_history(entries: Vec<HistoricalEntry>) -> Result<Vec<PricePoint>, PriceError> {
        let mut points = Vec::with_capacity(entries.len());
        for entry in entries {
            let time = DateTime::parse_from_rfc3339(&entry.timestamp)
                .map_err(|e| {
                    PriceError::ResponseFormatChanged(format!(
                        "bad timestamp {:?}: {e}",
                        entry.timestamp
                    ))
                })?
                .naive_utc();
            points.push(PricePoint {
                time,
                price: entry.price,
            });
        }
        points.sort_by_key(|p| p.time);
        Ok(points)
    }
}

impl Default for PaprikaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceProvider for PaprikaProvider {
    fn name(&self) -> &str {
        "CoinPaprika"
    }

    fn top_coins(&self, limit: usize) -> Result<CoinMap, PriceError> {
        let url = format!("{}/tickers", self.base_url);
        let mut entries: Vec<TickerEntry> = self.get_json(&url, &[])?;

        // Unranked coins sort last.
        entries.sort_by_key(|e| e.rank.unwrap_or(u32::MAX));
        entries.truncate(limit);

        let coins = entries
            .into_iter()
            .map(|e| CoinInfo {
                symbol: e.symbol.to_uppercase(),
                id: e.id,
                price_usd: e.quotes.usd.price,
            })
            .collect();
        Ok(CoinMap::new(coins))
    }

    fn history(&self, coin_id: &str, days: u32) -> Result<Vec<PricePoint>, PriceError> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(days));
        let url = format!("{}/tickers/{coin_id}/historical", self.base_url);
        let query = [
            ("start", start.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            ("end", end.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            ("interval", "24h".to_string()),
        ];

        let entries: Vec<HistoricalEntry> = match self.get_json(&url, &query) {
            Err(PriceError::Status { status: 404 }) => {
                return Err(PriceError::CoinNotFound {
                    symbol: coin_id.to_string(),
                })
            }
            other => other?,
        };
        Self::parse_history(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_json_parses() {
        let json = r#"[{
            "id": "btc-bitcoin",
            "symbol": "btc",
            "rank": 1,
            "quotes": {"USD": {"price": 60123.45, "volume_24h": 1.0}}
        }]"#;
        let entries: Vec<TickerEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].id, "btc-bitcoin");
        assert_eq!(entries[0].quotes.usd.price, 60123.45);
    }

    #[test]
    fn unranked_coins_sort_last() {
        let json = r#"[
            {"id": "a", "symbol": "A", "rank": null, "quotes": {"USD": {"price": 1.0}}},
            {"id": "b", "symbol": "B", "rank": 2, "quotes": {"USD": {"price": 2.0}}}
        ]"#;
        let mut entries: Vec<TickerEntry> = serde_json::from_str(json).unwrap();
        entries.sort_by_key(|e| e.rank.unwrap_or(u32::MAX));
        assert_eq!(entries[0].id, "b");
    }

    #[test]
    fn history_parses_and_sorts() {
        let entries = vec![
            HistoricalEntry {
                timestamp: "2024-01-03T00:00:00Z".into(),
                price: 3.0,
            },
            HistoricalEntry {
                timestamp: "2024-01-01T00:00:00Z".into(),
                price: 1.0,
            },
        ];
        let points = PaprikaProvider::parse_history(entries).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[0].time < points[1].time);
        assert_eq!(points[0].price, 1.0);
    }

    #[test]
    fn bad_timestamp_is_format_error() {
        let entries = vec![HistoricalEntry {
            timestamp: "yesterday".into(),
            price: 1.0,
        }];
        assert!(matches!(
            PaprikaProvider::parse_history(entries),
            Err(PriceError::ResponseFormatChanged(_))
        ));
    }
}

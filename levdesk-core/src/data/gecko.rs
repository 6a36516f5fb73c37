//! CoinGecko fallback provider — spot prices only.
//!
//! Used when CoinPaprika is down or rate-limited. Covers a fixed list of
//! major coins via the unauthenticated `simple/price` endpoint; history is
//! not supported here, so a Paprika outage degrades the chart to the
//! sample series.

use std::collections::HashMap;

use super::provider::{PriceError, PricePoint, PriceProvider};
use crate::domain::{CoinInfo, CoinMap};

const TIMEOUT_SECS: u64 = 5;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// (symbol, CoinGecko id) pairs the fallback covers.
const FALLBACK_COINS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("ADA", "cardano"),
    ("SUI", "sui"),
    ("LINK", "chainlink"),
    ("PEPE", "pepe"),
    ("AAVE", "aave"),
    ("ONDO", "ondo-finance"),
    ("PAAL", "paal-ai"),
];

/// CoinGecko spot-price fallback.
pub struct GeckoProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl GeckoProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

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
}

impl Default for GeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceProvider for GeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    fn top_coins(&self, limit: usize) -> Result<CoinMap, PriceError> {
        let ids: Vec<&str> = FALLBACK_COINS.iter().map(|(_, id)| *id).collect();
        let url = format!("{}/simple/price", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[("ids", ids.join(",")), ("vs_currencies", "usd".into())])
            .send()
            .map_err(|e| PriceError::from_reqwest(e, TIMEOUT_SECS))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PriceError::Status {
                status: status.as_u16(),
            });
        }

        // Response shape: { "<id>": { "usd": <price> }, ... }
        let prices: HashMap<String, HashMap<String, f64>> = resp
            .json()
            .map_err(|e| PriceError::from_reqwest(e, TIMEOUT_SECS))?;

        let coins = FALLBACK_COINS
            .iter()
            .take(limit)
            .filter_map(|(symbol, id)| {
                let price = prices.get(*id)?.get("usd")?;
                Some(CoinInfo {
                    symbol: (*symbol).to_string(),
                    id: (*id).to_string(),
                    price_usd: *price,
                })
            })
            .collect();
        Ok(CoinMap::new(coins))
    }

    fn history(&self, _coin_id: &str, _days: u32) -> Result<Vec<PricePoint>, PriceError> {
        Err(PriceError::Unsupported("price history"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_unsupported() {
        let provider = GeckoProvider::new();
        assert!(matches!(
            provider.history("bitcoin", 7),
            Err(PriceError::Unsupported(_))
        ));
    }

    #[test]
    fn fallback_list_has_unique_symbols() {
        let mut symbols: Vec<&str> = FALLBACK_COINS.iter().map(|(s, _)| *s).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), FALLBACK_COINS.len());
    }
}

//! Coin lookup — symbol to provider id and spot price.

use serde::{Deserialize, Serialize};

/// One supported coin: display symbol, provider id, last spot price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinInfo {
    /// Uppercase ticker symbol, e.g. "BTC".
    pub symbol: String,
    /// Provider-side identifier, e.g. "btc-bitcoin" (CoinPaprika).
    pub id: String,
    /// Spot price in USD at fetch time.
    pub price_usd: f64,
}

/// Ordered symbol -> coin lookup built from the ticker endpoint.
///
/// Order is the provider's rank order (top coins first) and is preserved
/// for display. Lookups are linear; the map holds at most a few dozen
/// entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoinMap {
    coins: Vec<CoinInfo>,
}

impl CoinMap {
    pub fn new(coins: Vec<CoinInfo>) -> Self {
        Self { coins }
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Case-insensitive symbol lookup.
    pub fn get(&self, symbol: &str) -> Option<&CoinInfo> {
        self.coins
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Spot price for a symbol, if known.
    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).map(|c| c.price_usd)
    }

    /// Symbols in rank order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.coins.iter().map(|c| c.symbol.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoinInfo> {
        self.coins.iter()
    }

    /// Merge fresher prices in, keeping existing entries for symbols the
    /// new fetch did not cover (last-known-price behavior on partial
    /// failures).
    pub fn merge_prices(&mut self, newer: CoinMap) {
        for coin in newer.coins {
            match self
                .coins
                .iter_mut()
                .find(|c| c.symbol.eq_ignore_ascii_case(&coin.symbol))
            {
                Some(existing) => *existing = coin,
                None => self.coins.push(coin),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CoinMap {
        CoinMap::new(vec![
            CoinInfo {
                symbol: "BTC".into(),
                id: "btc-bitcoin".into(),
                price_usd: 60_000.0,
            },
            CoinInfo {
                symbol: "ETH".into(),
                id: "eth-ethereum".into(),
                price_usd: 3_000.0,
            },
        ])
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let map = sample();
        assert_eq!(map.price("btc"), Some(60_000.0));
        assert_eq!(map.get("Eth").unwrap().id, "eth-ethereum");
        assert_eq!(map.price("DOGE"), None);
    }

    #[test]
    fn rank_order_preserved() {
        let map = sample();
        let symbols: Vec<&str> = map.symbols().collect();
        assert_eq!(symbols, vec!["BTC", "ETH"]);
    }

    #[test]
    fn merge_updates_and_appends() {
        let mut map = sample();
        map.merge_prices(CoinMap::new(vec![
            CoinInfo {
                symbol: "BTC".into(),
                id: "btc-bitcoin".into(),
                price_usd: 61_000.0,
            },
            CoinInfo {
                symbol: "SOL".into(),
                id: "sol-solana".into(),
                price_usd: 150.0,
            },
        ]));
        assert_eq!(map.price("BTC"), Some(61_000.0));
        // ETH untouched by the partial refresh
        assert_eq!(map.price("ETH"), Some(3_000.0));
        assert_eq!(map.price("SOL"), Some(150.0));
    }
}

//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over public price APIs (CoinPaprika,
//! CoinGecko) so the fallback chain can swap implementations and tests can
//! mock the network away.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::CoinMap;

/// One (timestamp, price) sample in a history series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: NaiveDateTime,
    pub price: f64,
}

/// Structured error types for price API operations.
///
/// Displayable in both CLI and TUI contexts. None of these is fatal: the
/// callers degrade to empty maps or sample series.
#[derive(Debug, Clone, Error)]
pub enum PriceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("coin not found: {symbol}")]
    CoinNotFound { symbol: String },

    #[error("provider does not support {0}")]
    Unsupported(&'static str),
}

impl PriceError {
    /// Map a reqwest failure onto the structured variants.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            PriceError::Timeout { timeout_secs }
        } else if err.is_decode() {
            PriceError::ResponseFormatChanged(err.to_string())
        } else if let Some(status) = err.status() {
            PriceError::Status {
                status: status.as_u16(),
            }
        } else {
            PriceError::Network(err.to_string())
        }
    }
}

/// Trait for public price APIs.
///
/// Implementations own their HTTP client and timeout; callers never retry —
/// price data is best-effort enrichment, not a critical path.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the top `limit` coins by rank with current spot prices.
    fn top_coins(&self, limit: usize) -> Result<CoinMap, PriceError>;

    /// Fetch a daily price history for a provider coin id over the past
    /// `days` days.
    fn history(&self, coin_id: &str, days: u32) -> Result<Vec<PricePoint>, PriceError>;
}

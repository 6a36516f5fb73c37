//! Price data — provider trait, API adapters, and the fallback chain.
//!
//! Everything here is best-effort: a dead network yields an empty coin map
//! or a synthetic sample series plus an error the UI can show, never a
//! crashed session.

pub mod gecko;
pub mod paprika;
pub mod provider;

pub use gecko::GeckoProvider;
pub use paprika::PaprikaProvider;
pub use provider::{PriceError, PricePoint, PriceProvider};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::CoinMap;

/// Default history lookback window, days.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// Where a history series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistorySource {
    /// Fetched from a provider.
    Live,
    /// Deterministic placeholder generated after a provider failure.
    Sample,
}

impl HistorySource {
    pub fn label(self) -> &'static str {
        match self {
            HistorySource::Live => "Live",
            HistorySource::Sample => "Sample",
        }
    }
}

/// A history series plus its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySeries {
    pub coin_id: String,
    pub points: Vec<PricePoint>,
    pub source: HistorySource,
    /// The provider error when `source` is `Sample`.
    pub error: Option<String>,
}

/// Result of the spot-price fallback chain.
#[derive(Debug)]
pub struct SpotFetch {
    pub coins: CoinMap,
    /// Name of the provider that answered, `None` when all failed.
    pub source: Option<String>,
    /// Errors from providers that failed before one answered.
    pub errors: Vec<(String, PriceError)>,
}

impl SpotFetch {
    pub fn failed(&self) -> bool {
        self.source.is_none()
    }
}

/// Ask each provider in order for the top coins; first success wins.
///
/// All providers failing is not an error to the caller: the map comes back
/// empty and the UI shows the collected errors while the rest of the view
/// keeps rendering.
pub fn fetch_spot_prices(providers: &[&dyn PriceProvider], limit: usize) -> SpotFetch {
    let mut errors = Vec::new();

    for provider in providers {
        match provider.top_coins(limit) {
            Ok(coins) => {
                return SpotFetch {
                    coins,
                    source: Some(provider.name().to_string()),
                    errors,
                }
            }
            Err(e) => errors.push((provider.name().to_string(), e)),
        }
    }

    SpotFetch {
        coins: CoinMap::default(),
        source: None,
        errors,
    }
}

/// Fetch a history series, degrading to the sample series on any failure.
pub fn fetch_history(provider: &dyn PriceProvider, coin_id: &str, days: u32) -> HistorySeries {
    match provider.history(coin_id, days) {
        Ok(points) => HistorySeries {
            coin_id: coin_id.to_string(),
            points,
            source: HistorySource::Live,
            error: None,
        },
        Err(e) => {
            let mut series = sample_history(coin_id, days);
            series.error = Some(e.to_string());
            series
        }
    }
}

/// Deterministic placeholder series: one point per day, a gentle sine wave
/// around 1.0, oldest first. Same shape the original calculator showed when
/// its API was down.
pub fn sample_history(coin_id: &str, days: u32) -> HistorySeries {
    let now = Utc::now().naive_utc();
    let points = (0..days)
        .rev()
        .map(|i| PricePoint {
            time: now - Duration::days(i64::from(i)),
            price: 1.0 + 0.05 * f64::from(i).sin(),
        })
        .collect();

    HistorySeries {
        coin_id: coin_id.to_string(),
        points,
        source: HistorySource::Sample,
        error: None,
    }
}

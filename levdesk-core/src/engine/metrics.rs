//! Derived position metrics and the batch evaluator.
//!
//! All functions are pure: they take positions plus spot prices and return
//! plain report structs for the UI shells to render. Spot prices are
//! optional so the evaluator keeps working offline; price-dependent columns
//! simply come back `None`.

use serde::{Deserialize, Serialize};

use super::risk::{RiskPolicy, RiskTier};
use crate::domain::{CoinMap, InvalidPosition, Position, Session};

/// Liquidation proximity threshold: within 5% of spot highlights the row.
const NEAR_LIQUIDATION_FRACTION: f64 = 0.05;

/// Derived metrics for one valid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub coin: String,
    pub direction: crate::domain::Direction,
    pub margin: f64,
    pub leverage: f64,
    pub stop_loss_pct: Option<f64>,
    pub take_profit_pct: Option<f64>,
    /// Spot price at evaluation time; `None` when prices are unavailable.
    pub price_usd: Option<f64>,
    /// Token quantity bought with the notional; `None` without a price.
    pub tokens: Option<f64>,
    pub notional_usd: f64,
    /// Estimated liquidation price; `None` without a price.
    pub liquidation_price: Option<f64>,
    /// PnL if the stop-loss is hit (always <= 0).
    pub stop_loss_pnl: Option<f64>,
    /// PnL if the take-profit is hit (always >= 0).
    pub take_profit_pnl: Option<f64>,
    pub risk: RiskTier,
    /// Liquidation price within 5% of spot.
    pub near_liquidation: bool,
}

/// Exposure share for one coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinExposure {
    pub coin: String,
    pub exposure_usd: f64,
    pub share_pct: f64,
}

/// Aggregates over valid positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_margin: f64,
    pub total_exposure: f64,
    /// Exposure / margin, 0 when there is no margin.
    pub weighted_leverage: f64,
    pub open_positions: usize,
    /// Per-coin exposure, sorted descending.
    pub composition: Vec<CoinExposure>,
}

/// Result of evaluating a whole session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// One row per valid position, in session order.
    pub rows: Vec<PositionReport>,
    /// (session index, reason) for each excluded position.
    pub skipped: Vec<(usize, InvalidPosition)>,
    pub summary: PortfolioSummary,
}

impl EvaluationReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Estimated liquidation price for a position at the given spot price.
///
/// Long: `price * (1 - 1/leverage + mm/100)`; short is mirrored. The
/// maintenance margin `mm` is a percentage.
pub fn liquidation_price(position: &Position, price: f64, maintenance_margin_pct: f64) -> f64 {
    let buffer = 1.0 / position.leverage - maintenance_margin_pct / 100.0;
    match position.direction {
        crate::domain::Direction::Long => price * (1.0 - buffer),
        crate::domain::Direction::Short => price * (1.0 + buffer),
    }
}

/// Compute the report row for one position. Fails on invalid input rather
/// than producing nonsense numbers.
pub fn position_report(
    position: &Position,
    price: Option<f64>,
    policy: &RiskPolicy,
    maintenance_margin_pct: f64,
) -> Result<PositionReport, InvalidPosition> {
    position.validate()?;

    let notional = position.notional();
    // Threshold PnLs reduce to fractions of notional: the price term in
    // (price_at_threshold - price) * tokens cancels. A stop-loss is an
    // adverse move for either direction, so its PnL is always negative.
    let stop_loss_pnl = position.stop_loss_pct.map(|sl| -notional * sl / 100.0);
    let take_profit_pnl = position.take_profit_pct.map(|tp| notional * tp / 100.0);

    let (tokens, liq, near) = match price {
        Some(p) if p > 0.0 => {
            let tokens = notional / p;
            let liq = liquidation_price(position, p, maintenance_margin_pct);
            let near = (liq - p).abs() <= p * NEAR_LIQUIDATION_FRACTION;
            (Some(tokens), Some(liq), near)
        }
        Some(_) => (Some(0.0), None, false),
        None => (None, None, false),
    };

    Ok(PositionReport {
        coin: position.coin.clone(),
        direction: position.direction,
        margin: position.margin,
        leverage: position.leverage,
        stop_loss_pct: position.stop_loss_pct,
        take_profit_pct: position.take_profit_pct,
        price_usd: price,
        tokens,
        notional_usd: notional,
        liquidation_price: liq,
        stop_loss_pnl,
        take_profit_pnl,
        risk: policy.classify(position.leverage, position.stop_loss_pct.is_some()),
        near_liquidation: near,
    })
}

/// Evaluate every position in the session.
///
/// Valid positions produce rows in session order; invalid ones are counted
/// and reported, never aborting the batch.
pub fn evaluate(session: &Session, coins: &CoinMap, policy: &RiskPolicy) -> EvaluationReport {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (idx, position) in session.positions.iter().enumerate() {
        let price = coins.price(&position.coin);
        match position_report(position, price, policy, session.maintenance_margin_pct) {
            Ok(row) => rows.push(row),
            Err(reason) => skipped.push((idx, reason)),
        }
    }

    let summary = summarize(&rows);

    EvaluationReport {
        rows,
        skipped,
        summary,
    }
}

/// Portfolio aggregates over report rows.
pub fn summarize(rows: &[PositionReport]) -> PortfolioSummary {
    let total_margin: f64 = rows.iter().map(|r| r.margin).sum();
    let total_exposure: f64 = rows.iter().map(|r| r.notional_usd).sum();
    let weighted_leverage = if total_margin > 0.0 {
        total_exposure / total_margin
    } else {
        0.0
    };

    let mut composition: Vec<CoinExposure> = Vec::new();
    for row in rows {
        match composition
            .iter_mut()
            .find(|c| c.coin.eq_ignore_ascii_case(&row.coin))
        {
            Some(entry) => entry.exposure_usd += row.notional_usd,
            None => composition.push(CoinExposure {
                coin: row.coin.clone(),
                exposure_usd: row.notional_usd,
                share_pct: 0.0,
            }),
        }
    }
    if total_exposure > 0.0 {
        for entry in &mut composition {
            entry.share_pct = 100.0 * entry.exposure_usd / total_exposure;
        }
    }
    composition.sort_by(|a, b| {
        b.exposure_usd
            .partial_cmp(&a.exposure_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    PortfolioSummary {
        total_margin,
        total_exposure,
        weighted_leverage,
        open_positions: rows.len(),
        composition,
    }
}

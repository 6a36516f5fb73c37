//! Scenario evaluation — hypothetical market moves against the book.
//!
//! PnL is linear in the move percentage until a stop-loss or take-profit
//! threshold is crossed; past the threshold the position is treated as
//! closed there and its PnL is clamped to the threshold value.

use serde::{Deserialize, Serialize};

use crate::domain::{Position, Session};

/// Which threshold closed a simulated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
}

impl CloseReason {
    pub fn label(self) -> &'static str {
        match self {
            CloseReason::StopLoss => "SL hit",
            CloseReason::TakeProfit => "TP hit",
        }
    }
}

/// Simulated outcome for one position under a given move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionOutcome {
    pub pnl: f64,
    pub closed_by: Option<CloseReason>,
}

/// Scenario result for all positions in one coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinScenario {
    pub coin: String,
    pub move_pct: f64,
    pub pnl: f64,
    /// Positions closed at a threshold under this move.
    pub closed: usize,
    /// Valid positions contributing to this coin.
    pub positions: usize,
}

/// Scenario result for the whole session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub coins: Vec<CoinScenario>,
    pub net_pnl: f64,
}

/// Simulate one position under a hypothetical move of `move_pct` percent.
///
/// The gain fraction seen by the position is `move_pct * direction sign`;
/// a take-profit caps it from above, a stop-loss from below. When the move
/// crosses a threshold the PnL freezes at the threshold value. Invalid
/// positions yield `None`.
pub fn position_outcome(position: &Position, move_pct: f64) -> Option<PositionOutcome> {
    if !position.is_valid() {
        return None;
    }

    let notional = position.notional();
    let gain_pct = move_pct * position.direction.sign();

    if let Some(tp) = position.take_profit_pct {
        if gain_pct >= tp {
            return Some(PositionOutcome {
                pnl: notional * tp / 100.0,
                closed_by: Some(CloseReason::TakeProfit),
            });
        }
    }
    if let Some(sl) = position.stop_loss_pct {
        if gain_pct <= -sl {
            return Some(PositionOutcome {
                pnl: -notional * sl / 100.0,
                closed_by: Some(CloseReason::StopLoss),
            });
        }
    }

    Some(PositionOutcome {
        pnl: notional * gain_pct / 100.0,
        closed_by: None,
    })
}

/// Evaluate the session's per-coin scenario moves and aggregate PnL.
///
/// Coins appear in first-seen position order; invalid positions are
/// excluded, matching the batch evaluator.
pub fn evaluate_scenario(session: &Session) -> ScenarioReport {
    let mut coins: Vec<CoinScenario> = Vec::new();
    let mut net_pnl = 0.0;

    for symbol in session.coins() {
        let move_pct = session.move_for(symbol);
        let mut pnl = 0.0;
        let mut closed = 0;
        let mut count = 0;

        for position in session
            .positions
            .iter()
            .filter(|p| p.coin.eq_ignore_ascii_case(symbol))
        {
            if let Some(outcome) = position_outcome(position, move_pct) {
                pnl += outcome.pnl;
                count += 1;
                if outcome.closed_by.is_some() {
                    closed += 1;
                }
            }
        }

        net_pnl += pnl;
        coins.push(CoinScenario {
            coin: symbol.to_string(),
            move_pct,
            pnl,
            closed,
            positions: count,
        });
    }

    ScenarioReport { coins, net_pnl }
}

//! Position — one leveraged trade the user is modeling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Long,
    Short,
}

impl Direction {
    /// Signed multiplier applied to price moves: +1 long, -1 short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }
}

/// Why a position is excluded from calculations.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum InvalidPosition {
    #[error("margin must be positive (got {0})")]
    NonPositiveMargin(f64),

    #[error("leverage must be positive (got {0})")]
    NonPositiveLeverage(f64),

    #[error("stop-loss must be in (0, 100] percent (got {0})")]
    StopLossOutOfRange(f64),

    #[error("take-profit must be in (0, 100] percent (got {0})")]
    TakeProfitOutOfRange(f64),
}

/// One leveraged trade entry.
///
/// Percentages are expressed as 0-100, not fractions. Stop-loss and
/// take-profit are optional; `None` means no threshold is set. Positions
/// deserialized from files written by older versions default to `Long`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coin: String,
    pub margin: f64,
    pub leverage: f64,
    #[serde(default)]
    pub stop_loss_pct: Option<f64>,
    #[serde(default)]
    pub take_profit_pct: Option<f64>,
    #[serde(default)]
    pub direction: Direction,
}

impl Position {
    /// A blank entry as created by the "add position" action.
    ///
    /// Blank entries fail validation (zero margin/leverage) until the user
    /// fills them in, so they never leak into aggregate outputs.
    pub fn blank(coin: impl Into<String>) -> Self {
        Self {
            coin: coin.into(),
            margin: 0.0,
            leverage: 0.0,
            stop_loss_pct: None,
            take_profit_pct: None,
            direction: Direction::Long,
        }
    }

    /// The invariant gate: margin > 0, leverage > 0, optional thresholds
    /// in (0, 100]. Invalid positions are skipped, never a crash.
    pub fn validate(&self) -> Result<(), InvalidPosition> {
        if !(self.margin > 0.0) {
            return Err(InvalidPosition::NonPositiveMargin(self.margin));
        }
        if !(self.leverage > 0.0) {
            return Err(InvalidPosition::NonPositiveLeverage(self.leverage));
        }
        if let Some(sl) = self.stop_loss_pct {
            if !(sl > 0.0 && sl <= 100.0) {
                return Err(InvalidPosition::StopLossOutOfRange(sl));
            }
        }
        if let Some(tp) = self.take_profit_pct {
            if !(tp > 0.0 && tp <= 100.0) {
                return Err(InvalidPosition::TakeProfitOutOfRange(tp));
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Notional exposure: margin x leverage.
    pub fn notional(&self) -> f64 {
        self.margin * self.leverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Position {
        Position {
            coin: "BTC".into(),
            margin: 100.0,
            leverage: 10.0,
            stop_loss_pct: Some(3.0),
            take_profit_pct: None,
            direction: Direction::Long,
        }
    }

    #[test]
    fn valid_position_passes() {
        assert!(valid().is_valid());
        assert_eq!(valid().notional(), 1000.0);
    }

    #[test]
    fn zero_margin_rejected() {
        let mut p = valid();
        p.margin = 0.0;
        assert_eq!(p.validate(), Err(InvalidPosition::NonPositiveMargin(0.0)));
    }

    #[test]
    fn zero_leverage_rejected() {
        let mut p = valid();
        p.leverage = 0.0;
        assert_eq!(p.validate(), Err(InvalidPosition::NonPositiveLeverage(0.0)));
    }

    #[test]
    fn nan_margin_rejected() {
        let mut p = valid();
        p.margin = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn out_of_range_stop_loss_rejected() {
        let mut p = valid();
        p.stop_loss_pct = Some(150.0);
        assert_eq!(
            p.validate(),
            Err(InvalidPosition::StopLossOutOfRange(150.0))
        );
        p.stop_loss_pct = Some(0.0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn blank_entry_is_invalid_until_filled() {
        let p = Position::blank("ETH");
        assert!(!p.is_valid());
    }

    #[test]
    fn direction_defaults_to_long_in_json() {
        let json = r#"{"coin":"BTC","margin":50.0,"leverage":2.0}"#;
        let p: Position = serde_json::from_str(json).unwrap();
        assert_eq!(p.direction, Direction::Long);
        assert!(p.is_valid());
    }
}

//! Risk tiers — qualitative classification from leverage and stop-loss use.
//!
//! The tier boundaries are policy, not law: they load from a TOML file so
//! deployments can tune them without code changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Qualitative risk label for one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }

    /// One step safer, saturating at Low.
    fn step_down(self) -> RiskTier {
        match self {
            RiskTier::High => RiskTier::Medium,
            RiskTier::Medium | RiskTier::Low => RiskTier::Low,
        }
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("thresholds must satisfy 0 < low_max_leverage < medium_max_leverage (got {low} and {medium})")]
    InvalidThresholds { low: f64, medium: f64 },
}

/// Tier boundaries and the stop-loss credit switch.
///
/// Defaults: leverage <= 3 is Low, <= 10 is Medium, above is High; a set
/// stop-loss shifts the tier one step down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    pub low_max_leverage: f64,
    pub medium_max_leverage: f64,
    pub stop_loss_credit: bool,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            low_max_leverage: 3.0,
            medium_max_leverage: 10.0,
            stop_loss_credit: true,
        }
    }
}

impl RiskPolicy {
    /// Load a policy from a TOML file, rejecting inverted thresholds.
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path)?;
        let policy: RiskPolicy = toml::from_str(&content)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(self.low_max_leverage > 0.0 && self.medium_max_leverage > self.low_max_leverage) {
            return Err(PolicyError::InvalidThresholds {
                low: self.low_max_leverage,
                medium: self.medium_max_leverage,
            });
        }
        Ok(())
    }

    /// Classify a position by leverage magnitude and stop-loss presence.
    ///
    /// Monotonic non-decreasing in leverage for fixed stop-loss presence.
    pub fn classify(&self, leverage: f64, has_stop_loss: bool) -> RiskTier {
        let base = if leverage <= self.low_max_leverage {
            RiskTier::Low
        } else if leverage <= self.medium_max_leverage {
            RiskTier::Medium
        } else {
            RiskTier::High
        };

        if has_stop_loss && self.stop_loss_credit {
            base.step_down()
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tiers() {
        let p = RiskPolicy::default();
        assert_eq!(p.classify(1.0, false), RiskTier::Low);
        assert_eq!(p.classify(3.0, false), RiskTier::Low);
        assert_eq!(p.classify(3.1, false), RiskTier::Medium);
        assert_eq!(p.classify(10.0, false), RiskTier::Medium);
        assert_eq!(p.classify(25.0, false), RiskTier::High);
    }

    #[test]
    fn stop_loss_shifts_one_tier_down() {
        let p = RiskPolicy::default();
        assert_eq!(p.classify(25.0, true), RiskTier::Medium);
        assert_eq!(p.classify(5.0, true), RiskTier::Low);
        assert_eq!(p.classify(1.0, true), RiskTier::Low);
    }

    #[test]
    fn credit_can_be_disabled() {
        let p = RiskPolicy {
            stop_loss_credit: false,
            ..RiskPolicy::default()
        };
        assert_eq!(p.classify(25.0, true), RiskTier::High);
    }

    #[test]
    fn toml_round_trip_with_partial_keys() {
        let policy: RiskPolicy = toml::from_str("low_max_leverage = 2.0").unwrap();
        assert_eq!(policy.low_max_leverage, 2.0);
        assert_eq!(policy.medium_max_leverage, 10.0);
        assert!(policy.stop_loss_credit);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let policy = RiskPolicy {
            low_max_leverage: 10.0,
            medium_max_leverage: 3.0,
            stop_loss_credit: true,
        };
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn tier_ordering() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::Medium < RiskTier::High);
    }
}

//! Session — the explicit context object owned by the UI shell.
//!
//! Replaces the original app's implicit per-session global state with a
//! plain struct the shells pass into the engine. Holds the ordered position
//! list, per-coin scenario moves, and the maintenance-margin setting.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Position;

/// Default maintenance margin percentage used for liquidation prices.
pub const DEFAULT_MAINTENANCE_MARGIN_PCT: f64 = 0.5;

/// Scenario move slider bounds, percent.
pub const MOVE_MIN_PCT: f64 = -50.0;
pub const MOVE_MAX_PCT: f64 = 50.0;

/// In-memory session state: positions plus scenario settings.
///
/// Positions keep insertion order; every aggregate output (table, CSV)
/// walks the list in this order. New positions are inserted at the front,
/// matching the original app's add behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub positions: Vec<Position>,
    /// Hypothetical move percentage per coin symbol, -50..50.
    pub scenario_moves: BTreeMap<String, f64>,
    /// Maintenance margin percentage for liquidation price estimates.
    pub maintenance_margin_pct: f64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            scenario_moves: BTreeMap::new(),
            maintenance_margin_pct: DEFAULT_MAINTENANCE_MARGIN_PCT,
        }
    }
}

impl Session {
    /// Insert a position at the front of the list.
    pub fn add(&mut self, position: Position) {
        self.positions.insert(0, position);
    }

    /// Remove the position at `index`. Out-of-range is a no-op.
    pub fn remove(&mut self, index: usize) {
        if index < self.positions.len() {
            self.positions.remove(index);
        }
    }

    /// Drop all positions and scenario moves.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.scenario_moves.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Set the scenario move for a coin, clamped to the slider bounds.
    pub fn set_move(&mut self, coin: &str, pct: f64) {
        let clamped = pct.clamp(MOVE_MIN_PCT, MOVE_MAX_PCT);
        self.scenario_moves.insert(coin.to_string(), clamped);
    }

    pub fn move_for(&self, coin: &str) -> f64 {
        self.scenario_moves.get(coin).copied().unwrap_or(0.0)
    }

    /// Reset every scenario move to zero.
    pub fn reset_moves(&mut self) {
        for v in self.scenario_moves.values_mut() {
            *v = 0.0;
        }
    }

    /// Distinct coin symbols across positions, first-seen order.
    pub fn coins(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for p in &self.positions {
            if !seen.iter().any(|s: &&str| s.eq_ignore_ascii_case(&p.coin)) {
                seen.push(p.coin.as_str());
            }
        }
        seen
    }

    /// Load a session from a JSON file. Missing file yields the default
    /// session; a corrupt file is an error the caller surfaces.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save the session as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

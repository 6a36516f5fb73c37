//! LevDesk Core — calculation engine for leveraged crypto positions.
//!
//! This crate contains everything below the UI shells:
//! - Domain types (positions, coins, the session context object)
//! - Pure calculation engine (notional, liquidation, risk tiers, scenario PnL)
//! - Price data adapters (CoinPaprika primary, CoinGecko fallback)
//! - Export (CSV report, positions JSON save/load)
//!
//! The UI shells (`levdesk-tui`, `levdesk-cli`) own the event handling and
//! pass a `Session` into the engine; nothing in here touches a terminal.

pub mod data;
pub mod domain;
pub mod engine;
pub mod export;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types cross the TUI thread boundary.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Session>();
        require_sync::<domain::Session>();
        require_send::<domain::CoinMap>();
        require_sync::<domain::CoinMap>();

        require_send::<engine::PositionReport>();
        require_sync::<engine::PositionReport>();
        require_send::<engine::RiskPolicy>();
        require_sync::<engine::RiskPolicy>();

        require_send::<data::HistorySeries>();
        require_sync::<data::HistorySeries>();
        require_send::<data::PriceError>();
        require_sync::<data::PriceError>();
    }
}

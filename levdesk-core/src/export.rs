//! Export — CSV report shaping and positions JSON save/load.
//!
//! The CSV projects positions plus derived fields into a flat record set
//! with a fixed column order; internal/UI-only fields (cursor state, near-
//! liquidation highlighting) are omitted. Zero valid positions produce a
//! header-only file, not an error.

use anyhow::{Context, Result};

use crate::domain::Position;
use crate::engine::PositionReport;

/// CSV header, in the stable column order.
pub const CSV_COLUMNS: [&str; 13] = [
    "coin",
    "direction",
    "margin",
    "leverage",
    "stop_loss_pct",
    "take_profit_pct",
    "price_usd",
    "tokens",
    "notional_usd",
    "liquidation_price",
    "stop_loss_pnl",
    "take_profit_pnl",
    "risk",
];

fn opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_default()
}

/// Render report rows as a UTF-8 CSV string, one row per valid position in
/// session order.
pub fn export_report_csv(rows: &[PositionReport]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_COLUMNS)?;

    for r in rows {
        wtr.write_record([
            r.coin.as_str(),
            r.direction.label(),
            &format!("{:.2}", r.margin),
            &format!("{:.2}", r.leverage),
            &opt(r.stop_loss_pct, 2),
            &opt(r.take_profit_pct, 2),
            &opt(r.price_usd, 6),
            &opt(r.tokens, 6),
            &format!("{:.2}", r.notional_usd),
            &opt(r.liquidation_price, 6),
            &opt(r.stop_loss_pnl, 2),
            &opt(r.take_profit_pnl, 2),
            r.risk.label(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Serialize the position list to pretty JSON (the save-positions feature).
pub fn export_positions_json(positions: &[Position]) -> Result<String> {
    serde_json::to_string_pretty(positions).context("failed to serialize positions to JSON")
}

/// Deserialize a position list from JSON. Shape errors fail the load;
/// per-position validity is the evaluator's concern, so out-of-range values
/// load fine and show up as skipped rows.
pub fn import_positions_json(json: &str) -> Result<Vec<Position>> {
    serde_json::from_str(json).context("failed to deserialize positions from JSON")
}

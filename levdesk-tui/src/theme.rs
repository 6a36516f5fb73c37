//! Neon-on-dark theme tokens for the LevDesk TUI.

use ratatui::style::{Color, Modifier, Style};

use levdesk_core::engine::RiskTier;

/// Electric cyan — focus, highlights.
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
/// Neon green — gains, success, longs.
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
/// Hot pink — losses, failures, shorts.
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
/// Neon orange — warnings, near-liquidation rows.
pub const WARNING: Color = Color::Rgb(255, 140, 0);
/// Steel blue — muted/secondary text.
pub const MUTED: Color = Color::Rgb(100, 149, 237);

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Style for a PnL cell: green at or above zero, pink below.
pub fn pnl(value: f64) -> Style {
    if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

/// Style for a risk tier label.
pub fn risk(tier: RiskTier) -> Style {
    match tier {
        RiskTier::Low => positive(),
        RiskTier::Medium => warning(),
        RiskTier::High => negative(),
    }
}

/// Border style for the active panel frame.
pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnl_color_splits_at_zero() {
        assert_eq!(pnl(10.0), positive());
        assert_eq!(pnl(0.0), positive());
        assert_eq!(pnl(-0.01), negative());
    }

    #[test]
    fn risk_colors() {
        assert_eq!(risk(RiskTier::Low), positive());
        assert_eq!(risk(RiskTier::Medium), warning());
        assert_eq!(risk(RiskTier::High), negative());
    }
}

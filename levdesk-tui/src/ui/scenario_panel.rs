//! Panel 2 — Scenario: per-coin hypothetical moves and simulated PnL.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use levdesk_core::domain::session::{MOVE_MAX_PCT, MOVE_MIN_PCT};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    if app.scenario.coins.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No valid positions to simulate. Add positions in Panel 1.",
                theme::muted(),
            )),
        ]);
        f.render_widget(empty, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // table
            Constraint::Length(2), // net PnL + hints
        ])
        .split(area);

    render_table(f, chunks[0], app);
    render_net(f, chunks[1], app);
}

/// Text gauge for a move slider, e.g. `[----|##--]  +12%`.
fn move_gauge(move_pct: f64, width: usize) -> String {
    let span = MOVE_MAX_PCT - MOVE_MIN_PCT;
    let zero = ((0.0 - MOVE_MIN_PCT) / span * (width as f64 - 1.0)).round() as usize;
    let pos = ((move_pct - MOVE_MIN_PCT) / span * (width as f64 - 1.0)).round() as usize;

    let (lo, hi) = if pos < zero { (pos, zero) } else { (zero, pos) };
    (0..width)
        .map(|i| {
            if i == zero {
                '|'
            } else if i >= lo && i <= hi {
                '#'
            } else {
                '-'
            }
        })
        .collect()
}

fn render_table(f: &mut Frame, area: Rect, app: &AppState) {
    let header = Row::new(
        ["Coin", "Move", "", "Positions", "Closed", "P/L"]
            .into_iter()
            .map(|h| Cell::from(Span::styled(h, theme::title()))),
    );

    let rows: Vec<Row> = app
        .scenario
        .coins
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let closed = if c.closed > 0 {
                Span::styled(format!("{}", c.closed), theme::warning())
            } else {
                Span::raw("0")
            };
            let row = Row::new(vec![
                Cell::from(c.coin.clone()),
                Cell::from(format!("{:+.0}%", c.move_pct)),
                Cell::from(move_gauge(c.move_pct, 21)),
                Cell::from(c.positions.to_string()),
                Cell::from(closed),
                Cell::from(Span::styled(format!("${:+.2}", c.pnl), theme::pnl(c.pnl))),
            ]);
            if idx == app.scenario_cursor {
                row.style(ratatui::style::Style::default().add_modifier(Modifier::REVERSED))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(21),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths).header(header).column_spacing(2);
    f.render_widget(table, area);
}

fn render_net(f: &mut Frame, area: Rect, app: &AppState) {
    let net = app.scenario.net_pnl;
    let lines = vec![
        Line::from(vec![
            Span::styled("Net portfolio P/L: ", theme::muted()),
            Span::styled(format!("${net:+.2}"), theme::pnl(net)),
        ]),
        Line::from(Span::styled(
            "j/k:coin h/l:±1% H/L:±10% 0:reset",
            theme::muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

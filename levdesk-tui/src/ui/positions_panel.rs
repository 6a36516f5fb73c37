//! Panel 1 — Positions: portfolio summary, position table, derived metrics.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use levdesk_core::engine::metrics::position_report;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // summary
            Constraint::Min(3),    // table
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_summary(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_footer(f, chunks[2], app);
}

fn fmt_usd(v: f64) -> String {
    format!("${v:.2}")
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format!("{x:.decimals$}")).unwrap_or_else(|| "—".into())
}

fn render_summary(f: &mut Frame, area: Rect, app: &AppState) {
    let s = &app.report.summary;

    let top3: String = if s.composition.is_empty() {
        "no exposure".into()
    } else {
        let mut parts: Vec<String> = s
            .composition
            .iter()
            .take(3)
            .map(|c| format!("{} {:.1}%", c.coin, c.share_pct))
            .collect();
        if s.composition.len() > 3 {
            let rest: f64 = s.composition.iter().skip(3).map(|c| c.share_pct).sum();
            parts.push(format!("others {rest:.1}%"));
        }
        parts.join(", ")
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Margin ", theme::muted()),
            Span::styled(fmt_usd(s.total_margin), theme::accent()),
            Span::styled("   Exposure ", theme::muted()),
            Span::styled(fmt_usd(s.total_exposure), theme::accent()),
            Span::styled("   Avg leverage ", theme::muted()),
            Span::styled(format!("{:.2}x", s.weighted_leverage), theme::accent()),
            Span::styled("   Open ", theme::muted()),
            Span::styled(s.open_positions.to_string(), theme::accent()),
            Span::styled("   Maint. margin ", theme::muted()),
            Span::styled(
                format!("{:.1}%", app.session.maintenance_margin_pct),
                theme::accent(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Composition: ", theme::muted()),
            Span::raw(top3),
        ]),
        Line::from(match &app.price_source {
            Some(source) => Span::styled(format!("Prices: {source}"), theme::muted()),
            None => Span::styled("Prices: not fetched (press r)", theme::warning()),
        }),
    ];

    f.render_widget(Paragraph::new(lines), area);
}

fn render_table(f: &mut Frame, area: Rect, app: &AppState) {
    if app.session.positions.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No positions. Press 'a' to add one.",
                theme::muted(),
            )),
        ]);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(
        ["#", "Coin", "Dir", "Margin", "Lev", "SL%", "TP%", "Price", "Notional", "Liq", "Risk"]
            .into_iter()
            .map(|h| Cell::from(Span::styled(h, theme::title()))),
    );

    let mut rows: Vec<Row> = Vec::with_capacity(app.session.positions.len());
    for (idx, position) in app.session.positions.iter().enumerate() {
        let price = app.coins.price(&position.coin);
        let selected = idx == app.cursor;

        let row = match position_report(
            position,
            price,
            &app.policy,
            app.session.maintenance_margin_pct,
        ) {
            Ok(r) => {
                let base = if r.near_liquidation {
                    Style::default().fg(theme::WARNING)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from((idx + 1).to_string()),
                    Cell::from(r.coin.clone()),
                    Cell::from(r.direction.label()),
                    Cell::from(fmt_usd(r.margin)),
                    Cell::from(format!("{:.2}x", r.leverage)),
                    Cell::from(fmt_opt(r.stop_loss_pct, 1)),
                    Cell::from(fmt_opt(r.take_profit_pct, 1)),
                    Cell::from(fmt_opt(r.price_usd, 4)),
                    Cell::from(fmt_usd(r.notional_usd)),
                    Cell::from(fmt_opt(r.liquidation_price, 4)),
                    Cell::from(Span::styled(r.risk.label(), theme::risk(r.risk))),
                ])
                .style(base)
            }
            Err(reason) => Row::new(vec![
                Cell::from((idx + 1).to_string()),
                Cell::from(position.coin.clone()),
                Cell::from(Span::styled("invalid", theme::negative())),
                Cell::from(Span::styled(reason.to_string(), theme::negative())),
            ]),
        };

        rows.push(if selected {
            row.style(Style::default().add_modifier(Modifier::REVERSED))
        } else {
            row
        });
    }

    let widths = [
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Length(5),
        Constraint::Length(11),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths).header(header).column_spacing(1);
    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &AppState) {
    let skipped = app.report.skipped_count();
    let line = if skipped > 0 {
        Line::from(Span::styled(
            format!("{skipped} position(s) excluded — fill margin and leverage"),
            theme::warning(),
        ))
    } else {
        Line::from(Span::styled(
            "a:add d:delete Enter:edit e:csv w/o:save/load r:prices c:clear",
            theme::muted(),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

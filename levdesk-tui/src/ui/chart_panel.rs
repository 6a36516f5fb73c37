//! Panel 3 — Chart: 7-day price history line chart for the selected coin.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use levdesk_core::data::{HistorySeries, HistorySource};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    match (&app.history, app.chart_symbol()) {
        (Some(series), Some(symbol)) if !series.points.is_empty() => {
            render_chart(f, area, series, &symbol)
        }
        (_, None) => render_message(f, area, "Add a position to chart its coin."),
        _ => render_message(f, area, "History unavailable."),
    }
}

fn render_message(f: &mut Frame, area: Rect, msg: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(msg.to_string(), theme::muted())),
        Line::from(""),
        Line::from(Span::styled("j/k: switch coin, r: refetch", theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_chart(f: &mut Frame, area: Rect, series: &HistorySeries, symbol: &str) {
    let prices: Vec<f64> = series.points.iter().map(|p| p.price).collect();
    let min_y = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max_y = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let padding = (max_y - min_y).abs().max(min_y.abs() * 0.01) * 0.05;
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = prices.len().saturating_sub(1) as f64;

    let data: Vec<(f64, f64)> = prices
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();

    let source_label = match series.source {
        HistorySource::Live => format!("{symbol} (live)"),
        HistorySource::Sample => format!("{symbol} (sample — API unavailable)"),
    };

    let dataset = Dataset::default()
        .name(source_label)
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(match series.source {
            HistorySource::Live => theme::ACCENT,
            HistorySource::Sample => theme::WARNING,
        }))
        .graph_type(GraphType::Line)
        .data(&data);

    let first = series.points.first().map(|p| p.time.format("%m-%d").to_string());
    let last = series.points.last().map(|p| p.time.format("%m-%d").to_string());

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(Span::styled("Day", theme::muted()))
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first.unwrap_or_default(), theme::muted()),
                    Span::styled(last.unwrap_or_default(), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("USD", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.4}"), theme::muted()),
                    Span::styled(format!("{y_max:.4}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

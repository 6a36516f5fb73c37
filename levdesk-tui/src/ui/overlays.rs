//! Modal overlays — the position edit form and the clear-all confirmation.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, EditField, EditForm};
use crate::theme;
use crate::ui::centered_rect;

pub fn render_edit(f: &mut Frame, area: Rect, form: &EditForm) {
    let popup = centered_rect(50, 60, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(format!(" Edit position {} ", form.index + 1))
        .title_style(theme::title());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines: Vec<Line> = vec![Line::from("")];
    for field in EditField::ALL {
        let selected = field == form.field;
        let value = if selected {
            // Live buffer with a cursor marker.
            format!("{}_", form.buffer)
        } else {
            display_value(form, field)
        };

        let label_style = if selected { theme::accent() } else { theme::muted() };
        let value_style = if selected {
            theme::accent()
        } else {
            ratatui::style::Style::default()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("  {:<14}", field.label()), label_style),
            Span::styled(value, value_style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Up/Down:field  Space:toggle direction  Enter:save  Esc:cancel",
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn display_value(form: &EditForm, field: EditField) -> String {
    match field {
        EditField::Coin => form.draft.coin.clone(),
        EditField::Margin => format!("{}", form.draft.margin),
        EditField::Leverage => format!("{}", form.draft.leverage),
        EditField::StopLoss => form
            .draft
            .stop_loss_pct
            .map(|v| format!("{v}"))
            .unwrap_or_else(|| "—".into()),
        EditField::TakeProfit => form
            .draft
            .take_profit_pct
            .map(|v| format!("{v}"))
            .unwrap_or_else(|| "—".into()),
        EditField::Direction => form.draft.direction.label().to_string(),
    }
}

pub fn render_confirm_clear(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(40, 20, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::warning())
        .title(" Clear all positions? ")
        .title_style(theme::title());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw(format!(
            "  This removes all {} position(s).",
            app.session.positions.len()
        ))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", theme::negative()),
            Span::raw(": clear   "),
            Span::styled("any other key", theme::muted()),
            Span::raw(": cancel"),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

//! Panel 4 — Help: keyboard reference.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-4", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "q", "Quit (session is saved)");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Positions");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "a", "Add a position (opens the edit form)");
    key(&mut lines, "d", "Delete the position under the cursor");
    key(&mut lines, "Enter", "Edit the position under the cursor");
    key(&mut lines, "e", "Export valid positions as positions.csv");
    key(&mut lines, "w / o", "Save / load positions.json");
    key(&mut lines, "r", "Refresh spot prices");
    key(&mut lines, "m / M", "Maintenance margin -0.1% / +0.1%");
    key(&mut lines, "c", "Clear all positions (asks to confirm)");
    lines.push(Line::from(""));

    section(&mut lines, "Edit form");
    key(&mut lines, "Up / Down / Tab", "Move between fields");
    key(&mut lines, "Space", "Toggle Long / Short on the Direction field");
    key(&mut lines, "Enter", "Save");
    key(&mut lines, "Esc", "Discard changes");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2 — Scenario");
    key(&mut lines, "j / k", "Select coin");
    key(&mut lines, "h / l", "Move -1% / +1%");
    key(&mut lines, "H / L", "Move -10% / +10%");
    key(&mut lines, "0", "Reset all moves to zero");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Chart");
    key(&mut lines, "j / k", "Switch coin");
    key(&mut lines, "r", "Refetch history");

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line>, title: &'static str) {
    lines.push(Line::from(Span::styled(title, theme::title())));
}

fn key(lines: &mut Vec<Line>, keys: &'static str, desc: &'static str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:<16}"), theme::accent()),
        Span::raw(desc),
    ]));
}

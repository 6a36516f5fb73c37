//! Keyboard input dispatch — overlays first, then global keys, then the
//! active panel's handler.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{AppState, EditField, Overlay, Panel, StatusLevel};

/// Default export targets in the working directory.
const CSV_EXPORT_PATH: &str = "positions.csv";
const JSON_EXPORT_PATH: &str = "positions.json";

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match std::mem::replace(&mut app.overlay, Overlay::None) {
        Overlay::Edit(form) => {
            handle_edit_overlay(app, form, key);
            return;
        }
        Overlay::ConfirmClear => {
            handle_confirm_clear(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => { app.active_panel = Panel::Positions; return; }
        KeyCode::Char('2') => { app.active_panel = Panel::Scenario; return; }
        KeyCode::Char('3') => { switch_to_chart(app); return; }
        KeyCode::Char('4') => { app.active_panel = Panel::Help; return; }
        KeyCode::Tab => {
            let next = app.active_panel.next();
            if next == Panel::Chart {
                switch_to_chart(app);
            } else {
                app.active_panel = next;
            }
            return;
        }
        KeyCode::BackTab => {
            let prev = app.active_panel.prev();
            if prev == Panel::Chart {
                switch_to_chart(app);
            } else {
                app.active_panel = prev;
            }
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Positions => handle_positions_key(app, key),
        Panel::Scenario => handle_scenario_key(app, key),
        Panel::Chart => handle_chart_key(app, key),
        Panel::Help => {} // display only
    }
}

/// Entering the chart panel fetches the series for the coin under the
/// cursor (synchronous, short timeout).
fn switch_to_chart(app: &mut AppState) {
    app.active_panel = Panel::Chart;
    app.ensure_history();
}

fn handle_edit_overlay(app: &mut AppState, mut form: crate::app::EditForm, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            // Discard the draft.
            app.set_status("edit cancelled", StatusLevel::Info);
        }
        KeyCode::Enter => match form.commit_buffer() {
            Ok(()) => app.apply_edit(&form),
            Err(e) => {
                app.set_status(e, StatusLevel::Error);
                app.overlay = Overlay::Edit(form);
            }
        },
        KeyCode::Up => {
            if form.commit_buffer().is_ok() {
                form.field = form.field.prev();
                form.load_buffer();
            }
            app.overlay = Overlay::Edit(form);
        }
        KeyCode::Down | KeyCode::Tab => {
            if form.commit_buffer().is_ok() {
                form.field = form.field.next();
                form.load_buffer();
            }
            app.overlay = Overlay::Edit(form);
        }
        KeyCode::Backspace => {
            if form.field != EditField::Direction {
                form.buffer.pop();
            }
            app.overlay = Overlay::Edit(form);
        }
        KeyCode::Char(' ') if form.field == EditField::Direction => {
            form.toggle_direction();
            app.overlay = Overlay::Edit(form);
        }
        KeyCode::Char(c) => {
            if form.field != EditField::Direction {
                form.buffer.push(c);
            }
            app.overlay = Overlay::Edit(form);
        }
        _ => {
            app.overlay = Overlay::Edit(form);
        }
    }
}

fn handle_confirm_clear(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.clear_positions(),
        _ => app.set_status("clear cancelled", StatusLevel::Info),
    }
}

fn handle_positions_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.cursor + 1 < app.session.positions.len() {
                app.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Char('a') => app.add_position(),
        KeyCode::Char('d') => app.remove_selected(),
        KeyCode::Enter => {
            if let Some(position) = app.session.positions.get(app.cursor) {
                app.overlay = Overlay::Edit(crate::app::EditForm::new(app.cursor, position));
            }
        }
        KeyCode::Char('c') => {
            if !app.session.is_empty() {
                app.overlay = Overlay::ConfirmClear;
            }
        }
        KeyCode::Char('r') => app.refresh_prices(),
        KeyCode::Char('e') => app.export_csv(Path::new(CSV_EXPORT_PATH)),
        KeyCode::Char('w') => app.save_positions(Path::new(JSON_EXPORT_PATH)),
        KeyCode::Char('o') => app.load_positions(Path::new(JSON_EXPORT_PATH)),
        KeyCode::Char('m') => app.nudge_maintenance_margin(-0.1),
        KeyCode::Char('M') => app.nudge_maintenance_margin(0.1),
        _ => {}
    }
}

fn handle_scenario_key(app: &mut AppState, key: KeyEvent) {
    let coin_count = app.session.coins().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.scenario_cursor + 1 < coin_count {
                app.scenario_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scenario_cursor = app.scenario_cursor.saturating_sub(1);
        }
        KeyCode::Char('h') | KeyCode::Left => app.nudge_move(-1.0),
        KeyCode::Char('l') | KeyCode::Right => app.nudge_move(1.0),
        KeyCode::Char('H') => app.nudge_move(-10.0),
        KeyCode::Char('L') => app.nudge_move(10.0),
        KeyCode::Char('0') => app.reset_moves(),
        _ => {}
    }
}

fn handle_chart_key(app: &mut AppState, key: KeyEvent) {
    let coin_count = app.session.coins().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.chart_cursor + 1 < coin_count {
                app.chart_cursor += 1;
                app.ensure_history();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.chart_cursor > 0 {
                app.chart_cursor -= 1;
                app.ensure_history();
            }
        }
        KeyCode::Char('r') => app.reload_history(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use levdesk_core::domain::{Position, Session};
    use std::path::PathBuf;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_positions(n: usize) -> AppState {
        let mut session = Session::default();
        for i in 0..n {
            let mut p = Position::blank("BTC");
            p.margin = 100.0 * (i + 1) as f64;
            p.leverage = 2.0;
            session.add(p);
        }
        AppState::new(session, PathBuf::from("/tmp/levdesk-input-test.json"))
    }

    #[test]
    fn number_keys_switch_panels() {
        let mut app = app_with_positions(0);
        handle_key(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.active_panel, Panel::Scenario);
        handle_key(&mut app, key(KeyCode::Char('4')));
        assert_eq!(app.active_panel, Panel::Help);
    }

    #[test]
    fn q_quits_outside_overlays() {
        let mut app = app_with_positions(0);
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn cursor_moves_clamp_to_list() {
        let mut app = app_with_positions(2);
        handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.cursor, 1);
        handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.cursor, 1);
        handle_key(&mut app, key(KeyCode::Char('k')));
        handle_key(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn enter_opens_edit_and_esc_discards() {
        let mut app = app_with_positions(1);
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(matches!(app.overlay, Overlay::Edit(_)));

        handle_key(&mut app, key(KeyCode::Esc));
        assert!(matches!(app.overlay, Overlay::None));
        // q in the overlay must not have quit the app
        assert!(app.running);
    }

    #[test]
    fn typing_in_edit_buffer() {
        let mut app = app_with_positions(1);
        handle_key(&mut app, key(KeyCode::Enter));
        // Move from Coin to Margin, then type a value.
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Backspace));
        handle_key(&mut app, key(KeyCode::Backspace));
        handle_key(&mut app, key(KeyCode::Backspace));
        for c in "250".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.session.positions[0].margin, 250.0);
    }

    #[test]
    fn clear_requires_confirmation() {
        let mut app = app_with_positions(2);
        handle_key(&mut app, key(KeyCode::Char('c')));
        assert!(matches!(app.overlay, Overlay::ConfirmClear));

        handle_key(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.session.positions.len(), 2);

        handle_key(&mut app, key(KeyCode::Char('c')));
        handle_key(&mut app, key(KeyCode::Char('y')));
        assert!(app.session.is_empty());
    }

    #[test]
    fn maintenance_margin_nudges_both_ways() {
        let mut app = app_with_positions(1);
        assert_eq!(app.session.maintenance_margin_pct, 0.5);

        // Terminals report shift-m as an uppercase char with SHIFT set.
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('M'), KeyModifiers::SHIFT),
        );
        assert!((app.session.maintenance_margin_pct - 0.6).abs() < 1e-9);

        handle_key(&mut app, key(KeyCode::Char('m')));
        assert!((app.session.maintenance_margin_pct - 0.5).abs() < 1e-9);
    }

    #[test]
    fn scenario_nudges_clamp_at_bounds() {
        let mut app = app_with_positions(1);
        app.active_panel = Panel::Scenario;
        for _ in 0..10 {
            handle_key(&mut app, key(KeyCode::Char('H')));
        }
        assert_eq!(app.session.move_for("BTC"), -50.0);
        handle_key(&mut app, key(KeyCode::Char('l')));
        assert_eq!(app.session.move_for("BTC"), -49.0);
    }
}

//! LevDesk TUI — four-panel terminal interface with vim-style navigation.
//!
//! Panels:
//! 1. Positions — portfolio summary, position table, add/edit/delete, export
//! 2. Scenario — per-coin hypothetical moves and simulated PnL
//! 3. Chart — 7-day price history for the selected coin
//! 4. Help — keyboard reference

mod app;
mod input;
mod persistence;
mod theme;
mod ui;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{AppState, StatusLevel};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Load persisted session.
    let session_path = persistence::session_path();
    let (session, load_warning) = persistence::load(&session_path);

    let mut app = AppState::new(session, session_path);
    if let Some(warning) = load_warning {
        app.set_status(warning, StatusLevel::Warning);
    }

    // One best-effort price fetch up front; failure is a status message.
    app.refresh_prices();

    // Setup terminal.
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save session before exit.
    if let Err(e) = persistence::save(&app.session_path, &app.session) {
        eprintln!("warning: failed to save session: {e}");
    }

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Block briefly for input; the timeout keeps the UI responsive to
        // terminal resizes without a busy loop.
        if event::poll(Duration::from_millis(200))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if !app.running {
            return Ok(());
        }
    }
}

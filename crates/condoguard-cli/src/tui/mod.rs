//! CondoGuard TUI
//!
//! Terminal user interface for the resident register.
//!
//! ## Layout
//!
//! - Top: capacity gauge and access level
//! - Left: resident list (filtered by the search)
//! - Right: detail of the selected resident
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down
//! - g/G: Jump to first/last
//! - Enter: Full-screen detail, Esc to go back
//! - /: Search by name or house number
//! - q: Quit
//!
//! ## Admin commands
//!
//! - t: Toggle active/inactive
//! - c: Export the selected resident's card

mod app;
mod ui;

use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;

use condoguard_core::{AccessLevel, Clock, Config, KeyValueStore, ResidentStore};

use app::{App, InputMode, View};

/// Run the TUI application
pub fn run<K: KeyValueStore, C: Clock>(
    store: ResidentStore<K, C>,
    config: Config,
    access: AccessLevel,
) -> Result<()> {
    info!(%access, "Starting TUI");

    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(&store, &config, access);
    let result = run_app(&mut terminal, &mut app, &store, &config);

    drop(terminal);
    guard.restore()?;

    info!("TUI exited");
    result
}

/// Raw mode plus alternate screen, undone on drop
///
/// Early returns and panics leave the shell usable; `restore` reports
/// errors on the normal exit path.
struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard { active: true };
        stdout().execute(EnterAlternateScreen)?;
        Ok(guard)
    }

    fn restore(mut self) -> Result<()> {
        self.active = false;
        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
            let _ = stdout().execute(LeaveAlternateScreen);
        }
    }
}

fn run_app<B: Backend, K: KeyValueStore, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &ResidentStore<K, C>,
    config: &Config,
) -> Result<()> {
    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // If help is showing, any key dismisses it
                if app.show_help {
                    app.show_help = false;
                    continue;
                }

                match app.input_mode {
                    InputMode::Normal => handle_normal_mode(app, store, config, key.code),
                    InputMode::Search => handle_search_mode(app, key.code),
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
fn handle_normal_mode<K: KeyValueStore, C: Clock>(
    app: &mut App,
    store: &ResidentStore<K, C>,
    config: &Config,
    code: KeyCode,
) {
    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => {
            if app.view == View::Detail {
                app.close_detail();
            } else if !app.search.is_empty() {
                app.clear_search();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('g') | KeyCode::Home => app.move_to_first(),
        KeyCode::Char('G') | KeyCode::End => app.move_to_last(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('/') => {
            app.close_detail();
            app.enter_search_mode();
        }
        KeyCode::Char('r') => {
            app.refresh(store);
            app.set_status("Reloaded");
        }
        KeyCode::Char('t') => app.toggle_current(store),
        KeyCode::Char('c') => app.export_current_card(store, config),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

/// Handle key events in search mode
fn handle_search_mode(app: &mut App, code: KeyCode) {
    match code {
        // Cancel search
        KeyCode::Esc => {
            app.exit_input_mode();
            app.clear_search();
        }

        // Confirm search (stay in filtered view)
        KeyCode::Enter => app.exit_input_mode(),

        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),

        _ => {}
    }
}

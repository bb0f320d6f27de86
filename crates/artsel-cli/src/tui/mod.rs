//! artsel TUI
//!
//! Terminal table of the collection, one page at a time, with a selection
//! that persists across pages.
//!
//! ## Layout
//!
//! - Top: table of the current page (selection mark, id, title, origin,
//!   artist, inscriptions, dates)
//! - Bottom: status bar with page position and selection count, or the bulk
//!   count prompt
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Move between rows
//! - Space: Toggle row selection
//! - a: Select / deselect every row on the page
//! - n/p or →/←: Next / previous page
//! - g/G: First / last page
//! - +/-: Bigger / smaller pages
//! - #: Select the first N records from this page on
//! - c: Clear the selection
//! - o or Enter: Open the artwork in a browser
//! - r: Reload the page
//! - ?: Help
//! - q: Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use artsel_core::{BlobStore, Config, RecordSource, Session};

use app::{Action, App, InputMode};

use crate::commands::AppSession;

/// Run the TUI application
pub async fn run<Bl: BlobStore>(mut session: AppSession<Bl>, start_page: usize) -> Result<()> {
    enable_raw_mode()?;
    let result = run_terminal(&mut session, start_page).await;

    // Restore terminal, whether or not the app failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_terminal<Bl: BlobStore>(session: &mut AppSession<Bl>, start_page: usize) -> Result<()> {
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new();
    start(&mut terminal, &mut app, session, start_page).await?;
    run_app(&mut terminal, &mut app, session).await
}

/// Load the first page and surface a selection that failed to restore
async fn start<B: Backend, S: RecordSource, Bl: BlobStore>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session<S, Bl>,
    start_page: usize,
) -> Result<()> {
    let page_size = session.page_size();
    run_action(
        terminal,
        app,
        session,
        Action::Goto {
            page: start_page.max(1),
            page_size,
        },
    )
    .await?;

    if let Some(err) = session.restore_error() {
        app.set_error(format!("Saved selection not restored: {}", err));
    }
    Ok(())
}

async fn run_app<B: Backend, S: RecordSource, Bl: BlobStore>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session<S, Bl>,
) -> Result<()> {
    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app, session))?;

        tokio::time::sleep(Duration::from_millis(50)).await;

        // Check for terminal events (non-blocking)
        if !event::poll(Duration::from_millis(0))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        // Only handle key press events (not release)
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // If error modal is showing, any key dismisses it
        if app.has_error() {
            app.clear_error();
            continue;
        }

        // If help is showing, any key dismisses it
        if app.show_help {
            app.show_help = false;
            continue;
        }

        let action = match app.input_mode {
            InputMode::Normal => handle_normal_mode(app, session, key.code, key.modifiers),
            InputMode::Count => handle_count_mode(app, key.code, key.modifiers),
        };

        if let Some(action) = action {
            run_action(terminal, app, session, action).await?;
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Show the loading state, then run an action to completion
///
/// Keys are not read while the action runs, so navigation can't overlap a
/// page load or bulk scan.
async fn run_action<B: Backend, S: RecordSource, Bl: BlobStore>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session<S, Bl>,
    action: Action,
) -> Result<()> {
    let label = match action {
        Action::Goto { page, .. } => format!("Loading page {}...", page),
        Action::Resize(size) => format!("Loading {} rows per page...", size),
        Action::Refresh => "Reloading...".to_string(),
        Action::Bulk(count) => format!("Selecting {} artworks...", count),
    };
    app.begin_loading(label);
    terminal.draw(|frame| ui::draw(frame, app, session))?;

    app::perform(app, session, action).await;
    app.end_loading();
    Ok(())
}

/// Handle key events in normal mode
///
/// Returns an action when the key needs the record source.
fn handle_normal_mode<S: RecordSource, B: BlobStore>(
    app: &mut App,
    session: &mut Session<S, B>,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Option<Action> {
    let page = session.current_page().max(1);
    let page_size = session.page_size();
    let last_page = session.total_pages().max(1);

    match code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Rows
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down(session.visible_records().len());
        }

        // Selection
        KeyCode::Char(' ') => {
            app::toggle_current(app, session);
        }
        KeyCode::Char('a') => {
            app::toggle_page(app, session);
        }
        KeyCode::Char('c') => {
            app::clear_all(app, session);
        }
        KeyCode::Char('#') => {
            app.enter_count_mode();
        }

        // Pages
        KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right => {
            if page < last_page {
                return Some(Action::Goto {
                    page: page + 1,
                    page_size,
                });
            }
            app.set_status("Already on the last page");
        }
        KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left => {
            if page > 1 {
                return Some(Action::Goto {
                    page: page - 1,
                    page_size,
                });
            }
            app.set_status("Already on the first page");
        }
        KeyCode::Char('g') => {
            if page != 1 {
                return Some(Action::Goto { page: 1, page_size });
            }
        }
        KeyCode::Char('G') => {
            if page != last_page {
                return Some(Action::Goto {
                    page: last_page,
                    page_size,
                });
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let size = app::step_page_size(page_size, true);
            if size != page_size {
                return Some(Action::Resize(size));
            }
        }
        KeyCode::Char('-') => {
            let size = app::step_page_size(page_size, false);
            if size != page_size {
                return Some(Action::Resize(size));
            }
        }
        KeyCode::Char('r') => {
            return Some(Action::Refresh);
        }

        // Open in browser
        KeyCode::Char('o') | KeyCode::Enter => {
            if let Some(record) = app.current_record(session.visible_records()) {
                let url = record.web_url();
                let title = record.display_title().to_string();
                match open::that_detached(&url) {
                    Ok(()) => app.set_status(format!("Opened '{}'", title)),
                    Err(e) => app.set_status(format!("Failed to open: {}", e)),
                }
            }
        }

        // Help
        KeyCode::Char('?') => {
            app.toggle_help();
        }

        _ => {}
    }

    None
}

/// Handle key events while typing a bulk count
fn handle_count_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    match code {
        KeyCode::Esc => {
            app.exit_input_mode();
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.exit_input_mode();
        }
        KeyCode::Enter => {
            let count = app.parsed_count();
            app.exit_input_mode();
            match count {
                Some(count) if count > 0 => return Some(Action::Bulk(count)),
                _ => app.set_status("Enter a number greater than zero"),
            }
        }
        KeyCode::Char(c) => {
            app.insert_digit(c);
        }
        KeyCode::Backspace => {
            app.delete_char();
        }
        _ => {}
    }

    None
}

/// Initialize logging for TUI mode
///
/// Only initializes if ARTSEL_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
pub fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("ARTSEL_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "artsel_core={},artsel_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}

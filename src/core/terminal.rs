//! Terminal rendering and event loop for tau.
//!
//! Handles setup/teardown of raw mode, alternate screen and mouse capture, redraws,
//! and events (keypress, mouse, resize) to app logic.

use crate::app::{AppState, KeypressResult};
use crate::ui;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use std::{io, time::Duration};

/// Initializes the terminal in raw mode and alternate sceen and runs the main event loop.
///
/// Blocks until quit. Handles all input and UI rendering.
/// Mouse capture is only enabled when `mouse` is set.
///
/// Returns an std::io::Error if terminal setup or teardown fails.
pub fn run_terminal(app: &mut AppState, mouse: bool) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, app);

    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    result
}

/// Main event loop of tau: draws UI, polls for events and dispatches them to the app.
/// Returns on quit
fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> io::Result<()>
where
    io::Error: From<<B as Backend>::Error>,
{
    terminal.draw(|f| ui::render(f, app))?;

    loop {
        if app.tick() {
            terminal.draw(|f| ui::render(f, app))?;
        }

        // Event Polling
        if !event::poll(Duration::from_millis(16))? {
            continue;
        }

        let result = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_keypress(key),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            Event::Resize(_, _) => KeypressResult::Consumed,
            _ => continue,
        };

        match result {
            KeypressResult::Quit => break,
            KeypressResult::OpenedEditor | KeypressResult::Recovered => {
                // full clear/reset
                terminal.clear()?;
            }
            _ => {}
        }
        // Redraw after state change
        terminal.draw(|f| ui::render(f, app))?;
    }
    Ok(())
}

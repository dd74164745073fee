//! TUI front end for tbx
//!
//! Renders the container list and command output with Ratatui and routes
//! key presses to the dispatcher as distinct intents.

pub mod app;
mod event;
pub mod ui;
pub mod widgets;

pub use app::{intent_for_key, App, AppError, AppResult, OutputKind, OutputLine, Panel, View};
pub use event::{Event, EventHandler};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use tbx_core::Dispatcher;
use tracing_subscriber::layer::SubscriberExt;

/// Run the TUI application
pub async fn run(dispatcher: Dispatcher) -> AppResult<()> {
    // Logs would corrupt the alternate screen; the guard restores the previous subscriber
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(tracing_subscriber::layer::Identity::new()),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(dispatcher);
    let res = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

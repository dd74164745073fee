//! Application state and event loop

use crate::event::{Event, EventHandler};
use crate::ui;
use crate::widgets::{SelectableList, TextInputState};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use std::path::PathBuf;
use std::time::Duration;
use tbx_core::{Dispatcher, DisplaySurface, Intent};
use thiserror::Error;

/// Errors that end the TUI session
#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Which screen has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Main,
    Help,
    /// Prompt for the file to open in the selected container
    OpenFile,
}

/// Origin of a line in the output pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub text: String,
}

/// The panel the dispatcher reports into: container list, status line, and
/// output history.
#[derive(Debug)]
pub struct Panel {
    pub containers: SelectableList<String>,
    pub status: String,
    pub output: Vec<OutputLine>,
    pub output_scroll: usize,
    pub auto_scroll: bool,
    /// Output lines visible at once, as of the last draw
    pub viewport: usize,
}

impl Default for Panel {
    fn default() -> Self {
        Self {
            containers: SelectableList::new(),
            status: String::new(),
            output: Vec::new(),
            output_scroll: 0,
            auto_scroll: true,
            viewport: 0,
        }
    }
}

impl Panel {
    /// Name of the selected container, empty when nothing is selected
    pub fn selected_name(&self) -> String {
        self.containers.selected_item().cloned().unwrap_or_default()
    }

    /// Each call starts a new block of lines in the output pane
    fn append(&mut self, kind: OutputKind, text: &str) {
        let text = text.strip_suffix('\n').unwrap_or(text);
        for line in text.split('\n') {
            self.output.push(OutputLine {
                kind,
                text: line.trim_end_matches('\r').to_string(),
            });
        }
    }

    /// First line of the page that ends at the newest output
    pub fn last_page(&self) -> usize {
        self.output.len().saturating_sub(self.viewport)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        if self.auto_scroll {
            self.output_scroll = self.last_page();
            self.auto_scroll = false;
        }
        self.output_scroll = self.output_scroll.min(self.last_page()).saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        if self.auto_scroll {
            return;
        }
        self.output_scroll += lines;
        if self.output_scroll >= self.last_page() {
            self.auto_scroll = true;
        }
    }
}

impl DisplaySurface for Panel {
    fn display_message(&mut self, message: &str) {
        self.status = message.to_string();
    }

    fn display_output(&mut self, output: &str) {
        self.append(OutputKind::Stdout, output);
    }

    fn display_error(&mut self, error: &str) {
        self.append(OutputKind::Error, error);
    }

    fn set_containers(&mut self, names: Vec<String>) {
        let previous = self.selected_name();
        self.containers.set_items(names);
        if let Some(index) = self.containers.items().iter().position(|n| *n == previous) {
            self.containers.select(index);
        }
    }
}

/// Map a main-view key to the intent it requests
pub fn intent_for_key(code: KeyCode) -> Option<Intent> {
    match code {
        KeyCode::Char('s') => Some(Intent::Start),
        KeyCode::Char('x') => Some(Intent::Stop),
        KeyCode::Char('e') => Some(Intent::exec_shell()),
        KeyCode::Char('c') | KeyCode::Enter => Some(Intent::Connect),
        _ => None,
    }
}

/// Main application state
pub struct App {
    pub panel: Panel,
    pub dispatcher: Dispatcher,
    pub view: View,
    /// Modal notice shown until the next key press
    pub notice: Option<String>,
    pub file_input: TextInputState,
    pub should_quit: bool,
}

impl App {
    /// Create the app and request the initial container list
    pub fn new(dispatcher: Dispatcher) -> Self {
        let mut app = Self {
            panel: Panel::default(),
            dispatcher,
            view: View::Main,
            notice: None,
            file_input: TextInputState::new(),
            should_quit: false,
        };
        app.dispatcher.request_refresh();
        app
    }

    /// Run the main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> AppResult<()> {
        let mut events = EventHandler::new(Duration::from_millis(250));

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Event::Key(key)) => self.send_key(key.code, key.modifiers),
                    Some(Event::Tick) | Some(Event::Resize(_, _)) => {}
                    None => self.should_quit = true,
                },
                event = self.dispatcher.next_event() => {
                    self.dispatcher.handle_event(event, &mut self.panel);
                }
            }
        }

        // Kills the tracked process and abandons queries still in flight
        self.dispatcher.shutdown();
        Ok(())
    }

    /// Handle a key press in the current view
    pub fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.notice.take().is_some() {
            return;
        }

        match self.view {
            View::Help => self.view = View::Main,
            View::OpenFile => self.handle_file_input(code),
            View::Main => self.handle_main_key(code),
        }
    }

    fn handle_main_key(&mut self, code: KeyCode) {
        if let Some(intent) = intent_for_key(code) {
            self.request(intent);
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.panel.containers.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.panel.containers.select_prev(),
            KeyCode::Char('g') | KeyCode::Home => self.panel.containers.select(0),
            KeyCode::Char('G') | KeyCode::End => self.panel.containers.select_last(),
            KeyCode::PageUp => self.panel.scroll_up(10),
            KeyCode::PageDown => self.panel.scroll_down(10),
            KeyCode::Char('r') => self.dispatcher.request_refresh(),
            KeyCode::Char('?') => self.view = View::Help,
            KeyCode::Char('o') => {
                self.file_input = TextInputState::new();
                self.view = View::OpenFile;
            }
            _ => {}
        }
    }

    fn handle_file_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.view = View::Main,
            KeyCode::Enter => {
                self.view = View::Main;
                let value = self.file_input.value().trim();
                let path = (!value.is_empty()).then(|| PathBuf::from(value));
                self.request(Intent::OpenFile { path });
            }
            KeyCode::Char(c) => self.file_input.insert(c),
            KeyCode::Backspace => self.file_input.backspace(),
            KeyCode::Left => self.file_input.move_left(),
            KeyCode::Right => self.file_input.move_right(),
            KeyCode::Home => self.file_input.home(),
            KeyCode::End => self.file_input.end(),
            _ => {}
        }
    }

    /// Send an intent for the selected container to the dispatcher
    fn request(&mut self, intent: Intent) {
        let name = self.panel.selected_name();
        let label = intent.label();
        if let Err(e) = self.dispatcher.dispatch(intent, &name, &mut self.panel) {
            tracing::warn!("{} {:?} failed: {}", label, name, e);
            if e.is_rejection() {
                self.notice = Some(e.to_string());
            } else {
                self.panel.display_error(&e.to_string());
            }
        }
    }
}

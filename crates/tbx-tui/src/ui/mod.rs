//! UI rendering for the TUI application

mod containers;
mod dialogs;
mod header_footer;
mod output;

use crate::app::{App, OutputKind, View};
use crate::widgets::{centered_rect, DialogBuilder};
use ansi_to_tui::IntoText;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use containers::*;
use dialogs::*;
use header_footer::*;
use output::*;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);

    match app.view {
        View::Help => draw_help(frame, chunks[1]),
        View::Main | View::OpenFile => draw_main_content(frame, app, chunks[1]),
    }

    draw_footer(frame, app, chunks[2]);

    if app.view == View::OpenFile {
        draw_open_file_prompt(frame, app, area);
    }
    if let Some(notice) = &app.notice {
        draw_notice(frame, notice, area);
    }
}

fn draw_main_content(frame: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    draw_containers(frame, app, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(columns[1]);

    draw_status(frame, app, rows[0]);
    draw_output(frame, app, rows[1]);
}

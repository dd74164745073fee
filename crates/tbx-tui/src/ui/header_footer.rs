use super::*;

pub(super) fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.dispatcher.state();
    let state_color = if app.dispatcher.is_busy() {
        Color::Yellow
    } else {
        Color::Green
    };

    let line = Line::from(vec![
        Span::styled(" context: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.dispatcher.context().to_string(),
            Style::default().fg(Color::White),
        ),
        Span::styled("  state: ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.to_string(), Style::default().fg(state_color)),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .title(" tbx - Toolbox Containers ")
            .title_style(Style::default().fg(Color::Cyan).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(header, area);
}

/// Context-sensitive key help for the footer
pub(super) fn footer_help(app: &App) -> &'static str {
    match app.view {
        View::Help => "Any key: Back",
        View::OpenFile => "Enter: Open  Esc: Cancel",
        View::Main if app.notice.is_some() => "Any key: Dismiss",
        View::Main if app.panel.containers.is_empty() => "r: Refresh  ?: Help  q: Quit",
        View::Main => {
            "s: Start  x: Stop  e: Exec  c: Connect  o: Open file  r: Refresh  ?: Help  q: Quit"
        }
    }
}

pub(super) fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let footer = Paragraph::new(footer_help(app))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

use super::*;

pub(super) fn draw_notice(frame: &mut Frame, notice: &str, area: Rect) {
    DialogBuilder::new("Notice")
        .width(50)
        .border_color(Color::Yellow)
        .empty_line()
        .message(notice)
        .empty_line()
        .help("Press any key to dismiss")
        .render(frame, area);
}

pub(super) fn draw_open_file_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let input = &app.file_input;
    let target = format_target(app);
    let field = Line::from(vec![
        Span::raw(input.before_cursor()),
        Span::styled("_", Style::default().fg(Color::Yellow)),
        Span::raw(input.after_cursor()),
    ]);

    DialogBuilder::new("Open File")
        .width(60)
        .border_color(Color::Cyan)
        .message(&target)
        .empty_line()
        .styled_message(field)
        .empty_line()
        .help("Enter: Open  Esc: Cancel")
        .render(frame, area);
}

fn format_target(app: &App) -> String {
    let name = app.panel.selected_name();
    if name.is_empty() {
        "Path to open (no container selected)".to_string()
    } else {
        format!("Path to open in {}", name)
    }
}

pub(super) fn draw_help(frame: &mut Frame, area: Rect) {
    let bindings = [
        ("j/k, Up/Down", "Select container"),
        ("g/G", "First / last container"),
        ("s", "Start container"),
        ("x", "Stop container"),
        ("e", "Run a shell in the container"),
        ("c, Enter", "Connect (starts the container if needed)"),
        ("o", "Open a file in the container's editor"),
        ("r", "Refresh container list"),
        ("PgUp/PgDn", "Scroll output"),
        ("?", "This help"),
        ("q, Esc", "Quit"),
    ];

    let lines: Vec<Line> = bindings
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{:>14}  ", keys), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();

    let height = lines.len() as u16 + 2;
    let help_area = centered_rect(64, height, area);
    frame.render_widget(Clear, help_area);

    let help = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(help, help_area);
}

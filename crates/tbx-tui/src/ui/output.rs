use super::*;

pub(super) fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(app.panel.status.as_str()).block(
        Block::default()
            .title(" Status ")
            .borders(Borders::ALL),
    );
    frame.render_widget(status, area);
}

pub(super) fn draw_output(frame: &mut Frame, app: &mut App, area: Rect) {
    let inner_height = area.height.saturating_sub(2) as usize;
    app.panel.viewport = inner_height;
    let total_lines = app.panel.output.len();
    let last_page = app.panel.last_page();

    let scroll = if app.panel.auto_scroll {
        last_page
    } else {
        app.panel.output_scroll.min(last_page)
    };

    let text: Vec<Line> = app
        .panel
        .output
        .iter()
        .skip(scroll)
        .take(inner_height)
        .map(|line| {
            let clean_line = line.text.replace('\r', "");
            match line.kind {
                OutputKind::Error => {
                    Line::from(Span::styled(clean_line, Style::default().fg(Color::Red)))
                }
                OutputKind::Stdout => match clean_line.into_text() {
                    Ok(text) => text.lines.into_iter().next().unwrap_or_default(),
                    Err(_) => Line::from(clean_line),
                },
            }
        })
        .collect();

    let title = if total_lines > inner_height {
        format!(" Output [{}/{}] ", scroll + 1, total_lines)
    } else {
        " Output ".to_string()
    };

    let output = Paragraph::new(text).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );

    frame.render_widget(output, area);
}

use super::*;

pub(super) fn draw_containers(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" Containers ({}) ", app.panel.containers.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    if app.panel.containers.is_empty() {
        let empty = Paragraph::new("No containers found.\nPress r to refresh.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .panel
        .containers
        .items()
        .iter()
        .map(|name| ListItem::new(name.clone()))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).bold())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, app.panel.containers.list_state_mut());
}

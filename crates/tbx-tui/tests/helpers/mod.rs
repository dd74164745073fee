use std::sync::Arc;
use tbx_core::test_support::{dispatcher_with, MockRunner};
use tbx_provider::ExecutionContext;
use tbx_tui::App;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

/// Build an App over a mock runner whose enumeration returns `containers`
#[allow(dead_code)]
pub async fn app_with(containers: &[&str], context: ExecutionContext) -> (App, Arc<MockRunner>) {
    let runner = Arc::new(MockRunner::new());
    let listing: String = containers.iter().map(|c| format!("{}\n", c)).collect();
    runner.set_list(&listing);
    let mut app = App::new(dispatcher_with(runner.clone(), context));
    settle(&mut app).await;
    (app, runner)
}

/// Let the dispatcher finish its current intent and any queries in flight
#[allow(dead_code)]
pub async fn settle(app: &mut App) {
    app.dispatcher.wait(&mut app.panel).await;
}

/// Render the app to a TestBackend and return the buffer
#[allow(dead_code)]
pub fn render_buffer(app: &mut App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| tbx_tui::ui::draw(frame, app)).unwrap();
    terminal.backend().buffer().clone()
}

/// Render the app to a TestBackend and capture output as a string
#[allow(dead_code)]
pub fn render_app(app: &mut App, width: u16, height: u16) -> String {
    buffer_to_string(&render_buffer(app, width, height))
}

/// Convert a ratatui buffer to a string representation
#[allow(dead_code)]
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut output = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            let cell = buffer.get(x, y);
            output.push_str(cell.symbol());
        }
        output.push('\n');
    }
    output
}

/// Find the position of the first cell of `needle` in the rendered buffer
#[allow(dead_code)]
pub fn find_text(buffer: &Buffer, needle: &str) -> Option<(u16, u16)> {
    let text = buffer_to_string(buffer);
    for (y, line) in text.lines().enumerate() {
        let chars: Vec<char> = line.chars().collect();
        let needle_chars: Vec<char> = needle.chars().collect();
        if let Some(x) = chars
            .windows(needle_chars.len())
            .position(|w| w == needle_chars.as_slice())
        {
            return Some((x as u16, y as u16));
        }
    }
    None
}

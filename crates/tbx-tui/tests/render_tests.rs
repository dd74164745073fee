//! Rendering tests using TestBackend

mod helpers;

use crossterm::event::{KeyCode, KeyModifiers};
use helpers::{app_with, find_text, render_app, render_buffer};
use ratatui::style::Color;
use tbx_core::DisplaySurface;
use tbx_provider::ExecutionContext;

#[tokio::test]
async fn test_main_view_shows_containers_and_context() {
    let (mut app, _) = app_with(&["alpha", "beta"], ExecutionContext::Sandboxed).await;
    let screen = render_app(&mut app, 100, 24);

    assert!(screen.contains("Containers (2)"));
    assert!(screen.contains("alpha"));
    assert!(screen.contains("beta"));
    assert!(screen.contains("sandboxed"));
    assert!(screen.contains("idle"));
    assert!(screen.contains("s: Start"));
}

#[tokio::test]
async fn test_empty_list_shows_hint() {
    let (mut app, _) = app_with(&[], ExecutionContext::Host).await;
    let screen = render_app(&mut app, 100, 24);

    assert!(screen.contains("No containers found."));
    assert!(screen.contains("r: Refresh"));
    assert!(!screen.contains("s: Start"));
}

#[tokio::test]
async fn test_errors_render_in_red() {
    let (mut app, _) = app_with(&["alpha"], ExecutionContext::Host).await;
    app.panel.display_output("plain line");
    app.panel.display_error("Command failed with exit code 3.");

    let buffer = render_buffer(&mut app, 100, 24);
    let (x, y) = find_text(&buffer, "Command failed").unwrap();
    assert_eq!(buffer.get(x, y).fg, Color::Red);

    let (x, y) = find_text(&buffer, "plain line").unwrap();
    assert_ne!(buffer.get(x, y).fg, Color::Red);
}

#[tokio::test]
async fn test_ansi_output_is_colored() {
    let (mut app, _) = app_with(&["alpha"], ExecutionContext::Host).await;
    app.panel.display_output("\u{1b}[32mgreen text\u{1b}[0m\n");

    let buffer = render_buffer(&mut app, 100, 24);
    let (x, y) = find_text(&buffer, "green text").unwrap();
    assert_eq!(buffer.get(x, y).fg, Color::Green);
}

#[tokio::test]
async fn test_page_up_moves_one_page_from_bottom() {
    let (mut app, _) = app_with(&["alpha"], ExecutionContext::Host).await;
    for i in 0..40 {
        app.panel.display_output(&format!("line {}", i));
    }

    // 24 rows leave 13 visible output lines
    let screen = render_app(&mut app, 100, 24);
    assert!(screen.contains("line 39"));
    assert!(!screen.contains("line 26"));

    app.send_key(KeyCode::PageUp, KeyModifiers::NONE);
    let screen = render_app(&mut app, 100, 24);
    assert!(screen.contains("Output [18/40]"));
    assert!(screen.contains("line 17"));
    assert!(!screen.contains("line 39"));

    app.send_key(KeyCode::PageDown, KeyModifiers::NONE);
    let screen = render_app(&mut app, 100, 24);
    assert!(app.panel.auto_scroll);
    assert!(screen.contains("line 39"));
}

#[tokio::test]
async fn test_status_line_shows_last_message() {
    let (mut app, _) = app_with(&["alpha"], ExecutionContext::Host).await;
    app.panel.display_message("Connecting to container alpha...");

    let screen = render_app(&mut app, 100, 24);
    assert!(screen.contains("Connecting to container alpha..."));
}

#[tokio::test]
async fn test_notice_dialog_renders() {
    let (mut app, _) = app_with(&[], ExecutionContext::Host).await;
    app.send_key(KeyCode::Char('s'), KeyModifiers::NONE);

    let screen = render_app(&mut app, 100, 24);
    assert!(screen.contains("Notice"));
    assert!(screen.contains("Please select a container."));
}

#[tokio::test]
async fn test_open_file_prompt_renders_input() {
    let (mut app, _) = app_with(&["alpha"], ExecutionContext::Host).await;
    app.send_key(KeyCode::Char('o'), KeyModifiers::NONE);
    for c in "/etc/hosts".chars() {
        app.send_key(KeyCode::Char(c), KeyModifiers::NONE);
    }

    let screen = render_app(&mut app, 100, 24);
    assert!(screen.contains("Open File"));
    assert!(screen.contains("Path to open in alpha"));
    assert!(screen.contains("/etc/hosts_"));
}

#[tokio::test]
async fn test_help_lists_bindings() {
    let (mut app, _) = app_with(&[], ExecutionContext::Host).await;
    app.send_key(KeyCode::Char('?'), KeyModifiers::NONE);

    let screen = render_app(&mut app, 100, 24);
    assert!(screen.contains("Help"));
    assert!(screen.contains("Connect (starts the container if needed)"));
}

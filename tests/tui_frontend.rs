use std::path::Path;

use breathe::config::Config;
use breathe::geometry::PageSize;
use breathe::test_utils::test_helpers::{
    TestScenarioBuilder, capture_terminal_state, create_test_terminal,
};
use breathe::test_utils::{FakeDocument, FakeEngine, page_color};
use breathe::tui::{self, HALF_BLOCK};
use breathe::viewer::{BACKGROUND, Viewer};
use ratatui::style::Color;

fn color([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

/// 30x10 cells: a 30x20 pixel viewport, 600x800 pages drawn 15x20 at x = 7
fn open() -> Viewer<FakeEngine> {
    Viewer::open(
        FakeEngine::new(
            FakeDocument::uniform(5, PageSize::new(600.0, 800.0)).with_text(1, &["Hello world"]),
        ),
        Path::new("doc.pdf"),
        Config::default(),
        HALF_BLOCK,
        30,
        10,
    )
    .unwrap()
}

#[test]
fn test_run_draws_page_and_status_bar() {
    let mut terminal = create_test_terminal(30, 10);
    let mut viewer = open();
    let mut events = TestScenarioBuilder::new().build();

    tui::run(&mut terminal, &mut viewer, &mut events, &mut |_: &str| {}).unwrap();

    let buffer = terminal.backend().buffer();
    assert_eq!(buffer[(10, 0)].fg, color(page_color(1)));
    assert_eq!(buffer[(10, 0)].bg, color(page_color(1)));
    assert_eq!(buffer[(0, 0)].fg, color(BACKGROUND));

    let screen = capture_terminal_state(&terminal);
    let last = screen.lines().last().unwrap();
    assert!(last.starts_with("page 1/5"), "status line was {last:?}");
}

#[test]
fn test_run_applies_scripted_input() {
    let mut terminal = create_test_terminal(30, 10);
    let mut viewer = open();
    let mut events = TestScenarioBuilder::new()
        .next_page()
        .next_page()
        .press_char('p')
        .press_esc()
        .quit()
        .build();

    tui::run(&mut terminal, &mut viewer, &mut events, &mut |_: &str| {}).unwrap();

    assert_eq!(viewer.state().page, 3);
    assert!(viewer.prompt().is_none());
    assert_eq!(events.remaining(), 0);
}

#[test]
fn test_run_hands_copied_text_to_clipboard() {
    let mut terminal = create_test_terminal(30, 10);
    let mut viewer = open();
    // Rows 1 to 2 are pixels 2 to 4, points 80 to 160: around the text line.
    let mut events = TestScenarioBuilder::new()
        .drag((7, 1), (22, 2))
        .press_ctrl_char('c')
        .build();

    let mut copied = Vec::new();
    tui::run(&mut terminal, &mut viewer, &mut events, &mut |text: &str| {
        copied.push(text.to_string())
    })
    .unwrap();

    assert_eq!(copied, vec!["Hello world".to_string()]);
}

#![cfg(not(target_arch = "wasm32"))]

use std::time::Duration;

use floating_toc::TocConfig;
use floating_toc::geometry::navigation_offset;
use floating_toc::host::Host;
use floating_toc::terminal::event_source::{KeyCode, SimulatedEventSource};
use floating_toc::terminal::{App, Document, TerminalPage, render, run_app_with_event_source};
use floating_toc::test_utils::test_helpers::{capture_terminal_state, create_test_terminal};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

const WIDTH: u16 = 80;
const HEIGHT: u16 = 16;

fn sample_app() -> App {
    let page = TerminalPage::new(Document::sample(), WIDTH, HEIGHT).with_manual_clock();
    let mut app = App::new(page, TocConfig::terminal());
    app.start();
    app
}

fn press(app: &mut App, c: char) {
    app.handle_terminal_event(SimulatedEventSource::char_key(c));
}

fn render_app(terminal: &mut Terminal<TestBackend>, app: &mut App) -> String {
    let App {
        controller,
        palette,
        ..
    } = app;
    terminal
        .draw(|frame| render::draw(frame, controller.host_mut(), palette))
        .unwrap();
    capture_terminal_state(terminal)
}

fn finish_animation(app: &mut App) {
    let mut frames = 0;
    while app.page().is_animating() {
        app.tick();
        frames += 1;
        assert!(frames < 500, "smooth scroll never settled");
    }
}

#[test]
fn test_toggle_opens_panel() {
    let mut terminal = create_test_terminal(WIDTH, HEIGHT);
    let mut app = sample_app();

    let closed = render_app(&mut terminal, &mut app);
    assert!(closed.contains("≡ Contents"));
    assert!(!closed.contains("% read"));

    press(&mut app, 't');
    assert!(app.controller.state().expanded);
    assert_eq!(app.page().view().toggle_label, "Close table of contents");

    let open = render_app(&mut terminal, &mut app);
    assert!(open.contains(" Contents "));
    assert!(open.contains("History"));
    assert!(open.contains("% read"));
}

#[test]
fn test_link_key_scrolls_and_closes_on_narrow_terminal() {
    let mut app = sample_app();
    press(&mut app, 't');
    press(&mut app, '3');

    assert!(app.page().is_animating());
    assert_eq!(app.page().fragment(), Some("awards"));
    assert_eq!(app.page().history(), ["/index.html#awards".to_string()]);

    finish_animation(&mut app);
    let layout = app.page().layout();
    let awards = layout.landmark("awards").unwrap().top as f64;
    let expected = navigation_offset(awards, 2.0, layout.height() as f64, HEIGHT as f64);
    assert_eq!(app.page().scroll_offset(), expected.round());
    assert!(app.controller.state().expanded);

    app.page_mut().advance_clock(Duration::from_millis(300));
    app.tick();
    assert!(!app.controller.state().expanded);
    assert_eq!(app.controller.state().active_link, Some(2));
    assert_eq!(app.controller.state().active_landmark.as_deref(), Some("awards"));
}

#[test]
fn test_scrolling_hides_and_reveals_widget() {
    let mut terminal = create_test_terminal(WIDTH, HEIGHT);
    let mut app = sample_app();

    press(&mut app, 'G');
    assert!(!app.controller.state().visible);
    assert!(app.page().view().is_hidden());
    let hidden = render_app(&mut terminal, &mut app);
    assert!(!hidden.contains("Contents"));

    press(&mut app, 'k');
    assert!(app.controller.state().visible);
    let shown = render_app(&mut terminal, &mut app);
    assert!(shown.contains("Contents"));
}

#[test]
fn test_mouse_clicks_toggle_and_close() {
    let mut terminal = create_test_terminal(WIDTH, HEIGHT);
    let mut app = sample_app();
    render_app(&mut terminal, &mut app);

    // the toggle sits in the bottom-right corner
    app.handle_terminal_event(SimulatedEventSource::click(WIDTH - 8, HEIGHT - 2));
    assert!(app.controller.state().expanded);
    render_app(&mut terminal, &mut app);

    app.handle_terminal_event(SimulatedEventSource::click(2, 4));
    assert!(!app.controller.state().expanded);

    app.page_mut().advance_clock(Duration::from_millis(100));
    app.tick();
    assert_eq!(app.page().view().focused, Some(floating_toc::Element::Toggle));
}

#[test]
fn test_escape_closes_panel() {
    let mut app = sample_app();
    press(&mut app, 't');
    app.handle_terminal_event(SimulatedEventSource::key(KeyCode::Esc));
    assert!(!app.controller.state().expanded);
}

#[test]
fn test_run_loop_quits_when_input_runs_out() {
    let mut terminal = create_test_terminal(WIDTH, HEIGHT);
    let mut app = sample_app();
    let mut events = SimulatedEventSource::new(vec![
        SimulatedEventSource::char_key('t'),
        SimulatedEventSource::wheel_down(),
    ]);

    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    assert!(app.should_quit);
    assert_eq!(events.remaining(), 0);
    assert!(app.controller.state().expanded);
    assert_eq!(app.page().scroll_offset(), 3.0);
}

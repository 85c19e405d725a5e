use anyhow::Result;
use log::{debug, info};
use ratatui::{Terminal, backend::Backend};
use std::time::Duration;

use super::event_source::{Event, EventSource, KeyCode, KeyEvent, KeyEventKind, MouseEventKind};
use super::page::TerminalPage;
use super::render;
use super::theme::Palette;
use crate::config::TocConfig;
use crate::controller::TocController;
use crate::events::PageEvent;
use crate::host::{ClickTarget, Key};

/// Frame interval while a smooth scroll is running.
const ANIMATION_FRAME: Duration = Duration::from_millis(16);
/// Longest the loop sleeps when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct App {
    pub controller: TocController<TerminalPage>,
    pub palette: Palette,
    pub should_quit: bool,
}

impl App {
    pub fn new(page: TerminalPage, config: TocConfig) -> Self {
        Self {
            controller: TocController::new(page, config),
            palette: Palette::detect(),
            should_quit: false,
        }
    }

    /// Deliver DOMContentLoaded and load; a terminal page is ready at once.
    pub fn start(&mut self) {
        self.controller.handle_event(PageEvent::StructureReady);
        self.controller.handle_event(PageEvent::Load);
    }

    pub fn page(&self) -> &TerminalPage {
        self.controller.host()
    }

    pub fn page_mut(&mut self) -> &mut TerminalPage {
        self.controller.host_mut()
    }

    fn page_rows(&self) -> f64 {
        let (_, height) = self.page().size();
        (height as f64 - 2.0).max(1.0)
    }

    /// Scroll by user input and deliver the scroll event if the page moved.
    fn user_scroll(&mut self, rows: f64) {
        if self.page_mut().scroll_by(rows) {
            self.controller.handle_event(PageEvent::Scroll);
        }
    }

    fn user_scroll_to(&mut self, row: f64) {
        if self.page_mut().scroll_to_row(row) {
            self.controller.handle_event(PageEvent::Scroll);
        }
    }

    pub fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.user_scroll(3.0),
                MouseEventKind::ScrollUp => self.user_scroll(-3.0),
                MouseEventKind::Down(_) => {
                    let target = self.page().hit_test(mouse.column, mouse.row);
                    debug!("Click at {},{} -> {:?}", mouse.column, mouse.row, target);
                    self.controller.handle_event(PageEvent::Click(target));
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                self.page_mut().resize(width, height);
                self.controller.handle_event(PageEvent::Resize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                info!("Quit requested");
                self.should_quit = true;
            }
            KeyCode::Char('j') | KeyCode::Down => self.user_scroll(1.0),
            KeyCode::Char('k') | KeyCode::Up => self.user_scroll(-1.0),
            KeyCode::PageDown | KeyCode::Char(' ') => self.user_scroll(self.page_rows()),
            KeyCode::PageUp => self.user_scroll(-self.page_rows()),
            KeyCode::Char('g') | KeyCode::Home => self.user_scroll_to(0.0),
            KeyCode::Char('G') | KeyCode::End => {
                let bottom = self.page().max_scroll();
                self.user_scroll_to(bottom);
            }
            KeyCode::Char('t') | KeyCode::Tab => {
                self.controller
                    .handle_event(PageEvent::Click(ClickTarget::Toggle));
            }
            KeyCode::Char('x') => {
                self.controller
                    .handle_event(PageEvent::Click(ClickTarget::Close));
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.controller.handle_event(PageEvent::click_link(index));
            }
            KeyCode::Esc => self.controller.handle_event(PageEvent::KeyDown(Key::Escape)),
            KeyCode::Char(c) => self
                .controller
                .handle_event(PageEvent::KeyDown(Key::Other(c.to_string()))),
            _ => {}
        }
    }

    /// Fire due timers and advance any running smooth scroll by one frame.
    pub fn tick(&mut self) {
        while let Some(timer) = self.page_mut().pop_due_timer() {
            self.controller.handle_event(PageEvent::Timer(timer.task));
        }
        if self.page_mut().step_animation() {
            self.controller.handle_event(PageEvent::Scroll);
        }
    }

    /// How long the loop may wait for input before it has work to do.
    pub fn next_wakeup(&self) -> Duration {
        let timer = self.page().next_timer_in().unwrap_or(IDLE_POLL);
        let wakeup = timer.min(IDLE_POLL);
        if self.page().is_animating() {
            wakeup.min(ANIMATION_FRAME)
        } else {
            wakeup
        }
    }
}

pub fn run_app_with_event_source<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()> {
    loop {
        let App {
            controller,
            palette,
            ..
        } = &mut *app;
        terminal.draw(|frame| render::draw(frame, controller.host_mut(), palette))?;

        if app.should_quit {
            return Ok(());
        }

        if event_source.poll(app.next_wakeup())? {
            let event = event_source.read()?;
            app.handle_terminal_event(event);
        }
        app.tick();
    }
}

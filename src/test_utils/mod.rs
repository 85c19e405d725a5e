pub mod fake_page;

pub use fake_page::{FakeLandmark, FakePage};

pub mod test_helpers {
    use std::time::Duration;

    use super::fake_page::FakePage;
    use crate::config::TocConfig;
    use crate::controller::{TocController, TocState};
    use crate::events::PageEvent;

    /// Sections of a typical long page: `(id, top, height)`.
    pub const HISTORY_PAGE: &[(&str, f64, f64)] = &[
        ("intro", 0.0, 600.0),
        ("history", 600.0, 900.0),
        ("awards", 1500.0, 700.0),
        ("contact", 2200.0, 800.0),
    ];

    /// A desktop page with [`HISTORY_PAGE`] sections.
    pub fn history_page() -> FakePage {
        FakePage::new()
            .with_sections(HISTORY_PAGE)
            .with_document_height(3000.0)
    }

    /// Owns a controller over a [`FakePage`] and plays its virtual clock.
    pub struct PageHarness {
        pub controller: TocController<FakePage>,
    }

    impl PageHarness {
        pub fn new(page: FakePage) -> Self {
            Self::with_config(page, TocConfig::default())
        }

        pub fn with_config(page: FakePage, config: TocConfig) -> Self {
            Self {
                controller: TocController::new(page, config),
            }
        }

        /// A harness that already received DOMContentLoaded.
        pub fn ready(page: FakePage) -> Self {
            let mut harness = Self::new(page);
            harness.dispatch(PageEvent::StructureReady);
            harness
        }

        pub fn dispatch(&mut self, event: PageEvent) {
            self.controller.handle_event(event);
        }

        /// Move the viewport and deliver one scroll event.
        pub fn scroll_to(&mut self, offset: f64) {
            self.controller.host_mut().scroll = offset;
            self.dispatch(PageEvent::Scroll);
        }

        /// Let `millis` of virtual time pass, firing due timers in order.
        pub fn advance(&mut self, millis: u64) {
            let until = self.page().now + Duration::from_millis(millis);
            loop {
                let Some(timer) = self.controller.host_mut().timers.pop_due(until) else {
                    break;
                };
                self.controller.host_mut().now = timer.due;
                self.dispatch(PageEvent::Timer(timer.task));
            }
            self.controller.host_mut().now = until;
        }

        pub fn page(&self) -> &FakePage {
            self.controller.host()
        }

        pub fn page_mut(&mut self) -> &mut FakePage {
            self.controller.host_mut()
        }

        pub fn state(&self) -> &TocState {
            self.controller.state()
        }
    }

    /// Create a test terminal for rendering checks
    #[cfg(not(target_arch = "wasm32"))]
    pub fn create_test_terminal(
        width: u16,
        height: u16,
    ) -> ratatui::Terminal<ratatui::backend::TestBackend> {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.hide_cursor().unwrap();
        terminal
    }

    /// Capture the current terminal buffer as a string
    #[cfg(not(target_arch = "wasm32"))]
    pub fn capture_terminal_state(
        terminal: &ratatui::Terminal<ratatui::backend::TestBackend>,
    ) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                if let Some(cell) = buffer.cell((x, y)) {
                    line.push_str(cell.symbol());
                }
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use crate::timers::TimerTask;

    #[test]
    fn test_harness_fires_timers_in_order() {
        let mut harness = PageHarness::ready(history_page());
        harness.scroll_to(100.0);
        assert!(harness.page().timers.contains(&TimerTask::ScrollSettle));

        harness.advance(99);
        assert!(harness.page().timers.contains(&TimerTask::ScrollSettle));
        harness.advance(1);
        assert!(harness.page().timers.is_empty());
        assert_eq!(harness.page().now.as_millis(), 100);
    }
}

use log::{debug, info};

use crate::config::TocConfig;
use crate::events::PageEvent;
use crate::geometry::{
    BoxRect, active_landmark, navigation_offset, next_visibility, progress_css, progress_percent,
};
use crate::host::{ClickTarget, Element, Host, Key, ScrollBehavior};
use crate::links::{TocLink, link_for_landmark};
use crate::timers::{TimerSlot, TimerTask};

const EXPANDED_CLASS: &str = "expanded";
const ACTIVE_CLASS: &str = "active";

/// Widget state for one page view.
#[derive(Debug, Clone, PartialEq)]
pub struct TocState {
    pub expanded: bool,
    /// Hidden while the reader scrolls down, shown again on the way up.
    pub visible: bool,
    pub last_scroll_offset: f64,
    /// Link highlighted by the last settle pass.
    pub active_link: Option<usize>,
    pub active_landmark: Option<String>,
    pub progress: f64,
}

impl Default for TocState {
    fn default() -> Self {
        Self {
            expanded: false,
            visible: true,
            last_scroll_offset: 0.0,
            active_link: None,
            active_landmark: None,
            progress: 0.0,
        }
    }
}

/// Drives the floating TOC on a [`Host`] page.
pub struct TocController<H: Host> {
    host: H,
    config: TocConfig,
    state: TocState,
    links: Vec<TocLink>,
    settle_timer: TimerSlot,
    pinned: bool,
}

impl<H: Host> TocController<H> {
    pub fn new(host: H, config: TocConfig) -> Self {
        let pinned = config.is_pinned_path(&host.location_path());
        Self {
            host,
            config,
            state: TocState::default(),
            links: Vec::new(),
            settle_timer: TimerSlot::new(),
            pinned,
        }
    }

    pub fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::StructureReady => self.initialize(),
            PageEvent::Load => self.handle_load(),
            PageEvent::Scroll => self.handle_scroll(),
            PageEvent::Resize => self.handle_resize(),
            PageEvent::KeyDown(key) => self.handle_key(&key),
            PageEvent::Click(target) => self.handle_click(target),
            PageEvent::Timer(task) => self.run_timer(task),
        }
    }

    /// Collect links, force the closed state and highlight the current section.
    pub fn initialize(&mut self) {
        self.links = self
            .host
            .link_hrefs()
            .iter()
            .map(|href| TocLink::from_href(href))
            .collect();
        debug!(
            "TOC initialized with {} links, pinned page: {}",
            self.links.len(),
            self.pinned
        );

        self.ensure_closed();
        self.update_active_section();
    }

    fn header_height(&self) -> f64 {
        self.host
            .header_height()
            .unwrap_or(self.config.header_fallback)
    }

    /// Recompute the progress bar and the active link from the live layout.
    pub fn update_active_section(&mut self) {
        let scroll = self.host.scroll_offset();

        let progress = progress_percent(
            scroll,
            self.host.document_height(),
            self.host.viewport_height(),
        );
        self.state.progress = progress;
        if self.host.has(Element::ProgressBar) {
            self.host
                .set_style(Element::ProgressBar, "height", &progress_css(progress));
        }

        let threshold = self.header_height() + self.config.detection_padding;
        let landmarks: Vec<(String, BoxRect)> = self
            .host
            .landmark_ids()
            .into_iter()
            .enumerate()
            .filter_map(|(index, id)| {
                self.host
                    .bounding_rect(Element::Landmark(index))
                    .map(|rect| (id, rect))
            })
            .collect();

        let current = active_landmark(
            scroll,
            threshold,
            landmarks
                .iter()
                .map(|(_, rect)| (rect.document_top(scroll), rect.height)),
        )
        .map(|index| landmarks[index].0.clone());

        let active_link = current
            .as_deref()
            .and_then(|id| link_for_landmark(&self.links, id));

        for index in 0..self.links.len() {
            self.host
                .set_class(Element::Link(index), ACTIVE_CLASS, Some(index) == active_link);
        }

        if self.state.active_landmark != current {
            debug!("Active section: {:?} (link {:?})", current, active_link);
        }
        self.state.active_landmark = current;
        self.state.active_link = active_link;
    }

    /// Animate the page to `target_id`, leaving room for the header.
    /// Returns false when no element carries that id.
    pub fn smooth_navigate(&mut self, target_id: &str) -> bool {
        let Some(rect) = self.host.rect_by_id(target_id) else {
            debug!("No element with id {target_id}, navigation skipped");
            return false;
        };

        let scroll = self.host.scroll_offset();
        let header_offset = self.header_height() + self.config.navigation_padding;
        let offset = navigation_offset(
            rect.document_top(scroll),
            header_offset,
            self.host.document_height(),
            self.host.viewport_height(),
        );

        info!("Navigating to #{target_id} at offset {offset}");
        self.host.scroll_to(offset, ScrollBehavior::Smooth);
        self.host.push_fragment(target_id);
        true
    }

    fn apply_expanded(&mut self) {
        let expanded = self.state.expanded;
        self.host
            .set_class(Element::Container, EXPANDED_CLASS, expanded);
        let label = if expanded {
            &self.config.close_label
        } else {
            &self.config.open_label
        };
        self.host.set_attribute(Element::Toggle, "aria-label", label);
    }

    pub fn toggle(&mut self) {
        self.state.expanded = !self.state.expanded;
        debug!("TOC toggled, expanded: {}", self.state.expanded);
        self.apply_expanded();

        if self.state.expanded {
            self.host
                .set_timeout(self.config.focus_delay(), TimerTask::FocusClose);
        }
    }

    pub fn close(&mut self) {
        self.state.expanded = false;
        debug!("TOC closed");
        self.apply_expanded();
        self.host
            .set_timeout(self.config.focus_delay(), TimerTask::FocusToggle);
    }

    /// Reset to the closed presentation without moving focus.
    pub fn ensure_closed(&mut self) {
        self.state.expanded = false;
        self.apply_expanded();
    }

    fn apply_visibility(&mut self, visible: bool) {
        self.state.visible = visible;
        debug!("TOC visible: {visible}");
        if !self.host.has(Element::Container) {
            return;
        }
        let (opacity, transform) = if visible {
            ("1", "translateY(0)")
        } else {
            ("0", "translateY(20px)")
        };
        self.host.set_style(Element::Container, "opacity", opacity);
        self.host
            .set_style(Element::Container, "transform", transform);
    }

    pub fn handle_scroll(&mut self) {
        let current = self.host.scroll_offset();

        if !self.state.expanded && !self.pinned {
            if let Some(visible) = next_visibility(
                self.state.visible,
                self.state.last_scroll_offset,
                current,
                self.config.hide_after,
            ) {
                self.apply_visibility(visible);
            }
        }
        self.state.last_scroll_offset = current;

        if let Some(previous) = self.settle_timer.take() {
            self.host.clear_timeout(previous);
        }
        let id = self
            .host
            .set_timeout(self.config.settle_delay(), TimerTask::ScrollSettle);
        self.settle_timer.arm(id);
    }

    pub fn handle_resize(&mut self) {
        if !self.state.expanded {
            self.ensure_closed();
        }
    }

    pub fn handle_link_click(&mut self, index: usize) {
        let Some(target) = self.links.get(index).and_then(|link| link.target.clone()) else {
            return;
        };
        self.smooth_navigate(&target);

        if self.host.viewport_width() <= self.config.narrow_viewport {
            self.host.set_timeout(
                self.config.navigate_close_delay(),
                TimerTask::CloseAfterNavigate,
            );
        }
    }

    pub fn handle_key(&mut self, key: &Key) {
        if *key == Key::Escape && self.state.expanded {
            self.close();
        }
    }

    /// Element handlers first, then the document-level outside check, the
    /// same order a bubbling click takes.
    pub fn handle_click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Toggle => self.toggle(),
            ClickTarget::Close => self.close(),
            ClickTarget::Link(index) => self.handle_link_click(index),
            ClickTarget::Widget | ClickTarget::Outside => {}
        }

        if self.state.expanded && target.is_outside() {
            self.close();
        }
    }

    /// Schedule the deep-link jump if the page was opened with a fragment.
    pub fn handle_load(&mut self) {
        match self.host.location_fragment() {
            Some(fragment) if !fragment.is_empty() => {
                debug!("Deep link to #{fragment} scheduled");
                self.host.set_timeout(
                    self.config.deep_link_delay(),
                    TimerTask::DeepLink(fragment),
                );
            }
            _ => {}
        }
    }

    pub fn run_timer(&mut self, task: TimerTask) {
        match task {
            TimerTask::FocusClose => {
                if self.host.has(Element::Close) {
                    self.host.focus(Element::Close);
                }
            }
            TimerTask::FocusToggle => {
                if self.host.has(Element::Toggle) {
                    self.host.focus(Element::Toggle);
                }
            }
            TimerTask::CloseAfterNavigate => self.close(),
            TimerTask::ScrollSettle => {
                self.settle_timer.fired();
                self.update_active_section();
            }
            TimerTask::DeepLink(target) => {
                self.smooth_navigate(&target);
            }
        }
    }

    pub fn state(&self) -> &TocState {
        &self.state
    }

    pub fn config(&self) -> &TocConfig {
        &self.config
    }

    pub fn links(&self) -> &[TocLink] {
        &self.links
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

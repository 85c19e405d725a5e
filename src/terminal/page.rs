use ratatui::layout::{Position, Rect};
use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::document::{Document, DocumentLayout};
use crate::geometry::{BoxRect, max_scroll_top};
use crate::host::{ClickTarget, Element, Host, ScrollBehavior};
use crate::timers::{ScheduledTimer, TimerId, TimerQueue, TimerTask};

/// Rows moved per frame at most while a smooth scroll is running.
const MAX_ANIMATION_STEP: f64 = 6.0;

#[derive(Debug)]
enum Clock {
    System(Instant),
    /// Advanced by hand, for tests.
    Manual(Duration),
}

impl Clock {
    fn now(&self) -> Duration {
        match self {
            Clock::System(start) => start.elapsed(),
            Clock::Manual(now) => *now,
        }
    }
}

/// How the floating widget should be drawn, as last set by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub expanded: bool,
    pub opacity: f64,
    pub transform: String,
    pub toggle_label: String,
    pub progress: f64,
    pub active_links: HashSet<usize>,
    pub focused: Option<Element>,
}

impl Default for WidgetView {
    fn default() -> Self {
        Self {
            expanded: false,
            opacity: 1.0,
            transform: "translateY(0)".to_string(),
            toggle_label: String::new(),
            progress: 0.0,
            active_links: HashSet::new(),
            focused: None,
        }
    }
}

impl WidgetView {
    pub fn is_hidden(&self) -> bool {
        self.opacity <= 0.0
    }
}

/// Screen areas of the widget from the last frame, for mouse hit testing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitAreas {
    pub container: Option<Rect>,
    pub toggle: Option<Rect>,
    pub close: Option<Rect>,
    pub links: Vec<(usize, Rect)>,
}

/// A long document shown in a terminal, acting as the TOC's host page.
///
/// One layout row is one unit; row 0 of the screen is the fixed header.
#[derive(Debug)]
pub struct TerminalPage {
    document: Document,
    layout: DocumentLayout,
    width: u16,
    height: u16,
    scroll: f64,
    animation_target: Option<f64>,
    path: String,
    fragment: Option<String>,
    history: Vec<String>,
    view: WidgetView,
    hit_areas: HitAreas,
    clock: Clock,
    timers: TimerQueue,
}

impl TerminalPage {
    pub fn new(document: Document, width: u16, height: u16) -> Self {
        let layout = document.layout(width);
        Self {
            document,
            layout,
            width,
            height,
            scroll: 0.0,
            animation_target: None,
            path: "/index.html".to_string(),
            fragment: None,
            history: Vec::new(),
            view: WidgetView::default(),
            hit_areas: HitAreas::default(),
            clock: Clock::System(Instant::now()),
            timers: TimerQueue::new(),
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn with_fragment(mut self, fragment: Option<String>) -> Self {
        self.fragment = fragment.filter(|f| !f.is_empty());
        self
    }

    /// Use a clock that only moves through [`TerminalPage::advance_clock`].
    pub fn with_manual_clock(mut self) -> Self {
        self.clock = Clock::Manual(Duration::ZERO);
        self
    }

    pub fn advance_clock(&mut self, by: Duration) {
        if let Clock::Manual(now) = &mut self.clock {
            *now += by;
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    pub fn view(&self) -> &WidgetView {
        &self.view
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// First visible layout row.
    pub fn top_row(&self) -> usize {
        self.scroll.max(0.0).round() as usize
    }

    pub fn max_scroll(&self) -> f64 {
        max_scroll_top(self.layout.height() as f64, self.height as f64)
    }

    pub fn is_animating(&self) -> bool {
        self.animation_target.is_some()
    }

    /// Scroll by whole rows. Cancels a running animation. Returns whether the
    /// offset changed.
    pub fn scroll_by(&mut self, rows: f64) -> bool {
        self.animation_target = None;
        self.set_scroll(self.scroll + rows)
    }

    pub fn scroll_to_row(&mut self, row: f64) -> bool {
        self.animation_target = None;
        self.set_scroll(row)
    }

    fn set_scroll(&mut self, offset: f64) -> bool {
        let clamped = offset.clamp(0.0, self.max_scroll()).round();
        let changed = clamped != self.scroll;
        self.scroll = clamped;
        changed
    }

    /// Advance a smooth scroll by one frame. Returns whether the offset moved.
    pub fn step_animation(&mut self) -> bool {
        let Some(target) = self.animation_target else {
            return false;
        };
        let distance = target - self.scroll;
        if distance.abs() < 1.0 {
            self.animation_target = None;
            return self.set_scroll(target);
        }
        let step = (distance.abs() / 3.0).clamp(1.0, MAX_ANIMATION_STEP);
        let moved = self.set_scroll(self.scroll + step * distance.signum());
        if !moved {
            self.animation_target = None;
        }
        moved
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.layout = self.document.layout(width);
        let scroll = self.scroll;
        self.set_scroll(scroll);
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Time until the next timer fires, if any is pending.
    pub fn next_timer_in(&self) -> Option<Duration> {
        let now = self.now();
        self.timers
            .next_due()
            .map(|due| due.saturating_sub(now))
    }

    pub fn pop_due_timer(&mut self) -> Option<ScheduledTimer> {
        let now = self.now();
        self.timers.pop_due(now)
    }

    pub fn set_hit_areas(&mut self, areas: HitAreas) {
        self.hit_areas = areas;
    }

    /// Resolve a mouse click to the widget part under it.
    pub fn hit_test(&self, column: u16, row: u16) -> ClickTarget {
        let position = Position::new(column, row);
        let areas = &self.hit_areas;
        if areas.close.is_some_and(|r| r.contains(position)) {
            return ClickTarget::Close;
        }
        if areas.toggle.is_some_and(|r| r.contains(position)) {
            return ClickTarget::Toggle;
        }
        if let Some((index, _)) = areas.links.iter().find(|(_, r)| r.contains(position)) {
            return ClickTarget::Link(*index);
        }
        if areas.container.is_some_and(|r| r.contains(position)) {
            return ClickTarget::Widget;
        }
        ClickTarget::Outside
    }

    fn landmark_rect(&self, index: usize) -> Option<BoxRect> {
        self.layout
            .landmarks
            .get(index)
            .map(|span| BoxRect::new(span.top as f64 - self.scroll, span.height as f64))
    }
}

impl Host for TerminalPage {
    fn has(&self, element: Element) -> bool {
        match element {
            Element::Link(index) | Element::Landmark(index) => {
                index < self.layout.landmarks.len()
            }
            _ => true,
        }
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn document_height(&self) -> f64 {
        self.layout.height() as f64
    }

    fn viewport_height(&self) -> f64 {
        self.height as f64
    }

    fn viewport_width(&self) -> f64 {
        self.width as f64
    }

    fn header_height(&self) -> Option<f64> {
        Some(1.0)
    }

    fn bounding_rect(&self, element: Element) -> Option<BoxRect> {
        match element {
            Element::Landmark(index) => self.landmark_rect(index),
            _ => None,
        }
    }

    fn rect_by_id(&self, id: &str) -> Option<BoxRect> {
        let index = self.layout.landmarks.iter().position(|span| span.id == id)?;
        self.landmark_rect(index)
    }

    fn link_hrefs(&self) -> Vec<String> {
        self.layout
            .landmarks
            .iter()
            .map(|span| format!("#{}", span.id))
            .collect()
    }

    fn landmark_ids(&self) -> Vec<String> {
        self.layout
            .landmarks
            .iter()
            .map(|span| span.id.clone())
            .collect()
    }

    fn set_class(&mut self, element: Element, class: &str, on: bool) {
        match (element, class) {
            (Element::Container, "expanded") => self.view.expanded = on,
            (Element::Link(index), "active") => {
                if on {
                    self.view.active_links.insert(index);
                } else {
                    self.view.active_links.remove(&index);
                }
            }
            _ => {}
        }
    }

    fn set_attribute(&mut self, element: Element, name: &str, value: &str) {
        if element == Element::Toggle && name == "aria-label" {
            self.view.toggle_label = value.to_string();
        }
    }

    fn set_style(&mut self, element: Element, property: &str, value: &str) {
        match (element, property) {
            (Element::Container, "opacity") => {
                self.view.opacity = value.parse().unwrap_or(1.0);
            }
            (Element::Container, "transform") => self.view.transform = value.to_string(),
            (Element::ProgressBar, "height") => {
                self.view.progress = value.trim_end_matches('%').parse().unwrap_or(0.0);
            }
            _ => {}
        }
    }

    fn focus(&mut self, element: Element) {
        self.view.focused = Some(element);
    }

    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
        match behavior {
            ScrollBehavior::Smooth => {
                self.animation_target = Some(offset.clamp(0.0, self.max_scroll()).round());
            }
            ScrollBehavior::Instant => {
                self.scroll_to_row(offset);
            }
        }
    }

    fn push_fragment(&mut self, fragment: &str) {
        self.history.push(format!("{}#{}", self.path, fragment));
        self.fragment = Some(fragment.to_string());
    }

    fn location_path(&self) -> String {
        self.path.clone()
    }

    fn location_fragment(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        let now = self.now();
        self.timers.schedule(now, delay, task)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.cancel(id);
    }
}

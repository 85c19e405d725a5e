use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::geometry::BoxRect;
use crate::host::{Element, Host, ScrollBehavior};
use crate::timers::{TimerId, TimerQueue, TimerTask};

/// A landmark laid out at a fixed document position.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeLandmark {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// In-memory page with a virtual clock.
///
/// Scroll requests land immediately; scroll events are delivered by whoever
/// drives the page (see [`super::test_helpers::PageHarness`]).
#[derive(Debug)]
pub struct FakePage {
    pub scroll: f64,
    pub document_height: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
    pub header: Option<f64>,
    pub landmarks: Vec<FakeLandmark>,
    pub hrefs: Vec<String>,
    pub missing: HashSet<Element>,
    pub path: String,
    pub fragment: Option<String>,

    pub classes: HashSet<(Element, String)>,
    pub attributes: HashMap<(Element, String), String>,
    pub styles: HashMap<(Element, String), String>,
    pub focused: Option<Element>,
    pub scroll_requests: Vec<(f64, ScrollBehavior)>,
    pub pushed_fragments: Vec<String>,

    pub now: Duration,
    pub timers: TimerQueue,
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePage {
    /// A 3000px document in a 1280x1000 desktop viewport with a 60px header.
    pub fn new() -> Self {
        Self {
            scroll: 0.0,
            document_height: 3000.0,
            viewport_height: 1000.0,
            viewport_width: 1280.0,
            header: Some(60.0),
            landmarks: Vec::new(),
            hrefs: Vec::new(),
            missing: HashSet::new(),
            path: "/index.html".to_string(),
            fragment: None,
            classes: HashSet::new(),
            attributes: HashMap::new(),
            styles: HashMap::new(),
            focused: None,
            scroll_requests: Vec::new(),
            pushed_fragments: Vec::new(),
            now: Duration::ZERO,
            timers: TimerQueue::new(),
        }
    }

    /// Add landmarks as `(id, top, height)` with one `#id` link each.
    pub fn with_sections(mut self, sections: &[(&str, f64, f64)]) -> Self {
        for (id, top, height) in sections {
            self.landmarks.push(FakeLandmark {
                id: id.to_string(),
                top: *top,
                height: *height,
            });
            self.hrefs.push(format!("#{id}"));
        }
        self
    }

    pub fn with_links(mut self, hrefs: &[&str]) -> Self {
        self.hrefs = hrefs.iter().map(|href| href.to_string()).collect();
        self
    }

    pub fn with_document_height(mut self, height: f64) -> Self {
        self.document_height = height;
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn with_header(mut self, header: Option<f64>) -> Self {
        self.header = header;
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn with_fragment(mut self, fragment: &str) -> Self {
        self.fragment = Some(fragment.to_string());
        self
    }

    pub fn without(mut self, element: Element) -> Self {
        self.missing.insert(element);
        self
    }

    pub fn has_class(&self, element: Element, class: &str) -> bool {
        self.classes.contains(&(element, class.to_string()))
    }

    pub fn attribute(&self, element: Element, name: &str) -> Option<&str> {
        self.attributes
            .get(&(element, name.to_string()))
            .map(String::as_str)
    }

    pub fn style(&self, element: Element, property: &str) -> Option<&str> {
        self.styles
            .get(&(element, property.to_string()))
            .map(String::as_str)
    }

    pub fn active_links(&self) -> Vec<usize> {
        (0..self.hrefs.len())
            .filter(|index| self.has_class(Element::Link(*index), "active"))
            .collect()
    }

    pub fn last_scroll_request(&self) -> Option<(f64, ScrollBehavior)> {
        self.scroll_requests.last().copied()
    }

    fn landmark_rect(&self, landmark: &FakeLandmark) -> BoxRect {
        BoxRect::new(landmark.top - self.scroll, landmark.height)
    }
}

impl Host for FakePage {
    fn has(&self, element: Element) -> bool {
        if self.missing.contains(&element) {
            return false;
        }
        match element {
            Element::Link(index) => index < self.hrefs.len(),
            Element::Landmark(index) => index < self.landmarks.len(),
            Element::Header => self.header.is_some(),
            _ => true,
        }
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn header_height(&self) -> Option<f64> {
        if self.missing.contains(&Element::Header) {
            return None;
        }
        self.header
    }

    fn bounding_rect(&self, element: Element) -> Option<BoxRect> {
        match element {
            Element::Landmark(index) if self.has(element) => {
                Some(self.landmark_rect(&self.landmarks[index]))
            }
            _ => None,
        }
    }

    fn rect_by_id(&self, id: &str) -> Option<BoxRect> {
        self.landmarks
            .iter()
            .find(|landmark| landmark.id == id)
            .map(|landmark| self.landmark_rect(landmark))
    }

    fn link_hrefs(&self) -> Vec<String> {
        self.hrefs.clone()
    }

    fn landmark_ids(&self) -> Vec<String> {
        self.landmarks
            .iter()
            .map(|landmark| landmark.id.clone())
            .collect()
    }

    fn set_class(&mut self, element: Element, class: &str, on: bool) {
        if !self.has(element) {
            return;
        }
        let key = (element, class.to_string());
        if on {
            self.classes.insert(key);
        } else {
            self.classes.remove(&key);
        }
    }

    fn set_attribute(&mut self, element: Element, name: &str, value: &str) {
        if self.has(element) {
            self.attributes
                .insert((element, name.to_string()), value.to_string());
        }
    }

    fn set_style(&mut self, element: Element, property: &str, value: &str) {
        if self.has(element) {
            self.styles
                .insert((element, property.to_string()), value.to_string());
        }
    }

    fn focus(&mut self, element: Element) {
        if self.has(element) {
            self.focused = Some(element);
        }
    }

    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
        self.scroll_requests.push((offset, behavior));
        self.scroll = offset;
    }

    fn push_fragment(&mut self, fragment: &str) {
        self.pushed_fragments.push(fragment.to_string());
        self.fragment = Some(fragment.to_string());
    }

    fn location_path(&self) -> String {
        self.path.clone()
    }

    fn location_fragment(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        self.timers.schedule(self.now, delay, task)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.cancel(id);
    }
}

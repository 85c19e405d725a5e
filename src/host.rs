use std::time::Duration;

use crate::geometry::BoxRect;
use crate::timers::{TimerId, TimerTask};

/// Elements of the page the controller talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Container,
    Toggle,
    Close,
    Panel,
    ProgressBar,
    Header,
    /// The n-th TOC link in document order.
    Link(usize),
    /// The n-th landmark in document order.
    Landmark(usize),
}

impl Element {
    /// Whether the element lives inside the floating widget's subtree.
    pub fn is_in_widget(&self) -> bool {
        matches!(
            self,
            Element::Container
                | Element::Toggle
                | Element::Close
                | Element::Panel
                | Element::ProgressBar
                | Element::Link(_)
        )
    }
}

/// What a click landed on, resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Toggle,
    Close,
    Link(usize),
    /// Inside the widget but not on an interactive control.
    Widget,
    Outside,
}

impl ClickTarget {
    pub fn is_outside(&self) -> bool {
        matches!(self, ClickTarget::Outside)
    }
}

impl From<Option<Element>> for ClickTarget {
    fn from(element: Option<Element>) -> Self {
        match element {
            Some(Element::Toggle) => ClickTarget::Toggle,
            Some(Element::Close) => ClickTarget::Close,
            Some(Element::Link(index)) => ClickTarget::Link(index),
            Some(element) if element.is_in_widget() => ClickTarget::Widget,
            _ => ClickTarget::Outside,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// The page the TOC lives on.
///
/// Mutating calls on absent elements are silently ignored; callers that need
/// to skip a whole sub-behavior check [`Host::has`] first.
pub trait Host {
    fn has(&self, element: Element) -> bool;

    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> f64;
    fn document_height(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn viewport_width(&self) -> f64;

    /// Rendered height of the header element, if there is one.
    fn header_height(&self) -> Option<f64>;

    /// Viewport-relative box of an element.
    fn bounding_rect(&self, element: Element) -> Option<BoxRect>;

    /// Viewport-relative box of any element by its id.
    fn rect_by_id(&self, id: &str) -> Option<BoxRect>;

    fn link_hrefs(&self) -> Vec<String>;
    fn landmark_ids(&self) -> Vec<String>;

    fn set_class(&mut self, element: Element, class: &str, on: bool);
    fn set_attribute(&mut self, element: Element, name: &str, value: &str);
    fn set_style(&mut self, element: Element, property: &str, value: &str);
    fn focus(&mut self, element: Element);

    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior);

    /// Record `#fragment` in the URL and history without navigating.
    fn push_fragment(&mut self, fragment: &str);
    fn location_path(&self) -> String;
    /// Fragment of the current URL without the leading `#`.
    fn location_fragment(&self) -> Option<String>;

    fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId;
    fn clear_timeout(&mut self, id: TimerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_target_from_element() {
        assert_eq!(ClickTarget::from(Some(Element::Toggle)), ClickTarget::Toggle);
        assert_eq!(ClickTarget::from(Some(Element::Link(3))), ClickTarget::Link(3));
        assert_eq!(ClickTarget::from(Some(Element::Panel)), ClickTarget::Widget);
        assert_eq!(ClickTarget::from(Some(Element::Landmark(0))), ClickTarget::Outside);
        assert_eq!(ClickTarget::from(Some(Element::Header)), ClickTarget::Outside);
        assert_eq!(ClickTarget::from(None), ClickTarget::Outside);
    }

    #[test]
    fn test_key_from_dom() {
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("Esc"), Key::Escape);
        assert_eq!(Key::from_dom("a"), Key::Other("a".to_string()));
    }
}

use log::{debug, warn};
use once_cell::unsync::OnceCell;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Node, ScrollToOptions, Window};

use crate::config::Selectors;
use crate::geometry::BoxRect;
use crate::host::{ClickTarget, Element, Host, ScrollBehavior};
use crate::timers::{TimerId, TimerTask};

type TimerCallback = Box<dyn Fn(TimerTask)>;

/// Routes fired `setTimeout` callbacks back to whoever owns the controller.
#[derive(Clone, Default)]
pub struct TimerDispatcher {
    sink: Rc<RefCell<Option<TimerCallback>>>,
}

impl TimerDispatcher {
    pub fn bind(&self, callback: impl Fn(TimerTask) + 'static) {
        *self.sink.borrow_mut() = Some(Box::new(callback));
    }

    fn fire(&self, task: TimerTask) {
        match self.sink.borrow().as_ref() {
            Some(callback) => callback(task),
            None => debug!("Timer {task:?} fired before the controller was bound"),
        }
    }
}

/// Elements found when the page structure became ready.
struct Resolved {
    container: Option<web_sys::Element>,
    toggle: Option<web_sys::Element>,
    close: Option<web_sys::Element>,
    panel: Option<web_sys::Element>,
    progress_bar: Option<web_sys::Element>,
    header: Option<web_sys::Element>,
    links: Vec<web_sys::Element>,
    landmarks: Vec<web_sys::Element>,
}

fn query_one(document: &Document, selector: &str) -> Option<web_sys::Element> {
    document.query_selector(selector).ok().flatten()
}

fn query_all(document: &Document, selector: &str) -> Vec<web_sys::Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        warn!("Invalid selector {selector}");
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .collect()
}

fn box_rect(element: &web_sys::Element) -> BoxRect {
    let rect = element.get_bounding_client_rect();
    BoxRect::new(rect.top(), rect.height())
}

/// `setTimeout` takes a signed 32-bit millisecond count; longer delays saturate.
pub(super) fn timeout_millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

/// The browser page, seen through `web-sys`.
///
/// Elements are looked up on first use, which the controller guarantees to be
/// at or after DOMContentLoaded.
pub struct DomPage {
    window: Window,
    document: Document,
    selectors: Selectors,
    resolved: OnceCell<Resolved>,
    timers: TimerDispatcher,
}

impl DomPage {
    pub fn new(
        window: Window,
        document: Document,
        selectors: Selectors,
        timers: TimerDispatcher,
    ) -> Self {
        Self {
            window,
            document,
            selectors,
            resolved: OnceCell::new(),
            timers,
        }
    }

    fn resolved(&self) -> &Resolved {
        self.resolved.get_or_init(|| {
            let s = &self.selectors;
            let resolved = Resolved {
                container: query_one(&self.document, &s.container),
                toggle: query_one(&self.document, &s.toggle),
                close: query_one(&self.document, &s.close),
                panel: query_one(&self.document, &s.panel),
                progress_bar: query_one(&self.document, &s.progress_bar),
                header: query_one(&self.document, &s.header),
                links: query_all(&self.document, &s.links),
                landmarks: query_all(&self.document, &s.landmarks),
            };
            debug!(
                "Resolved {} links and {} landmarks",
                resolved.links.len(),
                resolved.landmarks.len()
            );
            resolved
        })
    }

    fn element(&self, element: Element) -> Option<&web_sys::Element> {
        let resolved = self.resolved();
        match element {
            Element::Container => resolved.container.as_ref(),
            Element::Toggle => resolved.toggle.as_ref(),
            Element::Close => resolved.close.as_ref(),
            Element::Panel => resolved.panel.as_ref(),
            Element::ProgressBar => resolved.progress_bar.as_ref(),
            Element::Header => resolved.header.as_ref(),
            Element::Link(index) => resolved.links.get(index),
            Element::Landmark(index) => resolved.landmarks.get(index),
        }
    }

    fn html(&self, element: Element) -> Option<&HtmlElement> {
        self.element(element)
            .and_then(|e| e.dyn_ref::<HtmlElement>())
    }

    /// Work out which part of the widget a click landed on.
    pub fn classify_click(&self, node: &Node) -> ClickTarget {
        let within = |element: Element| {
            self.element(element)
                .is_some_and(|e| e.contains(Some(node)))
        };

        if within(Element::Toggle) {
            return ClickTarget::Toggle;
        }
        if within(Element::Close) {
            return ClickTarget::Close;
        }
        let links = self.resolved().links.len();
        if let Some(index) = (0..links).find(|i| within(Element::Link(*i))) {
            return ClickTarget::Link(index);
        }
        if within(Element::Container) {
            return ClickTarget::Widget;
        }
        ClickTarget::Outside
    }
}

impl Host for DomPage {
    fn has(&self, element: Element) -> bool {
        self.element(element).is_some()
    }

    fn scroll_offset(&self) -> f64 {
        self.window
            .scroll_y()
            .ok()
            .or_else(|| {
                self.document
                    .document_element()
                    .map(|root| root.scroll_top() as f64)
            })
            .unwrap_or(0.0)
    }

    fn document_height(&self) -> f64 {
        self.document
            .document_element()
            .map(|root| root.scroll_height() as f64)
            .unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn header_height(&self) -> Option<f64> {
        self.html(Element::Header)
            .map(|header| header.offset_height() as f64)
    }

    fn bounding_rect(&self, element: Element) -> Option<BoxRect> {
        self.element(element).map(box_rect)
    }

    fn rect_by_id(&self, id: &str) -> Option<BoxRect> {
        self.document.get_element_by_id(id).as_ref().map(box_rect)
    }

    fn link_hrefs(&self) -> Vec<String> {
        self.resolved()
            .links
            .iter()
            .map(|link| link.get_attribute("href").unwrap_or_default())
            .collect()
    }

    fn landmark_ids(&self) -> Vec<String> {
        self.resolved()
            .landmarks
            .iter()
            .map(|landmark| landmark.id())
            .collect()
    }

    fn set_class(&mut self, element: Element, class: &str, on: bool) {
        if let Some(e) = self.element(element) {
            let _ = e.class_list().toggle_with_force(class, on);
        }
    }

    fn set_attribute(&mut self, element: Element, name: &str, value: &str) {
        if let Some(e) = self.element(element) {
            let _ = e.set_attribute(name, value);
        }
    }

    fn set_style(&mut self, element: Element, property: &str, value: &str) {
        if let Some(e) = self.html(element) {
            let _ = e.style().set_property(property, value);
        }
    }

    fn focus(&mut self, element: Element) {
        if let Some(e) = self.html(element) {
            let _ = e.focus();
        }
    }

    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(offset);
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn push_fragment(&mut self, fragment: &str) {
        let url = format!("#{fragment}");
        let pushed = self
            .window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(&url)));
        if let Err(e) = pushed {
            warn!("Failed to push {url} to history: {e:?}");
        }
    }

    fn location_path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn location_fragment(&self) -> Option<String> {
        let hash = self.window.location().hash().ok()?;
        let fragment = hash.strip_prefix('#').unwrap_or(&hash);
        (!fragment.is_empty()).then(|| fragment.to_string())
    }

    fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        let timers = self.timers.clone();
        let callback = Closure::once_into_js(move || timers.fire(task));
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                timeout_millis(delay),
            ) {
            Ok(handle) => TimerId(handle as u64),
            Err(e) => {
                warn!("setTimeout failed: {e:?}");
                TimerId(0)
            }
        }
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.window.clear_timeout_with_handle(id.0 as i32);
    }
}

//! Browser binding: runs the controller against the live DOM.

mod console_log;
mod dom_page;

pub use dom_page::{DomPage, TimerDispatcher};

use log::{LevelFilter, info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, EventTarget, KeyboardEvent, Node};

use crate::config::TocConfig;
use crate::controller::TocController;
use crate::events::PageEvent;
use crate::host::{ClickTarget, Key};
use crate::links::TocLink;

type SharedController = Rc<RefCell<TocController<DomPage>>>;

fn dispatch(controller: &SharedController, event: PageEvent) {
    match controller.try_borrow_mut() {
        Ok(mut controller) => controller.handle_event(event),
        Err(_) => warn!("TOC controller busy, dropped {event:?}"),
    }
}

fn listen<F>(target: &EventTarget, name: &str, passive: bool, handler: F) -> Result<(), JsValue>
where
    F: FnMut(web_sys::Event) + 'static,
{
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if passive {
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
    } else {
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    }
    // listeners live as long as the page
    closure.forget();
    Ok(())
}

/// Which lifecycle steps `mount` can run at once for a `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReadySteps {
    structure: bool,
    load: bool,
}

impl ReadySteps {
    fn for_state(state: &str) -> Self {
        Self {
            structure: state != "loading",
            load: state == "complete",
        }
    }
}

/// Only link clicks the widget navigates itself lose their default action.
fn intercepts(links: &[TocLink], target: ClickTarget) -> bool {
    match target {
        ClickTarget::Link(index) => links.get(index).is_some_and(|link| link.target.is_some()),
        _ => false,
    }
}

/// Install listeners and run the structure-ready initialization.
fn start(controller: &SharedController) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let c = controller.clone();
    listen(&window, "scroll", true, move |_| dispatch(&c, PageEvent::Scroll))?;

    let c = controller.clone();
    listen(&window, "resize", false, move |_| dispatch(&c, PageEvent::Resize))?;

    let c = controller.clone();
    listen(&document, "keydown", false, move |event| {
        if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
            dispatch(&c, PageEvent::KeyDown(Key::from_dom(&key.key())));
        }
    })?;

    let c = controller.clone();
    listen(&document, "click", false, move |event| {
        let node = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        let (target, intercept) = match (node, c.try_borrow()) {
            (Some(node), Ok(controller)) => {
                let target = controller.host().classify_click(&node);
                (target, intercepts(controller.links(), target))
            }
            _ => (ClickTarget::Outside, false),
        };
        if intercept {
            event.prevent_default();
        }
        dispatch(&c, PageEvent::Click(target));
    })?;

    dispatch(controller, PageEvent::StructureReady);
    Ok(())
}

/// Attach the floating TOC to the current page.
///
/// `config_json` is an optional JSON object overriding any [`TocConfig`] field.
#[wasm_bindgen]
pub fn mount(config_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init(LevelFilter::Info);

    let config = match config_json {
        Some(json) => {
            TocConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => TocConfig::default(),
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let timers = TimerDispatcher::default();
    let page = DomPage::new(
        window.clone(),
        document.clone(),
        config.selectors.clone(),
        timers.clone(),
    );
    let controller: SharedController = Rc::new(RefCell::new(TocController::new(page, config)));

    let weak = Rc::downgrade(&controller);
    timers.bind(move |task| {
        if let Some(controller) = weak.upgrade() {
            dispatch(&controller, PageEvent::Timer(task));
        }
    });

    let state = document.ready_state();
    let steps = ReadySteps::for_state(&state);
    if steps.structure {
        start(&controller)?;
    } else {
        let c = controller.clone();
        listen(&document, "DOMContentLoaded", false, move |_| {
            if let Err(e) = start(&c) {
                warn!("Floating TOC failed to start: {e:?}");
            }
        })?;
    }

    if steps.load {
        dispatch(&controller, PageEvent::Load);
    } else {
        let c = controller.clone();
        listen(&window, "load", false, move |_| dispatch(&c, PageEvent::Load))?;
    }

    info!("Floating TOC mounted (document {state})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selectors;
    use crate::host::Host;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FIXTURE: &str = r##"
        <nav style="height: 50px">Lab</nav>
        <div class="floating-toc">
          <button class="toc-toggle"><span class="icon">≡</span></button>
          <div class="toc-panel">
            <button class="toc-close">×</button>
            <p class="toc-heading">Contents</p>
            <a class="toc-link" href="#history">History</a>
            <a class="toc-link" href="#awards">Awards</a>
            <div class="toc-progress-bar"></div>
          </div>
        </div>
        <section id="history" style="height: 1200px">History</section>
        <section id="awards" style="height: 1200px">Awards</section>
        <p id="elsewhere">Elsewhere</p>
    "##;

    fn window() -> web_sys::Window {
        web_sys::window().unwrap()
    }

    fn document() -> web_sys::Document {
        window().document().unwrap()
    }

    fn install_fixture() {
        document().body().unwrap().set_inner_html(FIXTURE);
    }

    fn find(selector: &str) -> web_sys::Element {
        document().query_selector(selector).unwrap().unwrap()
    }

    fn fixture_page() -> DomPage {
        install_fixture();
        DomPage::new(
            window(),
            document(),
            Selectors::default(),
            TimerDispatcher::default(),
        )
    }

    /// Dispatch a bubbling, cancelable click; returns false when a listener
    /// prevented the default action.
    fn click(element: &web_sys::Element) -> bool {
        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let event = web_sys::Event::new_with_event_init_dict("click", &init).unwrap();
        element.dispatch_event(&event).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_ready_steps_follow_document_state() {
        assert_eq!(
            ReadySteps::for_state("loading"),
            ReadySteps {
                structure: false,
                load: false
            }
        );
        assert_eq!(
            ReadySteps::for_state("interactive"),
            ReadySteps {
                structure: true,
                load: false
            }
        );
        assert_eq!(
            ReadySteps::for_state("complete"),
            ReadySteps {
                structure: true,
                load: true
            }
        );
    }

    #[wasm_bindgen_test]
    fn test_only_in_page_link_clicks_are_intercepted() {
        let links = vec![
            TocLink::from_href("#history"),
            TocLink::from_href("/other.html#awards"),
        ];
        assert!(intercepts(&links, ClickTarget::Link(0)));
        assert!(!intercepts(&links, ClickTarget::Link(1)));
        assert!(!intercepts(&links, ClickTarget::Link(5)));
        assert!(!intercepts(&links, ClickTarget::Toggle));
        assert!(!intercepts(&links, ClickTarget::Outside));
    }

    #[wasm_bindgen_test]
    fn test_classify_click_inside_and_outside() {
        let page = fixture_page();

        assert_eq!(page.classify_click(&find(".toc-toggle .icon")), ClickTarget::Toggle);
        assert_eq!(page.classify_click(&find(".toc-close")), ClickTarget::Close);
        assert_eq!(
            page.classify_click(&find(r##".toc-link[href="#awards"]"##)),
            ClickTarget::Link(1)
        );
        assert_eq!(page.classify_click(&find(".toc-heading")), ClickTarget::Widget);
        assert_eq!(page.classify_click(&find("#elsewhere")), ClickTarget::Outside);
        assert_eq!(page.classify_click(&find("nav")), ClickTarget::Outside);
    }

    #[wasm_bindgen_test]
    fn test_location_fragment_strips_hash() {
        let page = fixture_page();
        let location = window().location();

        location.set_hash("#awards").unwrap();
        assert_eq!(page.location_fragment().as_deref(), Some("awards"));

        location.set_hash("").unwrap();
        assert_eq!(page.location_fragment(), None);
    }

    #[wasm_bindgen_test]
    fn test_timeout_saturates_long_delays() {
        use std::time::Duration;

        assert_eq!(dom_page::timeout_millis(Duration::from_millis(300)), 300);
        assert_eq!(
            dom_page::timeout_millis(Duration::from_millis(u64::from(u32::MAX))),
            i32::MAX
        );
    }

    #[wasm_bindgen_test]
    fn test_mounted_widget_handles_clicks() {
        install_fixture();
        mount(None).unwrap();
        let container = find(".floating-toc");

        assert!(!click(&find(r##".toc-link[href="#history"]"##)));
        assert_eq!(window().location().hash().unwrap(), "#history");

        assert!(click(&find(".toc-toggle")));
        assert!(container.class_list().contains("expanded"));
        assert_eq!(
            find(".toc-toggle").get_attribute("aria-label").as_deref(),
            Some("Close table of contents")
        );

        click(&find(".toc-heading"));
        assert!(container.class_list().contains("expanded"));

        assert!(click(&find("#elsewhere")));
        assert!(!container.class_list().contains("expanded"));
    }
}

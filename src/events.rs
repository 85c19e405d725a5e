use crate::host::{ClickTarget, Key};
use crate::timers::TimerTask;

/// Everything a host can deliver to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The document structure is parsed (DOMContentLoaded).
    StructureReady,
    /// All page resources finished loading.
    Load,
    Scroll,
    Resize,
    KeyDown(Key),
    Click(ClickTarget),
    Timer(TimerTask),
}

impl PageEvent {
    pub fn escape() -> Self {
        PageEvent::KeyDown(Key::Escape)
    }

    pub fn click_link(index: usize) -> Self {
        PageEvent::Click(ClickTarget::Link(index))
    }
}

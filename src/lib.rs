pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod links;
pub mod timers;

#[cfg(not(target_arch = "wasm32"))]
pub mod panic_handler;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{Selectors, TocConfig};
pub use controller::{TocController, TocState};
pub use error::TocError;
pub use events::PageEvent;
pub use host::{ClickTarget, Element, Host, Key, ScrollBehavior};
pub use links::TocLink;
pub use timers::{TimerId, TimerTask};

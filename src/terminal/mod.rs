//! Terminal rendition of a long page with the floating TOC drawn on top.

pub mod app;
pub mod document;
pub mod event_source;
pub mod page;
pub mod render;
pub mod theme;

pub use app::{App, run_app_with_event_source};
pub use document::Document;
pub use page::TerminalPage;

//! Scroll math shared by every host: progress, active-section detection and
//! navigation offsets. Everything here is pure so it can be tested without a page.

/// Vertical extent of an element relative to the viewport, as returned by a
/// bounding-rect query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxRect {
    pub top: f64,
    pub height: f64,
}

impl BoxRect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Top edge in document coordinates.
    pub fn document_top(&self, scroll_offset: f64) -> f64 {
        self.top + scroll_offset
    }
}

/// Largest reachable scroll offset. Never negative.
pub fn max_scroll_top(document_height: f64, viewport_height: f64) -> f64 {
    (document_height - viewport_height).max(0.0)
}

/// Read progress in percent, clamped to `[0, 100]`.
///
/// A document that fits in the viewport has nothing to scroll and reports 0.
pub fn progress_percent(scroll_offset: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 || !scrollable.is_finite() {
        return 0.0;
    }
    (scroll_offset / scrollable * 100.0).clamp(0.0, 100.0)
}

/// Progress formatted as a CSS length, e.g. `"42.5%"`.
pub fn progress_css(percent: f64) -> String {
    format!("{percent}%")
}

/// Index of the landmark containing the threshold line.
///
/// `spans` are `(document_top, height)` pairs in document order. A landmark
/// matches when `scroll ∈ [top - threshold, top + height - threshold)`. When
/// ranges overlap the last match wins.
pub fn active_landmark<I>(scroll_offset: f64, threshold: f64, spans: I) -> Option<usize>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut current = None;
    for (index, (top, height)) in spans.into_iter().enumerate() {
        if scroll_offset >= top - threshold && scroll_offset < top + height - threshold {
            current = Some(index);
        }
    }
    current
}

/// Scroll offset that places an element just below the header.
pub fn navigation_offset(
    element_top: f64,
    header_offset: f64,
    document_height: f64,
    viewport_height: f64,
) -> f64 {
    let offset = (element_top - header_offset).max(0.0);
    offset.min(max_scroll_top(document_height, viewport_height))
}

/// Decide the widget's visibility after a scroll from `last` to `current`.
///
/// Returns `Some(new_visibility)` only when it changes.
pub fn next_visibility(visible: bool, last: f64, current: f64, hide_after: f64) -> Option<bool> {
    let hide = current > last && current > hide_after;
    match (visible, hide) {
        (true, true) => Some(false),
        (false, false) => Some(true),
        _ => None,
    }
}

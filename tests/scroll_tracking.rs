use floating_toc::PageEvent;
use floating_toc::test_utils::FakePage;
use floating_toc::test_utils::test_helpers::{HISTORY_PAGE, PageHarness, history_page};

fn settle_at(harness: &mut PageHarness, offset: f64) {
    harness.scroll_to(offset);
    harness.advance(100);
}

#[test]
fn test_at_most_one_link_active_across_the_page() {
    let mut harness = PageHarness::ready(history_page());

    let mut offset = 0.0;
    while offset <= 2000.0 {
        settle_at(&mut harness, offset);
        let active = harness.page().active_links();
        assert!(active.len() <= 1, "offset {offset}: {active:?}");
        assert_eq!(active.first().copied(), harness.state().active_link);
        offset += 25.0;
    }
}

#[test]
fn test_each_section_activates_its_own_link() {
    let mut harness = PageHarness::ready(history_page());

    for (index, (id, top, height)) in HISTORY_PAGE.iter().enumerate().take(3) {
        // a point well inside the section's detection range
        let offset = top + height / 2.0 - 90.0;
        settle_at(&mut harness, offset);
        assert_eq!(harness.page().active_links(), vec![index], "section {id}");
        assert_eq!(harness.state().active_landmark.as_deref(), Some(*id));
    }
}

#[test]
fn test_short_last_section_is_not_reached_at_bottom() {
    let mut harness = PageHarness::ready(history_page());

    // contact starts at 2200, but the page stops scrolling at 2000
    settle_at(&mut harness, 2000.0);
    assert_eq!(harness.state().active_landmark.as_deref(), Some("awards"));
    assert_eq!(harness.state().progress, 100.0);
}

#[test]
fn test_progress_matches_formula_at_every_offset() {
    let mut harness = PageHarness::ready(history_page());
    let scrollable = 3000.0 - 1000.0;

    for offset in [0.0, 1.0, 333.0, 999.5, 1500.0, 2000.0] {
        settle_at(&mut harness, offset);
        let expected = (offset / scrollable * 100.0_f64).clamp(0.0, 100.0);
        assert_eq!(harness.state().progress, expected);
        assert_eq!(
            harness
                .page()
                .style(floating_toc::Element::ProgressBar, "height"),
            Some(format!("{expected}%").as_str())
        );
    }
}

#[test]
fn test_rapid_scrolling_recomputes_once() {
    let mut harness = PageHarness::ready(history_page());

    for step in 1..=50 {
        harness.scroll_to(step as f64 * 30.0);
        harness.advance(10);
    }
    assert_eq!(harness.page().timers.len(), 1);
    // still showing the section from before the burst
    assert_eq!(harness.page().active_links(), vec![0]);

    harness.advance(100);
    assert!(harness.page().timers.is_empty());
    assert_eq!(harness.state().active_landmark.as_deref(), Some("awards"));
}

#[test]
fn test_hide_show_cycle_and_suppression() {
    let mut harness = PageHarness::ready(history_page());

    harness.scroll_to(301.0);
    assert!(!harness.state().visible);
    harness.scroll_to(150.0);
    assert!(harness.state().visible);

    harness.controller.toggle();
    harness.scroll_to(900.0);
    assert!(harness.state().visible);

    harness.dispatch(PageEvent::escape());
    harness.scroll_to(1200.0);
    assert!(!harness.state().visible);
}

#[test]
fn test_overlapping_landmarks_last_wins() {
    let page = FakePage::new()
        .with_sections(&[("year-2019", 0.0, 2000.0), ("item-2019-award", 700.0, 300.0)])
        .with_document_height(3000.0);
    let mut harness = PageHarness::ready(page);

    settle_at(&mut harness, 750.0);
    assert_eq!(harness.page().active_links(), vec![1]);

    settle_at(&mut harness, 1200.0);
    assert_eq!(harness.page().active_links(), vec![0]);
}

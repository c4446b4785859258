//! Scrolling tests - wheel, clamping, linked views

mod common;

use common::{comment, data, test_view};
use hexpane::commands::Cmd;
use hexpane::messages::{ScrollMsg, Msg};
use hexpane::update::update;

#[test]
fn test_wheel_scrolls_configured_lines() {
    let mut view = test_view(1000, vec![]);
    assert_eq!(update(&mut view, Msg::Scroll(ScrollMsg::Wheel(2))), Some(Cmd::Redraw));
    assert_eq!(view.scroll_yoff(), 6);

    update(&mut view, Msg::Scroll(ScrollMsg::Wheel(-10)));
    assert_eq!(view.scroll_yoff(), 0);

    // Already at the top: nothing to redraw
    assert_eq!(update(&mut view, Msg::Scroll(ScrollMsg::Wheel(-1))), None);
}

#[test]
fn test_vertical_scroll_is_clamped() {
    let mut view = test_view(1000, vec![]);
    // 63 lines, 10 visible
    assert_eq!(view.scroll_yoff_max(), 53);

    update(&mut view, Msg::Scroll(ScrollMsg::ToLine(1_000_000)));
    assert_eq!(view.scroll_yoff(), 53);

    // A short document cannot scroll at all
    let mut short = test_view(64, vec![]);
    update(&mut short, Msg::Scroll(ScrollMsg::ByLines(5)));
    assert_eq!(short.scroll_yoff(), 0);
}

#[test]
fn test_shrinking_document_pulls_scroll_back() {
    let mut view = test_view(1000, vec![]);
    view.set_scroll_yoff(50);
    view.replace_regions(vec![data(0, 1000)]);
    assert_eq!(view.scroll_yoff(), 50);

    update(&mut view, Msg::Resize { width: 700, height: 800 });
    assert_eq!(view.scroll_yoff_max(), 63 - 40);
    assert_eq!(view.scroll_yoff(), 23);
}

#[test]
fn test_horizontal_scroll_limited_to_virtual_width() {
    let mut view = test_view(100, vec![data(0, 16), comment(16, 16, "c"), data(16, 84)]);
    assert_eq!(view.virtual_width(), 720);

    update(&mut view, Msg::Scroll(ScrollMsg::HorizontalWheel(5)));
    assert_eq!(view.scroll_xoff(), 20);

    update(&mut view, Msg::Scroll(ScrollMsg::ToX(-40)));
    assert_eq!(view.scroll_xoff(), 0);

    // Everything fits: no horizontal scrolling
    let mut plain = test_view(100, vec![]);
    assert_eq!(update(&mut plain, Msg::Scroll(ScrollMsg::HorizontalWheel(3))), None);
}

#[test]
fn test_linked_views_scroll_together() {
    let mut a = test_view(10_000, vec![]);
    let mut b = test_view(10_000, vec![]);

    a.link_scroll_after(&mut b);
    assert!(a.scroll_group().unwrap().ptr_eq(b.scroll_group().unwrap()));

    a.set_scroll_yoff(100);
    assert_eq!(b.scroll_yoff(), 100);

    b.set_scroll_yoff(200);
    assert_eq!(a.scroll_yoff(), 200);

    a.unlink_scroll();
    b.set_scroll_yoff(300);
    assert_eq!(a.scroll_yoff(), 200);
    assert_eq!(b.scroll_yoff(), 300);
}

#[test]
fn test_linking_does_not_move_either_view() {
    let mut a = test_view(10_000, vec![]);
    let mut b = test_view(10_000, vec![]);
    a.set_scroll_yoff(10);
    b.set_scroll_yoff(20);

    a.link_scroll_after(&mut b);
    assert_eq!(a.scroll_yoff(), 10);
    assert_eq!(b.scroll_yoff(), 20);
}

#[test]
fn test_linked_peer_clamps_to_its_own_range() {
    let mut long = test_view(10_000, vec![]);
    let mut short = test_view(1000, vec![]);
    short.link_scroll_after(&mut long);

    long.set_scroll_yoff(400);
    assert_eq!(long.scroll_yoff(), 400);
    assert_eq!(short.scroll_yoff(), 53);
}

#[test]
fn test_peer_scroll_redraws_on_next_tick() {
    let mut a = test_view(10_000, vec![]);
    let mut b = test_view(10_000, vec![]);
    b.link_scroll_after(&mut a);

    update(&mut a, Msg::Scroll(ScrollMsg::ToLine(42)));
    assert_eq!(update(&mut b, Msg::Tick), Some(Cmd::Redraw));
    assert!(!b.take_scroll_changed());
}

#[test]
fn test_three_views_in_link_order() {
    let mut a = test_view(10_000, vec![]);
    let mut b = test_view(10_000, vec![]);
    let mut c = test_view(10_000, vec![]);
    b.link_scroll_after(&mut a);
    c.link_scroll_after(&mut a);

    let group = a.scroll_group().unwrap().clone();
    assert_eq!(group.members(), vec![a.id(), c.id(), b.id()]);

    c.set_scroll_yoff(7);
    assert_eq!(a.scroll_yoff(), 7);
    assert_eq!(b.scroll_yoff(), 7);
}

#[test]
fn test_dropped_view_leaves_group() {
    let mut a = test_view(10_000, vec![]);
    let group = {
        let mut b = test_view(10_000, vec![]);
        b.link_scroll_after(&mut a);
        a.scroll_group().unwrap().clone()
    };
    assert_eq!(group.len(), 1);

    // Scrolling with no live peers is fine
    a.set_scroll_yoff(5);
    assert_eq!(a.scroll_yoff(), 5);
}

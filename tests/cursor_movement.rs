//! Cursor movement tests - stepping, region crossing, column memory, paging

mod common;

use common::{comment, data, test_view};
use hexpane::messages::{CursorMsg, Direction, Key, KeyInput, Motion, Msg};
use hexpane::model::{CursorState, DocumentView, ScreenArea};
use hexpane::update::update;

fn step(view: &mut DocumentView, direction: Direction) {
    update(
        view,
        Msg::Cursor(CursorMsg::Move {
            motion: Motion::Step(direction),
            extend: false,
        }),
    );
}

fn goto(view: &mut DocumentView, offset: u64) {
    update(view, Msg::Cursor(CursorMsg::Goto(offset)));
}

fn assert_lookups_agree(view: &DocumentView) {
    let pos = view.cursor_position();
    let idx = view.region_index_by_offset(pos).unwrap();
    let rect = view.offset_document_rect(pos, ScreenArea::Hex).unwrap();
    assert_eq!(view.region_index_by_line(rect.y as u64), Some(idx), "at {}", pos);
}

#[test]
fn test_left_undoes_right() {
    let mut view = test_view(
        100,
        vec![
            data(0, 16),
            comment(16, 32, "header"),
            data(16, 20),
            data(36, 12),
            data(48, 52),
        ],
    );

    for p in 0..99 {
        goto(&mut view, p);
        step(&mut view, Direction::Right);
        assert_eq!(view.cursor_position(), p + 1);
        assert_lookups_agree(&view);
        step(&mut view, Direction::Left);
        assert_eq!(view.cursor_position(), p, "round trip from {}", p);
        assert_lookups_agree(&view);
    }
}

#[test]
fn test_horizontal_steps_cross_region_boundaries() {
    let mut view = test_view(100, vec![data(0, 16), data(16, 20), data(36, 64)]);

    goto(&mut view, 35);
    step(&mut view, Direction::Right);
    assert_eq!(view.cursor_position(), 36);
    step(&mut view, Direction::Left);
    assert_eq!(view.cursor_position(), 35);
}

#[test]
fn test_moving_off_the_document_is_absorbed() {
    let mut view = test_view(100, vec![]);
    step(&mut view, Direction::Left);
    step(&mut view, Direction::Up);
    assert_eq!(view.cursor_position(), 0);

    goto(&mut view, 5000);
    assert_eq!(view.cursor_position(), 99);
    step(&mut view, Direction::Right);
    step(&mut view, Direction::Down);
    assert_eq!(view.cursor_position(), 99);
}

#[test]
fn test_vertical_moves_remember_column_across_regions() {
    let mut view = test_view(100, vec![data(0, 32), data(32, 4), data(36, 64)]);
    goto(&mut view, 13);

    step(&mut view, Direction::Down);
    assert_eq!(view.cursor_position(), 29);

    // The short region cannot reach column 13
    step(&mut view, Direction::Down);
    assert_eq!(view.cursor_position(), 35);

    step(&mut view, Direction::Down);
    assert_eq!(view.cursor_position(), 45);
    assert_lookups_agree(&view);

    step(&mut view, Direction::Up);
    assert_eq!(view.cursor_position(), 35);
    step(&mut view, Direction::Up);
    assert_eq!(view.cursor_position(), 29);

    // A horizontal step forgets the column
    step(&mut view, Direction::Left);
    step(&mut view, Direction::Down);
    assert_eq!(view.cursor_position(), 35);
    step(&mut view, Direction::Down);
    assert_eq!(view.cursor_position(), 44);
}

#[test]
fn test_vertical_move_skips_comment() {
    let mut view = test_view(32, vec![data(0, 16), comment(16, 16, "c"), data(16, 16)]);
    goto(&mut view, 5);
    step(&mut view, Direction::Down);
    assert_eq!(view.cursor_position(), 21);
    step(&mut view, Direction::Up);
    assert_eq!(view.cursor_position(), 5);
}

#[test]
fn test_home_and_end_keys() {
    let mut view = test_view(1000, vec![]);
    goto(&mut view, 21);

    update(&mut view, Msg::Key(KeyInput::plain(Key::Home)));
    assert_eq!(view.cursor_position(), 16);
    update(&mut view, Msg::Key(KeyInput::plain(Key::End)));
    assert_eq!(view.cursor_position(), 31);

    update(&mut view, Msg::Key(KeyInput::ctrl(Key::End)));
    assert_eq!(view.cursor_position(), 999);
    update(&mut view, Msg::Key(KeyInput::ctrl(Key::Home)));
    assert_eq!(view.cursor_position(), 0);

    update(&mut view, Msg::Cursor(CursorMsg::ToggleInsertMode));
    update(&mut view, Msg::Key(KeyInput::ctrl(Key::End)));
    assert_eq!(view.cursor_position(), 1000);
}

#[test]
fn test_page_moves_cursor_and_scroll_together() {
    let mut view = test_view(1000, vec![]);
    goto(&mut view, 5);

    update(&mut view, Msg::Key(KeyInput::plain(Key::PageDown)));
    assert_eq!(view.cursor_position(), 5 + 10 * 16);
    assert_eq!(view.scroll_yoff(), 10);

    update(&mut view, Msg::Key(KeyInput::plain(Key::PageUp)));
    assert_eq!(view.cursor_position(), 5);
    assert_eq!(view.scroll_yoff(), 0);
}

#[test]
fn test_cursor_move_scrolls_into_view() {
    let mut view = test_view(1000, vec![]);
    for _ in 0..12 {
        step(&mut view, Direction::Down);
    }
    assert_eq!(view.cursor_position(), 12 * 16);
    assert_eq!(view.scroll_yoff(), 3);
}

#[test]
fn test_tab_toggles_focused_area() {
    let mut view = test_view(100, vec![]);
    update(&mut view, Msg::Key(KeyInput::plain(Key::Tab)));
    assert_eq!(view.cursor_state(), CursorState::Ascii);
    update(&mut view, Msg::Key(KeyInput::plain(Key::Tab)));
    assert_eq!(view.cursor_state(), CursorState::Hex);
}

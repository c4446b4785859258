//! Cursor and selection message handlers

use crate::commands::Cmd;
use crate::messages::{CursorMsg, SelectionMsg};
use crate::model::cursor::CursorState;
use crate::model::view::DocumentView;

pub fn update_cursor(view: &mut DocumentView, msg: CursorMsg) -> Option<Cmd> {
    match msg {
        CursorMsg::Move { motion, extend } => view.move_cursor(motion, extend),
        CursorMsg::Goto(offset) => view.set_cursor_position(offset, CursorState::Goto),
        CursorMsg::SetPosition { offset, state } => view.set_cursor_position(offset, state),
        CursorMsg::ToggleInsertMode => view.set_insert_mode(!view.insert_mode()),
        CursorMsg::ToggleArea => view.toggle_area(),
    }
    Some(Cmd::Redraw)
}

pub fn update_selection(view: &mut DocumentView, msg: SelectionMsg) -> Option<Cmd> {
    match msg {
        SelectionMsg::Set { offset, length } => view.set_selection(offset, length),
        SelectionMsg::Clear => view.clear_selection(),
        SelectionMsg::SelectAll => view.select_all(),
    }
    Some(Cmd::Redraw)
}

//! Keyboard and clipboard handlers
//!
//! Editing keys never touch storage. They produce an [`EditRequest`] for the
//! host, which applies it and hands back a rebuilt region list through
//! [`DocumentView::finish_edit`].

use crate::clipboard::MemoryClipboard;
use crate::commands::{Cmd, EditKind, EditRequest};
use crate::messages::{ClipboardMsg, Direction, Key, KeyInput, Motion};
use crate::model::cursor::CursorState;
use crate::model::geometry::ScreenArea;
use crate::model::view::DocumentView;

pub fn update_key(view: &mut DocumentView, key: KeyInput) -> Option<Cmd> {
    if let Some(cmd) = view.offer_key_to_region(&key) {
        return Some(cmd);
    }

    let extend = key.shift;
    let motion = match key.key {
        Key::Left => Some(Motion::Step(Direction::Left)),
        Key::Right => Some(Motion::Step(Direction::Right)),
        Key::Up => Some(Motion::Step(Direction::Up)),
        Key::Down => Some(Motion::Step(Direction::Down)),
        Key::Home if key.ctrl => Some(Motion::DocumentStart),
        Key::Home => Some(Motion::LineStart),
        Key::End if key.ctrl => Some(Motion::DocumentEnd),
        Key::End => Some(Motion::LineEnd),
        Key::PageUp => Some(Motion::PageUp),
        Key::PageDown => Some(Motion::PageDown),
        _ => None,
    };
    if let Some(motion) = motion {
        view.move_cursor(motion, extend);
        return Some(Cmd::Redraw);
    }

    match key.key {
        Key::Tab => {
            view.toggle_area();
            Some(Cmd::Redraw)
        }
        Key::Insert => {
            view.set_insert_mode(!view.insert_mode());
            Some(Cmd::Redraw)
        }
        Key::Escape => {
            view.clear_selection();
            Some(Cmd::Redraw)
        }
        Key::Backspace => erase_backward(view),
        Key::Delete => erase_forward(view),
        Key::Char(c) if key.ctrl => match c.to_ascii_lowercase() {
            'a' => {
                view.select_all();
                Some(Cmd::Redraw)
            }
            'c' => update_clipboard(view, ClipboardMsg::Copy),
            'x' => update_clipboard(view, ClipboardMsg::Cut),
            _ => None,
        },
        Key::Char(c) => type_char(view, c),
        _ => None,
    }
}

pub fn update_clipboard(view: &mut DocumentView, msg: ClipboardMsg) -> Option<Cmd> {
    match msg {
        ClipboardMsg::Copy => view.copy_selection().map(Cmd::CopyToClipboard),
        ClipboardMsg::Cut => {
            let copy = view.copy_selection().map(Cmd::CopyToClipboard);
            let erase = view
                .insert_mode()
                .then(|| erase_selection(view))
                .flatten()
                .map(Cmd::Edit);
            Cmd::merge(copy, erase)
        }
        ClipboardMsg::Paste(payload) => view.paste(&mut MemoryClipboard::with_payload(payload)),
    }
}

fn type_char(view: &mut DocumentView, c: char) -> Option<Cmd> {
    match view.cursor_state().area() {
        ScreenArea::Ascii => {
            if !(c.is_ascii_graphic() || c == ' ') {
                return None;
            }
            Some(Cmd::Edit(view.write_request(vec![c as u8])))
        }
        ScreenArea::Hex => {
            let digit = c.to_digit(16)? as u8;
            type_nibble(view, digit).map(Cmd::Edit)
        }
        _ => None,
    }
}

/// The first nibble typed on a byte writes its high half and leaves the
/// cursor in place; the second writes the low half and moves on
fn type_nibble(view: &DocumentView, digit: u8) -> Option<EditRequest> {
    let cursor = view.cursor_position();

    if view.cursor_state() == CursorState::HexMid {
        let current = byte_at(view, cursor)?;
        return Some(EditRequest {
            kind: EditKind::Overwrite {
                offset: cursor,
                data: vec![(current & 0xF0) | digit],
            },
            cursor_after: cursor + 1,
            state_after: CursorState::Hex,
        });
    }

    let data = if view.insert_mode() {
        vec![digit << 4]
    } else {
        let current = byte_at(view, cursor)?;
        vec![(digit << 4) | (current & 0x0F)]
    };
    let mut request = view.write_request(data);
    request.cursor_after -= 1;
    request.state_after = CursorState::HexMid;
    Some(request)
}

fn byte_at(view: &DocumentView, offset: u64) -> Option<u8> {
    match view.source().read(offset, 1) {
        Ok(bytes) => bytes.first().copied(),
        Err(e) => {
            tracing::warn!("Failed to read byte at {}: {:#}", offset, e);
            None
        }
    }
}

fn erase_selection(view: &DocumentView) -> Option<EditRequest> {
    let sel = view.selection();
    (!sel.is_empty()).then(|| EditRequest {
        kind: EditKind::Erase {
            offset: sel.offset,
            length: sel.length,
        },
        cursor_after: sel.offset,
        state_after: CursorState::Goto.resolve(view.cursor_state()),
    })
}

/// Backspace: in insert mode erases the selection or the byte before the
/// cursor; in overwrite mode it only steps left
fn erase_backward(view: &mut DocumentView) -> Option<Cmd> {
    if !view.insert_mode() {
        view.move_cursor(Motion::Step(Direction::Left), false);
        return Some(Cmd::Redraw);
    }
    if let Some(request) = erase_selection(view) {
        return Some(Cmd::Edit(request));
    }

    let cursor = view.cursor_position();
    if cursor == 0 {
        return None;
    }
    Some(Cmd::Edit(EditRequest {
        kind: EditKind::Erase {
            offset: cursor - 1,
            length: 1,
        },
        cursor_after: cursor - 1,
        state_after: CursorState::Goto.resolve(view.cursor_state()),
    }))
}

/// Delete: in insert mode erases the selection or the byte under the cursor
fn erase_forward(view: &mut DocumentView) -> Option<Cmd> {
    if !view.insert_mode() {
        return None;
    }
    if let Some(request) = erase_selection(view) {
        return Some(Cmd::Edit(request));
    }

    let cursor = view.cursor_position();
    if cursor >= view.file_length() {
        return None;
    }
    Some(Cmd::Edit(EditRequest {
        kind: EditKind::Erase {
            offset: cursor,
            length: 1,
        },
        cursor_after: cursor,
        state_after: CursorState::Goto.resolve(view.cursor_state()),
    }))
}

//! Pointer handlers

use crate::commands::Cmd;
use crate::messages::MouseMsg;
use crate::model::view::DocumentView;

pub fn update_mouse(view: &mut DocumentView, msg: MouseMsg) -> Option<Cmd> {
    match msg {
        MouseMsg::LeftDown { x, y, shift } => view.mouse_down(x, y, shift),
        MouseMsg::RightDown { x, y } => Some(view.context_menu_at(x, y)),
        MouseMsg::Motion { x, y } => view.mouse_motion(x, y).then_some(Cmd::Redraw),
        MouseMsg::LeftUp => {
            view.mouse_up();
            None
        }
    }
}

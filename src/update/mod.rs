//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions.

mod cursor;
mod edit;
mod layout;
mod mouse;

use crate::commands::Cmd;
use crate::messages::Msg;
use crate::model::view::DocumentView;

#[cfg(debug_assertions)]
use crate::tracing::LayoutSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use cursor::{update_cursor, update_selection};
pub use edit::{update_clipboard, update_key};
pub use layout::{update_display, update_scroll};
pub use mouse::update_mouse;

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(view: &mut DocumentView, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(view, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(view, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner(view: &mut DocumentView, msg: Msg) -> Option<Cmd> {
    match msg {
        Msg::Cursor(m) => cursor::update_cursor(view, m),
        Msg::Selection(m) => cursor::update_selection(view, m),
        Msg::Scroll(m) => layout::update_scroll(view, m),
        Msg::Mouse(m) => mouse::update_mouse(view, m),
        Msg::Display(m) => layout::update_display(view, m),
        Msg::Clipboard(m) => edit::update_clipboard(view, m),
        Msg::Key(key) => edit::update_key(view, key),
        Msg::Resize { width, height } => {
            view.resize(width, height);
            Some(Cmd::Redraw)
        }
        Msg::ReplaceRegions(regions) => {
            view.replace_regions(regions);
            Some(Cmd::Redraw)
        }
        Msg::Tick => view.tick(),
    }
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after layout state and logs diffs for debugging.
/// Ticks are too frequent to log.
#[cfg(debug_assertions)]
fn update_traced(view: &mut DocumentView, msg: Msg) -> Option<Cmd> {
    let is_noisy = matches!(&msg, Msg::Tick);

    let msg_name = msg_type_name(&msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = %msg_name).entered())
    };

    let before = LayoutSnapshot::capture(view);

    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let result = update_inner(view, msg);

    let after = LayoutSnapshot::capture(view);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "layout", %diff, "state changed");
    }

    view.assert_invariants();
    result
}

/// Get a display name for a message type
///
/// Example outputs:
/// - `Cursor::Goto(16)`
/// - `Key::KeyInput { key: Char('a'), shift: false, ctrl: false }`
/// - `Resize(800, 600)`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Cursor(m) => format!("Cursor::{:?}", m),
        Msg::Selection(m) => format!("Selection::{:?}", m),
        Msg::Scroll(m) => format!("Scroll::{:?}", m),
        Msg::Mouse(m) => format!("Mouse::{:?}", m),
        Msg::Display(m) => format!("Display::{:?}", m),
        Msg::Clipboard(m) => format!("Clipboard::{:?}", m),
        Msg::Key(k) => format!("Key::{:?}", k),
        Msg::Resize { width, height } => format!("Resize({}, {})", width, height),
        Msg::ReplaceRegions(regions) => format!("ReplaceRegions({})", regions.len()),
        Msg::Tick => "Tick".to_string(),
    }
}

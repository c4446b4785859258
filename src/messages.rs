//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use crate::clipboard::ClipboardPayload;
use crate::model::cursor::CursorState;
use crate::model::metrics::FontMetrics;
use crate::model::options::{BytesPerLine, DisplayOptions, OffsetBase};
use crate::model::region::Region;

/// Direction for cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Every way the cursor can be moved from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Step(Direction),
    /// Start of the screen line
    LineStart,
    /// Last byte of the screen line
    LineEnd,
    DocumentStart,
    DocumentEnd,
    PageUp,
    PageDown,
}

/// Keys the view reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Insert,
    Backspace,
    Delete,
    Escape,
    Char(char),
}

/// A key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
}

impl KeyInput {
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
        }
    }

    pub const fn shifted(key: Key) -> Self {
        Self {
            key,
            shift: true,
            ctrl: false,
        }
    }

    pub const fn ctrl(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: true,
        }
    }
}

/// Cursor messages
#[derive(Debug, Clone)]
pub enum CursorMsg {
    /// Move the cursor; `extend` grows the selection from its anchor
    Move { motion: Motion, extend: bool },
    /// Set the cursor, keeping the focused area
    Goto(u64),
    SetPosition { offset: u64, state: CursorState },
    ToggleInsertMode,
    /// Switch focus between the hex and ASCII areas
    ToggleArea,
}

#[derive(Debug, Clone)]
pub enum SelectionMsg {
    Set { offset: u64, length: u64 },
    Clear,
    SelectAll,
}

#[derive(Debug, Clone)]
pub enum ScrollMsg {
    /// Scroll so `line` is the first visible line
    ToLine(u64),
    /// Scroll by whole lines (positive = down)
    ByLines(i64),
    /// Mouse wheel notches (positive = down), scaled by the configured step
    Wheel(i32),
    /// Horizontal wheel notches (positive = right), one character each
    HorizontalWheel(i32),
    /// Horizontal scroll position in pixels
    ToX(i32),
}

/// Pointer events in client-area pixels
#[derive(Debug, Clone)]
pub enum MouseMsg {
    LeftDown { x: i32, y: i32, shift: bool },
    RightDown { x: i32, y: i32 },
    Motion { x: i32, y: i32 },
    LeftUp,
}

#[derive(Debug, Clone)]
pub enum DisplayMsg {
    SetOptions(DisplayOptions),
    SetBytesPerLine(BytesPerLine),
    SetBytesPerGroup(u32),
    SetShowOffsets(bool),
    SetOffsetBase(OffsetBase),
    SetShowAscii(bool),
    SetHighlightSelectionMatch(bool),
    SetFontMetrics(FontMetrics),
}

#[derive(Debug, Clone)]
pub enum ClipboardMsg {
    Copy,
    /// Copy, then erase the selection (insert mode only)
    Cut,
    /// Paste the payload the host fetched from its clipboard
    Paste(ClipboardPayload),
}

/// Top-level message type
#[derive(Debug, Clone)]
pub enum Msg {
    Cursor(CursorMsg),
    Selection(SelectionMsg),
    Scroll(ScrollMsg),
    Mouse(MouseMsg),
    Display(DisplayMsg),
    Clipboard(ClipboardMsg),
    Key(KeyInput),
    /// Client area resized (pixels)
    Resize { width: i32, height: i32 },
    /// Swap in a freshly built region list
    ReplaceRegions(Vec<Region>),
    /// Timer tick driving cursor blink and drag-select sampling
    Tick,
}

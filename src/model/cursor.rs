//! Cursor, selection and timer-driven pointer state

use std::time::{Duration, Instant};

use serde::Serialize;

use super::geometry::ScreenArea;

/// How the cursor position was last set, which also decides which
/// sub-area has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum CursorState {
    /// Hex area focused, at the start of a byte
    #[default]
    Hex,
    /// Hex area focused, first nibble of the byte already typed
    HexMid,
    /// ASCII area focused
    Ascii,
    /// Region-specific area focused
    Special,
    /// Explicit navigation: keep whichever area had focus
    Goto,
}

impl CursorState {
    /// The sub-area this state puts focus on. `Goto` has no area of its own.
    pub fn area(self) -> ScreenArea {
        match self {
            CursorState::Hex | CursorState::HexMid => ScreenArea::Hex,
            CursorState::Ascii => ScreenArea::Ascii,
            CursorState::Special => ScreenArea::Special,
            CursorState::Goto => ScreenArea::None,
        }
    }

    pub fn from_area(area: ScreenArea) -> Self {
        match area {
            ScreenArea::Ascii => CursorState::Ascii,
            ScreenArea::Special => CursorState::Special,
            ScreenArea::Hex | ScreenArea::None => CursorState::Hex,
        }
    }

    /// Resolve `Goto` against the state currently in effect
    pub fn resolve(self, current: CursorState) -> CursorState {
        match self {
            CursorState::Goto => match current {
                CursorState::Ascii => CursorState::Ascii,
                CursorState::Special => CursorState::Special,
                _ => CursorState::Hex,
            },
            other => other,
        }
    }
}

/// Byte cursor with a remembered column for vertical movement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub offset: u64,
    pub state: CursorState,
    /// Column to aim for when moving up/down, so crossing a short line or a
    /// region with a different layout does not lose the visual column
    pub desired_column: Option<u32>,
}

impl Cursor {
    pub const fn new(offset: u64) -> Self {
        Self {
            offset,
            state: CursorState::Hex,
            desired_column: None,
        }
    }

    /// Clear desired column (call after horizontal movement)
    pub fn clear_desired_column(&mut self) {
        self.desired_column = None;
    }

    /// Remember `column` unless a vertical move already remembered one
    pub fn set_desired_column(&mut self, column: u32) {
        if self.desired_column.is_none() {
            self.desired_column = Some(column);
        }
    }

    /// Get the effective column for positioning (uses desired_column if set)
    pub fn effective_column(&self, current: u32) -> u32 {
        self.desired_column.unwrap_or(current)
    }
}

/// Half-open selected byte range. A zero length means nothing is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub offset: u64,
    pub length: u64,
}

impl Selection {
    /// Zero-length selections collapse to the empty selection
    pub fn new(offset: u64, length: u64) -> Self {
        if length == 0 {
            Self::default()
        } else {
            Self { offset, length }
        }
    }

    /// Selection covering `[min(a, b), max(a, b))`
    pub fn between(a: u64, b: u64) -> Self {
        Self::new(a.min(b), a.abs_diff(b))
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.offset && offset < self.end()
    }

    pub fn as_pair(&self) -> (u64, u64) {
        (self.offset, self.length)
    }
}

/// Cursor blink animation state
#[derive(Debug, Clone)]
pub struct CursorBlink {
    /// Whether the cursor is currently visible
    pub visible: bool,
    /// Timestamp of last blink state change
    pub last_change: Instant,
}

impl CursorBlink {
    pub fn new() -> Self {
        Self {
            visible: true,
            last_change: Instant::now(),
        }
    }

    /// Reset cursor blink timer (call after user input)
    pub fn reset(&mut self) {
        self.visible = true;
        self.last_change = Instant::now();
    }

    /// Update cursor blink state based on elapsed time.
    /// Returns true if the state changed (needs redraw)
    pub fn update(&mut self, interval: Duration) -> bool {
        if self.last_change.elapsed() >= interval {
            self.visible = !self.visible;
            self.last_change = Instant::now();
            true
        } else {
            false
        }
    }
}

impl Default for CursorBlink {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse drag-selection in progress.
///
/// The pointer is sampled on a timer rather than only on motion so that the
/// selection keeps growing (and the view keeps scrolling) while the button is
/// held with the pointer outside the client area.
#[derive(Debug, Clone)]
pub struct DragSelect {
    /// Offset under the pointer when the button went down
    pub down_offset: u64,
    /// Area the drag started in; hit-tests prefer it
    pub down_area: ScreenArea,
    /// Latest pointer position in surface pixels (may be outside the client area)
    pub pointer: (i32, i32),
    /// Set once the pointer leaves the button-down position; a plain click
    /// selects nothing
    pub moved: bool,
    pub last_tick: Instant,
}

impl DragSelect {
    pub fn new(down_offset: u64, down_area: ScreenArea, pointer: (i32, i32)) -> Self {
        Self {
            down_offset,
            down_area,
            pointer,
            moved: false,
            last_tick: Instant::now(),
        }
    }

    /// Record a pointer sample
    pub fn track(&mut self, pointer: (i32, i32)) {
        if pointer != self.pointer {
            self.moved = true;
            self.pointer = pointer;
        }
    }

    /// True once per `interval`
    pub fn tick_due(&mut self, interval: Duration) -> bool {
        if self.last_tick.elapsed() >= interval {
            self.last_tick = Instant::now();
            true
        } else {
            false
        }
    }
}

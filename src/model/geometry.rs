//! Coordinate types shared by regions, the document view and drawing surfaces
//!
//! Three coordinate spaces meet here:
//! - byte offsets into the underlying file (`u64`)
//! - document coordinates: pixel x (relative to the left edge of the virtual
//!   document) and virtual line y (relative to the first line of the document)
//! - surface pixels, which are document coordinates shifted by the current
//!   scroll position

use serde::Serialize;

/// An on-screen rectangle in document coordinates.
///
/// `x`/`w` are in pixels, `y`/`h` are in virtual lines. Bounds are computed
/// independently of the current scroll position, so a rectangle may lie
/// entirely outside the visible part of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i64,
    pub w: i32,
    pub h: i64,
}

impl Rect {
    pub const fn new(x: i32, y: i64, w: i32, h: i64) -> Self {
        Self { x, y, w, h }
    }

    /// Top-left corner as `(x_px, y_line)`
    pub const fn top_left(&self) -> (i32, i64) {
        (self.x, self.y)
    }

    pub fn contains(&self, x: i32, y: i64) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Rectangle on a drawing surface, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// Region-specific zone distinguishing otherwise-ambiguous hit-test results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ScreenArea {
    /// No/unknown area
    #[default]
    None,
    /// The hex (data) view
    Hex,
    /// The ASCII (text) view
    Ascii,
    /// Region-specific data area
    Special,
}

/// Result of a single-step cursor movement inside a byte-mapped region.
///
/// `CrossPrev`/`CrossNext` tell the view to resume the move in the adjacent
/// byte-mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Moved(u64),
    CrossPrev,
    CrossNext,
}

impl CursorMove {
    /// The new offset, if the move stayed inside the region
    pub fn offset(self) -> Option<u64> {
        match self {
            CursorMove::Moved(offset) => Some(offset),
            CursorMove::CrossPrev | CursorMove::CrossNext => None,
        }
    }
}

/// Pointer-shape hint returned by hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerShape {
    #[default]
    Arrow,
    /// Over selectable byte data
    IBeam,
    /// Over something that activates on click
    Hand,
}

//! Drawing surface contract
//!
//! Regions paint through [`Surface`]; the host supplies an implementation
//! backed by its toolkit. [`TextSurface`] renders into a character grid and
//! is what the command-line viewer and the tests draw into.

use serde::{Deserialize, Serialize};

use unicode_width::UnicodeWidthStr;

use crate::model::geometry::PixelRect;
use crate::util::text::char_columns;

/// Filler for the second cell of a wide character
const WIDE_TAIL: char = '\0';

/// Colour slots; the host maps them to real colours through its theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteColour {
    Background,
    Normal,
    /// Every other byte group, to make groups easier to tell apart
    AltNormal,
    Offset,
    SelectedFg,
    SelectedBg,
    /// Other occurrences of the selected bytes
    SecondarySelectedBg,
    CursorFg,
    CursorBg,
    /// Bytes with unsaved edits
    Dirty,
    CommentFg,
    CommentBg,
    Border,
    /// Annotation-defined colour slot
    Highlight(u8),
}

pub trait Surface {
    /// Width in pixels of `text` in the data font
    fn text_width(&self, text: &str) -> i32;

    /// Height of one line of the data font in pixels
    fn line_height(&self) -> i32;

    /// Drawable area in pixels
    fn client_size(&self) -> (i32, i32);

    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        fg: PaletteColour,
        bg: Option<PaletteColour>,
    );

    fn fill_rect(&mut self, rect: PixelRect, colour: PaletteColour);

    /// Axis-aligned line from `(x1, y1)` to `(x2, y2)`
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: PaletteColour);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: PaletteColour,
    bg: PaletteColour,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: PaletteColour::Normal,
            bg: PaletteColour::Background,
        }
    }
}

/// Character-grid surface.
///
/// Each cell is `cell_width` x `cell_height` pixels; anything drawn outside
/// the grid is clipped.
#[derive(Debug, Clone)]
pub struct TextSurface {
    columns: usize,
    rows: usize,
    cell_width: i32,
    cell_height: i32,
    cells: Vec<Cell>,
}

impl TextSurface {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self::with_cell_size(columns, rows, 1, 1)
    }

    pub fn with_cell_size(columns: usize, rows: usize, cell_width: i32, cell_height: i32) -> Self {
        Self {
            columns,
            rows,
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
            cells: vec![Cell::default(); columns * rows],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn cell_at(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let col = (x / self.cell_width) as usize;
        let row = (y / self.cell_height) as usize;
        (col < self.columns && row < self.rows).then(|| row * self.columns + col)
    }

    /// Character at grid position `(col, row)`
    pub fn char_at(&self, col: usize, row: usize) -> Option<char> {
        (col < self.columns && row < self.rows).then(|| self.cells[row * self.columns + col].ch)
    }

    /// Background colour at grid position `(col, row)`
    pub fn bg_at(&self, col: usize, row: usize) -> Option<PaletteColour> {
        (col < self.columns && row < self.rows).then(|| self.cells[row * self.columns + col].bg)
    }

    /// Foreground colour at grid position `(col, row)`
    pub fn fg_at(&self, col: usize, row: usize) -> Option<PaletteColour> {
        (col < self.columns && row < self.rows).then(|| self.cells[row * self.columns + col].fg)
    }

    /// One grid row as text, trailing spaces removed
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = row * self.columns;
        let line: String = self.cells[start..start + self.columns]
            .iter()
            .map(|c| c.ch)
            .filter(|&ch| ch != WIDE_TAIL)
            .collect();
        line.trim_end().to_string()
    }

    /// Whole grid as text, one line per row
    pub fn render(&self) -> String {
        (0..self.rows)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn put(&mut self, x: i32, y: i32, ch: char, fg: PaletteColour, bg: Option<PaletteColour>) {
        if let Some(idx) = self.cell_at(x, y) {
            let cell = &mut self.cells[idx];
            cell.ch = ch;
            cell.fg = fg;
            if let Some(bg) = bg {
                cell.bg = bg;
            }
        }
    }
}

impl Surface for TextSurface {
    fn text_width(&self, text: &str) -> i32 {
        text.width() as i32 * self.cell_width
    }

    fn line_height(&self) -> i32 {
        self.cell_height
    }

    fn client_size(&self) -> (i32, i32) {
        (
            self.columns as i32 * self.cell_width,
            self.rows as i32 * self.cell_height,
        )
    }

    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        fg: PaletteColour,
        bg: Option<PaletteColour>,
    ) {
        let mut cx = x;
        for ch in text.chars() {
            let cols = char_columns(ch) as i32;
            if cols == 0 {
                continue;
            }
            self.put(cx, y, ch, fg, bg);
            for tail in 1..cols {
                self.put(cx + tail * self.cell_width, y, WIDE_TAIL, fg, bg);
            }
            cx += cols * self.cell_width;
        }
    }

    fn fill_rect(&mut self, rect: PixelRect, colour: PaletteColour) {
        let mut y = rect.y;
        while y < rect.y + rect.h {
            let mut x = rect.x;
            while x < rect.x + rect.w {
                if let Some(idx) = self.cell_at(x, y) {
                    self.cells[idx].bg = colour;
                }
                x += self.cell_width;
            }
            y += self.cell_height;
        }
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: PaletteColour) {
        if x1 == x2 {
            let (top, bottom) = (y1.min(y2), y1.max(y2));
            let mut y = top;
            while y < bottom {
                self.put(x1, y, '|', colour, None);
                y += self.cell_height;
            }
        } else {
            let (left, right) = (x1.min(x2), x1.max(x2));
            let mut x = left;
            while x < right {
                self.put(x, y1, '-', colour, None);
                x += self.cell_width;
            }
        }
    }
}

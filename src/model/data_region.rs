//! Hex/ASCII dump of a contiguous byte range
//!
//! A line shows `bytes_per_line_actual` bytes: an optional offset column,
//! the hex digits in groups separated by one space, and an ASCII column
//! pinned to the right edge of the virtual width. The first line of a region
//! is padded so every line starts on a multiple of the line width, which
//! keeps consecutive regions aligned on the same grid.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::surface::{PaletteColour, Surface};

use super::geometry::{CursorMove, PixelRect, PointerShape, Rect, ScreenArea};
use super::options::{BytesPerLine, BYTES_PER_LINE_MAX, BYTES_PER_LINE_MIN};
use super::region::{draw_container, ByteRegion, DrawContext, RegionBase, RegionContext, RegionOps};

/// Colour override for a single byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub fg: PaletteColour,
    pub bg: PaletteColour,
    /// Strong highlights win over selection-match colouring
    #[serde(default)]
    pub strong: bool,
}

/// Per-byte highlight lookup supplied by whoever knows what the bytes mean
pub trait HighlightSource {
    fn highlight_at(&self, offset: u64) -> Option<Highlight>;
}

#[derive(Clone)]
pub struct DataRegion {
    base: RegionBase,
    d_offset: u64,
    d_length: u64,

    offset_text_x: i32,
    hex_text_x: i32,
    ascii_text_x: i32,

    bytes_per_line_actual: u32,
    first_line_pad_bytes: u32,

    tail_slot: bool,
    highlighter: Option<Rc<dyn HighlightSource>>,
}

impl fmt::Debug for DataRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataRegion")
            .field("base", &self.base)
            .field("d_offset", &self.d_offset)
            .field("d_length", &self.d_length)
            .field("bytes_per_line_actual", &self.bytes_per_line_actual)
            .field("first_line_pad_bytes", &self.first_line_pad_bytes)
            .field("tail_slot", &self.tail_slot)
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}

impl DataRegion {
    pub fn new(d_offset: u64, d_length: u64) -> Self {
        Self {
            base: RegionBase::new(d_offset, 0),
            d_offset,
            d_length,
            offset_text_x: 0,
            hex_text_x: 0,
            ascii_text_x: 0,
            bytes_per_line_actual: 1,
            first_line_pad_bytes: 0,
            tail_slot: false,
            highlighter: None,
        }
    }

    pub fn with_highlighter(mut self, highlighter: Rc<dyn HighlightSource>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    pub fn bytes_per_line_actual(&self) -> u32 {
        self.bytes_per_line_actual
    }

    pub fn first_line_pad_bytes(&self) -> u32 {
        self.first_line_pad_bytes
    }

    pub fn offset_text_x(&self) -> i32 {
        self.offset_text_x
    }

    pub fn hex_text_x(&self) -> i32 {
        self.hex_text_x
    }

    pub fn ascii_text_x(&self) -> i32 {
        self.ascii_text_x
    }

    pub fn highlight_at_off(&self, offset: u64) -> Option<Highlight> {
        self.highlighter.as_ref()?.highlight_at(offset)
    }

    /// Number of hex lines, excluding indentation closing lines
    pub fn rows(&self) -> u64 {
        let bpl = self.bytes_per_line_actual as u64;
        (self.first_line_pad_bytes as u64 + self.d_length)
            .div_ceil(bpl)
            .max(1)
    }

    /// Pixel width of a line showing `bytes` bytes at this region's depth
    pub fn calc_width_for_bytes(&self, ctx: &RegionContext, bytes: u32) -> i32 {
        let metrics = ctx.metrics;
        let bytes = bytes.max(1) as usize;
        let group = ctx.options.group_size() as usize;

        let mut width = 2 * ctx.indent_width(self.base.indent_depth);
        if ctx.options.show_offsets {
            width += ctx.offset_column_width();
        }
        width += metrics.string_width(bytes * 2 + (bytes - 1) / group);
        if ctx.options.show_ascii {
            width += metrics.char_width() + metrics.string_width(bytes);
        }
        width
    }

    fn resolve_bytes_per_line(&self, ctx: &RegionContext) -> u32 {
        let fits = |n: u32| self.calc_width_for_bytes(ctx, n) <= ctx.client_width;

        // Width grows with the byte count, so the fitting counts form a prefix
        let most_bytes = || {
            let (mut lo, mut hi) = (BYTES_PER_LINE_MIN, BYTES_PER_LINE_MAX);
            if !fits(lo) {
                return BYTES_PER_LINE_MIN;
            }
            while lo < hi {
                let mid = lo + (hi - lo + 1) / 2;
                if fits(mid) {
                    lo = mid;
                } else {
                    hi = mid - 1;
                }
            }
            lo
        };

        match ctx.options.bytes_per_line {
            BytesPerLine::Fixed(n) => n.clamp(BYTES_PER_LINE_MIN, BYTES_PER_LINE_MAX),
            BytesPerLine::FitBytes => most_bytes(),
            BytesPerLine::FitGroups => {
                let group = ctx.options.group_size().min(BYTES_PER_LINE_MAX);
                let max_groups = BYTES_PER_LINE_MAX / group;
                // Narrower than one group: show what fits of it
                (1..=max_groups)
                    .rev()
                    .map(|groups| groups * group)
                    .find(|&n| fits(n))
                    .unwrap_or_else(most_bytes)
            }
        }
    }

    /// File offset the first screen column of line 0 would hold
    fn line_base(&self) -> u64 {
        self.d_offset - self.first_line_pad_bytes as u64
    }

    /// Last valid cursor position in this region
    fn cursor_limit(&self) -> u64 {
        if self.tail_slot || self.d_length == 0 {
            self.d_end()
        } else {
            self.d_end() - 1
        }
    }

    /// Screen row and column of `pos`. The EOF slot after a full last line
    /// sits one column past the end of that line.
    fn cell(&self, pos: u64) -> (u64, u32) {
        let bpl = self.bytes_per_line_actual as u64;
        let rel = pos.clamp(self.d_offset, self.d_end()) - self.line_base();
        let (row, col) = (rel / bpl, (rel % bpl) as u32);
        let rows = self.rows();
        if row >= rows {
            (rows - 1, self.bytes_per_line_actual)
        } else {
            (row, col)
        }
    }

    /// Inclusive range of cursor positions on `row`
    fn row_bounds(&self, row: u64) -> (u64, u64) {
        let bpl = self.bytes_per_line_actual as u64;
        let start = self.line_base() + row * bpl;
        let first = start.max(self.d_offset);
        let last = (start + bpl - 1).min(self.cursor_limit()).max(first);
        (first, last)
    }

    fn hex_column_x(&self, ctx: &RegionContext, col: u32) -> i32 {
        let group = ctx.options.group_size();
        self.hex_text_x + ctx.metrics.string_width((col * 2 + col / group) as usize)
    }

    fn ascii_column_x(&self, ctx: &RegionContext, col: u32) -> i32 {
        self.ascii_text_x + ctx.metrics.string_width(col as usize)
    }

    /// Right edge of the hex digits of a full line
    fn hex_text_end(&self, ctx: &RegionContext) -> i32 {
        let bpl = self.bytes_per_line_actual as usize;
        let group = ctx.options.group_size() as usize;
        self.hex_text_x + ctx.metrics.string_width(bpl * 2 + (bpl - 1) / group)
    }

    /// Byte column under `x` in the hex area, and whether `x` is on a group
    /// gap. A gap reports the byte on its left.
    fn hex_char_column(&self, ctx: &RegionContext, x: i32) -> (u32, bool) {
        let group_chars = ctx.options.group_size() as usize * 2 + 1;
        let mut char_offset = ctx.metrics.char_at_x(x - self.hex_text_x);
        let gap = (char_offset + 1) % group_chars == 0;
        if gap {
            char_offset -= 1;
        }
        let col = (char_offset - char_offset / group_chars) / 2;
        (col.min(u32::MAX as usize) as u32, gap)
    }

    /// Which sub-area a click at `x` belongs to when the caller has no usable hint.
    ///
    /// Between the end of the hex digits and the ASCII column the nearer one
    /// wins; an exact tie goes to hex.
    fn nearest_area(&self, ctx: &RegionContext, x: i32) -> ScreenArea {
        if !ctx.options.show_ascii {
            return ScreenArea::Hex;
        }
        if x >= self.ascii_text_x {
            return ScreenArea::Ascii;
        }
        let hex_end = self.hex_text_end(ctx);
        if x <= hex_end {
            return ScreenArea::Hex;
        }
        if self.ascii_text_x - x < x - hex_end {
            ScreenArea::Ascii
        } else {
            ScreenArea::Hex
        }
    }

    fn byte_colours(
        &self,
        ctx: &DrawContext,
        offset: u64,
        col: u32,
        matched: bool,
    ) -> (PaletteColour, Option<PaletteColour>) {
        if ctx.selection.contains(offset) {
            return (PaletteColour::SelectedFg, Some(PaletteColour::SelectedBg));
        }

        let highlight = self.highlight_at_off(offset);
        if let Some(hl) = highlight.filter(|hl| hl.strong) {
            return (hl.fg, Some(hl.bg));
        }
        if matched {
            return (PaletteColour::Normal, Some(PaletteColour::SecondarySelectedBg));
        }
        if let Some(hl) = highlight {
            return (hl.fg, Some(hl.bg));
        }
        if ctx.source.is_modified(offset) {
            return (PaletteColour::Dirty, None);
        }

        let group = ctx.layout.options.group_size();
        if (col / group) % 2 == 1 {
            (PaletteColour::AltNormal, None)
        } else {
            (PaletteColour::Normal, None)
        }
    }
}

/// Offsets within `window` (which starts at `window_start`) covered by an
/// occurrence of `needle` other than the selection itself
fn selection_matches(window: &[u8], window_start: u64, needle: &[u8], skip: u64) -> Vec<bool> {
    let mut marks = vec![false; window.len()];
    if needle.is_empty() || window.len() < needle.len() {
        return marks;
    }
    for (i, candidate) in window.windows(needle.len()).enumerate() {
        if candidate == needle && window_start + i as u64 != skip {
            marks[i..i + needle.len()].fill(true);
        }
    }
    marks
}

fn ascii_char(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        '.'
    }
}

impl RegionOps for DataRegion {
    fn base(&self) -> &RegionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RegionBase {
        &mut self.base
    }

    fn calc_width(&mut self, ctx: &RegionContext) -> i32 {
        self.bytes_per_line_actual = self.resolve_bytes_per_line(ctx);
        self.calc_width_for_bytes(ctx, self.bytes_per_line_actual)
    }

    fn calc_height(&mut self, ctx: &RegionContext) {
        let indent = ctx.indent_width(self.base.indent_depth);
        let bpl = self.bytes_per_line_actual.max(1);
        self.bytes_per_line_actual = bpl;

        self.offset_text_x = indent;
        self.hex_text_x = if ctx.options.show_offsets {
            indent + ctx.offset_column_width()
        } else {
            indent
        };
        self.ascii_text_x = ctx.virtual_width - indent - ctx.metrics.string_width(bpl as usize);

        self.first_line_pad_bytes = (self.d_offset % bpl as u64) as u32;
        self.base.y_lines = self.rows() + self.base.indent_final as u64;
    }

    fn draw(&self, ctx: &DrawContext, surface: &mut dyn Surface, x: i32, y: i64) {
        draw_container(&self.base, ctx, surface, x, y);

        let layout = &ctx.layout;
        let lh = layout.metrics.line_height() as i64;
        let client_height = ctx.client_height as i64;
        let rows = self.rows();

        let first_row = if y < 0 { ((-y) / lh) as u64 } else { 0 };
        if first_row >= rows || y >= client_height {
            return;
        }
        let visible_rows = ((client_height - y - first_row as i64 * lh + lh - 1) / lh).max(0) as u64;
        let end_row = (first_row + visible_rows).min(rows);
        if end_row <= first_row {
            return;
        }
        let last_row = end_row - 1;

        let vis_start = self.row_bounds(first_row).0;
        let bpl = self.bytes_per_line_actual as u64;
        let vis_end = (self.line_base() + (last_row + 1) * bpl).min(self.d_end());

        // Selection matches may straddle the visible window
        let needle = ctx.selection_match.filter(|n| !n.is_empty());
        let slack = needle.map_or(0, |n| n.len() as u64 - 1);
        let read_start = vis_start.saturating_sub(slack).max(self.d_offset);
        let read_end = (vis_end + slack).min(self.d_end());

        let window = match ctx
            .source
            .read(read_start, (read_end - read_start) as usize)
        {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!("Failed to read {} bytes at {}: {:#}", read_end - read_start, read_start, e);
                None
            }
        };
        let matches = match (&window, needle) {
            (Some(window), Some(needle)) => {
                selection_matches(window, read_start, needle, ctx.selection.offset)
            }
            _ => Vec::new(),
        };

        let focus = match ctx.cursor_area {
            ScreenArea::Ascii if layout.options.show_ascii => ScreenArea::Ascii,
            _ => ScreenArea::Hex,
        };

        for row in first_row..=last_row {
            let line_y = (y + row as i64 * lh) as i32;
            let (row_first, _) = self.row_bounds(row);
            let row_end = (self.line_base() + (row + 1) * bpl).min(self.d_end());

            if layout.options.show_offsets {
                let text = layout.options.offset_base.format(row_first);
                surface.draw_text(x + self.offset_text_x, line_y, &text, PaletteColour::Offset, None);
            }

            for offset in row_first..row_end {
                let col = ((offset - self.line_base()) % bpl) as u32;
                let idx = (offset - read_start) as usize;
                let byte = window.as_ref().and_then(|w| w.get(idx).copied());
                let matched = matches.get(idx).copied().unwrap_or(false);

                let (mut fg, mut bg) = self.byte_colours(ctx, offset, col, matched);
                let hex_text = byte.map_or_else(|| "??".to_string(), |b| format!("{:02X}", b));
                let ascii_text = byte.map_or('?', ascii_char).to_string();

                let is_cursor = ctx.cursor_visible && offset == ctx.cursor;
                let (hex_fg, hex_bg) = if is_cursor && focus == ScreenArea::Hex {
                    (PaletteColour::CursorFg, Some(PaletteColour::CursorBg))
                } else {
                    (fg, bg)
                };
                surface.draw_text(
                    x + self.hex_column_x(layout, col),
                    line_y,
                    &hex_text,
                    hex_fg,
                    hex_bg,
                );

                if layout.options.show_ascii {
                    if is_cursor && focus == ScreenArea::Ascii {
                        fg = PaletteColour::CursorFg;
                        bg = Some(PaletteColour::CursorBg);
                    }
                    surface.draw_text(x + self.ascii_column_x(layout, col), line_y, &ascii_text, fg, bg);
                }
            }
        }

        // End-of-file slot
        if self.tail_slot && ctx.cursor_visible && ctx.cursor == self.d_end() {
            let (row, col) = self.cell(self.d_end());
            if (first_row..=last_row).contains(&row) {
                let line_y = (y + row as i64 * lh) as i32;
                let (cell_x, cell_w) = if focus == ScreenArea::Ascii {
                    (self.ascii_column_x(layout, col), layout.metrics.char_width())
                } else {
                    (self.hex_column_x(layout, col), layout.metrics.string_width(2))
                };
                surface.fill_rect(
                    PixelRect::new(x + cell_x, line_y, cell_w, lh as i32),
                    PaletteColour::CursorBg,
                );
            }
        }
    }

    fn cursor_for_point(
        &self,
        ctx: &RegionContext,
        x: i32,
        y_lines: i64,
        _y_px: i32,
    ) -> PointerShape {
        if self.offset_at_xy(ctx, x, y_lines).is_some() {
            PointerShape::IBeam
        } else {
            PointerShape::Arrow
        }
    }
}

impl ByteRegion for DataRegion {
    fn d_offset(&self) -> u64 {
        self.d_offset
    }

    fn d_length(&self) -> u64 {
        self.d_length
    }

    fn tail_slot(&self) -> bool {
        self.tail_slot
    }

    fn set_tail_slot(&mut self, tail: bool) {
        self.tail_slot = tail;
    }

    fn offset_at_xy(
        &self,
        ctx: &RegionContext,
        x: i32,
        y_lines: i64,
    ) -> Option<(u64, ScreenArea)> {
        if y_lines < 0 || y_lines as u64 >= self.rows() {
            return None;
        }
        let row = y_lines as u64;

        let (col, area) = if ctx.options.show_ascii && x >= self.ascii_text_x {
            (ctx.metrics.char_at_x(x - self.ascii_text_x) as u32, ScreenArea::Ascii)
        } else if x >= self.hex_text_x {
            let (col, gap) = self.hex_char_column(ctx, x);
            if gap {
                return None;
            }
            (col, ScreenArea::Hex)
        } else {
            return None;
        };

        if col >= self.bytes_per_line_actual {
            return None;
        }

        let offset = self.line_base() + row * self.bytes_per_line_actual as u64 + col as u64;
        self.contains_offset(offset).then_some((offset, area))
    }

    fn offset_near_xy(
        &self,
        ctx: &RegionContext,
        x: i32,
        y_lines: i64,
        area_hint: ScreenArea,
    ) -> Option<(u64, ScreenArea)> {
        if self.is_vacant() {
            return None;
        }

        let row = y_lines.clamp(0, self.rows() as i64 - 1) as u64;
        let area = match area_hint {
            ScreenArea::Hex => ScreenArea::Hex,
            ScreenArea::Ascii if ctx.options.show_ascii => ScreenArea::Ascii,
            _ => self.nearest_area(ctx, x),
        };

        let col = match area {
            ScreenArea::Ascii => ctx.metrics.char_at_x(x - self.ascii_text_x) as u32,
            _ => self.hex_char_column(ctx, x).0,
        };
        let col = col.min(self.bytes_per_line_actual - 1);

        Some((self.nth_row_nearest_column(row, col), area))
    }

    fn cursor_left_from(&self, pos: u64) -> CursorMove {
        if pos <= self.d_offset {
            CursorMove::CrossPrev
        } else {
            CursorMove::Moved(pos - 1)
        }
    }

    fn cursor_right_from(&self, pos: u64) -> CursorMove {
        if pos >= self.cursor_limit() {
            CursorMove::CrossNext
        } else {
            CursorMove::Moved(pos + 1)
        }
    }

    fn cursor_up_from(&self, pos: u64) -> CursorMove {
        let (row, col) = self.cell(pos);
        if row == 0 {
            CursorMove::CrossPrev
        } else {
            CursorMove::Moved(self.nth_row_nearest_column(row - 1, col))
        }
    }

    fn cursor_down_from(&self, pos: u64) -> CursorMove {
        let (row, col) = self.cell(pos);
        if row + 1 >= self.rows() {
            CursorMove::CrossNext
        } else {
            CursorMove::Moved(self.nth_row_nearest_column(row + 1, col))
        }
    }

    fn cursor_home_from(&self, pos: u64) -> u64 {
        self.row_bounds(self.cell(pos).0).0
    }

    fn cursor_end_from(&self, pos: u64) -> u64 {
        let (row, _) = self.cell(pos);
        let bpl = self.bytes_per_line_actual as u64;
        let row_last = self.line_base() + (row + 1) * bpl - 1;
        let last_byte = self.d_end().saturating_sub(1).max(self.d_offset);
        row_last.min(last_byte).max(self.row_bounds(row).0)
    }

    fn cursor_column(&self, pos: u64) -> u32 {
        self.cell(pos).1
    }

    fn first_row_nearest_column(&self, column: u32) -> u64 {
        self.nth_row_nearest_column(0, column)
    }

    fn last_row_nearest_column(&self, column: u32) -> u64 {
        self.nth_row_nearest_column(self.rows() - 1, column)
    }

    fn nth_row_nearest_column(&self, row: u64, column: u32) -> u64 {
        let row = row.min(self.rows() - 1);
        let bpl = self.bytes_per_line_actual;
        let target = self.line_base()
            + row * bpl as u64
            + column.min(bpl - 1) as u64;

        let (first, last) = self.row_bounds(row);
        target.clamp(first, last)
    }

    fn calc_offset_bounds(&self, ctx: &RegionContext, offset: u64, area: ScreenArea) -> Rect {
        let (row, col) = self.cell(offset);
        let y = (self.base.y_offset + row) as i64;

        if area == ScreenArea::Ascii && ctx.options.show_ascii {
            Rect::new(self.ascii_column_x(ctx, col), y, ctx.metrics.char_width(), 1)
        } else {
            Rect::new(self.hex_column_x(ctx, col), y, ctx.metrics.string_width(2), 1)
        }
    }
}

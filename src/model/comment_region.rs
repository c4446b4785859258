//! Annotation block shown above the bytes it describes

use std::rc::Rc;

use crate::surface::{PaletteColour, Surface};
use crate::util::text::{format_text, take_columns};

use super::geometry::{PixelRect, PointerShape};
use super::region::{draw_container, DrawContext, RegionBase, RegionContext, RegionOps};

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct CommentRegion {
    base: RegionBase,
    c_offset: u64,
    c_length: u64,
    c_text: Rc<str>,
    truncate: bool,
    /// Characters per text line, from the last layout pass
    row_chars: usize,
}

impl CommentRegion {
    /// `nest_children` makes the comment open an indentation bracket over
    /// the bytes it covers.
    pub fn new(c_offset: u64, c_length: u64, text: Rc<str>, nest_children: bool, truncate: bool) -> Self {
        let indent_length = if nest_children { c_length } else { 0 };
        Self {
            base: RegionBase::new(c_offset, indent_length),
            c_offset,
            c_length,
            c_text: text,
            truncate,
            row_chars: 1,
        }
    }

    pub fn c_offset(&self) -> u64 {
        self.c_offset
    }

    pub fn c_length(&self) -> u64 {
        self.c_length
    }

    pub fn text(&self) -> &Rc<str> {
        &self.c_text
    }

    pub fn truncate(&self) -> bool {
        self.truncate
    }

    /// Lines taken by the bordered box, excluding indentation closing lines
    fn box_lines(&self) -> u64 {
        self.base.y_lines() - self.base.indent_final() as u64
    }

    fn text_lines(&self) -> Vec<String> {
        if !self.truncate {
            return format_text(&self.c_text, self.row_chars, 0, usize::MAX);
        }

        let mut lines = format_text(&self.c_text, self.row_chars, 0, 2);
        if lines.len() > 1 {
            lines.truncate(1);
            let keep = self.row_chars.saturating_sub(ELLIPSIS.len());
            let mut first = take_columns(&lines[0], keep).0.to_string();
            first.push_str(ELLIPSIS);
            lines[0] = first;
        }
        lines
    }

    /// Whether document x `x` and region line `y_lines` fall inside the box
    pub fn hit_box(&self, ctx: &RegionContext, x: i32, y_lines: i64) -> bool {
        let indent = ctx.indent_width(self.base.indent_depth());
        y_lines >= 0
            && (y_lines as u64) < self.box_lines()
            && x >= indent
            && x < ctx.virtual_width - indent
    }
}

impl RegionOps for CommentRegion {
    fn base(&self) -> &RegionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RegionBase {
        &mut self.base
    }

    fn calc_height(&mut self, ctx: &RegionContext) {
        let indent = ctx.indent_width(self.base.indent_depth());
        let box_width = ctx.virtual_width - 2 * indent;
        // One character of border on each side
        self.row_chars = ctx.metrics.char_at_x(box_width).saturating_sub(2).max(1);

        let text_lines = if self.truncate {
            1
        } else {
            format_text(&self.c_text, self.row_chars, 0, usize::MAX).len() as u64
        };
        self.base.y_lines = text_lines + 2 + self.base.indent_final() as u64;
    }

    fn draw(&self, ctx: &DrawContext, surface: &mut dyn Surface, x: i32, y: i64) {
        draw_container(&self.base, ctx, surface, x, y);

        let metrics = ctx.layout.metrics;
        let lh = metrics.line_height() as i64;
        let client_height = ctx.client_height as i64;
        let box_lines = self.box_lines() as i64;

        if y >= client_height || y + box_lines * lh <= 0 {
            return;
        }

        let indent = ctx.layout.indent_width(self.base.indent_depth());
        let left = x + indent;
        let box_width = ctx.layout.virtual_width - 2 * indent;
        let right = left + box_width - 1;

        let top = y.max(-lh);
        let bottom = (y + box_lines * lh).min(client_height + lh);
        surface.fill_rect(
            PixelRect::new(left, top as i32, box_width, (bottom - top) as i32),
            PaletteColour::CommentBg,
        );

        let border_top = y + lh / 2;
        let border_bottom = y + (box_lines - 1) * lh + lh / 2;
        for line_y in [border_top, border_bottom] {
            if line_y >= 0 && line_y < client_height {
                surface.draw_line(left, line_y as i32, right + 1, line_y as i32, PaletteColour::Border);
            }
        }
        let side_top = (y + lh).max(0);
        let side_bottom = (y + (box_lines - 1) * lh).min(client_height);
        if side_top < side_bottom {
            for side_x in [left, right] {
                surface.draw_line(side_x, side_top as i32, side_x, side_bottom as i32, PaletteColour::Border);
            }
        }

        let text_x = left + metrics.char_width();
        for (i, line) in self.text_lines().iter().enumerate() {
            let line_y = y + (i as i64 + 1) * lh;
            if line_y >= client_height {
                break;
            }
            if line_y + lh <= 0 {
                continue;
            }
            surface.draw_text(text_x, line_y as i32, line, PaletteColour::CommentFg, None);
        }
    }

    fn cursor_for_point(&self, ctx: &RegionContext, x: i32, y_lines: i64, _y_px: i32) -> PointerShape {
        if self.hit_box(ctx, x, y_lines) {
            PointerShape::Hand
        } else {
            PointerShape::Arrow
        }
    }
}

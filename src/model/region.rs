//! Region model
//!
//! The virtual document is an ordered list of [`Region`]s. Every region
//! knows its indentation and how many virtual lines it occupies; regions that
//! map file bytes onto the screen additionally implement [`ByteRegion`].
//!
//! Regions never hold a reference back to the view. Everything they need
//! (display options, font metrics, widths, cursor, the byte source) arrives
//! as a [`RegionContext`] or [`DrawContext`] argument.

use crate::clipboard::{ClipboardPayload, ClipboardSink};
use crate::commands::Cmd;
use crate::messages::KeyInput;
use crate::storage::ByteSource;
use crate::surface::{PaletteColour, Surface};

use super::comment_region::CommentRegion;
use super::cursor::Selection;
use super::data_region::DataRegion;
use super::geometry::{CursorMove, PointerShape, Rect, ScreenArea};
use super::metrics::FontMetrics;
use super::options::DisplayOptions;

/// Layout state shared by every region kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionBase {
    /// Start of the byte range the indentation bracket covers
    pub indent_offset: u64,
    /// Length of that range; zero when the region opens no bracket
    pub indent_length: u64,
    /// Nesting level, assigned during layout
    pub(crate) indent_depth: u32,
    /// Number of nesting levels this region is the last child of
    pub(crate) indent_final: u32,
    /// First virtual line, assigned during layout
    pub(crate) y_offset: u64,
    /// Height in virtual lines, assigned by `calc_height`
    pub(crate) y_lines: u64,
}

impl RegionBase {
    pub fn new(indent_offset: u64, indent_length: u64) -> Self {
        Self {
            indent_offset,
            indent_length,
            ..Default::default()
        }
    }

    pub fn indent_depth(&self) -> u32 {
        self.indent_depth
    }

    pub fn indent_final(&self) -> u32 {
        self.indent_final
    }

    pub fn y_offset(&self) -> u64 {
        self.y_offset
    }

    pub fn y_lines(&self) -> u64 {
        self.y_lines
    }

    /// One past the last virtual line
    pub fn y_end(&self) -> u64 {
        self.y_offset + self.y_lines
    }
}

/// Display settings a region needs for width and height calculations
#[derive(Debug, Clone, Copy)]
pub struct RegionContext<'a> {
    pub options: &'a DisplayOptions,
    pub metrics: &'a FontMetrics,
    /// Width of the client area in pixels
    pub client_width: i32,
    /// Width of the scrollable document in pixels (at least `client_width`)
    pub virtual_width: i32,
}

impl RegionContext<'_> {
    pub fn indent_width(&self, depth: u32) -> i32 {
        self.metrics.char_width() * depth as i32
    }

    pub fn offset_column_width(&self) -> i32 {
        self.metrics
            .string_width(self.options.offset_base.column_chars())
            + self.metrics.char_width()
    }
}

/// Everything a region needs to paint itself
pub struct DrawContext<'a> {
    pub layout: RegionContext<'a>,
    pub source: &'a dyn ByteSource,
    /// Height of the surface in pixels; regions may skip anything below it
    pub client_height: i32,
    pub cursor: u64,
    pub cursor_area: ScreenArea,
    pub cursor_visible: bool,
    pub insert_mode: bool,
    pub selection: Selection,
    /// Selected bytes, when other occurrences should be highlighted
    pub selection_match: Option<&'a [u8]>,
}

/// Operations every region supports
pub trait RegionOps {
    fn base(&self) -> &RegionBase;

    fn base_mut(&mut self) -> &mut RegionBase;

    /// Pixel width this region needs. Called before `calc_height` in each
    /// layout pass.
    fn calc_width(&mut self, _ctx: &RegionContext) -> i32 {
        0
    }

    /// Set `y_lines`. Must depend only on content, widths and font metrics,
    /// never on the scroll position.
    fn calc_height(&mut self, ctx: &RegionContext);

    /// Paint the region with its top-left corner at surface pixel `(x, y)`.
    /// `y` may be far outside the surface; off-screen lines may be skipped.
    fn draw(&self, ctx: &DrawContext, surface: &mut dyn Surface, x: i32, y: i64);

    /// Pointer shape over document x `x` and region-relative line `y_lines`
    fn cursor_for_point(
        &self,
        _ctx: &RegionContext,
        _x: i32,
        _y_lines: i64,
        _y_px: i32,
    ) -> PointerShape {
        PointerShape::Arrow
    }
}

/// Byte-range contract for regions that display file data.
///
/// Offsets are absolute file offsets. Line arguments are relative to the
/// region's first line; x arguments are document pixels.
pub trait ByteRegion: RegionOps {
    fn d_offset(&self) -> u64;

    fn d_length(&self) -> u64;

    fn d_end(&self) -> u64 {
        self.d_offset() + self.d_length()
    }

    /// Whether this region owns the end-of-file cursor slot
    fn tail_slot(&self) -> bool;

    fn set_tail_slot(&mut self, tail: bool);

    /// Whether `offset` is a cursor position inside this region
    fn contains_offset(&self, offset: u64) -> bool {
        offset >= self.d_offset()
            && (offset < self.d_end() || (self.tail_slot() && offset == self.d_end()))
    }

    /// Whether the region has no cursor positions at all
    fn is_vacant(&self) -> bool {
        self.d_length() == 0 && !self.tail_slot()
    }

    /// Byte exactly under the point, or `None` over padding and gaps
    fn offset_at_xy(&self, ctx: &RegionContext, x: i32, y_lines: i64)
        -> Option<(u64, ScreenArea)>;

    /// Byte nearest the point. A supported `area_hint` wins over geometric
    /// proximity.
    fn offset_near_xy(
        &self,
        ctx: &RegionContext,
        x: i32,
        y_lines: i64,
        area_hint: ScreenArea,
    ) -> Option<(u64, ScreenArea)>;

    fn cursor_left_from(&self, pos: u64) -> CursorMove;

    fn cursor_right_from(&self, pos: u64) -> CursorMove;

    fn cursor_up_from(&self, pos: u64) -> CursorMove;

    fn cursor_down_from(&self, pos: u64) -> CursorMove;

    /// Start of the screen line containing `pos`
    fn cursor_home_from(&self, pos: u64) -> u64;

    /// Last byte of the screen line containing `pos`
    fn cursor_end_from(&self, pos: u64) -> u64;

    /// Screen column of `pos`
    fn cursor_column(&self, pos: u64) -> u32;

    fn first_row_nearest_column(&self, column: u32) -> u64;

    fn last_row_nearest_column(&self, column: u32) -> u64;

    fn nth_row_nearest_column(&self, row: u64, column: u32) -> u64;

    /// Bounding box of the byte at `offset` in `area`, in document coordinates
    fn calc_offset_bounds(&self, ctx: &RegionContext, offset: u64, area: ScreenArea) -> Rect;

    /// Region-specific key handling. `None` declines and must leave the
    /// region untouched, since the view may offer the same key again.
    fn on_char(&mut self, _key: &KeyInput, _ctx: &RegionContext, _cursor: u64) -> Option<Cmd> {
        None
    }

    /// Region-specific copy of a selection lying wholly inside this region
    fn on_copy(
        &self,
        _selection: Selection,
        _source: &dyn ByteSource,
    ) -> Option<ClipboardPayload> {
        None
    }

    /// Region-specific paste at `cursor`
    fn on_paste(&mut self, _clipboard: &mut dyn ClipboardSink, _cursor: u64) -> Option<Cmd> {
        None
    }
}

/// The closed set of region kinds
#[derive(Debug, Clone)]
pub enum Region {
    Data(DataRegion),
    Comment(CommentRegion),
}

impl Region {
    pub fn as_byte_region(&self) -> Option<&dyn ByteRegion> {
        match self {
            Region::Data(region) => Some(region),
            Region::Comment(_) => None,
        }
    }

    pub fn as_byte_region_mut(&mut self) -> Option<&mut dyn ByteRegion> {
        match self {
            Region::Data(region) => Some(region),
            Region::Comment(_) => None,
        }
    }

    pub fn y_offset(&self) -> u64 {
        self.base().y_offset
    }

    pub fn y_lines(&self) -> u64 {
        self.base().y_lines
    }

    pub fn indent_depth(&self) -> u32 {
        self.base().indent_depth
    }

    pub fn indent_final(&self) -> u32 {
        self.base().indent_final
    }
}

impl From<DataRegion> for Region {
    fn from(region: DataRegion) -> Self {
        Region::Data(region)
    }
}

impl From<CommentRegion> for Region {
    fn from(region: CommentRegion) -> Self {
        Region::Comment(region)
    }
}

impl RegionOps for Region {
    fn base(&self) -> &RegionBase {
        match self {
            Region::Data(r) => r.base(),
            Region::Comment(r) => r.base(),
        }
    }

    fn base_mut(&mut self) -> &mut RegionBase {
        match self {
            Region::Data(r) => r.base_mut(),
            Region::Comment(r) => r.base_mut(),
        }
    }

    fn calc_width(&mut self, ctx: &RegionContext) -> i32 {
        match self {
            Region::Data(r) => r.calc_width(ctx),
            Region::Comment(r) => r.calc_width(ctx),
        }
    }

    fn calc_height(&mut self, ctx: &RegionContext) {
        match self {
            Region::Data(r) => r.calc_height(ctx),
            Region::Comment(r) => r.calc_height(ctx),
        }
    }

    fn draw(&self, ctx: &DrawContext, surface: &mut dyn Surface, x: i32, y: i64) {
        match self {
            Region::Data(r) => r.draw(ctx, surface, x, y),
            Region::Comment(r) => r.draw(ctx, surface, x, y),
        }
    }

    fn cursor_for_point(&self, ctx: &RegionContext, x: i32, y_lines: i64, y_px: i32) -> PointerShape {
        match self {
            Region::Data(r) => r.cursor_for_point(ctx, x, y_lines, y_px),
            Region::Comment(r) => r.cursor_for_point(ctx, x, y_lines, y_px),
        }
    }
}

/// Recompute `indent_depth`/`indent_final` for regions in file order.
///
/// A stack holds the end offsets of the indentation ranges that are still
/// open. A region's depth is the stack height when it is reached; it is
/// final for every open range that ends at or before the next region starts.
pub fn assign_indentation(regions: &mut [Region]) {
    let mut open: Vec<u64> = Vec::new();

    for i in 0..regions.len() {
        let next_offset = regions
            .get(i + 1)
            .map(|r| r.base().indent_offset)
            .unwrap_or(u64::MAX);

        let base = regions[i].base_mut();
        while open.last().is_some_and(|&end| end <= base.indent_offset) {
            open.pop();
        }

        base.indent_depth = open.len() as u32;

        let own_end = base.indent_offset.saturating_add(base.indent_length);
        let opens_children = base.indent_length > 0 && own_end > next_offset;

        base.indent_final = if opens_children {
            0
        } else {
            open.iter().rev().take_while(|&&end| end <= next_offset).count() as u32
        };

        if base.indent_length > 0 {
            open.push(own_end);
        }
    }
}

/// Draw the nesting brackets around a region
pub fn draw_container(
    base: &RegionBase,
    ctx: &DrawContext,
    surface: &mut dyn Surface,
    x: i32,
    y: i64,
) {
    if base.indent_depth == 0 {
        return;
    }

    let cw = ctx.layout.metrics.char_width();
    let lh = ctx.layout.metrics.line_height() as i64;
    let client_height = ctx.client_height as i64;

    let skip_lines = if y < 0 { (-y) / lh } else { 0 };
    let box_y = y + skip_lines * lh;
    let mut box_h = (base.y_lines as i64 - skip_lines) * lh;

    for i in 0..base.indent_depth {
        let closing = i + base.indent_final >= base.indent_depth;
        let left = x + cw / 4 + i as i32 * cw;
        let right = x + ctx.layout.virtual_width - 1 - cw / 4 - i as i32 * cw;

        let bottom = if closing {
            box_y + box_h - lh + lh / 2
        } else {
            box_y + box_h
        };

        let top_px = box_y.max(0);
        let bottom_px = bottom.min(client_height);
        if top_px < bottom_px {
            surface.draw_line(left, top_px as i32, left, bottom_px as i32, PaletteColour::Border);
            surface.draw_line(right, top_px as i32, right, bottom_px as i32, PaletteColour::Border);
        }

        if closing {
            if bottom >= 0 && bottom < client_height {
                surface.draw_line(left, bottom as i32, right, bottom as i32, PaletteColour::Border);
            }
            box_h -= lh;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn comment(offset: u64, length: u64) -> Region {
        CommentRegion::new(offset, length, Rc::from("c"), true, false).into()
    }

    fn data(offset: u64, length: u64) -> Region {
        DataRegion::new(offset, length).into()
    }

    fn depths(regions: &[Region]) -> Vec<(u32, u32)> {
        regions
            .iter()
            .map(|r| (r.indent_depth(), r.indent_final()))
            .collect()
    }

    #[test]
    fn test_flat_regions_have_no_indentation() {
        let mut regions = vec![data(0, 16), data(16, 16)];
        assign_indentation(&mut regions);
        assert_eq!(depths(&regions), vec![(0, 0), (0, 0)]);
    }

    #[test]
    fn test_single_nesting_level() {
        // comment [0,20) with children data[0,20), then data[20,40)
        let mut regions = vec![comment(0, 20), data(0, 20), data(20, 20)];
        assign_indentation(&mut regions);
        assert_eq!(depths(&regions), vec![(0, 0), (1, 1), (0, 0)]);
    }

    #[test]
    fn test_nested_ranges_close_together() {
        // [0,100) contains [10,20); only the inner range closes at 20
        let mut regions = vec![
            comment(0, 100),
            data(0, 10),
            comment(10, 10),
            data(10, 10),
            data(20, 80),
            data(100, 10),
        ];
        assign_indentation(&mut regions);
        assert_eq!(
            depths(&regions),
            vec![(0, 0), (1, 0), (1, 0), (2, 1), (1, 1), (0, 0)]
        );
    }

    #[test]
    fn test_ranges_ending_at_same_offset() {
        let mut regions = vec![comment(0, 50), data(0, 10), comment(10, 40), data(10, 40)];
        assign_indentation(&mut regions);
        assert_eq!(depths(&regions), vec![(0, 0), (1, 0), (1, 0), (2, 2)]);
    }

    #[test]
    fn test_last_region_closes_everything() {
        let mut regions = vec![comment(0, 1000), data(0, 8)];
        assign_indentation(&mut regions);
        assert_eq!(depths(&regions), vec![(0, 0), (1, 1)]);
    }
}

//! Document view: region layout, scrolling, cursor and selection
//!
//! The view owns the ordered region list. Every change that can affect
//! geometry marks the layout state and flushes it immediately, so outside
//! callers always observe a stable layout.

use std::rc::Rc;
use std::time::Duration;

use crate::clipboard::{hex_encode, parse_hex, ClipboardPayload, ClipboardSink};
use crate::commands::{Cmd, EditKind, EditRequest};
use crate::messages::{Direction, KeyInput, Motion};
use crate::storage::ByteSource;
use crate::surface::{PaletteColour, Surface};

use super::cursor::{Cursor, CursorBlink, CursorState, DragSelect, Selection};
use super::data_region::DataRegion;
use super::geometry::{CursorMove, PixelRect, PointerShape, Rect, ScreenArea};
use super::metrics::FontMetrics;
use super::options::{BytesPerLine, DisplayOptions, OffsetBase};
use super::region::{assign_indentation, ByteRegion, DrawContext, Region, RegionContext, RegionOps};
use super::scroll::{ScrollGroup, ScrollState, ViewId};

/// Longest selection whose other occurrences are highlighted
pub const SELECTION_MATCH_MAX: u64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    NeedsFullLayout,
    NeedsHeightRecalc,
    Stable,
}

/// Timer intervals and scroll steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTiming {
    pub cursor_blink: Duration,
    pub select_tick: Duration,
    /// Lines scrolled per wheel notch
    pub wheel_lines: u32,
}

impl Default for ViewTiming {
    fn default() -> Self {
        Self {
            cursor_blink: Duration::from_millis(500),
            select_tick: Duration::from_millis(100),
            wheel_lines: 3,
        }
    }
}

/// Selection covering both `a` and `b`, cut off at `len`
fn inclusive_selection(a: u64, b: u64, len: u64) -> Selection {
    let (lo, hi) = (a.min(b), a.max(b));
    Selection::new(lo, (hi + 1).min(len).saturating_sub(lo))
}

/// Move `pos` along its screen line towards `column`
fn with_column(region: &dyn ByteRegion, pos: u64, column: u32) -> u64 {
    if region.cursor_column(pos) == column {
        return pos;
    }
    let home = region.cursor_home_from(pos);
    let home_column = region.cursor_column(home);
    if column <= home_column {
        return home;
    }
    (home + (column - home_column) as u64).min(region.cursor_end_from(pos))
}

pub struct DocumentView {
    id: ViewId,
    source: Rc<dyn ByteSource>,

    regions: Vec<Region>,
    /// Indices into `regions` of the byte-mapped regions, in offset order
    data_regions: Vec<usize>,

    options: DisplayOptions,
    metrics: FontMetrics,
    client_width: i32,
    client_height: i32,
    visible_lines: u64,
    virtual_width: i32,
    total_lines: u64,
    layout_state: LayoutState,

    scroll: Rc<ScrollState>,
    scroll_group: Option<ScrollGroup>,
    scroll_xoff: i32,

    cursor: Cursor,
    insert_mode: bool,
    selection: Selection,
    /// Fixed end of a keyboard or mouse extended selection
    selection_anchor: Option<u64>,

    blink: CursorBlink,
    drag: Option<DragSelect>,
    timing: ViewTiming,
}

impl DocumentView {
    /// A view showing the whole source as one data region
    pub fn new(
        source: Rc<dyn ByteSource>,
        options: DisplayOptions,
        metrics: FontMetrics,
        client_width: i32,
        client_height: i32,
    ) -> Self {
        let len = source.len();
        let mut view = Self {
            id: ViewId::next(),
            source,
            regions: vec![DataRegion::new(0, len).into()],
            data_regions: Vec::new(),
            options,
            metrics,
            client_width: client_width.max(0),
            client_height: client_height.max(0),
            visible_lines: 1,
            virtual_width: client_width.max(0),
            total_lines: 0,
            layout_state: LayoutState::NeedsFullLayout,
            scroll: Rc::new(ScrollState::default()),
            scroll_group: None,
            scroll_xoff: 0,
            cursor: Cursor::new(0),
            insert_mode: false,
            selection: Selection::default(),
            selection_anchor: None,
            blink: CursorBlink::new(),
            drag: None,
            timing: ViewTiming::default(),
        };
        view.flush_layout();
        view
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn source(&self) -> &Rc<dyn ByteSource> {
        &self.source
    }

    pub fn file_length(&self) -> u64 {
        self.source.len()
    }

    pub fn timing(&self) -> ViewTiming {
        self.timing
    }

    pub fn set_timing(&mut self, timing: ViewTiming) {
        self.timing = timing;
    }

    // === Regions and layout ===

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Indices into [`regions`](Self::regions) of the byte-mapped regions
    pub fn data_region_indices(&self) -> &[usize] {
        &self.data_regions
    }

    /// Replace the region list wholesale. Regions must be ordered by offset
    /// and must not overlap.
    pub fn replace_regions(&mut self, regions: Vec<Region>) {
        self.regions = regions;
        self.drag = None;
        self.invalidate(LayoutState::NeedsFullLayout);

        let len = self.source.len();
        let sel = self.selection;
        if sel.end() > len {
            self.selection = Selection::new(sel.offset.min(len), len.saturating_sub(sel.offset));
        }
        self.place_cursor(self.cursor.offset, self.cursor.state);
    }

    pub fn layout_state(&self) -> LayoutState {
        self.layout_state
    }

    pub fn total_lines(&self) -> u64 {
        self.total_lines
    }

    pub fn visible_lines(&self) -> u64 {
        self.visible_lines
    }

    pub fn virtual_width(&self) -> i32 {
        self.virtual_width
    }

    pub fn client_size(&self) -> (i32, i32) {
        (self.client_width, self.client_height)
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.client_width = width.max(0);
        self.client_height = height.max(0);
        self.invalidate(LayoutState::NeedsFullLayout);
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Swap the font. Only a change in horizontal measurements needs the
    /// line widths resolved again.
    pub fn set_font_metrics(&mut self, metrics: FontMetrics) {
        let state = if metrics.widths_differ(&self.metrics) {
            LayoutState::NeedsFullLayout
        } else {
            LayoutState::NeedsHeightRecalc
        };
        self.metrics = metrics;
        self.invalidate(state);
    }

    fn invalidate(&mut self, state: LayoutState) {
        if self.layout_state != LayoutState::NeedsFullLayout {
            self.layout_state = state;
        }
        self.flush_layout();
    }

    fn flush_layout(&mut self) {
        match self.layout_state {
            LayoutState::NeedsFullLayout => self.full_layout(),
            LayoutState::NeedsHeightRecalc => self.recalc_heights(),
            LayoutState::Stable => {}
        }
        self.layout_state = LayoutState::Stable;
    }

    fn full_layout(&mut self) {
        assign_indentation(&mut self.regions);
        self.data_regions = self
            .regions
            .iter()
            .enumerate()
            .filter(|(_, region)| region.as_byte_region().is_some())
            .map(|(i, _)| i)
            .collect();
        self.assign_tail_slot();

        let ctx = RegionContext {
            options: &self.options,
            metrics: &self.metrics,
            client_width: self.client_width,
            virtual_width: self.client_width,
        };
        let mut widest = self.client_width;
        for region in &mut self.regions {
            widest = widest.max(region.calc_width(&ctx));
        }
        self.virtual_width = widest;

        self.recalc_heights();
        tracing::debug!(
            regions = self.regions.len(),
            total_lines = self.total_lines,
            virtual_width = self.virtual_width,
            "full layout"
        );
    }

    /// The last byte-mapped region ending at the file size owns the EOF slot
    fn assign_tail_slot(&mut self) {
        let len = self.source.len();
        let mut assigned = false;
        for &i in self.data_regions.iter().rev() {
            if let Some(region) = self.regions[i].as_byte_region_mut() {
                let tail = !assigned && region.d_end() == len;
                region.set_tail_slot(tail);
                assigned |= tail;
            }
        }
    }

    fn recalc_heights(&mut self) {
        let ctx = RegionContext {
            options: &self.options,
            metrics: &self.metrics,
            client_width: self.client_width,
            virtual_width: self.virtual_width,
        };
        let mut y = 0u64;
        for region in &mut self.regions {
            region.base_mut().y_offset = y;
            region.calc_height(&ctx);
            y += region.y_lines();
        }
        self.total_lines = y;
        self.update_scroll_limits();
    }

    fn update_scroll_limits(&mut self) {
        let lh = self.metrics.line_height();
        self.visible_lines = (self.client_height / lh).max(1) as u64;
        self.scroll
            .set_max(self.total_lines.saturating_sub(self.visible_lines));
        self.scroll_xoff = self.scroll_xoff.clamp(0, self.scroll_xoff_max());
    }

    fn region_ctx(&self) -> RegionContext<'_> {
        RegionContext {
            options: &self.options,
            metrics: &self.metrics,
            client_width: self.client_width,
            virtual_width: self.virtual_width,
        }
    }

    // === Display options ===

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DisplayOptions) {
        self.update_options(|o| *o = options);
    }

    pub fn set_bytes_per_line(&mut self, bytes_per_line: BytesPerLine) {
        self.update_options(|o| o.bytes_per_line = bytes_per_line);
    }

    pub fn set_bytes_per_group(&mut self, bytes_per_group: u32) {
        self.update_options(|o| o.bytes_per_group = bytes_per_group.max(1));
    }

    pub fn set_show_offsets(&mut self, show: bool) {
        self.update_options(|o| o.show_offsets = show);
    }

    pub fn set_offset_base(&mut self, base: OffsetBase) {
        self.update_options(|o| o.offset_base = base);
    }

    pub fn set_show_ascii(&mut self, show: bool) {
        self.update_options(|o| o.show_ascii = show);
    }

    pub fn set_highlight_selection_match(&mut self, enabled: bool) {
        self.update_options(|o| o.highlight_selection_match = enabled);
    }

    fn update_options(&mut self, change: impl FnOnce(&mut DisplayOptions)) {
        let before = self.options.clone();
        change(&mut self.options);
        if self.options == before {
            return;
        }
        if !self.options.show_ascii && self.cursor.state == CursorState::Ascii {
            self.cursor.state = CursorState::Hex;
        }
        self.invalidate(LayoutState::NeedsFullLayout);
    }

    // === Lookups ===

    fn byte_region(&self, k: usize) -> Option<&dyn ByteRegion> {
        self.regions.get(*self.data_regions.get(k)?)?.as_byte_region()
    }

    /// Position in the data index of the region containing `offset`
    fn data_index_by_offset(&self, offset: u64) -> Option<usize> {
        let pos = self.data_regions.partition_point(|&i| {
            self.regions[i]
                .as_byte_region()
                .is_some_and(|r| r.d_offset() <= offset)
        });
        let k = pos.checked_sub(1)?;
        self.byte_region(k)?.contains_offset(offset).then_some(k)
    }

    /// Like `data_index_by_offset`, but falls back to the closest region
    /// when `offset` is in a gap of the region list
    fn data_index_near(&self, offset: u64) -> Option<usize> {
        if let Some(k) = self.data_index_by_offset(offset) {
            return Some(k);
        }
        let pos = self.data_regions.partition_point(|&i| {
            self.regions[i]
                .as_byte_region()
                .is_some_and(|r| r.d_offset() <= offset)
        });
        let n = self.data_regions.len();
        (n > 0).then(|| pos.saturating_sub(1).min(n - 1))
    }

    fn prev_occupied(&self, k: usize) -> Option<&dyn ByteRegion> {
        (0..k)
            .rev()
            .filter_map(|p| self.byte_region(p))
            .find(|r| !r.is_vacant())
    }

    fn next_occupied(&self, k: usize) -> Option<&dyn ByteRegion> {
        (k + 1..self.data_regions.len())
            .filter_map(|p| self.byte_region(p))
            .find(|r| !r.is_vacant())
    }

    /// Index into [`regions`](Self::regions) of the byte-mapped region containing `offset`
    pub fn region_index_by_offset(&self, offset: u64) -> Option<usize> {
        self.data_index_by_offset(offset)
            .and_then(|k| self.data_regions.get(k).copied())
    }

    /// Index of the region covering virtual line `line`
    pub fn region_index_by_line(&self, line: u64) -> Option<usize> {
        if line >= self.total_lines {
            return None;
        }
        self.regions
            .partition_point(|r| r.y_offset() <= line)
            .checked_sub(1)
    }

    /// Nearest non-empty byte-mapped region to region `idx`, looking
    /// forward first
    fn byte_region_near(&self, idx: usize) -> Option<&dyn ByteRegion> {
        let k = self.data_regions.partition_point(|&i| i < idx);
        let occupied = |p: usize| self.byte_region(p).filter(|r| !r.is_vacant());
        (k..self.data_regions.len())
            .find_map(occupied)
            .or_else(|| (0..k).rev().find_map(occupied))
    }

    // === Coordinates ===

    /// Document x and virtual line under a client-area pixel
    fn client_to_document(&self, px: i32, py: i32) -> (i32, i64) {
        let lh = self.metrics.line_height();
        let line = self.scroll.yoff() as i64 + py.div_euclid(lh) as i64;
        (px + self.scroll_xoff, line)
    }

    /// Byte exactly under a client-area pixel
    pub fn hit_test(&self, px: i32, py: i32) -> Option<(u64, ScreenArea)> {
        let (x, line) = self.client_to_document(px, py);
        let idx = self.region_index_by_line(u64::try_from(line).ok()?)?;
        let region = self.regions[idx].as_byte_region()?;
        region.offset_at_xy(&self.region_ctx(), x, line - region.base().y_offset() as i64)
    }

    /// Byte nearest a client-area pixel, preferring `hint` as the sub-area.
    /// Points over non-byte regions resolve to the next byte region down
    /// (or the previous one at the end of the document).
    pub fn hit_test_near(&self, px: i32, py: i32, hint: ScreenArea) -> Option<(u64, ScreenArea)> {
        if self.total_lines == 0 {
            return None;
        }
        let (x, line) = self.client_to_document(px, py);
        let clamped = line.clamp(0, self.total_lines as i64 - 1) as u64;
        let idx = self.region_index_by_line(clamped)?;
        let region = self.byte_region_near(idx)?;
        region.offset_near_xy(&self.region_ctx(), x, line - region.base().y_offset() as i64, hint)
    }

    pub fn pointer_shape_at(&self, px: i32, py: i32) -> PointerShape {
        let (x, line) = self.client_to_document(px, py);
        let Some(idx) = u64::try_from(line)
            .ok()
            .and_then(|line| self.region_index_by_line(line))
        else {
            return PointerShape::Arrow;
        };
        let region = &self.regions[idx];
        region.cursor_for_point(&self.region_ctx(), x, line - region.y_offset() as i64, py)
    }

    /// Bounding box of a byte in document coordinates (pixels across,
    /// virtual lines down), regardless of the scroll position
    pub fn offset_document_rect(&self, offset: u64, area: ScreenArea) -> Option<Rect> {
        let k = self.data_index_by_offset(offset)?;
        Some(self.byte_region(k)?.calc_offset_bounds(&self.region_ctx(), offset, area))
    }

    /// Bounding box of a byte in client-area pixels. May lie outside the
    /// client area.
    pub fn offset_client_rect(&self, offset: u64, area: ScreenArea) -> Option<PixelRect> {
        let rect = self.offset_document_rect(offset, area)?;
        let lh = self.metrics.line_height() as i64;
        let y = (rect.y - self.scroll.yoff() as i64).checked_mul(lh)?;
        Some(PixelRect::new(
            rect.x - self.scroll_xoff,
            i32::try_from(y).ok()?,
            rect.w,
            i32::try_from(rect.h * lh).ok()?,
        ))
    }

    // === Scrolling ===

    pub fn scroll_yoff(&self) -> u64 {
        self.scroll.yoff()
    }

    pub fn scroll_yoff_max(&self) -> u64 {
        self.scroll.yoff_max()
    }

    /// Scroll so `line` is the first visible line, then bring linked views along
    pub fn set_scroll_yoff(&mut self, line: u64) {
        if self.scroll.set_yoff(line) {
            tracing::trace!("Scroll {:?} to line {}", self.id, self.scroll.yoff());
        }
        if let Some(group) = &self.scroll_group {
            group.broadcast(self.id, self.scroll.yoff());
        }
    }

    pub fn scroll_by(&mut self, lines: i64) {
        self.set_scroll_yoff(self.scroll.yoff().saturating_add_signed(lines));
    }

    pub fn scroll_xoff(&self) -> i32 {
        self.scroll_xoff
    }

    fn scroll_xoff_max(&self) -> i32 {
        (self.virtual_width - self.client_width).max(0)
    }

    pub fn set_scroll_xoff(&mut self, px: i32) {
        self.scroll_xoff = px.clamp(0, self.scroll_xoff_max());
    }

    /// Whether a linked view scrolled this one since the last call
    pub fn take_scroll_changed(&self) -> bool {
        self.scroll.take_changed()
    }

    /// Scroll the minimum needed for `offset` to be fully on screen
    pub fn make_byte_visible(&mut self, offset: u64) {
        let Some(rect) = self.offset_document_rect(offset, self.cursor.state.area()) else {
            return;
        };

        let line = rect.y as u64;
        let yoff = self.scroll.yoff();
        if line < yoff {
            self.set_scroll_yoff(line);
        } else if line >= yoff + self.visible_lines {
            self.set_scroll_yoff(line + 1 - self.visible_lines);
        }

        if rect.x < self.scroll_xoff {
            self.set_scroll_xoff(rect.x);
        } else if rect.x + rect.w > self.scroll_xoff + self.client_width {
            self.set_scroll_xoff(rect.x + rect.w - self.client_width);
        }
    }

    fn make_cursor_visible(&mut self) {
        self.make_byte_visible(self.cursor.offset);
    }

    // === Linked scrolling ===

    /// Join `peer`'s scroll group, directly after `peer`
    pub fn link_scroll_after(&mut self, peer: &mut DocumentView) {
        if self.id == peer.id {
            return;
        }
        self.unlink_scroll();

        let group = peer
            .scroll_group
            .get_or_insert_with(|| {
                let group = ScrollGroup::new();
                group.push(peer.id, &peer.scroll);
                group
            })
            .clone();
        group.insert_after(peer.id, self.id, &self.scroll);
        tracing::debug!("Linked scroll of {:?} after {:?}", self.id, peer.id);
        self.scroll_group = Some(group);
    }

    pub fn unlink_scroll(&mut self) {
        if let Some(group) = self.scroll_group.take() {
            group.remove(self.id);
            tracing::debug!("Unlinked scroll of {:?}", self.id);
        }
    }

    pub fn scroll_group(&self) -> Option<&ScrollGroup> {
        self.scroll_group.as_ref()
    }

    // === Cursor ===

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_position(&self) -> u64 {
        self.cursor.offset
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state
    }

    pub fn cursor_visible(&self) -> bool {
        self.blink.visible
    }

    /// Move the cursor to `offset` (clamped to the file) and scroll it into view
    pub fn set_cursor_position(&mut self, offset: u64, state: CursorState) {
        self.cursor.clear_desired_column();
        self.place_cursor(offset, state);
        self.make_cursor_visible();

        // Extending from here starts afresh unless the cursor sits on an edge
        let pos = self.cursor.offset;
        let sel = self.selection;
        if sel.is_empty() || (pos != sel.offset && pos != sel.end() && pos + 1 != sel.end()) {
            self.selection_anchor = None;
        }
    }

    fn place_cursor(&mut self, offset: u64, state: CursorState) {
        let len = self.source.len();
        let mut offset = offset.min(len);
        // Overwrite mode has nothing to overwrite at EOF
        if !self.insert_mode && len > 0 && offset == len {
            offset = len - 1;
        }

        let mut state = state.resolve(self.cursor.state);
        if state == CursorState::Ascii && !self.options.show_ascii {
            state = CursorState::Hex;
        }

        if offset != self.cursor.offset || state != self.cursor.state {
            tracing::trace!(
                "Cursor {} ({:?}) -> {} ({:?})",
                self.cursor.offset,
                self.cursor.state,
                offset,
                state
            );
        }
        self.cursor.offset = offset;
        self.cursor.state = state;
        self.blink.reset();
    }

    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn set_insert_mode(&mut self, enabled: bool) {
        self.insert_mode = enabled;
        if !enabled {
            self.place_cursor(self.cursor.offset, self.cursor.state);
        }
    }

    /// Switch focus between the hex and ASCII areas
    pub fn toggle_area(&mut self) {
        let state = match self.cursor.state {
            CursorState::Ascii => CursorState::Hex,
            _ if self.options.show_ascii => CursorState::Ascii,
            _ => CursorState::Hex,
        };
        self.place_cursor(self.cursor.offset, state);
    }

    /// Apply a keyboard motion. With `extend` the selection grows from its
    /// anchor to the new position; without, the selection is dropped.
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) {
        let from = self.cursor.offset;
        let target = match motion {
            Motion::Step(Direction::Left) => {
                self.cursor.clear_desired_column();
                self.step_left(from)
            }
            Motion::Step(Direction::Right) => {
                self.cursor.clear_desired_column();
                self.step_right(from)
            }
            Motion::Step(Direction::Up) => {
                let column = self.remember_column(from);
                self.step_vertical(from, Direction::Up, column)
            }
            Motion::Step(Direction::Down) => {
                let column = self.remember_column(from);
                self.step_vertical(from, Direction::Down, column)
            }
            Motion::LineStart => {
                self.cursor.clear_desired_column();
                self.data_index_near(from)
                    .and_then(|k| self.byte_region(k))
                    .map(|r| r.cursor_home_from(from))
            }
            Motion::LineEnd => {
                self.cursor.clear_desired_column();
                self.data_index_near(from)
                    .and_then(|k| self.byte_region(k))
                    .map(|r| r.cursor_end_from(from))
            }
            Motion::DocumentStart => {
                self.cursor.clear_desired_column();
                Some(0)
            }
            Motion::DocumentEnd => {
                self.cursor.clear_desired_column();
                Some(self.source.len())
            }
            Motion::PageUp => self.page(from, Direction::Up),
            Motion::PageDown => self.page(from, Direction::Down),
        };

        let Some(target) = target else {
            return;
        };

        let anchor = extend.then(|| self.extend_anchor());
        self.place_cursor(target, CursorState::Goto);
        match anchor {
            Some(anchor) => {
                // The head may be the EOF slot even when the cursor is kept off it
                let head = target.min(self.source.len()).max(self.cursor.offset);
                self.selection = Selection::between(anchor, head);
                self.selection_anchor = Some(anchor);
            }
            None => self.clear_selection(),
        }
        self.make_cursor_visible();
    }

    fn remember_column(&mut self, pos: u64) -> u32 {
        let column = self
            .data_index_near(pos)
            .and_then(|k| self.byte_region(k))
            .map_or(0, |r| r.cursor_column(pos));
        self.cursor.set_desired_column(column);
        self.cursor.effective_column(column)
    }

    fn step_left(&self, pos: u64) -> Option<u64> {
        let k = self.data_index_near(pos)?;
        match self.byte_region(k)?.cursor_left_from(pos) {
            CursorMove::Moved(offset) => Some(offset),
            CursorMove::CrossPrev => self
                .prev_occupied(k)
                .map(|r| r.last_row_nearest_column(u32::MAX)),
            CursorMove::CrossNext => None,
        }
    }

    fn step_right(&self, pos: u64) -> Option<u64> {
        let k = self.data_index_near(pos)?;
        match self.byte_region(k)?.cursor_right_from(pos) {
            CursorMove::Moved(offset) => Some(offset),
            CursorMove::CrossNext => self.next_occupied(k).map(|r| r.first_row_nearest_column(0)),
            CursorMove::CrossPrev => None,
        }
    }

    fn step_vertical(&self, pos: u64, direction: Direction, column: u32) -> Option<u64> {
        let k = self.data_index_near(pos)?;
        let region = self.byte_region(k)?;
        let step = match direction {
            Direction::Up => region.cursor_up_from(pos),
            _ => region.cursor_down_from(pos),
        };
        match step {
            CursorMove::Moved(offset) => Some(with_column(region, offset, column)),
            CursorMove::CrossPrev => self
                .prev_occupied(k)
                .map(|r| r.last_row_nearest_column(column)),
            CursorMove::CrossNext => self
                .next_occupied(k)
                .map(|r| r.first_row_nearest_column(column)),
        }
    }

    /// Step a page of lines and scroll by the same amount
    fn page(&mut self, from: u64, direction: Direction) -> Option<u64> {
        let column = self.remember_column(from);
        let lines = self.visible_lines;

        let mut pos = from;
        for _ in 0..lines {
            match self.step_vertical(pos, direction, column) {
                Some(next) if next != pos => pos = next,
                _ => break,
            }
        }

        let yoff = self.scroll.yoff();
        let target = match direction {
            Direction::Up => yoff.saturating_sub(lines),
            _ => yoff.saturating_add(lines),
        };
        self.set_scroll_yoff(target);
        Some(pos)
    }

    // === Selection ===

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection, clamped to the file. A zero length clears it.
    pub fn set_selection(&mut self, offset: u64, length: u64) {
        let len = self.source.len();
        let offset = offset.min(len);
        self.selection = Selection::new(offset, length.min(len - offset));
        self.selection_anchor = None;
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
        self.selection_anchor = None;
    }

    pub fn select_all(&mut self) {
        self.set_selection(0, self.source.len());
    }

    fn extend_anchor(&self) -> u64 {
        if let Some(anchor) = self.selection_anchor {
            return anchor;
        }
        let pos = self.cursor.offset;
        let sel = self.selection;
        if !sel.is_empty() {
            if pos == sel.offset {
                return sel.end();
            }
            if pos == sel.end() {
                return sel.offset;
            }
        }
        pos
    }

    // === Mouse ===

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Left button pressed at a client-area pixel
    pub fn mouse_down(&mut self, px: i32, py: i32, shift: bool) -> Option<Cmd> {
        let (x, line) = self.client_to_document(px, py);
        let idx = self.region_index_by_line(u64::try_from(line).ok()?)?;

        if let Region::Comment(comment) = &self.regions[idx] {
            let y_lines = line - comment.base().y_offset() as i64;
            if comment.hit_box(&self.region_ctx(), x, y_lines) {
                return Some(Cmd::CommentActivated {
                    offset: comment.c_offset(),
                    length: comment.c_length(),
                });
            }
            return None;
        }

        let hint = self.cursor.state.area();
        let (offset, area) = self
            .hit_test(px, py)
            .or_else(|| self.hit_test_near(px, py, hint))?;

        let anchor = shift.then(|| self.extend_anchor());
        self.cursor.clear_desired_column();
        self.place_cursor(offset, CursorState::from_area(area));

        let drag = match anchor {
            Some(anchor) => {
                self.selection = inclusive_selection(anchor, self.cursor.offset, self.source.len());
                self.selection_anchor = Some(anchor);
                let mut drag = DragSelect::new(anchor, area, (px, py));
                drag.moved = true;
                drag
            }
            None => {
                self.clear_selection();
                DragSelect::new(self.cursor.offset, area, (px, py))
            }
        };
        self.drag = Some(drag);
        Some(Cmd::Redraw)
    }

    /// Pointer moved. Returns whether the selection changed.
    pub fn mouse_motion(&mut self, px: i32, py: i32) -> bool {
        match self.drag.as_mut() {
            Some(drag) => {
                drag.track((px, py));
                self.drag_select(false)
            }
            None => false,
        }
    }

    pub fn mouse_up(&mut self) {
        self.drag = None;
    }

    /// Right button pressed. Moves the cursor unless the click is inside
    /// the selection.
    pub fn context_menu_at(&mut self, px: i32, py: i32) -> Cmd {
        let hit = self.hit_test(px, py);
        if let Some((offset, area)) = hit {
            if !self.selection.contains(offset) {
                self.clear_selection();
                self.set_cursor_position(offset, CursorState::from_area(area));
            }
        }
        Cmd::ShowContextMenu {
            offset: hit.map(|(offset, _)| offset),
        }
    }

    /// One drag-selection sample. With `autoscroll`, a pointer outside the
    /// client area scrolls one line (or one character) towards it first.
    /// Returns whether anything changed.
    pub fn drag_select(&mut self, autoscroll: bool) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        if !drag.moved {
            return false;
        }
        let (px, py) = drag.pointer;
        let (down_offset, down_area) = (drag.down_offset, drag.down_area);

        let before = (self.scroll.yoff(), self.scroll_xoff, self.selection, self.cursor.offset);

        if autoscroll {
            if py < 0 {
                self.scroll_by(-1);
            } else if py >= self.client_height {
                self.scroll_by(1);
            }
            let cw = self.metrics.char_width();
            if px < 0 {
                self.set_scroll_xoff(self.scroll_xoff - cw);
            } else if px >= self.client_width {
                self.set_scroll_xoff(self.scroll_xoff + cw);
            }
        }

        let py = py.clamp(0, (self.client_height - 1).max(0));
        let Some((offset, _)) = self.hit_test_near(px, py, down_area) else {
            return before.0 != self.scroll.yoff() || before.1 != self.scroll_xoff;
        };

        self.place_cursor(offset, CursorState::from_area(down_area));
        self.selection = inclusive_selection(down_offset, self.cursor.offset, self.source.len());
        self.selection_anchor = Some(down_offset);

        before != (self.scroll.yoff(), self.scroll_xoff, self.selection, self.cursor.offset)
    }

    /// Timer tick: cursor blink and drag-select sampling
    pub fn tick(&mut self) -> Option<Cmd> {
        let mut cmd = None;
        if self.blink.update(self.timing.cursor_blink) {
            cmd = Some(Cmd::RedrawCursor);
        }
        let select_tick = self.timing.select_tick;
        if self.drag.as_mut().is_some_and(|d| d.tick_due(select_tick)) && self.drag_select(true) {
            cmd = Some(Cmd::Redraw);
        }
        if self.take_scroll_changed() {
            cmd = Some(Cmd::Redraw);
        }
        cmd
    }

    // === Keyboard and clipboard hooks ===

    /// Give the region under the cursor the first chance at a key
    pub fn offer_key_to_region(&mut self, key: &KeyInput) -> Option<Cmd> {
        let idx = self.region_index_by_offset(self.cursor.offset)?;
        let cursor = self.cursor.offset;
        let ctx = RegionContext {
            options: &self.options,
            metrics: &self.metrics,
            client_width: self.client_width,
            virtual_width: self.virtual_width,
        };
        self.regions
            .get_mut(idx)?
            .as_byte_region_mut()?
            .on_char(key, &ctx, cursor)
    }

    /// Clipboard payload for the current selection. A region holding the
    /// whole selection may supply its own; otherwise the bytes are exported
    /// as hex digits (hex focus) or raw text (ASCII focus).
    pub fn copy_selection(&self) -> Option<ClipboardPayload> {
        let sel = self.selection;
        if sel.is_empty() {
            return None;
        }

        if let Some(region) = self
            .data_index_by_offset(sel.offset)
            .and_then(|k| self.byte_region(k))
            .filter(|r| sel.end() <= r.d_end())
        {
            if let Some(payload) = region.on_copy(sel, &*self.source) {
                return Some(payload);
            }
        }

        let data = match self.source.read(sel.offset, sel.length as usize) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Copy of {} bytes at {} failed: {:#}", sel.length, sel.offset, e);
                return None;
            }
        };

        Some(match self.cursor.state.area() {
            ScreenArea::Ascii => ClipboardPayload::Text(String::from_utf8_lossy(&data).into_owned()),
            _ => ClipboardPayload::HexText(hex_encode(&data)),
        })
    }

    /// Turn clipboard content into an edit at the cursor. The region under
    /// the cursor may handle the paste itself.
    pub fn paste(&mut self, clipboard: &mut dyn ClipboardSink) -> Option<Cmd> {
        let cursor = self.cursor.offset;
        if let Some(idx) = self.region_index_by_offset(cursor) {
            if let Some(cmd) = self
                .regions
                .get_mut(idx)
                .and_then(Region::as_byte_region_mut)
                .and_then(|r| r.on_paste(clipboard, cursor))
            {
                return Some(cmd);
            }
        }

        if !clipboard.paste_available() {
            return None;
        }
        let payload = clipboard.fetch()?;
        let data = match self.cursor.state.area() {
            ScreenArea::Ascii => payload.text().as_bytes().to_vec(),
            _ => match parse_hex(payload.text()) {
                Some(data) => data,
                None => {
                    tracing::debug!("Clipboard text is not hex, ignoring paste");
                    return None;
                }
            },
        };
        if data.is_empty() {
            return None;
        }

        Some(Cmd::Edit(self.write_request(data)))
    }

    /// Edit that writes `data` at the cursor: replaces the selection in
    /// insert mode, inserts in insert mode, overwrites otherwise
    pub fn write_request(&self, data: Vec<u8>) -> EditRequest {
        let state_after = CursorState::Goto.resolve(self.cursor.state);
        let written = data.len() as u64;
        let sel = self.selection;

        if self.insert_mode && !sel.is_empty() {
            EditRequest {
                kind: EditKind::Replace {
                    offset: sel.offset,
                    length: sel.length,
                    data,
                },
                cursor_after: sel.offset + written,
                state_after,
            }
        } else if self.insert_mode {
            EditRequest {
                kind: EditKind::Insert {
                    offset: self.cursor.offset,
                    data,
                },
                cursor_after: self.cursor.offset + written,
                state_after,
            }
        } else {
            EditRequest {
                kind: EditKind::Overwrite {
                    offset: self.cursor.offset,
                    data,
                },
                cursor_after: self.cursor.offset + written,
                state_after,
            }
        }
    }

    /// Adopt the region list rebuilt after an edit and move the cursor to
    /// where the edit wants it
    pub fn finish_edit(&mut self, regions: Vec<Region>, edit: &EditRequest) {
        self.clear_selection();
        self.replace_regions(regions);
        self.set_cursor_position(edit.cursor_after, edit.state_after);
    }

    // === Drawing ===

    fn selection_match_bytes(&self) -> Option<Vec<u8>> {
        let sel = self.selection;
        if !self.options.highlight_selection_match || sel.is_empty() || sel.length > SELECTION_MATCH_MAX {
            return None;
        }
        match self.source.read(sel.offset, sel.length as usize) {
            Ok(bytes) if bytes.len() as u64 == sel.length => Some(bytes),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Failed to read selection for matching: {:#}", e);
                None
            }
        }
    }

    /// Paint the visible part of the document
    pub fn paint(&self, surface: &mut dyn Surface) {
        surface.fill_rect(
            PixelRect::new(0, 0, self.client_width, self.client_height),
            PaletteColour::Background,
        );

        let yoff = self.scroll.yoff();
        let Some(first) = self.region_index_by_line(yoff) else {
            return;
        };

        let match_bytes = self.selection_match_bytes();
        let ctx = DrawContext {
            layout: self.region_ctx(),
            source: &*self.source,
            client_height: self.client_height,
            cursor: self.cursor.offset,
            cursor_area: self.cursor.state.area(),
            cursor_visible: self.blink.visible,
            insert_mode: self.insert_mode,
            selection: self.selection,
            selection_match: match_bytes.as_deref(),
        };

        let lh = self.metrics.line_height() as i64;
        for region in &self.regions[first..] {
            let y = (region.y_offset() as i64 - yoff as i64) * lh;
            if y >= self.client_height as i64 {
                break;
            }
            region.draw(&ctx, surface, -self.scroll_xoff, y);
        }
    }

    /// Check internal consistency (debug builds only)
    #[cfg(debug_assertions)]
    pub fn assert_invariants(&self) {
        let mut expected = 0;
        for (i, region) in self.regions.iter().enumerate() {
            debug_assert_eq!(region.y_offset(), expected, "Region {} y_offset", i);
            debug_assert!(region.y_lines() > 0, "Region {} has no lines", i);
            expected += region.y_lines();
        }
        debug_assert_eq!(expected, self.total_lines, "Total lines");
        debug_assert!(self.cursor.offset <= self.source.len(), "Cursor past EOF");
        debug_assert!(self.scroll.yoff() <= self.scroll.yoff_max(), "Scroll past end");
        debug_assert!(self.selection.end() <= self.source.len(), "Selection past EOF");
    }

    /// No-op in release builds
    #[cfg(not(debug_assertions))]
    #[inline]
    pub fn assert_invariants(&self) {}
}

impl Drop for DocumentView {
    fn drop(&mut self) {
        self.unlink_scroll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySource;

    fn view(len: usize) -> DocumentView {
        let source = Rc::new(MemorySource::new(vec![0u8; len]));
        DocumentView::new(
            source,
            DisplayOptions::default(),
            FontMetrics::monospace(10, 20),
            700,
            200,
        )
    }

    #[test]
    fn test_new_view_lays_out_whole_file() {
        let view = view(100);
        assert_eq!(view.layout_state(), LayoutState::Stable);
        assert_eq!(view.total_lines(), 7);
        assert_eq!(view.visible_lines(), 10);
        assert_eq!(view.scroll_yoff_max(), 0);
        view.assert_invariants();
    }

    #[test]
    fn test_overwrite_mode_keeps_cursor_off_eof() {
        let mut view = view(100);
        view.set_cursor_position(500, CursorState::Hex);
        assert_eq!(view.cursor_position(), 99);

        view.set_insert_mode(true);
        view.set_cursor_position(100, CursorState::Hex);
        assert_eq!(view.cursor_position(), 100);

        view.set_insert_mode(false);
        assert_eq!(view.cursor_position(), 99);
    }

    #[test]
    fn test_empty_file_cursor_at_zero() {
        let mut view = view(0);
        view.set_cursor_position(10, CursorState::Hex);
        assert_eq!(view.cursor_position(), 0);
        assert_eq!(view.total_lines(), 1);
        view.move_cursor(Motion::Step(Direction::Right), false);
        assert_eq!(view.cursor_position(), 0);
    }

    #[test]
    fn test_goto_state_keeps_ascii_focus() {
        let mut view = view(100);
        view.set_cursor_position(10, CursorState::Ascii);
        view.set_cursor_position(20, CursorState::Goto);
        assert_eq!(view.cursor_state(), CursorState::Ascii);
    }

    #[test]
    fn test_hiding_ascii_moves_focus_to_hex() {
        let mut view = view(100);
        view.set_cursor_position(10, CursorState::Ascii);
        view.set_show_ascii(false);
        assert_eq!(view.cursor_state(), CursorState::Hex);
        view.toggle_area();
        assert_eq!(view.cursor_state(), CursorState::Hex);
    }

    #[test]
    fn test_inclusive_selection() {
        assert_eq!(inclusive_selection(5, 2, 100), Selection::new(2, 4));
        assert_eq!(inclusive_selection(7, 7, 100), Selection::new(7, 1));
        assert_eq!(inclusive_selection(99, 100, 100), Selection::new(99, 1));
    }

    #[test]
    fn test_write_request_modes() {
        let mut view = view(100);
        view.set_cursor_position(10, CursorState::Hex);
        assert_eq!(
            view.write_request(vec![1, 2]).kind,
            EditKind::Overwrite { offset: 10, data: vec![1, 2] }
        );

        view.set_insert_mode(true);
        view.set_selection(20, 5);
        let req = view.write_request(vec![9]);
        assert_eq!(
            req.kind,
            EditKind::Replace { offset: 20, length: 5, data: vec![9] }
        );
        assert_eq!(req.cursor_after, 21);
    }
}

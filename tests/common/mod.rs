//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::rc::Rc;

use hexpane::model::{
    CommentRegion, DataRegion, DisplayOptions, DocumentView, FontMetrics, Region,
};
use hexpane::storage::MemorySource;

/// Pixel size of one character in the default test font
pub const CHAR_W: i32 = 10;
pub const LINE_H: i32 = 20;

/// Client area that fits exactly one default 16-byte line, and 10 lines
pub const CLIENT_W: i32 = 700;
pub const CLIENT_H: i32 = 200;

/// `len` bytes counting up from zero, wrapping at 256
pub fn counting_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

pub fn data(offset: u64, length: u64) -> Region {
    DataRegion::new(offset, length).into()
}

pub fn comment(offset: u64, length: u64, text: &str) -> Region {
    CommentRegion::new(offset, length, Rc::from(text), true, false).into()
}

/// Create a view over `len` counting bytes with default options.
/// An empty `regions` keeps the single whole-file data region.
pub fn test_view(len: usize, regions: Vec<Region>) -> DocumentView {
    test_view_with(len, regions, DisplayOptions::default())
}

pub fn test_view_with(len: usize, regions: Vec<Region>, options: DisplayOptions) -> DocumentView {
    let source = Rc::new(MemorySource::new(counting_bytes(len)));
    let mut view = DocumentView::new(
        source,
        options,
        FontMetrics::monospace(CHAR_W, LINE_H),
        CLIENT_W,
        CLIENT_H,
    );
    if !regions.is_empty() {
        view.replace_regions(regions);
    }
    view
}

/// View over `data` drawn one pixel per character, so a `TextSurface` of
/// `columns` x `rows` cells shows it exactly
pub fn text_view(data: Vec<u8>, columns: i32, rows: i32, regions: Vec<Region>) -> DocumentView {
    let mut view = DocumentView::new(
        Rc::new(MemorySource::new(data)),
        DisplayOptions::default(),
        FontMetrics::monospace(1, 1),
        columns,
        rows,
    );
    if !regions.is_empty() {
        view.replace_regions(regions);
    }
    view
}

/// Panics unless every region starts on the line where the previous one ended
pub fn assert_contiguous(view: &DocumentView) {
    let mut expected = 0;
    for (i, region) in view.regions().iter().enumerate() {
        assert_eq!(region.y_offset(), expected, "region {} y_offset", i);
        assert!(region.y_lines() > 0, "region {} is empty", i);
        expected += region.y_lines();
    }
    assert_eq!(view.total_lines(), expected);
}

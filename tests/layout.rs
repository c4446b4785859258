//! Layout tests - region heights, indentation, option changes, painting

mod common;

use std::rc::Rc;

use common::{
    assert_contiguous, comment, data, test_view, test_view_with, text_view, CLIENT_H,
};
use hexpane::messages::{DisplayMsg, Msg};
use hexpane::model::{
    BytesPerLine, CommentRegion, CursorState, DisplayOptions, LayoutState, Region, ScreenArea,
};
use hexpane::surface::TextSurface;
use hexpane::update::update;

fn bytes_per_line(region: &Region) -> u32 {
    match region {
        Region::Data(d) => d.bytes_per_line_actual(),
        Region::Comment(_) => panic!("not a data region"),
    }
}

#[test]
fn test_aligned_region_of_two_lines() {
    let view = test_view(32, vec![]);
    assert_eq!(view.total_lines(), 2);

    let region = view.regions()[0].as_byte_region().unwrap();
    assert_eq!(region.nth_row_nearest_column(1, 5), 16 + 5);
}

#[test]
fn test_mixed_regions_are_contiguous() {
    let view = test_view(
        100,
        vec![
            data(0, 16),
            comment(16, 32, "header"),
            data(16, 20),
            data(36, 12),
            data(48, 52),
        ],
    );
    assert_contiguous(&view);

    let y: Vec<u64> = view.regions().iter().map(Region::y_offset).collect();
    assert_eq!(y, vec![0, 1, 4, 6, 8]);
    assert_eq!(view.total_lines(), 12);

    let depths: Vec<(u32, u32)> = view
        .regions()
        .iter()
        .map(|r| (r.indent_depth(), r.indent_final()))
        .collect();
    assert_eq!(depths, vec![(0, 0), (0, 0), (1, 0), (1, 1), (0, 0)]);

    // Indented lines are wider than the client area
    assert_eq!(view.virtual_width(), 720);
}

#[test]
fn test_option_change_relays_out() {
    let mut view = test_view(100, vec![]);
    assert_eq!(view.total_lines(), 7);

    update(
        &mut view,
        Msg::Display(DisplayMsg::SetBytesPerLine(BytesPerLine::fixed(8))),
    );
    assert_eq!(view.layout_state(), LayoutState::Stable);
    assert_eq!(view.total_lines(), 13);
    assert_contiguous(&view);

    update(&mut view, Msg::Display(DisplayMsg::SetShowAscii(false)));
    assert_eq!(view.total_lines(), 13);
    assert!(view.virtual_width() >= 700);
}

#[test]
fn test_fit_bytes_with_exact_width_resolves_to_eight() {
    let options = DisplayOptions {
        bytes_per_line: BytesPerLine::FitBytes,
        ..Default::default()
    };
    let mut view = test_view_with(64, vec![], options);

    // offsets 18 chars, hex 17 chars, gap + ascii 9 chars, 10px each
    view.resize(440, CLIENT_H);
    assert_eq!(bytes_per_line(&view.regions()[0]), 8);
    assert_eq!(view.total_lines(), 8);

    view.resize(445, CLIENT_H);
    assert_eq!(bytes_per_line(&view.regions()[0]), 8);

    view.resize(480, CLIENT_H);
    assert_eq!(bytes_per_line(&view.regions()[0]), 9);
}

#[test]
fn test_zero_sized_client_degrades_gracefully() {
    let options = DisplayOptions {
        bytes_per_line: BytesPerLine::FitBytes,
        ..Default::default()
    };
    let mut view = test_view_with(64, vec![], options);
    update(&mut view, Msg::Resize { width: 0, height: 0 });

    assert_eq!(view.visible_lines(), 1);
    assert_eq!(bytes_per_line(&view.regions()[0]), 1);
    assert_eq!(view.total_lines(), 64);
    assert_eq!(view.scroll_yoff_max(), 63);
}

#[test]
fn test_font_change_keeps_layout_consistent() {
    let mut view = test_view(100, vec![comment(0, 100, "all of it"), data(0, 100)]);
    let before = view.total_lines();

    // Taller font, same widths: only heights are recalculated
    update(
        &mut view,
        Msg::Display(DisplayMsg::SetFontMetrics(hexpane::model::FontMetrics::monospace(
            10, 40,
        ))),
    );
    assert_eq!(view.total_lines(), before);
    assert_eq!(view.visible_lines(), 5);
    assert_contiguous(&view);
}

#[test]
fn test_lookups_agree_for_every_offset() {
    let view = test_view(
        100,
        vec![
            data(0, 16),
            comment(16, 32, "header"),
            data(16, 20),
            data(36, 12),
            data(48, 52),
        ],
    );

    for offset in 0..100 {
        let idx = view.region_index_by_offset(offset).unwrap();
        let rect = view.offset_document_rect(offset, ScreenArea::Hex).unwrap();
        assert_eq!(
            view.region_index_by_line(rect.y as u64),
            Some(idx),
            "offset {}",
            offset
        );
    }
}

#[test]
fn test_tail_slot_adds_no_line() {
    let mut view = test_view(32, vec![]);
    view.set_insert_mode(true);
    view.set_cursor_position(32, CursorState::Hex);
    assert_eq!(view.cursor_position(), 32);
    assert_eq!(view.total_lines(), 2);

    let rect = view.offset_document_rect(32, ScreenArea::Hex).unwrap();
    assert_eq!(rect.y, 1);
}

#[test]
fn test_paint_renders_hex_and_ascii() {
    let bytes: Vec<u8> = (0x41..0x61).collect();
    let view = text_view(bytes, 70, 3, vec![]);

    let mut surface = TextSurface::new(70, 3);
    view.paint(&mut surface);

    assert_eq!(
        surface.row_text(0),
        "00000000:00000000 41424344 45464748 494A4B4C 4D4E4F50 ABCDEFGHIJKLMNOP"
    );
    assert_eq!(
        surface.row_text(1),
        r"00000000:00000010 51525354 55565758 595A5B5C 5D5E5F60 QRSTUVWXYZ[\]^_`"
    );
    assert_eq!(surface.row_text(2), "");
}

#[test]
fn test_paint_renders_comment_box_between_data() {
    let bytes: Vec<u8> = (0x41..0x61).collect();
    let note: Region = CommentRegion::new(16, 16, Rc::from("note"), false, false).into();
    let view = text_view(bytes, 70, 6, vec![data(0, 16), note, data(16, 16)]);
    assert_eq!(view.total_lines(), 5);

    let mut surface = TextSurface::new(70, 6);
    view.paint(&mut surface);

    assert_eq!(surface.row_text(1), "-".repeat(70));
    let text_row = surface.row_text(2);
    assert!(text_row.starts_with("|note "), "{:?}", text_row);
    assert!(text_row.ends_with('|'), "{:?}", text_row);
    assert_eq!(surface.row_text(3), "-".repeat(70));
    assert!(surface.row_text(4).starts_with("00000000:00000010 51525354"));
}

#[test]
fn test_decimal_offsets() {
    // Twenty offset digits plus the gap, then 16 bytes of hex and ASCII
    let mut view = text_view(vec![0; 32], 73, 2, vec![]);
    view.set_offset_base(hexpane::model::OffsetBase::Dec);

    let mut surface = TextSurface::new(73, 2);
    view.paint(&mut surface);
    assert!(surface.row_text(1).starts_with("00000000000000000016 00000000"));
}

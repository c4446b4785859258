//! Scroll and display option handlers

use crate::commands::Cmd;
use crate::messages::{DisplayMsg, ScrollMsg};
use crate::model::view::DocumentView;

pub fn update_scroll(view: &mut DocumentView, msg: ScrollMsg) -> Option<Cmd> {
    let before = (view.scroll_yoff(), view.scroll_xoff());

    match msg {
        ScrollMsg::ToLine(line) => view.set_scroll_yoff(line),
        ScrollMsg::ByLines(lines) => view.scroll_by(lines),
        ScrollMsg::Wheel(notches) => {
            let step = view.timing().wheel_lines as i64;
            view.scroll_by(notches as i64 * step);
        }
        ScrollMsg::HorizontalWheel(notches) => {
            let cw = view.metrics().char_width();
            view.set_scroll_xoff(view.scroll_xoff().saturating_add(notches.saturating_mul(cw)));
        }
        ScrollMsg::ToX(px) => view.set_scroll_xoff(px),
    }

    (before != (view.scroll_yoff(), view.scroll_xoff())).then_some(Cmd::Redraw)
}

pub fn update_display(view: &mut DocumentView, msg: DisplayMsg) -> Option<Cmd> {
    match msg {
        DisplayMsg::SetOptions(options) => view.set_options(options),
        DisplayMsg::SetBytesPerLine(bytes_per_line) => view.set_bytes_per_line(bytes_per_line),
        DisplayMsg::SetBytesPerGroup(bytes_per_group) => view.set_bytes_per_group(bytes_per_group),
        DisplayMsg::SetShowOffsets(show) => view.set_show_offsets(show),
        DisplayMsg::SetOffsetBase(base) => view.set_offset_base(base),
        DisplayMsg::SetShowAscii(show) => view.set_show_ascii(show),
        DisplayMsg::SetHighlightSelectionMatch(enabled) => {
            view.set_highlight_selection_match(enabled)
        }
        DisplayMsg::SetFontMetrics(metrics) => view.set_font_metrics(metrics),
    }
    Some(Cmd::Redraw)
}

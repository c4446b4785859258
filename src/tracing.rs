//! Tracing setup and layout diagnostics
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=layout=debug,cursor=trace` - scoped filtering
//! - `RUST_LOG=hexpane::model::view=trace` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/hexpane/logs/hexpane.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use anyhow::Context;
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::{ConfigPaths, LOG_FILE_PREFIX};
use crate::model::cursor::{CursorState, Selection};
use crate::model::region::{ByteRegion, Region};
use crate::model::view::DocumentView;

/// Initialize tracing subscriber with console and file logging
///
/// Console output goes to stderr and respects RUST_LOG (default `warn`).
/// The returned guard flushes the file writer when dropped, so keep it
/// alive for the life of the program.
pub fn init() -> Option<WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let logs_dir = ConfigPaths::discover()
        .context("No config directory available")
        .and_then(|paths| paths.ensure_logs_dir());
    let (file_layer, guard) = match logs_dir {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {:#}", e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// Geometry of one region at snapshot time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionInfo {
    pub kind: &'static str,
    /// First byte covered (data) or annotated (comment)
    pub offset: u64,
    pub length: u64,
    pub y_offset: u64,
    pub y_lines: u64,
    pub indent_depth: u32,
    pub indent_final: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_per_line: Option<u32>,
}

impl RegionInfo {
    fn from_region(region: &Region) -> Self {
        let (kind, offset, length, bytes_per_line) = match region {
            Region::Data(data) => (
                "data",
                data.d_offset(),
                data.d_length(),
                Some(data.bytes_per_line_actual()),
            ),
            Region::Comment(comment) => ("comment", comment.c_offset(), comment.c_length(), None),
        };
        Self {
            kind,
            offset,
            length,
            y_offset: region.y_offset(),
            y_lines: region.y_lines(),
            indent_depth: region.indent_depth(),
            indent_final: region.indent_final(),
            bytes_per_line,
        }
    }
}

/// Layout, cursor and scroll state of a view, for diffing and dumping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutSnapshot {
    pub file_length: u64,
    pub total_lines: u64,
    pub visible_lines: u64,
    pub virtual_width: i32,
    pub cursor: u64,
    pub cursor_state: CursorState,
    pub insert_mode: bool,
    pub selection: Selection,
    pub scroll_yoff: u64,
    pub scroll_yoff_max: u64,
    pub scroll_xoff: i32,
    pub regions: Vec<RegionInfo>,
}

impl LayoutSnapshot {
    pub fn capture(view: &DocumentView) -> Self {
        Self {
            file_length: view.file_length(),
            total_lines: view.total_lines(),
            visible_lines: view.visible_lines(),
            virtual_width: view.virtual_width(),
            cursor: view.cursor_position(),
            cursor_state: view.cursor_state(),
            insert_mode: view.insert_mode(),
            selection: view.selection(),
            scroll_yoff: view.scroll_yoff(),
            scroll_yoff_max: view.scroll_yoff_max(),
            scroll_xoff: view.scroll_xoff(),
            regions: view.regions().iter().map(RegionInfo::from_region).collect(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &LayoutSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if self.regions.len() != other.regions.len() {
            changes.push(format!(
                "regions: {} → {}",
                self.regions.len(),
                other.regions.len()
            ));
        } else if self.regions != other.regions {
            let moved = self
                .regions
                .iter()
                .zip(&other.regions)
                .filter(|(a, b)| a != b)
                .count();
            changes.push(format!("{} region(s) relaid", moved));
        }
        if self.total_lines != other.total_lines {
            changes.push(format!(
                "lines: {} → {}",
                self.total_lines, other.total_lines
            ));
        }
        if self.cursor != other.cursor || self.cursor_state != other.cursor_state {
            changes.push(format!(
                "cursor: {} ({:?}) → {} ({:?})",
                self.cursor, self.cursor_state, other.cursor, other.cursor_state
            ));
        }
        if self.insert_mode != other.insert_mode {
            changes.push(format!("insert mode {}", if other.insert_mode { "on" } else { "off" }));
        }
        if self.selection != other.selection {
            if other.selection.is_empty() {
                changes.push("selection cleared".to_string());
            } else {
                changes.push(format!(
                    "selection: [{}, {})",
                    other.selection.offset,
                    other.selection.end()
                ));
            }
        }
        if self.scroll_yoff != other.scroll_yoff || self.scroll_xoff != other.scroll_xoff {
            changes.push(format!(
                "scroll: ({},{}) → ({},{})",
                self.scroll_xoff, self.scroll_yoff, other.scroll_xoff, other.scroll_yoff
            ));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::metrics::FontMetrics;
    use crate::model::options::DisplayOptions;
    use crate::storage::MemorySource;
    use std::rc::Rc;

    fn view() -> DocumentView {
        DocumentView::new(
            Rc::new(MemorySource::new(vec![0u8; 64])),
            DisplayOptions::default(),
            FontMetrics::monospace(10, 20),
            700,
            100,
        )
    }

    #[test]
    fn test_identical_snapshots_have_no_diff() {
        let view = view();
        let a = LayoutSnapshot::capture(&view);
        let b = LayoutSnapshot::capture(&view);
        assert_eq!(a.diff(&b), None);
    }

    #[test]
    fn test_diff_reports_cursor_and_selection() {
        let mut view = view();
        let before = LayoutSnapshot::capture(&view);
        view.set_cursor_position(5, CursorState::Hex);
        view.set_selection(2, 3);
        let after = LayoutSnapshot::capture(&view);

        let diff = before.diff(&after).unwrap();
        assert!(diff.contains("cursor: 0 (Hex) → 5 (Hex)"), "{}", diff);
        assert!(diff.contains("selection: [2, 5)"), "{}", diff);
    }

    #[test]
    fn test_snapshot_serializes_regions() {
        let view = view();
        let json = serde_json::to_value(LayoutSnapshot::capture(&view)).unwrap();
        assert_eq!(json["regions"][0]["kind"], "data");
        assert_eq!(json["regions"][0]["bytes_per_line"], 16);
        assert_eq!(json["total_lines"], 4);
    }
}

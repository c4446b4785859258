//! View model - the complete state of a hex view
//!
//! Regions, their layout, and the cursor/selection engine that navigates
//! them. Everything here is single-threaded and owned by the host's event loop.

pub mod comment_region;
pub mod cursor;
pub mod data_region;
pub mod geometry;
pub mod metrics;
pub mod options;
pub mod region;
pub mod scroll;
pub mod view;

pub use comment_region::CommentRegion;
pub use cursor::{Cursor, CursorBlink, CursorState, DragSelect, Selection};
pub use data_region::{DataRegion, Highlight, HighlightSource};
pub use geometry::{CursorMove, PixelRect, PointerShape, Rect, ScreenArea};
pub use metrics::FontMetrics;
pub use options::{BytesPerLine, DisplayOptions, OffsetBase, BYTES_PER_LINE_MAX, BYTES_PER_LINE_MIN};
pub use region::{ByteRegion, DrawContext, Region, RegionBase, RegionContext, RegionOps};
pub use scroll::{ScrollGroup, ScrollState, ViewId};
pub use view::{DocumentView, LayoutState, ViewTiming, SELECTION_MATCH_MAX};

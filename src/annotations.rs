//! Comment and highlight annotations, and the region list built from them
//!
//! Annotations are read from a JSON file:
//!
//! ```json
//! {
//!   "comments":   [{ "offset": 16, "length": 32, "text": "header" }],
//!   "highlights": [{ "offset": 16, "length": 4, "fg": "normal", "bg": { "highlight": 2 } }]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::comment_region::CommentRegion;
use crate::model::data_region::{DataRegion, Highlight, HighlightSource};
use crate::model::region::Region;
use crate::surface::PaletteColour;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub offset: u64,
    #[serde(default)]
    pub length: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRecord {
    pub offset: u64,
    pub length: u64,
    pub fg: PaletteColour,
    pub bg: PaletteColour,
    #[serde(default)]
    pub strong: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub comments: Vec<CommentRecord>,
    pub highlights: Vec<HighlightRecord>,
}

impl Annotations {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read annotations from {}", path.display()))?;
        let annotations: Annotations = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse annotations in {}", path.display()))?;

        tracing::info!(
            "Loaded {} comments and {} highlights from {}",
            annotations.comments.len(),
            annotations.highlights.len(),
            path.display()
        );
        Ok(annotations)
    }

    pub fn highlight_map(&self) -> HighlightMap {
        let mut map = HighlightMap::default();
        for record in &self.highlights {
            map.insert(
                record.offset,
                record.length,
                Highlight {
                    fg: record.fg,
                    bg: record.bg,
                    strong: record.strong,
                },
            );
        }
        map
    }
}

/// Highlight ranges keyed by start offset. Ranges should not overlap;
/// where they do, the range starting closest before an offset decides it.
#[derive(Debug, Clone, Default)]
pub struct HighlightMap {
    ranges: BTreeMap<u64, (u64, Highlight)>,
}

impl HighlightMap {
    pub fn insert(&mut self, offset: u64, length: u64, highlight: Highlight) {
        if length > 0 {
            self.ranges
                .insert(offset, (offset.saturating_add(length), highlight));
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl HighlightSource for HighlightMap {
    fn highlight_at(&self, offset: u64) -> Option<Highlight> {
        let (_, &(end, highlight)) = self.ranges.range(..=offset).next_back()?;
        (offset < end).then_some(highlight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Comments bracket the regions they cover
    pub nest_comments: bool,
    /// Comments show only their first line
    pub truncate_comments: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            nest_comments: true,
            truncate_comments: false,
        }
    }
}

/// Turn comment records into an offset-ordered region list covering
/// `[0, file_len)`.
///
/// Each comment comes directly before the data it annotates. Outer comments
/// precede inner ones starting at the same offset. With nesting, data is
/// also split where comments end so every bracket closes on a region
/// boundary. An empty file still gets one empty data region to hold the
/// cursor.
pub fn build_regions(
    file_len: u64,
    comments: &[CommentRecord],
    highlighter: Option<Rc<dyn HighlightSource>>,
    options: BuildOptions,
) -> Vec<Region> {
    let mut comments: Vec<&CommentRecord> = comments
        .iter()
        .filter(|c| c.offset <= file_len)
        .collect();
    comments.sort_by(|a, b| a.offset.cmp(&b.offset).then(b.length.cmp(&a.length)));

    let clamp_len = |c: &CommentRecord| c.length.min(file_len - c.offset);

    let mut cuts: Vec<u64> = vec![0, file_len];
    for c in &comments {
        cuts.push(c.offset);
        if options.nest_comments {
            cuts.push(c.offset + clamp_len(c));
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    let data = |offset: u64, length: u64| -> Region {
        let region = DataRegion::new(offset, length);
        match &highlighter {
            Some(h) => region.with_highlighter(h.clone()).into(),
            None => region.into(),
        }
    };

    let mut regions = Vec::with_capacity(comments.len() + cuts.len());
    let mut pending = comments.iter().peekable();
    for pair in cuts.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        while let Some(c) = pending.next_if(|c| c.offset == start) {
            regions.push(
                CommentRegion::new(
                    c.offset,
                    clamp_len(c),
                    Rc::from(c.text.as_str()),
                    options.nest_comments,
                    options.truncate_comments,
                )
                .into(),
            );
        }
        regions.push(data(start, end - start));
    }

    // Comments at EOF, or everything when the file is empty
    for c in pending {
        regions.push(
            CommentRegion::new(
                c.offset,
                0,
                Rc::from(c.text.as_str()),
                options.nest_comments,
                options.truncate_comments,
            )
            .into(),
        );
    }
    if !regions.iter().any(|r| matches!(r, Region::Data(_))) {
        regions.push(data(file_len, 0));
    }

    tracing::debug!(
        "Built {} regions for {} bytes and {} comments",
        regions.len(),
        file_len,
        comments.len()
    );
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::region::{assign_indentation, ByteRegion};

    fn comment(offset: u64, length: u64, text: &str) -> CommentRecord {
        CommentRecord {
            offset,
            length,
            text: text.to_string(),
        }
    }

    fn shape(regions: &[Region]) -> Vec<(&'static str, u64, u64)> {
        regions
            .iter()
            .map(|r| match r {
                Region::Data(d) => ("data", d.d_offset(), d.d_length()),
                Region::Comment(c) => ("comment", c.c_offset(), c.c_length()),
            })
            .collect()
    }

    #[test]
    fn test_no_comments_is_one_data_region() {
        let regions = build_regions(100, &[], None, BuildOptions::default());
        assert_eq!(shape(&regions), vec![("data", 0, 100)]);
    }

    #[test]
    fn test_empty_file_gets_empty_data_region() {
        let regions = build_regions(0, &[], None, BuildOptions::default());
        assert_eq!(shape(&regions), vec![("data", 0, 0)]);
    }

    #[test]
    fn test_comment_header_precedes_its_data() {
        let regions = build_regions(100, &[comment(20, 10, "x")], None, BuildOptions::default());
        assert_eq!(
            shape(&regions),
            vec![
                ("data", 0, 20),
                ("comment", 20, 10),
                ("data", 20, 10),
                ("data", 30, 70),
            ]
        );
    }

    #[test]
    fn test_nested_comments_split_and_indent() {
        let comments = [comment(10, 10, "inner"), comment(0, 100, "outer")];
        let mut regions = build_regions(110, &comments, None, BuildOptions::default());
        assert_eq!(
            shape(&regions),
            vec![
                ("comment", 0, 100),
                ("data", 0, 10),
                ("comment", 10, 10),
                ("data", 10, 10),
                ("data", 20, 80),
                ("data", 100, 10),
            ]
        );

        assign_indentation(&mut regions);
        let depths: Vec<u32> = regions.iter().map(Region::indent_depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 2, 1, 0]);
    }

    #[test]
    fn test_without_nesting_data_is_not_split_at_comment_end() {
        let options = BuildOptions {
            nest_comments: false,
            ..Default::default()
        };
        let regions = build_regions(100, &[comment(20, 10, "x")], None, options);
        assert_eq!(
            shape(&regions),
            vec![("data", 0, 20), ("comment", 20, 10), ("data", 20, 80)]
        );
    }

    #[test]
    fn test_comments_past_eof_are_dropped() {
        let regions = build_regions(
            50,
            &[comment(40, 100, "clamped"), comment(60, 1, "gone")],
            None,
            BuildOptions::default(),
        );
        assert_eq!(
            shape(&regions),
            vec![("data", 0, 40), ("comment", 40, 10), ("data", 40, 10)]
        );
    }

    #[test]
    fn test_highlight_map_lookup() {
        let annotations = Annotations {
            comments: vec![],
            highlights: vec![HighlightRecord {
                offset: 8,
                length: 4,
                fg: PaletteColour::Highlight(1),
                bg: PaletteColour::Highlight(2),
                strong: true,
            }],
        };
        let map = annotations.highlight_map();
        assert_eq!(map.highlight_at(7), None);
        assert!(map.highlight_at(8).is_some_and(|h| h.strong));
        assert!(map.highlight_at(11).is_some());
        assert_eq!(map.highlight_at(12), None);
    }

    #[test]
    fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(
            &path,
            r#"{ "comments": [{ "offset": 4, "length": 2, "text": "magic" }] }"#,
        )
        .unwrap();

        let annotations = Annotations::load(&path).unwrap();
        assert_eq!(annotations.comments, vec![comment(4, 2, "magic")]);
        assert!(annotations.highlights.is_empty());
    }

    #[test]
    fn test_load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Annotations::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse annotations"));
    }
}

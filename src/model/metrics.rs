//! Font metrics for the fixed-width data font
//!
//! String widths are precomputed for the first few hundred lengths so that
//! layout and hit-testing never have to measure text. Surfaces with kerning
//! or fractional advances report slightly non-linear widths, which is why the
//! table is measured rather than derived from a single character width.

use crate::surface::Surface;

/// Number of string lengths whose widths are measured up front
const PRECOMP_STRING_WIDTH_TO: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetrics {
    char_width: i32,
    line_height: i32,
    /// `string_widths[n]` is the pixel width of `n` characters
    string_widths: Vec<i32>,
}

impl FontMetrics {
    /// Metrics for an ideal monospace font. Values below one pixel are raised to one.
    pub fn monospace(char_width: i32, line_height: i32) -> Self {
        let char_width = char_width.max(1);
        let string_widths = (0..PRECOMP_STRING_WIDTH_TO as i32)
            .map(|n| n * char_width)
            .collect();

        Self {
            char_width,
            line_height: line_height.max(1),
            string_widths,
        }
    }

    /// Measure the surface's current font
    pub fn from_surface(surface: &dyn Surface) -> Self {
        let mut string_widths = Vec::with_capacity(PRECOMP_STRING_WIDTH_TO);
        let mut text = String::with_capacity(PRECOMP_STRING_WIDTH_TO);
        string_widths.push(0);

        for _ in 1..PRECOMP_STRING_WIDTH_TO {
            text.push('X');
            let measured = surface.text_width(&text);
            // Widths must be strictly increasing for char_at_x to invert them
            let prev = string_widths.last().copied().unwrap_or(0);
            string_widths.push(measured.max(prev + 1));
        }

        Self {
            char_width: string_widths[1],
            line_height: surface.line_height().max(1),
            string_widths,
        }
    }

    pub fn char_width(&self) -> i32 {
        self.char_width
    }

    pub fn line_height(&self) -> i32 {
        self.line_height
    }

    /// Whether switching from `other` to `self` changes any horizontal measurement
    pub fn widths_differ(&self, other: &FontMetrics) -> bool {
        self.string_widths != other.string_widths
    }

    /// Width in pixels of a string of `len` characters
    pub fn string_width(&self, len: usize) -> i32 {
        match self.string_widths.get(len) {
            Some(&width) => width,
            None => {
                let last = self.string_widths.len() - 1;
                let extra = (len - last) as i64 * self.char_width as i64;
                (self.string_widths[last] as i64 + extra).min(i32::MAX as i64) as i32
            }
        }
    }

    /// Index of the character cell containing pixel `x`.
    ///
    /// Negative coordinates map to the first cell.
    pub fn char_at_x(&self, x: i32) -> usize {
        if x <= 0 {
            return 0;
        }

        let last = self.string_widths.len() - 1;
        if x < self.string_widths[last] {
            // Largest n with string_widths[n] <= x
            self.string_widths.partition_point(|&w| w <= x) - 1
        } else {
            last + ((x - self.string_widths[last]) / self.char_width) as usize
        }
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::monospace(8, 16)
    }
}

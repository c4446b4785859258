//! Display options that drive layout
//!
//! Every option here invalidates the whole layout when it changes.

use serde::{Deserialize, Serialize};

pub const BYTES_PER_LINE_MIN: u32 = 1;
pub const BYTES_PER_LINE_MAX: u32 = 128;

/// How many bytes each data line shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BytesPerLineRepr", into = "BytesPerLineRepr")]
pub enum BytesPerLine {
    /// As many bytes as fit in the client width
    FitBytes,
    /// As many whole groups as fit in the client width
    FitGroups,
    /// A fixed count, clamped to `[BYTES_PER_LINE_MIN, BYTES_PER_LINE_MAX]`
    Fixed(u32),
}

impl BytesPerLine {
    pub fn fixed(count: u32) -> Self {
        BytesPerLine::Fixed(count.clamp(BYTES_PER_LINE_MIN, BYTES_PER_LINE_MAX))
    }
}

impl Default for BytesPerLine {
    fn default() -> Self {
        BytesPerLine::Fixed(16)
    }
}

impl std::str::FromStr for BytesPerLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fit-bytes" => Ok(BytesPerLine::FitBytes),
            "fit-groups" => Ok(BytesPerLine::FitGroups),
            other => other
                .parse::<u32>()
                .map(BytesPerLine::fixed)
                .map_err(|_| format!("expected a number, fit-bytes or fit-groups, got '{}'", other)),
        }
    }
}

/// YAML/JSON shape: either a plain number or one of the policy names
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum BytesPerLineRepr {
    Fixed(u32),
    Policy(FitPolicy),
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum FitPolicy {
    FitBytes,
    FitGroups,
}

impl From<BytesPerLineRepr> for BytesPerLine {
    fn from(repr: BytesPerLineRepr) -> Self {
        match repr {
            BytesPerLineRepr::Fixed(n) => BytesPerLine::fixed(n),
            BytesPerLineRepr::Policy(FitPolicy::FitBytes) => BytesPerLine::FitBytes,
            BytesPerLineRepr::Policy(FitPolicy::FitGroups) => BytesPerLine::FitGroups,
        }
    }
}

impl From<BytesPerLine> for BytesPerLineRepr {
    fn from(value: BytesPerLine) -> Self {
        match value {
            BytesPerLine::Fixed(n) => BytesPerLineRepr::Fixed(n),
            BytesPerLine::FitBytes => BytesPerLineRepr::Policy(FitPolicy::FitBytes),
            BytesPerLine::FitGroups => BytesPerLineRepr::Policy(FitPolicy::FitGroups),
        }
    }
}

/// Numeric base of the offset column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetBase {
    #[default]
    Hex,
    Dec,
}

impl OffsetBase {
    /// Characters needed to print any 64-bit offset
    pub fn column_chars(self) -> usize {
        match self {
            OffsetBase::Hex => 17,
            OffsetBase::Dec => 20,
        }
    }

    pub fn format(self, offset: u64) -> String {
        match self {
            OffsetBase::Hex => format!("{:08X}:{:08X}", offset >> 32, offset & 0xFFFF_FFFF),
            OffsetBase::Dec => format!("{:020}", offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub bytes_per_line: BytesPerLine,
    pub bytes_per_group: u32,
    pub show_offsets: bool,
    pub offset_base: OffsetBase,
    pub show_ascii: bool,
    pub highlight_selection_match: bool,
}

impl DisplayOptions {
    /// Group size used for layout; never zero
    pub fn group_size(&self) -> u32 {
        self.bytes_per_group.max(1)
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            bytes_per_line: BytesPerLine::default(),
            bytes_per_group: 4,
            show_offsets: true,
            offset_base: OffsetBase::Hex,
            show_ascii: true,
            highlight_selection_match: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_is_clamped() {
        assert_eq!(BytesPerLine::fixed(0), BytesPerLine::Fixed(1));
        assert_eq!(BytesPerLine::fixed(500), BytesPerLine::Fixed(128));
        assert_eq!(BytesPerLine::fixed(24), BytesPerLine::Fixed(24));
    }

    #[test]
    fn test_bytes_per_line_from_str() {
        assert_eq!("fit-bytes".parse::<BytesPerLine>(), Ok(BytesPerLine::FitBytes));
        assert_eq!("fit-groups".parse::<BytesPerLine>(), Ok(BytesPerLine::FitGroups));
        assert_eq!("32".parse::<BytesPerLine>(), Ok(BytesPerLine::Fixed(32)));
        assert!("lots".parse::<BytesPerLine>().is_err());
    }

    #[test]
    fn test_bytes_per_line_yaml_shapes() {
        let options: DisplayOptions = serde_yaml::from_str("bytes_per_line: fit-groups\n").unwrap();
        assert_eq!(options.bytes_per_line, BytesPerLine::FitGroups);

        let options: DisplayOptions = serde_yaml::from_str("bytes_per_line: 300\n").unwrap();
        assert_eq!(options.bytes_per_line, BytesPerLine::Fixed(128));
        assert!(options.show_ascii, "missing fields take defaults");
    }

    #[test]
    fn test_offset_formatting() {
        assert_eq!(OffsetBase::Hex.format(0x1_0000_00FF), "00000001:000000FF");
        assert_eq!(OffsetBase::Hex.format(0).len(), OffsetBase::Hex.column_chars());
        assert_eq!(OffsetBase::Dec.format(42), "00000000000000000042");
        assert_eq!(OffsetBase::Dec.format(u64::MAX), "18446744073709551615");
        assert_eq!(OffsetBase::Dec.format(u64::MAX).len(), OffsetBase::Dec.column_chars());
    }
}

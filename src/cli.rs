//! Command-line argument parsing for the viewer
//!
//! Supports:
//! - Picking the window position and size
//! - Overriding the configured display options
//! - Loading comment/highlight annotations
//! - Dumping the computed layout as JSON
//! - Copying bytes to the system clipboard

use clap::Parser;
use std::path::PathBuf;

use crate::model::options::{BytesPerLine, DisplayOptions, OffsetBase};

/// Render part of a binary file as a hex dump
#[derive(Parser, Debug)]
#[command(name = "hexpane", version, about = "Render part of a binary file as a hex dump")]
pub struct CliArgs {
    /// File to show
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON file with comments and highlights
    #[arg(short, long, value_name = "PATH")]
    pub annotations: Option<PathBuf>,

    /// Bytes per line: a number, fit-bytes or fit-groups
    #[arg(short, long, value_name = "N")]
    pub bytes_per_line: Option<BytesPerLine>,

    /// Bytes per group
    #[arg(short, long, value_name = "N")]
    pub group: Option<u32>,

    /// Window width in characters
    #[arg(long, value_name = "COLS", default_value_t = 80)]
    pub width: usize,

    /// Window height in lines
    #[arg(long, value_name = "N", default_value_t = 24)]
    pub lines: usize,

    /// Byte to start at (decimal, or hex with a 0x prefix)
    #[arg(short, long, value_name = "N", value_parser = parse_offset, default_value = "0")]
    pub offset: u64,

    /// Print offsets in decimal
    #[arg(long)]
    pub dec: bool,

    /// Hide the ASCII column
    #[arg(long)]
    pub no_ascii: bool,

    /// Print the computed layout as JSON instead of rendering
    #[arg(long)]
    pub dump_layout: bool,

    /// Copy N bytes from --offset to the clipboard as hex
    #[arg(long, value_name = "N", value_parser = parse_offset)]
    pub copy: Option<u64>,

    /// Print where the log file is written, then exit
    #[arg(long)]
    pub log_path: bool,
}

impl CliArgs {
    /// Layer the command-line overrides on top of configured options
    pub fn apply_to(&self, options: &mut DisplayOptions) {
        if let Some(bytes_per_line) = self.bytes_per_line {
            options.bytes_per_line = bytes_per_line;
        }
        if let Some(group) = self.group {
            options.bytes_per_group = group.max(1);
        }
        if self.dec {
            options.offset_base = OffsetBase::Dec;
        }
        if self.no_ascii {
            options.show_ascii = false;
        }
    }
}

fn parse_offset(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid offset '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["hexpane", "dump.bin"]);
        assert_eq!(args.file, PathBuf::from("dump.bin"));
        assert_eq!(args.width, 80);
        assert_eq!(args.lines, 24);
        assert_eq!(args.offset, 0);
        assert!(!args.dump_layout);
        assert_eq!(args.copy, None);
        assert!(!args.log_path);

        let mut options = DisplayOptions::default();
        args.apply_to(&mut options);
        assert_eq!(options, DisplayOptions::default());
    }

    #[test]
    fn test_hex_offset() {
        let args = CliArgs::parse_from(["hexpane", "f", "--offset", "0x1F0"]);
        assert_eq!(args.offset, 0x1F0);
        assert!(CliArgs::try_parse_from(["hexpane", "f", "--offset", "0xZZ"]).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let args = CliArgs::parse_from([
            "hexpane",
            "f",
            "--bytes-per-line",
            "fit-groups",
            "--group",
            "8",
            "--dec",
            "--no-ascii",
        ]);
        let mut options = DisplayOptions::default();
        args.apply_to(&mut options);
        assert_eq!(options.bytes_per_line, BytesPerLine::FitGroups);
        assert_eq!(options.bytes_per_group, 8);
        assert_eq!(options.offset_base, OffsetBase::Dec);
        assert!(!options.show_ascii);
    }

    #[test]
    fn test_copy_length() {
        let args = CliArgs::parse_from(["hexpane", "f", "--offset", "16", "--copy", "0x20"]);
        assert_eq!(args.offset, 16);
        assert_eq!(args.copy, Some(32));
    }

    #[test]
    fn test_fixed_bytes_per_line_is_clamped() {
        let args = CliArgs::parse_from(["hexpane", "f", "-b", "1000"]);
        assert_eq!(args.bytes_per_line, Some(BytesPerLine::Fixed(128)));
    }
}

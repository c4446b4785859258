//! Utility modules

pub mod text;

pub use text::format_text;

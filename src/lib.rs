//! hexpane - layout and navigation core for a hex viewer
//!
//! This crate lays out a binary file as an ordered list of regions (hex/ASCII
//! data lines and comment blocks), maps pixels to bytes and back, and drives
//! cursor, selection and scrolling through the Elm Architecture pattern.

pub mod annotations;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod messages;
pub mod model;
pub mod storage;
pub mod surface;
pub mod tracing;
pub mod update;
pub mod util;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::ViewConfig;
pub use messages::Msg;
pub use model::DocumentView;

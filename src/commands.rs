//! Command types for the Elm-style architecture
//!
//! Commands represent side effects the host should perform after an update.
//! The view never touches storage, the clipboard or the window itself.

use anyhow::Result;

use crate::clipboard::{ClipboardPayload, ClipboardSink};
use crate::model::cursor::CursorState;

/// A storage mutation requested by keyboard or paste handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKind {
    Overwrite { offset: u64, data: Vec<u8> },
    Insert { offset: u64, data: Vec<u8> },
    Erase { offset: u64, length: u64 },
    /// Erase `length` bytes at `offset` and insert `data` in their place
    Replace {
        offset: u64,
        length: u64,
        data: Vec<u8>,
    },
}

/// An edit plus where the cursor belongs once the edit has been applied
/// and the region list rebuilt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub kind: EditKind,
    pub cursor_after: u64,
    pub state_after: CursorState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Request a full redraw
    Redraw,
    /// Only the cursor blink state changed
    RedrawCursor,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
    /// Apply an edit to storage
    Edit(EditRequest),
    /// Place a payload on the clipboard
    CopyToClipboard(ClipboardPayload),
    /// A comment block was clicked
    CommentActivated { offset: u64, length: u64 },
    /// Right click; `offset` is the byte under the pointer, if any
    ShowContextMenu { offset: Option<u64> },
}

impl Cmd {
    /// Combine two optional commands, flattening as needed
    pub fn merge(a: Option<Cmd>, b: Option<Cmd>) -> Option<Cmd> {
        match (a, b) {
            (None, b) => b,
            (a, None) => a,
            (Some(Cmd::Batch(mut cmds)), Some(b)) => {
                cmds.push(b);
                Some(Cmd::Batch(cmds))
            }
            (Some(a), Some(b)) => Some(Cmd::Batch(vec![a, b])),
        }
    }

    /// Hand every clipboard payload in this command to `sink`.
    /// Returns how many were written.
    pub fn deliver_clipboard(&self, sink: &mut dyn ClipboardSink) -> Result<usize> {
        match self {
            Cmd::CopyToClipboard(payload) => {
                sink.put(payload.clone())?;
                Ok(1)
            }
            Cmd::Batch(cmds) => {
                let mut written = 0;
                for cmd in cmds {
                    written += cmd.deliver_clipboard(&mut *sink)?;
                }
                Ok(written)
            }
            _ => Ok(0),
        }
    }

    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Batch(cmds) => cmds.iter().any(Cmd::needs_redraw),
            Cmd::Redraw | Cmd::RedrawCursor => true,
            _ => false,
        }
    }
}

//! Clipboard sink contract and implementations
//!
//! Copy produces a [`ClipboardPayload`]; how it is marshalled into the
//! platform clipboard is the sink's business.

use anyhow::{Context, Result};

/// What the view puts on (or takes off) the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardPayload {
    /// Bytes as hex digits, e.g. `"DEADBEEF"`
    HexText(String),
    /// Bytes as raw text
    Text(String),
}

impl ClipboardPayload {
    pub fn text(&self) -> &str {
        match self {
            ClipboardPayload::HexText(text) | ClipboardPayload::Text(text) => text,
        }
    }
}

pub trait ClipboardSink {
    fn put(&mut self, payload: ClipboardPayload) -> Result<()>;

    fn paste_available(&mut self) -> bool;

    fn fetch(&mut self) -> Option<ClipboardPayload>;
}

/// System clipboard via arboard. Everything is exchanged as plain text.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().context("Failed to open system clipboard")?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    fn put(&mut self, payload: ClipboardPayload) -> Result<()> {
        self.inner
            .set_text(payload.text().to_string())
            .context("Failed to write clipboard")
    }

    fn paste_available(&mut self) -> bool {
        self.inner.get_text().is_ok_and(|text| !text.is_empty())
    }

    fn fetch(&mut self) -> Option<ClipboardPayload> {
        match self.inner.get_text() {
            Ok(text) => Some(ClipboardPayload::Text(text)),
            Err(e) => {
                tracing::debug!("Clipboard read failed: {}", e);
                None
            }
        }
    }
}

/// Process-local clipboard, used by tests and headless hosts
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    content: Option<ClipboardPayload>,
}

impl MemoryClipboard {
    pub fn with_payload(payload: ClipboardPayload) -> Self {
        Self {
            content: Some(payload),
        }
    }

    pub fn content(&self) -> Option<&ClipboardPayload> {
        self.content.as_ref()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn put(&mut self, payload: ClipboardPayload) -> Result<()> {
        self.content = Some(payload);
        Ok(())
    }

    fn paste_available(&mut self) -> bool {
        self.content.as_ref().is_some_and(|p| !p.text().is_empty())
    }

    fn fetch(&mut self) -> Option<ClipboardPayload> {
        self.content.clone()
    }
}

/// Upper-case hex digits, no separators
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Parse hex digits, ignoring whitespace. `None` on odd length or a non-hex character.
pub fn parse_hex(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;

    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    Some(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0xDE, 0xAD, 0x00, 0x0F]), "DEAD000F");
        assert_eq!(hex_encode(&[]), "");
    }

    #[test]
    fn test_parse_hex_accepts_spacing_and_case() {
        assert_eq!(parse_hex("de ad\nBE ef"), Some(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    }

    #[test]
    fn test_parse_hex_rejects_bad_input() {
        assert_eq!(parse_hex("ABC"), None);
        assert_eq!(parse_hex("zz"), None);
        assert_eq!(parse_hex("   "), None);
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::default();
        assert!(!clipboard.paste_available());
        clipboard.put(ClipboardPayload::HexText("00FF".into())).unwrap();
        assert!(clipboard.paste_available());
        assert_eq!(clipboard.fetch(), Some(ClipboardPayload::HexText("00FF".into())));
    }
}

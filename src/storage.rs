//! Read-only byte storage consumed by the view
//!
//! The view never writes through these types. Edits leave the view as
//! [`EditRequest`](crate::commands::EditRequest)s, and the owner of the
//! storage applies them and then hands the view a fresh region list.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::commands::{EditKind, EditRequest};

pub trait ByteSource {
    /// Total length of the file in bytes
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read up to `max_len` bytes starting at `offset`. Short reads happen at EOF.
    fn read(&self, offset: u64, max_len: usize) -> Result<Vec<u8>>;

    /// Whether the byte at `offset` has an unsaved edit
    fn is_modified(&self, _offset: u64) -> bool {
        false
    }
}

/// In-memory buffer with edit tracking
#[derive(Debug, Default)]
pub struct MemorySource {
    data: RefCell<Vec<u8>>,
    modified: RefCell<BTreeSet<u64>>,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: RefCell::new(data),
            modified: RefCell::new(BTreeSet::new()),
        }
    }

    /// Apply an edit produced by the view, marking the touched bytes modified
    pub fn apply(&self, edit: &EditRequest) {
        let mut data = self.data.borrow_mut();
        let mut modified = self.modified.borrow_mut();

        match &edit.kind {
            EditKind::Overwrite { offset, data: bytes } => {
                let start = (*offset as usize).min(data.len());
                let end = (start + bytes.len()).min(data.len());
                data[start..end].copy_from_slice(&bytes[..end - start]);
                modified.extend(start as u64..end as u64);
            }
            EditKind::Insert { offset, data: bytes } => {
                let at = (*offset as usize).min(data.len());
                data.splice(at..at, bytes.iter().copied());
                respan_marks(&mut modified, at as u64, 0, bytes.len() as u64);
            }
            EditKind::Erase { offset, length } => {
                let start = (*offset as usize).min(data.len());
                let end = (start + *length as usize).min(data.len());
                data.drain(start..end);
                respan_marks(&mut modified, start as u64, (end - start) as u64, 0);
            }
            EditKind::Replace {
                offset,
                length,
                data: bytes,
            } => {
                let start = (*offset as usize).min(data.len());
                let end = (start + *length as usize).min(data.len());
                data.splice(start..end, bytes.iter().copied());
                respan_marks(
                    &mut modified,
                    start as u64,
                    (end - start) as u64,
                    bytes.len() as u64,
                );
            }
        }
        tracing::debug!("Applied {:?}, length now {}", edit.kind, data.len());
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }
}

/// Replace `removed` marked offsets at `start` with `inserted` fresh ones,
/// moving every later mark along with its byte
fn respan_marks(modified: &mut BTreeSet<u64>, start: u64, removed: u64, inserted: u64) {
    let mut moved = modified.split_off(&start);
    moved.retain(|&o| o >= start + removed);
    modified.extend(moved.into_iter().map(|o| o - removed + inserted));
    modified.extend(start..start + inserted);
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.borrow().len() as u64
    }

    fn read(&self, offset: u64, max_len: usize) -> Result<Vec<u8>> {
        let data = self.data.borrow();
        let start = (offset as usize).min(data.len());
        let end = start.saturating_add(max_len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    fn is_modified(&self, offset: u64) -> bool {
        self.modified.borrow().contains(&offset)
    }
}

/// Random-access reads straight from a file on disk
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    file: RefCell<File>,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();

        tracing::info!("Opened {} ({} bytes)", path.display(), len);
        Ok(Self {
            path: path.to_path_buf(),
            file: RefCell::new(file),
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read(&self, offset: u64, max_len: usize) -> Result<Vec<u8>> {
        if offset >= self.len {
            return Ok(Vec::new());
        }

        let want = (self.len - offset).min(max_len as u64) as usize;
        let mut buf = vec![0u8; want];
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(offset))
            .with_context(|| format!("Failed to seek to {} in {}", offset, self.path.display()))?;

        let mut filled = 0;
        while filled < want {
            let n = file
                .read(&mut buf[filled..])
                .with_context(|| format!("Failed to read {}", self.path.display()))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cursor::CursorState;
    use std::io::Write;

    fn edit(kind: EditKind) -> EditRequest {
        EditRequest {
            kind,
            cursor_after: 0,
            state_after: CursorState::Hex,
        }
    }

    #[test]
    fn test_memory_read_is_clamped_to_length() {
        let source = MemorySource::new(vec![1, 2, 3, 4]);
        assert_eq!(source.read(2, 10).unwrap(), vec![3, 4]);
        assert!(source.read(9, 10).unwrap().is_empty());
    }

    #[test]
    fn test_memory_apply_tracks_modified_bytes() {
        let source = MemorySource::new(vec![0; 4]);
        source.apply(&edit(EditKind::Overwrite {
            offset: 1,
            data: vec![0xAA, 0xBB],
        }));
        assert_eq!(source.to_vec(), vec![0, 0xAA, 0xBB, 0]);
        assert!(source.is_modified(1));
        assert!(source.is_modified(2));
        assert!(!source.is_modified(3));

        source.apply(&edit(EditKind::Insert {
            offset: 4,
            data: vec![0xCC],
        }));
        source.apply(&edit(EditKind::Erase {
            offset: 0,
            length: 1,
        }));
        assert_eq!(source.to_vec(), vec![0xAA, 0xBB, 0, 0xCC]);
        let marked: Vec<u64> = (0..4).filter(|&o| source.is_modified(o)).collect();
        assert_eq!(marked, vec![0, 1, 3]);
    }

    #[test]
    fn test_modified_marks_follow_their_bytes() {
        let source = MemorySource::new(vec![0; 10]);
        source.apply(&edit(EditKind::Overwrite {
            offset: 8,
            data: vec![0xEE],
        }));

        // Insert before the mark pushes it right
        source.apply(&edit(EditKind::Insert {
            offset: 2,
            data: vec![1, 2, 3],
        }));
        let marked: Vec<u64> = (0..13).filter(|&o| source.is_modified(o)).collect();
        assert_eq!(marked, vec![2, 3, 4, 11]);
        assert_eq!(source.read(11, 1).unwrap(), vec![0xEE]);

        // Erasing the inserted bytes drops their marks and pulls the old one back
        source.apply(&edit(EditKind::Erase {
            offset: 2,
            length: 3,
        }));
        let marked: Vec<u64> = (0..10).filter(|&o| source.is_modified(o)).collect();
        assert_eq!(marked, vec![8]);

        // Shrinking replace before the mark
        source.apply(&edit(EditKind::Replace {
            offset: 0,
            length: 4,
            data: vec![7],
        }));
        let marked: Vec<u64> = (0..7).filter(|&o| source.is_modified(o)).collect();
        assert_eq!(marked, vec![0, 5]);
        assert_eq!(source.read(5, 1).unwrap(), vec![0xEE]);
    }

    #[test]
    fn test_file_source_reads_ranges() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&(0u8..=255).collect::<Vec<_>>()).unwrap();
        file.flush().unwrap();

        let source = FileSource::open(file.path()).unwrap();
        assert_eq!(source.len(), 256);
        assert_eq!(source.read(250, 16).unwrap(), vec![250, 251, 252, 253, 254, 255]);
        assert_eq!(source.read(16, 2).unwrap(), vec![16, 17]);
    }

    #[test]
    fn test_file_source_missing_file_errors() {
        let err = FileSource::open("/definitely/not/here.bin").unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}

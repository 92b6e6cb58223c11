//! The buffer proper: arena ownership, line index maintenance, and the
//! structural edit operations the cursor engine composes (byte edits, line
//! split/join/splice, raw append).

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use core_text::{ALLOC_SLACK, Line};

use crate::BufferError;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BufferFlags: u8 {
        /// Unsaved edits exist.
        const DIRTY = 0b0000_0001;
        /// Read-only content (directory listings, message buffers).
        const RO    = 0b0000_0010;
    }
}

/// Stable, non-owning buffer identity handed out by the editor state. Used
/// for the single-level `prev` back-reference instead of a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// An editable document: raw byte arena, ordered line index, identity, and
/// the viewport/cursor bookkeeping the cursor engine maintains.
#[derive(Debug)]
pub struct Buffer {
    /// Shared raw storage; view lines borrow ranges of it. Only ever grows
    /// (appends at the end), so recorded view ranges stay valid for the
    /// buffer's lifetime.
    pub(crate) data: Vec<u8>,
    pub(crate) lines: Vec<Line>,

    /// Display name.
    pub name: String,
    /// Filesystem identity; `None` means not file-backed.
    pub path: Option<PathBuf>,
    /// Internal scratch/system buffer, tracked on a separate list.
    pub internal: bool,
    pub(crate) flags: BufferFlags,
    /// Buffer that was active before this one (single-level restore).
    pub prev: Option<BufferId>,

    /// Index of the first visible line.
    pub top: usize,
    /// 1-based visible row within the frame holding the cursor.
    pub line: usize,
    /// 1-based render column of the cursor.
    pub column: usize,
    /// 1-based absolute screen row, accounting for wrapped lines between
    /// `top` and the cursor line. Recomputed wholesale, never tracked
    /// incrementally.
    pub cursor_line: usize,
    /// Byte offset within the current line. At most the trailing newline's
    /// index on a terminated line; on an unterminated final line the
    /// one-past-the-end offset is also legal, so appending at the buffer
    /// tail stays reachable.
    pub loff: usize,
}

impl Buffer {
    fn bare(name: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            lines: Vec::new(),
            name: name.into(),
            path: None,
            internal: false,
            flags: BufferFlags::empty(),
            prev: None,
            top: 0,
            line: 1,
            column: 1,
            cursor_line: 1,
            loff: 0,
        }
    }

    /// Empty scratch buffer seeded with a single `"\n"` line.
    pub fn scratch(name: impl Into<String>) -> Self {
        let mut buf = Self::bare(name);
        buf.data.push(b'\n');
        buf.lines.push(Line::view(&buf.data, 0, 1));
        buf
    }

    /// Internal (system) buffer, e.g. message or listing output. Starts
    /// empty; content arrives through [`Buffer::append`].
    pub fn internal(name: impl Into<String>) -> Self {
        let mut buf = Self::scratch(name);
        buf.internal = true;
        buf
    }

    /// Buffer over an in-memory byte string, indexed the same way a loaded
    /// file is. Not file-backed until a path is assigned.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let mut buf = Self::bare(name);
        buf.data = bytes.to_vec();
        buf.index_region(0);
        if buf.lines.is_empty() {
            buf.lines.push(Line::view(&buf.data, 0, 0));
        }
        buf
    }

    /// Load `path` in full: a single sized read (retried only on `EINTR`),
    /// then one linear scan building the all-view line index.
    pub fn load(path: &Path) -> Result<Self, BufferError> {
        let mut file = File::open(path)?;
        let expected = file.metadata()?.len();
        let mut data = vec![0u8; expected as usize];
        let mut total = 0usize;
        while total < data.len() {
            match file.read(&mut data[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if total as u64 != expected {
            return Err(BufferError::ShortRead {
                expected,
                actual: total as u64,
            });
        }

        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("buffer")
            .to_string();
        let mut buf = Self::bare(name);
        buf.path = Some(path.to_path_buf());
        buf.data = data;
        buf.index_region(0);
        if buf.lines.is_empty() {
            // Empty file: keep one zero-length view so cursor invariants
            // hold; saving it writes zero bytes.
            buf.lines.push(Line::view(&buf.data, 0, 0));
        }
        tracing::debug!(
            target: "io",
            file = %path.display(),
            size_bytes = total,
            line_count = buf.lines.len(),
            "file_read_ok"
        );
        Ok(buf)
    }

    /// Split `data[from..]` into view lines at every `\n` (inclusive); a
    /// final chunk without a newline is still recorded.
    fn index_region(&mut self, mut from: usize) {
        let end = self.data.len();
        while from < end {
            let stop = match self.data[from..end].iter().position(|&b| b == b'\n') {
                Some(i) => from + i + 1,
                None => end,
            };
            self.lines.push(Line::view(&self.data, from, stop - from));
            from = stop;
        }
    }

    /// Append raw bytes at the arena's end, extending the line index. Used
    /// for building synthetic buffers (messages, listings) line by line.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let new_len = self
            .data
            .len()
            .checked_add(bytes.len())
            .expect("buffer length overflow");
        if new_len > self.data.capacity() {
            self.data.reserve(bytes.len().max(ALLOC_SLACK));
        }
        let mut scan_from = self.data.len();
        self.data.extend_from_slice(bytes);

        // An unterminated trailing line absorbs the first appended segment.
        let absorb = self
            .lines
            .last()
            .is_some_and(|l| l.bytes(&self.data).last() != Some(&b'\n'));
        if absorb {
            let last = self.lines.last().expect("non-empty line index");
            match last.view_range() {
                // Contiguous view: fold it into the rescan.
                Some(r) if r.end == scan_from => {
                    scan_from = r.start;
                    self.lines.pop();
                }
                // Materialized (or detached view): extend it with the first
                // appended segment up to and including its newline.
                _ => {
                    let stop = match self.data[scan_from..].iter().position(|&b| b == b'\n') {
                        Some(i) => scan_from + i + 1,
                        None => self.data.len(),
                    };
                    let segment = self.data[scan_from..stop].to_vec();
                    let idx = self.lines.len() - 1;
                    self.lines[idx].extend(&self.data, &segment);
                    scan_from = stop;
                }
            }
        }
        self.index_region(scan_from);
    }

    // ---- line index access -------------------------------------------------

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, idx: usize) -> &Line {
        &self.lines[idx]
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_bytes(&self, idx: usize) -> &[u8] {
        self.lines[idx].bytes(&self.data)
    }

    /// Byte length of line `idx` excluding a trailing newline.
    pub fn content_len(&self, idx: usize) -> usize {
        self.lines[idx].content_len(&self.data)
    }

    pub fn arena(&self) -> &[u8] {
        &self.data
    }

    /// Index of the line holding the cursor. Bookkeeping violations here are
    /// bugs, not recoverable errors.
    pub fn cur_index(&self) -> usize {
        assert!(self.line >= 1, "cursor row must be 1-based");
        let idx = self.top + self.line - 1;
        assert!(idx < self.lines.len(), "cursor line outside buffer");
        idx
    }

    pub fn cur_line(&self) -> &Line {
        &self.lines[self.cur_index()]
    }

    pub fn cur_bytes(&self) -> &[u8] {
        self.line_bytes(self.cur_index())
    }

    // ---- flags -------------------------------------------------------------

    pub fn flags(&self) -> BufferFlags {
        self.flags
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.contains(BufferFlags::DIRTY)
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.contains(BufferFlags::RO)
    }

    pub fn set_read_only(&mut self, ro: bool) {
        self.flags.set(BufferFlags::RO, ro);
    }

    pub fn mark_dirty(&mut self) {
        self.flags.insert(BufferFlags::DIRTY);
    }

    // ---- structural edits --------------------------------------------------
    //
    // These mutate bytes and the line index only; cursor column/offset
    // updates are the cursor engine's job.

    /// Insert one byte into line `idx` at `off`.
    pub fn insert_byte_at(&mut self, idx: usize, off: usize, byte: u8) {
        self.lines[idx].insert_byte(&self.data, off, byte);
        self.flags.insert(BufferFlags::DIRTY);
    }

    /// Remove and return the byte at (`idx`, `off`).
    pub fn remove_byte_at(&mut self, idx: usize, off: usize) -> u8 {
        let b = self.lines[idx].remove_byte(&self.data, off);
        self.flags.insert(BufferFlags::DIRTY);
        b
    }

    /// Newline insertion: insert `\n` at (`idx`, `off`), then split the
    /// remainder into a new owned line directly after `idx`.
    pub fn split_line(&mut self, idx: usize, off: usize) {
        self.lines[idx].insert_byte(&self.data, off, b'\n');
        let rest = self.lines[idx].split_off(&self.data, off + 1);
        self.lines.insert(idx + 1, rest);
        self.flags.insert(BufferFlags::DIRTY);
    }

    /// Merge line `idx + 1` into line `idx`, dropping the separating
    /// newline. Returns the junction offset (former content length of
    /// `idx`), where the cursor belongs after a backward erase at line
    /// start.
    pub fn join_line(&mut self, idx: usize) -> usize {
        assert!(idx + 1 < self.lines.len(), "join requires a following line");
        let tail = self.lines.remove(idx + 1);
        let tail_bytes = tail.bytes(&self.data).to_vec();
        if self.lines[idx].bytes(&self.data).last() == Some(&b'\n') {
            let last = self.lines[idx].len() - 1;
            self.lines[idx].remove_byte(&self.data, last);
        }
        let junction = self.lines[idx].len();
        self.lines[idx].extend(&self.data, &tail_bytes);
        self.flags.insert(BufferFlags::DIRTY);
        junction
    }

    /// Splice line `idx` out of the index (the empty-line erase path).
    pub fn remove_line(&mut self, idx: usize) -> Line {
        assert!(self.lines.len() > 1, "cannot remove the last line");
        let line = self.lines.remove(idx);
        self.flags.insert(BufferFlags::DIRTY);
        line
    }
}

//! The copy-on-write line store.
//!
//! Freshly loaded buffers index their content as `View` lines: byte ranges
//! into the buffer's raw arena, allocated nowhere else. The first byte-level
//! edit of a line copies it out into an `Owned` growable block
//! (materialization); the arena bytes behind it are never touched again, so
//! unedited neighbors keep their zero-copy views and the save path can stream
//! whole runs of them straight from the arena.

use crate::{ALLOC_SLACK, width};

#[derive(Debug, Clone)]
enum Repr {
    /// Window into the owning buffer's arena; not independently freed.
    View { start: usize, len: usize },
    /// Materialized: heap block owned by the line itself.
    Owned(Vec<u8>),
}

/// One editable line. Holds bytes *including* the trailing newline when
/// present (every line except possibly a final unterminated one ends in
/// `\n`), plus a render-width cache kept current by every mutator.
#[derive(Debug, Clone)]
pub struct Line {
    repr: Repr,
    columns: usize,
}

impl Line {
    /// Zero-copy line referencing `arena[start..start + len]`.
    pub fn view(arena: &[u8], start: usize, len: usize) -> Self {
        let columns = width::columns_of(&arena[start..start + len]);
        Self {
            repr: Repr::View { start, len },
            columns,
        }
    }

    /// Line owning its bytes outright (newline-split remainders, scratch
    /// content).
    pub fn owned(bytes: Vec<u8>) -> Self {
        let columns = width::columns_of(&bytes);
        Self {
            repr: Repr::Owned(bytes),
            columns,
        }
    }

    /// Byte length including a trailing newline when present.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::View { len, .. } => *len,
            Repr::Owned(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached render width in terminal columns (trailing newline excluded).
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self.repr, Repr::Owned(_))
    }

    /// Arena range backing a view line; `None` once materialized.
    pub fn view_range(&self) -> Option<std::ops::Range<usize>> {
        match self.repr {
            Repr::View { start, len } => Some(start..start + len),
            Repr::Owned(_) => None,
        }
    }

    /// The line's bytes, resolved against the owning buffer's arena.
    pub fn bytes<'a>(&'a self, arena: &'a [u8]) -> &'a [u8] {
        match &self.repr {
            Repr::View { start, len } => &arena[*start..*start + *len],
            Repr::Owned(v) => v,
        }
    }

    /// Byte length excluding a trailing newline.
    pub fn content_len(&self, arena: &[u8]) -> usize {
        let bytes = self.bytes(arena);
        match bytes.last() {
            Some(b'\n') => bytes.len() - 1,
            _ => bytes.len(),
        }
    }

    /// Copy a view line out of the arena into its own allocation, with slack
    /// so the first few edits avoid reallocating. Idempotent: a line
    /// materializes at most once and later edits grow the same block.
    pub fn materialize(&mut self, arena: &[u8]) {
        if let Repr::View { start, len } = self.repr {
            let mut owned = Vec::with_capacity(len + ALLOC_SLACK);
            owned.extend_from_slice(&arena[start..start + len]);
            self.repr = Repr::Owned(owned);
        }
    }

    fn owned_mut(&mut self) -> &mut Vec<u8> {
        match &mut self.repr {
            Repr::Owned(v) => v,
            Repr::View { .. } => unreachable!("line must be materialized before mutation"),
        }
    }

    /// Insert one byte at `offset`, shifting the tail right.
    pub fn insert_byte(&mut self, arena: &[u8], offset: usize, byte: u8) {
        self.materialize(arena);
        let v = self.owned_mut();
        assert!(offset <= v.len(), "insert offset out of range");
        if v.len() == v.capacity() {
            v.reserve(ALLOC_SLACK);
        }
        v.insert(offset, byte);
        self.columns = width::columns_of(v);
    }

    /// Remove and return the byte at `offset`, closing the gap.
    pub fn remove_byte(&mut self, arena: &[u8], offset: usize) -> u8 {
        self.materialize(arena);
        let v = self.owned_mut();
        assert!(offset < v.len(), "remove offset out of range");
        let b = v.remove(offset);
        self.columns = width::columns_of(v);
        b
    }

    /// Truncate to `offset` bytes and return the remainder as a new owned
    /// line. Newline insertion splits through here.
    pub fn split_off(&mut self, arena: &[u8], offset: usize) -> Line {
        self.materialize(arena);
        let v = self.owned_mut();
        assert!(offset <= v.len(), "split offset out of range");
        let rest = v.split_off(offset);
        self.columns = width::columns_of(v);
        Line::owned(rest)
    }

    /// Append `bytes` (line join path). `bytes` must not alias the arena.
    pub fn extend(&mut self, arena: &[u8], bytes: &[u8]) {
        self.materialize(arena);
        let v = self.owned_mut();
        if v.len() + bytes.len() > v.capacity() {
            v.reserve(bytes.len().max(ALLOC_SLACK));
        }
        v.extend_from_slice(bytes);
        self.columns = width::columns_of(v);
    }
}
